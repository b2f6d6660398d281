//! Picking the Nth entry of a folder.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Order in which folder entries are counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingOrder {
    /// Whatever order the filesystem yields. Not stable across platforms.
    #[default]
    Filesystem,
    /// Sorted by file name.
    Alphabetical,
}

/// Return the entry at 1-based position `ordinal` in `folder`.
///
/// Every entry counts, including subdirectories and non-image files.
/// `None` when the folder has fewer entries than `ordinal` or `ordinal` is 0.
/// A missing or unreadable folder is an error.
pub fn locate(folder: &Path, ordinal: usize, order: ListingOrder) -> Result<Option<PathBuf>> {
    let Some(index) = ordinal.checked_sub(1) else {
        return Ok(None);
    };

    let mut entries = fs::read_dir(folder)?;

    let found = match order {
        ListingOrder::Filesystem => entries.nth(index).transpose()?.map(|e| e.path()),
        ListingOrder::Alphabetical => {
            let mut paths = entries
                .map(|entry| entry.map(|e| e.path()))
                .collect::<std::io::Result<Vec<_>>>()?;
            paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
            paths.into_iter().nth(index)
        }
    };

    match &found {
        Some(path) => debug!("Entry {} of {} is {}", ordinal, folder.display(), path.display()),
        None => debug!("{} has fewer than {} entries", folder.display(), ordinal),
    }

    Ok(found)
}
