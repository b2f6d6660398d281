//! Writing the extracted text to disk.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Label used for the output file when no image was found.
pub const NULL_LABEL: &str = "None";

/// How an image file name becomes the output base name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BaseNameMode {
    /// Everything before the first dot: `photo.v2.png` -> `photo`.
    #[default]
    FirstDot,
    /// Drop only the last extension: `photo.v2.png` -> `photo.v2`.
    StripExtension,
}

/// Base name of `image` under `mode`.
///
/// The name stays an `OsString` so file names that are not valid UTF-8
/// keep their exact bytes.
pub fn base_name(image: &Path, mode: BaseNameMode) -> OsString {
    match mode {
        BaseNameMode::FirstDot => {
            let name = image.file_name().unwrap_or_default();
            let bytes = name.as_encoded_bytes();
            match bytes.iter().position(|b| *b == b'.') {
                // SAFETY: the split point is an ASCII byte taken from
                // `as_encoded_bytes`, which is a valid boundary.
                Some(dot) => unsafe { OsStr::from_encoded_bytes_unchecked(&bytes[..dot]) }
                    .to_os_string(),
                None => name.to_os_string(),
            }
        }
        BaseNameMode::StripExtension => image.file_stem().unwrap_or_default().to_os_string(),
    }
}

/// The line written when nothing could be extracted for `label`.
pub fn placeholder_line(label: &OsStr) -> String {
    format!("In {} - could not find or recognize text", label.to_string_lossy())
}

/// Write `lines` to `<dir>/<label>.txt`, one per line, replacing any
/// existing file. An empty `lines` writes the placeholder instead.
pub fn write_lines(dir: &Path, label: &OsStr, lines: &[String]) -> Result<PathBuf> {
    let mut file_name = label.to_os_string();
    file_name.push(".txt");
    let path = dir.join(file_name);

    let content: String = if lines.is_empty() {
        format!("{}\n", placeholder_line(label))
    } else {
        lines.iter().map(|line| format!("{}\n", line)).collect()
    };

    fs::write(&path, &content)?;
    debug!("Wrote {} bytes to {}", content.len(), path.display());

    Ok(path)
}
