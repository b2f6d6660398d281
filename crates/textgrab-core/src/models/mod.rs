//! Configuration and request models.

pub mod config;
pub mod language;
pub mod request;
