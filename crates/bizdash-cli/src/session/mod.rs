//! Session storage and client construction for CLI commands.

pub mod storage;

use std::path::PathBuf;
use std::time::Duration;

/// Connection settings shared by every command.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub store: Option<PathBuf>,
    pub refresh_timeout: Duration,
}
