//! Home directory resolution for csvm
//!
//! The home directory anchors the global config file
//! (`{home}/.config/csvm/config.toml`).
//!
//! # Precedence
//!
//! 1. `CSVM_HOME` environment variable (if set and non-empty)
//! 2. `dirs::home_dir()` platform default
//!
//! Integration tests set `CSVM_HOME` to a temp directory so a developer's
//! real config never leaks into a test run:
//!
//! ```ignore
//! use assert_cmd::Command;
//! use tempfile::TempDir;
//!
//! let temp_dir = TempDir::new().unwrap();
//! let mut cmd = Command::cargo_bin("csvm").unwrap();
//! cmd.env("CSVM_HOME", temp_dir.path());
//! ```

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Get the home directory for csvm operations
///
/// # Errors
///
/// Returns an error if `CSVM_HOME` is unset and the platform home directory
/// cannot be determined.
pub fn get_home_dir() -> Result<PathBuf> {
    if let Ok(home) = std::env::var("CSVM_HOME") {
        let trimmed = home.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }

    dirs::home_dir().context("Could not determine home directory")
}

/// Path of the global config file under `home`
pub fn global_config_path(home: &std::path::Path) -> PathBuf {
    home.join(".config/csvm/config.toml")
}
