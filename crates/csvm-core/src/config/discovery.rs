//! Configuration discovery and resolution

use super::types::{Config, TransportKind};
use crate::home::global_config_path;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// TOML parsing error
    #[error("TOML parsing error in {path}: {source}")]
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Command-line overrides for configuration
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    /// Explicit config file, applied after the discovered ones
    pub config_path: Option<PathBuf>,
    /// Override transport
    pub transport: Option<TransportKind>,
    /// Override outbox directory
    pub outbox_dir: Option<PathBuf>,
}

/// Config files that take part in resolution, lowest priority first
#[derive(Debug, Clone)]
pub struct ConfigSources {
    /// Global config path (may not exist)
    pub global: PathBuf,
    /// Nearest `.csvm.toml` between the current dir and the git root
    pub repo: Option<PathBuf>,
    /// `--config` file
    pub explicit: Option<PathBuf>,
}

impl ConfigSources {
    pub fn discover(overrides: &ConfigOverrides, current_dir: &Path, home_dir: &Path) -> Self {
        Self {
            global: global_config_path(home_dir),
            repo: find_repo_local_config(current_dir),
            explicit: overrides.config_path.clone(),
        }
    }

    /// Existing files in the order they are applied
    pub fn existing(&self) -> Vec<&Path> {
        let mut paths = Vec::new();
        if self.global.exists() {
            paths.push(self.global.as_path());
        }
        if let Some(ref repo) = self.repo {
            paths.push(repo.as_path());
        }
        if let Some(ref explicit) = self.explicit {
            if explicit.exists() {
                paths.push(explicit.as_path());
            }
        }
        paths
    }
}

/// Resolve configuration from all sources
///
/// Priority (highest to lowest):
/// 1. Command-line overrides (`--config` file, then flag values)
/// 2. Environment variables
/// 3. Repo-local config (.csvm.toml in current dir or up to git root)
/// 4. Global config (~/.config/csvm/config.toml)
/// 5. Defaults
///
/// Files are merged key by key, so a repo file that only sets
/// `notify.transport` keeps the SMTP credentials from the global file.
/// Discovered files that fail to parse are skipped with a warning; an
/// explicit `--config` file that fails is an error.
pub fn resolve_config(
    overrides: &ConfigOverrides,
    current_dir: &Path,
    home_dir: &Path,
) -> Result<Config, ConfigError> {
    let sources = ConfigSources::discover(overrides, current_dir, home_dir);
    let mut merged = toml::Table::new();

    // 4. Global config
    if sources.global.exists() {
        match load_config_table(&sources.global) {
            Ok(table) => merge_tables(&mut merged, table),
            Err(e) => warn!("Skipping global config: {e}"),
        }
    }

    // 3. Repo-local config
    if let Some(ref repo_config) = sources.repo {
        match load_config_table(repo_config) {
            Ok(table) => merge_tables(&mut merged, table),
            Err(e) => warn!("Skipping repo config: {e}"),
        }
    }

    // 1a. Explicit config file
    if let Some(ref explicit) = sources.explicit {
        merge_tables(&mut merged, load_config_table(explicit)?);
    }

    let mut config = toml::Value::Table(merged)
        .try_into::<Config>()
        .map_err(|source| ConfigError::TomlParse {
            path: sources.explicit.clone().unwrap_or(sources.global.clone()),
            source,
        })?;

    // 2. Environment variables
    apply_env_overrides(&mut config);

    // 1b. Command-line flags
    apply_cli_overrides(&mut config, overrides);

    debug!(
        transport = %config.notify.transport,
        host = %config.smtp.host,
        port = config.smtp.port,
        "resolved configuration"
    );

    Ok(config)
}

/// Find repo-local config file
///
/// Searches current directory and parent directories up to git root
fn find_repo_local_config(current_dir: &Path) -> Option<PathBuf> {
    let mut dir = current_dir;

    loop {
        let config_path = dir.join(".csvm.toml");
        if config_path.exists() {
            return Some(config_path);
        }

        // Stop at git root
        if dir.join(".git").exists() {
            break;
        }

        dir = dir.parent()?;
    }

    None
}

/// Load a config file as a raw TOML table, rejecting files that do not fit
/// the [`Config`] shape
fn load_config_table(path: &Path) -> Result<toml::Table, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table: toml::Table = contents.parse().map_err(|source| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source,
    })?;

    // Shape check so one bad file cannot poison the merged result
    toml::Value::Table(table.clone())
        .try_into::<Config>()
        .map_err(|source| ConfigError::TomlParse {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(table)
}

/// Recursively merge `overlay` into `base`; overlay values win
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        if let toml::Value::Table(overlay_table) = value {
            if let Some(toml::Value::Table(base_table)) = base.get_mut(&key) {
                merge_tables(base_table, overlay_table);
                continue;
            }
            base.insert(key, toml::Value::Table(overlay_table));
        } else {
            base.insert(key, value);
        }
    }
}

/// Apply environment variable overrides
fn apply_env_overrides(config: &mut Config) {
    if let Ok(host) = std::env::var("CSVM_SMTP_HOST") {
        config.smtp.host = host;
    }

    if let Ok(port) = std::env::var("CSVM_SMTP_PORT") {
        match port.trim().parse() {
            Ok(port) => config.smtp.port = port,
            Err(_) => warn!("Ignoring invalid CSVM_SMTP_PORT '{port}'"),
        }
    }

    if let Ok(user) = std::env::var("CSVM_SMTP_USER") {
        config.smtp.username = Some(user);
    }

    if let Ok(password) = std::env::var("CSVM_SMTP_PASSWORD") {
        config.smtp.password = Some(password);
    }

    if let Ok(sender) = std::env::var("CSVM_SENDER") {
        config.notify.sender = Some(sender);
    }

    if let Ok(transport) = std::env::var("CSVM_TRANSPORT") {
        match transport.parse() {
            Ok(kind) => config.notify.transport = kind,
            Err(e) => warn!("Ignoring CSVM_TRANSPORT: {e}"),
        }
    }

    if let Ok(dir) = std::env::var("CSVM_OUTBOX_DIR") {
        config.notify.outbox_dir = Some(PathBuf::from(dir));
    }
}

/// Apply command-line overrides
fn apply_cli_overrides(config: &mut Config, overrides: &ConfigOverrides) {
    if let Some(transport) = overrides.transport {
        config.notify.transport = transport;
    }

    if let Some(ref dir) = overrides.outbox_dir {
        config.notify.outbox_dir = Some(dir.clone());
    }
}
