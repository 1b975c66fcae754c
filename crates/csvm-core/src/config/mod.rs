//! Configuration resolution
//!
//! Resolves configuration from multiple sources with priority:
//! 1. Command-line flags (passed as parameters)
//! 2. Environment variables
//! 3. Repo-local config (.csvm.toml)
//! 4. Global config (~/.config/csvm/config.toml)
//! 5. Defaults

mod discovery;
mod types;

pub use discovery::{resolve_config, ConfigError, ConfigOverrides, ConfigSources};
pub use types::{Config, NotifyConfig, SmtpConfig, SmtpSecurity, TransportKind};
