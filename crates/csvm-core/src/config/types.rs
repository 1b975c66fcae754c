//! Configuration types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Complete configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// SMTP connection settings
    #[serde(default)]
    pub smtp: SmtpConfig,
    /// Notification delivery settings
    #[serde(default)]
    pub notify: NotifyConfig,
}

/// SMTP connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    /// Server hostname
    pub host: String,
    /// Submission port
    pub port: u16,
    /// Login name, usually the sending account's address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Login secret (app passcode)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Connection security
    pub security: SmtpSecurity,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 587,
            username: None,
            password: None,
            security: SmtpSecurity::Starttls,
        }
    }
}

/// SMTP connection security
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    /// Plain connection upgraded with STARTTLS
    Starttls,
    /// Implicit TLS from the first byte
    Tls,
    /// No encryption (local relays only)
    None,
}

impl fmt::Display for SmtpSecurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Starttls => f.write_str("starttls"),
            Self::Tls => f.write_str("tls"),
            Self::None => f.write_str("none"),
        }
    }
}

/// Notification delivery settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// How messages leave the process
    pub transport: TransportKind,
    /// Directory receiving `.eml` files when `transport = "file"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outbox_dir: Option<PathBuf>,
    /// Sending account address (defaults to `smtp.username`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
}

/// Notification transport
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Deliver over SMTP
    #[default]
    Smtp,
    /// Write each message as an `.eml` file into `outbox_dir`
    File,
    /// Log and drop
    Disabled,
}

impl FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "smtp" => Ok(Self::Smtp),
            "file" => Ok(Self::File),
            "disabled" | "none" | "off" => Ok(Self::Disabled),
            other => Err(format!(
                "unknown transport '{other}' (expected smtp, file, or disabled)"
            )),
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Smtp => f.write_str("smtp"),
            Self::File => f.write_str("file"),
            Self::Disabled => f.write_str("disabled"),
        }
    }
}

impl Config {
    /// The account notifications are sent from: `notify.sender`, else
    /// `smtp.username`.
    pub fn sender(&self) -> Option<&str> {
        self.notify
            .sender
            .as_deref()
            .or(self.smtp.username.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}
