//! Email notifications
//!
//! This module provides a thin abstraction over [lettre](https://lettre.rs):
//!
//! - [`MessageContext`]: who a notification is from and to, at both the SMTP
//!   envelope and the header level
//! - [`Notification`]: subject, plain-text body, optional file attachment
//! - [`Notifier`]: the delivery seam; [`Mailer`] is the lettre-backed one
//!
//! Delivery is best-effort. Failures come back as [`NotifyError`] values and
//! callers decide whether to log and carry on; nothing here retries.

pub mod mailer;
pub mod message;

pub use mailer::Mailer;
pub use message::{build_message, parse_address, MessageContext};

use std::path::PathBuf;
use thiserror::Error;

/// One email to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
    /// File attached as `application/octet-stream`, named by its base name
    pub attachment: Option<PathBuf>,
}

impl Notification {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, path: impl Into<PathBuf>) -> Self {
        self.attachment = Some(path.into());
        self
    }
}

/// Outcome of a successful notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Handed to the transport as built
    Sent,

    /// Attachment could not be read; the message went out without it
    SentWithoutAttachment { path: PathBuf, reason: String },

    /// Transport is disabled; the notification was only logged
    Suppressed,
}

/// Errors that can occur while building or delivering a notification
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Transport or addressing setting absent from the configuration
    #[error("Missing mail configuration: {0}")]
    MissingConfig(String),

    /// Address does not parse as an email address
    #[error("Invalid email address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// MIME message could not be assembled
    #[error("Failed to build message: {0}")]
    Build(String),

    /// Transport rejected or failed to deliver the message
    #[error("Error sending email: {0}")]
    Transport(String),
}

/// Delivery seam for notifications
pub trait Notifier {
    /// Build and deliver `notification` addressed per `context`
    fn notify(
        &self,
        context: &MessageContext,
        notification: &Notification,
    ) -> Result<DeliveryOutcome, NotifyError>;
}
