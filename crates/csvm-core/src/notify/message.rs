//! Message addressing and MIME assembly

use crate::notify::{DeliveryOutcome, Notification, NotifyError};
use lettre::address::{Address, Envelope};
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::Message;
use tracing::warn;

/// Addressing for every notification of a session
///
/// The SMTP envelope and the visible headers are kept apart:
///
/// - `envelope_from`: MAIL FROM and header `From`; the configured sending
///   account. `None` when no account is configured, in which case building
///   a message fails with [`NotifyError::MissingConfig`].
/// - `envelope_to`: RCPT TO list; who actually receives the message.
/// - `display_to`: header `To`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContext {
    pub envelope_from: Option<Address>,
    pub envelope_to: Vec<Address>,
    pub display_to: Address,
}

impl MessageContext {
    /// Context for a session run by `user`: sent from `sender`, delivered to
    /// and displayed as `user`.
    pub fn new(sender: Option<Address>, user: Address) -> Self {
        Self {
            envelope_from: sender,
            envelope_to: vec![user.clone()],
            display_to: user,
        }
    }
}

/// Parse an email address, trimming surrounding whitespace
pub fn parse_address(input: &str) -> Result<Address, NotifyError> {
    let trimmed = input.trim();
    trimmed
        .parse::<Address>()
        .map_err(|e| NotifyError::InvalidAddress {
            address: trimmed.to_string(),
            reason: e.to_string(),
        })
}

/// Assemble the MIME message for `notification`
///
/// The body is `text/plain`; an attachment becomes an
/// `application/octet-stream` part named after the file's base name. When
/// the attachment cannot be read the message is built without it and the
/// returned outcome says so.
///
/// # Errors
///
/// `MissingConfig` without a sender, `Build` if lettre rejects the parts.
pub fn build_message(
    context: &MessageContext,
    notification: &Notification,
) -> Result<(Message, DeliveryOutcome), NotifyError> {
    let sender = context.envelope_from.clone().ok_or_else(|| {
        NotifyError::MissingConfig("sender account (notify.sender or smtp.username)".to_string())
    })?;

    let envelope = Envelope::new(Some(sender.clone()), context.envelope_to.clone())
        .map_err(|e| NotifyError::Build(e.to_string()))?;

    let mut parts = MultiPart::mixed().singlepart(SinglePart::plain(notification.body.clone()));
    let mut outcome = DeliveryOutcome::Sent;

    if let Some(ref path) = notification.attachment {
        match std::fs::read(path) {
            Ok(content) => {
                let filename = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                let content_type = ContentType::parse("application/octet-stream")
                    .map_err(|e| NotifyError::Build(e.to_string()))?;
                parts = parts.singlepart(Attachment::new(filename).body(content, content_type));
            }
            Err(e) => {
                warn!("Error attaching file {}: {e}", path.display());
                outcome = DeliveryOutcome::SentWithoutAttachment {
                    path: path.clone(),
                    reason: e.to_string(),
                };
            }
        }
    }

    let message = Message::builder()
        .from(Mailbox::new(None, sender))
        .to(Mailbox::new(None, context.display_to.clone()))
        .subject(notification.subject.clone())
        .envelope(envelope)
        .multipart(parts)
        .map_err(|e| NotifyError::Build(e.to_string()))?;

    Ok((message, outcome))
}
