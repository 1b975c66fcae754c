//! lettre-backed [`Notifier`]

use crate::config::{Config, SmtpSecurity, TransportKind};
use crate::notify::{
    build_message, DeliveryOutcome, MessageContext, Notification, Notifier, NotifyError,
};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{FileTransport, SmtpTransport, Transport};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Sends notifications over the transport chosen in [`Config::notify`]
pub struct Mailer {
    transport: MailTransport,
}

enum MailTransport {
    Smtp(SmtpTransport),
    File { outbox_dir: PathBuf },
    Disabled,
    /// Transport selected but not usable; every send reports why
    Unconfigured { missing: String },
}

impl Mailer {
    /// Build a mailer from resolved configuration
    ///
    /// Missing credentials or a missing outbox directory do not fail here:
    /// the CSV operations must keep working, so the gap is reported by each
    /// later [`Notifier::notify`] call instead.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Transport` if lettre rejects the SMTP host.
    pub fn from_config(config: &Config) -> Result<Self, NotifyError> {
        let transport = match config.notify.transport {
            TransportKind::Disabled => MailTransport::Disabled,
            TransportKind::File => match config.notify.outbox_dir {
                Some(ref dir) => MailTransport::File {
                    outbox_dir: dir.clone(),
                },
                None => unconfigured("notify.outbox_dir"),
            },
            TransportKind::Smtp => {
                let smtp = &config.smtp;
                match (smtp.username.as_deref(), smtp.password.as_deref()) {
                    (Some(user), Some(password)) => {
                        let builder = match smtp.security {
                            SmtpSecurity::Starttls => SmtpTransport::starttls_relay(&smtp.host),
                            SmtpSecurity::Tls => SmtpTransport::relay(&smtp.host),
                            SmtpSecurity::None => Ok(SmtpTransport::builder_dangerous(&smtp.host)),
                        }
                        .map_err(|e| NotifyError::Transport(e.to_string()))?;

                        MailTransport::Smtp(
                            builder
                                .port(smtp.port)
                                .credentials(Credentials::new(
                                    user.to_string(),
                                    password.to_string(),
                                ))
                                .build(),
                        )
                    }
                    (None, _) => unconfigured("smtp.username"),
                    (Some(_), None) => unconfigured("smtp.password"),
                }
            }
        };

        Ok(Self { transport })
    }
}

fn unconfigured(missing: &str) -> MailTransport {
    warn!("Email notifications are not configured: {missing} is not set");
    MailTransport::Unconfigured {
        missing: missing.to_string(),
    }
}

impl Notifier for Mailer {
    fn notify(
        &self,
        context: &MessageContext,
        notification: &Notification,
    ) -> Result<DeliveryOutcome, NotifyError> {
        match self.transport {
            MailTransport::Disabled => {
                info!(
                    subject = %notification.subject,
                    to = %context.display_to,
                    "Notification suppressed (transport disabled)"
                );
                return Ok(DeliveryOutcome::Suppressed);
            }
            MailTransport::Unconfigured { ref missing } => {
                return Err(NotifyError::MissingConfig(missing.clone()));
            }
            _ => {}
        }

        let (message, outcome) = build_message(context, notification)?;

        match self.transport {
            MailTransport::Smtp(ref smtp) => {
                smtp.send(&message)
                    .map_err(|e| NotifyError::Transport(e.to_string()))?;
            }
            MailTransport::File { ref outbox_dir } => {
                std::fs::create_dir_all(outbox_dir).map_err(|e| {
                    NotifyError::Transport(format!("{}: {e}", outbox_dir.display()))
                })?;
                let id = FileTransport::new(outbox_dir)
                    .send(&message)
                    .map_err(|e| NotifyError::Transport(e.to_string()))?;
                debug!("Wrote {id}.eml to {}", outbox_dir.display());
            }
            MailTransport::Disabled | MailTransport::Unconfigured { .. } => {}
        }

        info!(
            subject = %notification.subject,
            "Notification email sent to {}",
            context.display_to
        );
        Ok(outcome)
    }
}
