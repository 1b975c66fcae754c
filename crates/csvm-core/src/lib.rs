//! Core types and operations for csv-mail (csvm)
//!
//! This crate provides everything behind the `csvm` CLI: a CSV record store
//! whose mutations are announced by email, the interactive session that
//! drives it, and the configuration of the mail transport.
//!
//! - [`table`]: header and record value types, comma-separated input parsing
//! - [`io`]: raw CSV file operations (create, append, rewrite)
//! - [`notify`]: message addressing, the [`notify::Notifier`] trait, lettre-backed mailer
//! - [`store`]: CSV operations paired with their notifications
//! - [`session`]: the interactive read-eval loop

pub mod config;
pub mod home;
pub mod io;
pub mod logging;
pub mod notify;
pub mod session;
pub mod store;
pub mod table;

pub use notify::{DeliveryOutcome, MessageContext, Notification, Notifier, NotifyError};
pub use session::{Session, SessionOptions, SessionReport, SessionState};
pub use store::Store;
pub use table::{Header, Record};
