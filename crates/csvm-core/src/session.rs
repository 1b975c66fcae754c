//! Interactive session
//!
//! A read-eval loop over any `BufRead`/`Write` pair:
//!
//! ```text
//! Init -> HeaderResolution -> OperationLoop -> Terminated
//! ```
//!
//! `Init` asks for the user's address, `HeaderResolution` for the CSV path
//! (and a header if the file is new), `OperationLoop` for write / update /
//! delete / exit. On `Terminated` the operation log is emailed with the CSV
//! attached. End of input anywhere in the loop counts as `exit`.

use crate::io::{CreateOutcome, StoreError};
use crate::notify::{
    parse_address, DeliveryOutcome, MessageContext, Notification, Notifier, NotifyError,
};
use crate::store::{Store, UpdateOutcome};
use crate::table::{Header, Record};
use lettre::Address;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

const RECORD_MISMATCH: &str = "Error: Record length does not match headers length.";
const NEW_RECORD_MISMATCH: &str = "Error: New record length does not match headers length.";
const INVALID_OPERATION: &str =
    "Invalid operation. Please choose 'write', 'update', 'delete', or 'exit'.";

/// Session errors that end the session early
#[derive(Debug, Error)]
pub enum SessionError {
    /// Reading the prompt input or writing the console failed
    #[error("Console I/O error: {0}")]
    Console(#[from] std::io::Error),

    /// CSV file operation failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Init,
    HeaderResolution,
    OperationLoop,
    Terminated,
}

/// Answers supplied up front; each one skips its prompt
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub email: Option<String>,
    pub csv_path: Option<PathBuf>,
}

/// What a finished session did
#[derive(Debug)]
pub struct SessionReport {
    /// State the session stopped in; anything but `Terminated` is an early return
    pub state: SessionState,
    pub csv_path: Option<PathBuf>,
    /// Operation log, in order
    pub log: Vec<String>,
    /// Result of the summary email, `None` if the session returned early
    pub summary: Option<Result<DeliveryOutcome, NotifyError>>,
}

/// One choice at the operation prompt
#[derive(Debug, Clone, PartialEq, Eq)]
enum Operation {
    Write,
    Update,
    Delete,
    Exit,
    Invalid,
}

impl Operation {
    fn parse(input: &str) -> Self {
        match input.trim().to_ascii_lowercase().as_str() {
            "write" => Self::Write,
            "update" => Self::Update,
            "delete" => Self::Delete,
            "exit" => Self::Exit,
            _ => Self::Invalid,
        }
    }
}

/// Interactive CSV editing session
pub struct Session<'a, R, W> {
    input: R,
    output: W,
    notifier: &'a dyn Notifier,
    sender: Option<Address>,
    options: SessionOptions,
    state: SessionState,
    log: Vec<String>,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    /// `sender` is the configured account notifications are sent from
    pub fn new(input: R, output: W, notifier: &'a dyn Notifier, sender: Option<Address>) -> Self {
        Self {
            input,
            output,
            notifier,
            sender,
            options: SessionOptions::default(),
            state: SessionState::Init,
            log: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    /// Drive the session to completion
    ///
    /// # Errors
    ///
    /// Console I/O failures and CSV file errors end the session with an
    /// error; no summary is sent. Input mistakes and email failures do not.
    pub fn run(mut self) -> Result<SessionReport, SessionError> {
        let Some(context) = self.init()? else {
            return Ok(self.finish(None, None));
        };

        self.transition(SessionState::HeaderResolution);
        let notifier = self.notifier;
        let Some(store) = self.resolve_header(&context, notifier)? else {
            return Ok(self.finish(None, None));
        };

        self.transition(SessionState::OperationLoop);
        self.operation_loop(&store)?;

        self.transition(SessionState::Terminated);
        let summary = self.send_summary(&store);
        let path = store.path().to_path_buf();
        Ok(self.finish(Some(path), Some(summary)))
    }

    fn transition(&mut self, next: SessionState) {
        debug!("session: {:?} -> {next:?}", self.state);
        self.state = next;
    }

    fn finish(
        self,
        csv_path: Option<PathBuf>,
        summary: Option<Result<DeliveryOutcome, NotifyError>>,
    ) -> SessionReport {
        SessionReport {
            state: self.state,
            csv_path,
            log: self.log,
            summary,
        }
    }

    /// Ask for the user's address and build the session's message context
    fn init(&mut self) -> Result<Option<MessageContext>, SessionError> {
        let email = match self.options.email.take() {
            Some(email) => Some(email),
            None => self.prompt("Enter your email address: ")?,
        };
        let email = email.map(|e| e.trim().to_string()).unwrap_or_default();

        if email.is_empty() {
            self.say("Error: Email address is required.")?;
            return Ok(None);
        }

        match parse_address(&email) {
            Ok(user) => Ok(Some(MessageContext::new(self.sender.clone(), user))),
            Err(e) => {
                self.say(&format!("Error: {e}"))?;
                Ok(None)
            }
        }
    }

    /// Ask for the CSV path; create the file with a new header or load the
    /// existing one
    fn resolve_header<'s>(
        &mut self,
        context: &'s MessageContext,
        notifier: &'s dyn Notifier,
    ) -> Result<Option<Store<'s>>, SessionError> {
        let path = match self.options.csv_path.take() {
            Some(path) => Some(path),
            None => self
                .prompt("Enter the path to the CSV file: ")?
                .map(|p| PathBuf::from(p.trim())),
        };
        let Some(path) = path.filter(|p| !p.as_os_str().is_empty()) else {
            self.say("Error: CSV file path is required.")?;
            return Ok(None);
        };

        if path.exists() {
            self.say(&format!("{} already exists.", path.display()))?;
            return Ok(Some(Store::load(path, context, notifier)?));
        }

        let Some(line) = self.prompt("Enter the headers for the CSV file (comma-separated): ")? else {
            self.say("Error: Headers are required for a new CSV file.")?;
            return Ok(None);
        };
        let store = Store::new(path, Header::parse(&line), context, notifier);
        match store.ensure_created()?.outcome {
            CreateOutcome::Created => self.say(&format!(
                "{} created with headers: {}",
                store.path().display(),
                store.header()
            ))?,
            CreateOutcome::AlreadyExists => {
                // Appeared after the existence check, or a dangling link
                self.say(&format!("{} already exists.", store.path().display()))?;
                return Ok(Some(Store::load(store.path(), context, notifier)?));
            }
        }
        Ok(Some(store))
    }

    fn operation_loop(&mut self, store: &Store<'_>) -> Result<(), SessionError> {
        loop {
            let keep_going = match self
                .prompt("Choose operation: write, update, delete, or exit: ")?
                .map(|choice| Operation::parse(&choice))
            {
                Some(Operation::Write) => self.write(store)?,
                Some(Operation::Update) => self.update(store)?,
                Some(Operation::Delete) => self.delete(store)?,
                Some(Operation::Exit) | None => false,
                Some(Operation::Invalid) => {
                    self.say(INVALID_OPERATION)?;
                    true
                }
            };

            if !keep_going {
                self.say("Exiting.")?;
                return Ok(());
            }
        }
    }

    /// Returns `false` when input ran out mid-operation, which ends the loop
    /// like `exit`
    fn write(&mut self, store: &Store<'_>) -> Result<bool, SessionError> {
        let Some(line) = self.prompt("Enter the record to write (comma-separated): ")? else {
            return Ok(false);
        };
        let record = Record::parse(&line);

        match store.append(&record) {
            Ok(_) => {
                self.say(&format!(
                    "Record {record} added to {}.",
                    store.path().display()
                ))?;
                self.log.push(format!("Added: {record}"));
            }
            Err(StoreError::FieldCountMismatch { .. }) => self.say(RECORD_MISMATCH)?,
            Err(e) => return Err(e.into()),
        }
        Ok(true)
    }

    fn update(&mut self, store: &Store<'_>) -> Result<bool, SessionError> {
        let Some(old_line) = self.prompt("Enter the old record to update (comma-separated): ")?
        else {
            return Ok(false);
        };
        let Some(new_line) = self.prompt("Enter the new record (comma-separated): ")? else {
            return Ok(false);
        };
        let old = Record::parse(&old_line);
        let new = Record::parse(&new_line);

        match store.update(&old, &new) {
            Ok(report) => {
                match report.outcome {
                    UpdateOutcome::Updated { row } => {
                        debug!(row, "update applied");
                        self.say(&format!("Record {old} updated to {new}."))?
                    }
                    UpdateOutcome::NotFound => self.say(&format!("Record {old} not found."))?,
                }
                self.log.push(format!("Updated: {old} to {new}"));
            }
            Err(StoreError::FieldCountMismatch { .. }) => self.say(NEW_RECORD_MISMATCH)?,
            Err(e) => return Err(e.into()),
        }
        Ok(true)
    }

    fn delete(&mut self, store: &Store<'_>) -> Result<bool, SessionError> {
        let Some(line) = self.prompt("Enter the record to delete (comma-separated): ")? else {
            return Ok(false);
        };
        let record = Record::parse(&line);

        match store.delete(&record) {
            Ok(_) => {
                self.say(&format!("Record {record} deleted."))?;
                self.log.push(format!("Deleted: {record}"));
            }
            Err(StoreError::FieldCountMismatch { .. }) => self.say(RECORD_MISMATCH)?,
            Err(e) => return Err(e.into()),
        }
        Ok(true)
    }

    /// Email the operation log with the CSV attached
    fn send_summary(&mut self, store: &Store<'_>) -> Result<DeliveryOutcome, NotifyError> {
        let notification = Notification::new(
            "CSV Operations Completed",
            format!(
                "Operations on the CSV file {} have been completed:\n{}",
                store.path().display(),
                self.log.join("\n")
            ),
        )
        .with_attachment(store.path());

        let result = store.notify(&notification);
        if let Err(ref e) = result {
            warn!("Summary email not sent: {e}");
        }
        result
    }

    /// Print `text` without a newline and read one line; `None` at end of input
    fn prompt(&mut self, text: &str) -> Result<Option<String>, SessionError> {
        write!(self.output, "{text}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn say(&mut self, text: &str) -> Result<(), SessionError> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }
}
