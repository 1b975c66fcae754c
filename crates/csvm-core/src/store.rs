//! CSV record store with email notifications
//!
//! [`Store`] binds a CSV path and its header to the session's
//! [`MessageContext`] and [`Notifier`]. Every mutating call checks the record
//! shape, touches the file through [`crate::io`], then announces the change.
//! File errors abort the call; notification errors are handed back inside
//! the [`Report`] for the caller to log.

use crate::io::{self, CreateOutcome, StoreError};
use crate::notify::{DeliveryOutcome, MessageContext, Notification, Notifier, NotifyError};
use crate::table::{Header, Record};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Result of a store operation plus what happened to its notification
#[derive(Debug)]
pub struct Report<T> {
    pub outcome: T,
    /// `None` when the operation sends no notification (e.g. update miss)
    pub notification: Option<Result<DeliveryOutcome, NotifyError>>,
}

impl<T> Report<T> {
    fn silent(outcome: T) -> Self {
        Self {
            outcome,
            notification: None,
        }
    }

    /// The notification error, if one was attempted and failed
    pub fn notify_error(&self) -> Option<&NotifyError> {
        match self.notification {
            Some(Err(ref e)) => Some(e),
            _ => None,
        }
    }
}

/// Outcome of [`Store::update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// First matching row replaced; `row` is its 1-based data row number
    Updated { row: usize },
    /// No row matched; file untouched
    NotFound,
}

/// Outcome of [`Store::delete`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub removed: usize,
}

/// A CSV file with a fixed header, whose mutations are announced by email
pub struct Store<'a> {
    path: PathBuf,
    header: Header,
    context: &'a MessageContext,
    notifier: &'a dyn Notifier,
}

impl<'a> Store<'a> {
    /// Bind `path` to `header` without touching the file
    pub fn new(
        path: impl Into<PathBuf>,
        header: Header,
        context: &'a MessageContext,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            path: path.into(),
            header,
            context,
            notifier,
        }
    }

    /// Bind an existing file, taking its first row as the header
    ///
    /// # Errors
    ///
    /// `StoreError::MissingHeader` for an empty file, `Io`/`Csv` otherwise.
    pub fn load(
        path: impl Into<PathBuf>,
        context: &'a MessageContext,
        notifier: &'a dyn Notifier,
    ) -> Result<Self, StoreError> {
        let path = path.into();
        let header = io::read_header(&path)?;
        debug!("Loaded header {header} from {}", path.display());
        Ok(Self::new(path, header, context, notifier))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Write the header row if the file is absent, announcing the new file
    pub fn ensure_created(&self) -> Result<Report<CreateOutcome>, StoreError> {
        match io::create(&self.path, &self.header)? {
            CreateOutcome::Created => {
                debug!("{} created with headers: {}", self.path.display(), self.header);
                let notification = Notification::new(
                    "CSV File Created",
                    format!(
                        "The CSV file {} was created with headers: {}",
                        self.path.display(),
                        self.header
                    ),
                );
                Ok(self.announce(CreateOutcome::Created, notification))
            }
            CreateOutcome::AlreadyExists => {
                debug!("{} already exists.", self.path.display());
                Ok(Report::silent(CreateOutcome::AlreadyExists))
            }
        }
    }

    /// Append `record` as the last row
    pub fn append(&self, record: &Record) -> Result<Report<()>, StoreError> {
        self.check_shape(record)?;
        io::append_record(&self.path, record)?;
        debug!("Record {record} added to {}.", self.path.display());

        let notification = Notification::new(
            "Record Added",
            format!("A new record was added to {}: {record}", self.path.display()),
        );
        Ok(self.announce((), notification))
    }

    /// Replace the first row equal to `old` with `new`
    ///
    /// Only `new` is checked against the header; `old` simply fails to match
    /// when its shape is wrong. A miss leaves the file untouched and sends
    /// nothing.
    pub fn update(&self, old: &Record, new: &Record) -> Result<Report<UpdateOutcome>, StoreError> {
        self.check_shape(new)?;

        let mut table = io::read_table(&self.path)?;
        let Some(index) = table.replace_first(old, new.clone()) else {
            debug!("Record {old} not found.");
            return Ok(Report::silent(UpdateOutcome::NotFound));
        };
        io::write_table(&self.path, &table)?;
        debug!("Record {old} updated to {new}.");

        let notification = Notification::new(
            "Record Updated",
            format!(
                "The record {old} was updated to {new} in {}.",
                self.path.display()
            ),
        );
        Ok(self.announce(UpdateOutcome::Updated { row: index + 1 }, notification))
    }

    /// Remove every row equal to `record`
    ///
    /// The file is rewritten and the deletion announced even when nothing
    /// matched.
    pub fn delete(&self, record: &Record) -> Result<Report<DeleteOutcome>, StoreError> {
        self.check_shape(record)?;

        let mut table = io::read_table(&self.path)?;
        let removed = table.remove_all(record);
        io::write_table(&self.path, &table)?;
        debug!("Record {record} deleted ({removed} row(s) removed).");

        let notification = Notification::new(
            "Record Deleted",
            format!("The record {record} was deleted from {}.", self.path.display()),
        );
        Ok(self.announce(DeleteOutcome { removed }, notification))
    }

    /// Send `notification` with this store's context
    pub fn notify(&self, notification: &Notification) -> Result<DeliveryOutcome, NotifyError> {
        self.notifier.notify(self.context, notification)
    }

    fn announce<T>(&self, outcome: T, notification: Notification) -> Report<T> {
        let result = self.notify(&notification);
        if let Err(ref e) = result {
            warn!("Notification '{}' failed: {e}", notification.subject);
        }
        Report {
            outcome,
            notification: Some(result),
        }
    }

    fn check_shape(&self, record: &Record) -> Result<(), StoreError> {
        if self.header.matches(record) {
            Ok(())
        } else {
            Err(StoreError::FieldCountMismatch {
                expected: self.header.len(),
                actual: record.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::testing::{context, RecordingNotifier};
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("people.csv");
        (temp_dir, path)
    }

    #[test]
    fn test_ensure_created_writes_header_and_notifies() {
        let (_temp_dir, path) = setup();
        let ctx = context();
        let notifier = RecordingNotifier::new();
        let store = Store::new(&path, Header::parse("name,age"), &ctx, &notifier);

        let report = store.ensure_created().unwrap();

        assert_eq!(report.outcome, CreateOutcome::Created);
        assert!(matches!(report.notification, Some(Ok(DeliveryOutcome::Sent))));
        assert_eq!(fs::read_to_string(&path).unwrap(), "name,age\n");
        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "CSV File Created");
        assert_eq!(
            sent[0].body,
            format!(
                "The CSV file {} was created with headers: [\"name\", \"age\"]",
                path.display()
            )
        );
    }

    #[test]
    fn test_ensure_created_twice_is_noop() {
        let (_temp_dir, path) = setup();
        let ctx = context();
        let notifier = RecordingNotifier::new();
        let store = Store::new(&path, Header::parse("name,age"), &ctx, &notifier);

        store.ensure_created().unwrap();
        let report = store.ensure_created().unwrap();

        assert_eq!(report.outcome, CreateOutcome::AlreadyExists);
        assert!(report.notification.is_none());
        assert_eq!(fs::read_to_string(&path).unwrap(), "name,age\n");
        assert_eq!(notifier.subjects(), vec!["CSV File Created"]);
    }

    #[test]
    fn test_write_update_delete_scenario() {
        let (_temp_dir, path) = setup();
        let ctx = context();
        let notifier = RecordingNotifier::new();
        let store = Store::new(&path, Header::parse("name,age"), &ctx, &notifier);
        store.ensure_created().unwrap();

        store.append(&Record::parse("Alice,30")).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "name,age\nAlice,30\n");

        let report = store
            .update(&Record::parse("Alice,30"), &Record::parse("Alice,31"))
            .unwrap();
        assert_eq!(report.outcome, UpdateOutcome::Updated { row: 1 });
        assert_eq!(fs::read_to_string(&path).unwrap(), "name,age\nAlice,31\n");

        let report = store.delete(&Record::parse("Alice,31")).unwrap();
        assert_eq!(report.outcome, DeleteOutcome { removed: 1 });
        assert_eq!(fs::read_to_string(&path).unwrap(), "name,age\n");

        assert_eq!(
            notifier.subjects(),
            vec![
                "CSV File Created",
                "Record Added",
                "Record Updated",
                "Record Deleted"
            ]
        );
    }

    #[test]
    fn test_append_rejects_short_record() {
        let (_temp_dir, path) = setup();
        let ctx = context();
        let notifier = RecordingNotifier::new();
        let store = Store::new(&path, Header::parse("name,age"), &ctx, &notifier);
        store.ensure_created().unwrap();

        let result = store.append(&Record::parse("Alice"));

        assert!(matches!(
            result,
            Err(StoreError::FieldCountMismatch { expected: 2, actual: 1 })
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), "name,age\n");
        assert_eq!(notifier.subjects(), vec!["CSV File Created"]);
    }

    #[test]
    fn test_update_replaces_only_first_match() {
        let (_temp_dir, path) = setup();
        fs::write(&path, "name,age\nAlice,30\nBob,40\nAlice,30\n").unwrap();
        let ctx = context();
        let notifier = RecordingNotifier::new();
        let store = Store::load(&path, &ctx, &notifier).unwrap();

        let report = store
            .update(&Record::parse("Alice,30"), &Record::parse("Alice,31"))
            .unwrap();

        assert_eq!(report.outcome, UpdateOutcome::Updated { row: 1 });
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "name,age\nAlice,31\nBob,40\nAlice,30\n"
        );
    }

    #[test]
    fn test_update_miss_sends_nothing() {
        let (_temp_dir, path) = setup();
        fs::write(&path, "name,age\nAlice,30\n").unwrap();
        let ctx = context();
        let notifier = RecordingNotifier::new();
        let store = Store::load(&path, &ctx, &notifier).unwrap();

        let report = store
            .update(&Record::parse("Carol,22"), &Record::parse("Carol,23"))
            .unwrap();

        assert_eq!(report.outcome, UpdateOutcome::NotFound);
        assert!(report.notification.is_none());
        assert!(notifier.sent().is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "name,age\nAlice,30\n");
    }

    #[test]
    fn test_update_does_not_check_old_record_shape() {
        let (_temp_dir, path) = setup();
        fs::write(&path, "name,age\nAlice\n").unwrap();
        let ctx = context();
        let notifier = RecordingNotifier::new();
        let store = Store::load(&path, &ctx, &notifier).unwrap();

        let report = store
            .update(&Record::parse("Alice"), &Record::parse("Alice,30"))
            .unwrap();
        assert_eq!(report.outcome, UpdateOutcome::Updated { row: 1 });

        let result = store.update(&Record::parse("Alice,30"), &Record::parse("Alice"));
        assert!(matches!(result, Err(StoreError::FieldCountMismatch { .. })));
        assert_eq!(fs::read_to_string(&path).unwrap(), "name,age\nAlice,30\n");
    }

    #[test]
    fn test_delete_removes_all_exact_matches() {
        let (_temp_dir, path) = setup();
        fs::write(&path, "name,age\nAlice,30\nalice,30\nAlice,30\nAlice,300\n").unwrap();
        let ctx = context();
        let notifier = RecordingNotifier::new();
        let store = Store::load(&path, &ctx, &notifier).unwrap();

        let report = store.delete(&Record::parse("Alice,30")).unwrap();

        assert_eq!(report.outcome, DeleteOutcome { removed: 2 });
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "name,age\nalice,30\nAlice,300\n"
        );
    }

    #[test]
    fn test_delete_miss_still_notifies() {
        let (_temp_dir, path) = setup();
        fs::write(&path, "name,age\nAlice,30\n").unwrap();
        let ctx = context();
        let notifier = RecordingNotifier::new();
        let store = Store::load(&path, &ctx, &notifier).unwrap();

        let report = store.delete(&Record::parse("Carol,22")).unwrap();

        assert_eq!(report.outcome, DeleteOutcome { removed: 0 });
        assert_eq!(notifier.subjects(), vec!["Record Deleted"]);
        assert_eq!(fs::read_to_string(&path).unwrap(), "name,age\nAlice,30\n");
    }

    #[test]
    fn test_delete_never_removes_header() {
        let (_temp_dir, path) = setup();
        fs::write(&path, "name,age\nAlice,30\n").unwrap();
        let ctx = context();
        let notifier = RecordingNotifier::new();
        let store = Store::load(&path, &ctx, &notifier).unwrap();

        let report = store.delete(&Record::parse("name,age")).unwrap();

        assert_eq!(report.outcome, DeleteOutcome { removed: 0 });
        assert_eq!(fs::read_to_string(&path).unwrap(), "name,age\nAlice,30\n");
    }

    #[test]
    fn test_notification_failure_is_reported_not_fatal() {
        let (_temp_dir, path) = setup();
        let ctx = context();
        let notifier = RecordingNotifier::failing();
        let store = Store::new(&path, Header::parse("name,age"), &ctx, &notifier);
        store.ensure_created().unwrap();

        let report = store.append(&Record::parse("Alice,30")).unwrap();

        assert!(matches!(report.notify_error(), Some(NotifyError::Transport(_))));
        assert_eq!(fs::read_to_string(&path).unwrap(), "name,age\nAlice,30\n");
    }

    #[test]
    fn test_load_empty_file_errors() {
        let (_temp_dir, path) = setup();
        fs::write(&path, "").unwrap();
        let ctx = context();
        let notifier = RecordingNotifier::new();

        let result = Store::load(&path, &ctx, &notifier);
        assert!(matches!(result, Err(StoreError::MissingHeader { .. })));
    }

    #[test]
    fn test_io_error_propagates() {
        let (_temp_dir, path) = setup();
        let ctx = context();
        let notifier = RecordingNotifier::new();
        let store = Store::new(&path, Header::parse("name,age"), &ctx, &notifier);

        let result = store.delete(&Record::parse("Alice,30"));
        assert!(matches!(result, Err(StoreError::Io { .. })));
        assert!(notifier.sent().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_rewrite_through_symlink_updates_target() {
        let (temp_dir, real) = setup();
        let link = temp_dir.path().join("link.csv");
        fs::write(&real, "name,age\nAlice,30\nBob,40\n").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();
        let ctx = context();
        let notifier = RecordingNotifier::new();
        let store = Store::load(&link, &ctx, &notifier).unwrap();

        store.delete(&Record::parse("Alice,30")).unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&real).unwrap(), "name,age\nBob,40\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_update_keeps_private_mode() {
        use std::os::unix::fs::PermissionsExt;

        let (_temp_dir, path) = setup();
        fs::write(&path, "name,age\nAlice,30\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();
        let ctx = context();
        let notifier = RecordingNotifier::new();
        let store = Store::load(&path, &ctx, &notifier).unwrap();

        store
            .update(&Record::parse("Alice,30"), &Record::parse("Alice,31"))
            .unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(fs::read_to_string(&path).unwrap(), "name,age\nAlice,31\n");
    }
}
