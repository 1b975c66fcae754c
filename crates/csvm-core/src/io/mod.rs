//! CSV file I/O
//!
//! Raw file operations behind the [`crate::store::Store`]:
//!
//! - **Create**: header row written only if the file is absent
//! - **Append**: one record added at the end of the file
//! - **Rewrite**: whole table written to a synced sibling temp file, then
//!   renamed over the original
//!
//! None of these lock the file; a concurrent writer wins or loses by timing.
//!
//! # Example
//!
//! ```rust,no_run
//! use csv_mail_core::io::{append_record, create, read_table, CreateOutcome};
//! use csv_mail_core::{Header, Record};
//! use std::path::Path;
//!
//! let path = Path::new("people.csv");
//! if create(path, &Header::parse("name,age")).unwrap() == CreateOutcome::Created {
//!     println!("new file");
//! }
//! append_record(path, &Record::parse("Alice,30")).unwrap();
//! let table = read_table(path).unwrap();
//! assert_eq!(table.records.last(), Some(&Record::parse("Alice,30")));
//! ```

pub mod atomic;
pub mod csv_file;
pub mod error;

pub use csv_file::{append_record, create, read_header, read_table, write_table, CreateOutcome};
pub use error::StoreError;
