//! CSV file operations: create, append, read, rewrite

use crate::io::{atomic::replace_file, error::StoreError};
use crate::table::{Header, Record, Table};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Outcome of [`create`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// File did not exist and was written with the header row
    Created,

    /// File was already present and left untouched
    AlreadyExists,
}

/// Create `path` containing only the header row, unless it already exists
///
/// Uses `create_new`, so an existing file is never truncated even if it
/// appears between the caller's existence check and this call.
///
/// # Errors
///
/// Returns `StoreError::Io` if the file cannot be created or written.
pub fn create(path: &Path, header: &Header) -> Result<CreateOutcome, StoreError> {
    let file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(CreateOutcome::AlreadyExists),
        Err(e) => return Err(StoreError::io(path, e)),
    };

    let mut writer = csv_writer(file);
    writer
        .write_record(header.fields())
        .map_err(|e| StoreError::csv(path, e))?;
    writer.flush().map_err(|e| StoreError::io(path, e))?;

    Ok(CreateOutcome::Created)
}

/// Append one record as the last line of an existing file
///
/// If the file does not end with a newline (hand-edited files often don't),
/// one is written first so the record lands on its own line.
///
/// # Errors
///
/// Returns `StoreError::Io` if the file is missing or cannot be written.
pub fn append_record(path: &Path, record: &Record) -> Result<(), StoreError> {
    let mut file = OpenOptions::new()
        .read(true)
        .append(true)
        .open(path)
        .map_err(|e| StoreError::io(path, e))?;

    if !ends_with_newline(&mut file).map_err(|e| StoreError::io(path, e))? {
        file.write_all(b"\n").map_err(|e| StoreError::io(path, e))?;
    }

    let mut writer = csv_writer(file);
    writer
        .write_record(record.fields())
        .map_err(|e| StoreError::csv(path, e))?;
    writer.flush().map_err(|e| StoreError::io(path, e))?;

    Ok(())
}

/// Read the first row of `path` as the header
///
/// # Errors
///
/// Returns `StoreError::MissingHeader` for an empty file, `StoreError::Io`
/// or `StoreError::Csv` if the file cannot be read.
pub fn read_header(path: &Path) -> Result<Header, StoreError> {
    let file = File::open(path).map_err(|e| StoreError::io(path, e))?;
    let mut reader = csv_reader(file);

    let mut row = StringRecord::new();
    let found = reader
        .read_record(&mut row)
        .map_err(|e| StoreError::csv(path, e))?;
    if !found {
        return Err(StoreError::MissingHeader {
            path: path.to_path_buf(),
        });
    }

    Ok(Header::new(to_fields(&row)))
}

/// Read the whole file: first row as header, the rest as records
///
/// Rows are not checked against the header length; files edited by hand may
/// be ragged and are carried through a rewrite as they are.
///
/// # Errors
///
/// Returns `StoreError::MissingHeader` for an empty file, `StoreError::Io`
/// or `StoreError::Csv` if the file cannot be read.
pub fn read_table(path: &Path) -> Result<Table, StoreError> {
    let file = File::open(path).map_err(|e| StoreError::io(path, e))?;
    let mut reader = csv_reader(file);

    let mut rows = reader.records();
    let header = match rows.next() {
        Some(row) => Header::new(to_fields(&row.map_err(|e| StoreError::csv(path, e))?)),
        None => {
            return Err(StoreError::MissingHeader {
                path: path.to_path_buf(),
            });
        }
    };

    let mut records = Vec::new();
    for row in rows {
        let row = row.map_err(|e| StoreError::csv(path, e))?;
        records.push(Record::new(to_fields(&row)));
    }

    Ok(Table::new(header, records))
}

/// Rewrite `path` with the full contents of `table`
///
/// # Errors
///
/// Returns `StoreError::Csv` if serialization fails, `StoreError::Io` if the
/// replacement cannot be written.
pub fn write_table(path: &Path, table: &Table) -> Result<(), StoreError> {
    let mut writer = csv_writer(Vec::new());

    writer
        .write_record(table.header.fields())
        .map_err(|e| StoreError::csv(path, e))?;
    for record in &table.records {
        writer
            .write_record(record.fields())
            .map_err(|e| StoreError::csv(path, e))?;
    }

    let content = writer
        .into_inner()
        .map_err(|e| StoreError::io(path, e.into_error()))?;

    replace_file(path, &content)
}

fn csv_reader<R: Read>(inner: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(inner)
}

fn csv_writer<W: Write>(inner: W) -> csv::Writer<W> {
    WriterBuilder::new().flexible(true).from_writer(inner)
}

fn to_fields(row: &StringRecord) -> Vec<String> {
    row.iter().map(str::to_string).collect()
}

fn ends_with_newline(file: &mut File) -> std::io::Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}
