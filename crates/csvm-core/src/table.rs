//! Header and record value types
//!
//! Both are ordered lists of strings. A record's identity is full value
//! equality: same length, same fields, same order, exact string match.

use std::fmt;

/// Ordered field names defining the shape of every record in a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header(Vec<String>);

/// Ordered field values of one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record(Vec<String>);

/// Split user input on commas and trim each field.
///
/// Empty input yields a single empty field, so `""` against a one-column
/// header is a valid (blank) record.
pub fn parse_fields(input: &str) -> Vec<String> {
    input
        .trim()
        .split(',')
        .map(|field| field.trim().to_string())
        .collect()
}

impl Header {
    pub fn new(fields: Vec<String>) -> Self {
        Self(fields)
    }

    /// Parse a comma-separated header line typed by the user
    pub fn parse(input: &str) -> Self {
        Self(parse_fields(input))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> &[String] {
        &self.0
    }

    /// Whether `record` has exactly one value per header field
    pub fn matches(&self, record: &Record) -> bool {
        self.len() == record.len()
    }
}

impl Record {
    pub fn new(fields: Vec<String>) -> Self {
        Self(fields)
    }

    /// Parse a comma-separated record line typed by the user
    pub fn parse(input: &str) -> Self {
        Self(parse_fields(input))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> &[String] {
        &self.0
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, fields: &[String]) -> fmt::Result {
    f.write_str("[")?;
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "\"{field}\"")?;
    }
    f.write_str("]")
}

/// Renders as `["name", "age"]`
impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_list(f, &self.0)
    }
}

/// Renders as `["Alice", "30"]`
impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_list(f, &self.0)
    }
}

/// A whole CSV file held in memory: the header row plus data rows in file order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header: Header,
    pub records: Vec<Record>,
}

impl Table {
    pub fn new(header: Header, records: Vec<Record>) -> Self {
        Self { header, records }
    }

    /// Replace the first data row equal to `old` with `new`.
    ///
    /// Returns the index of the replaced row within `records`, or `None` when
    /// no row matched. Later identical rows are left alone.
    pub fn replace_first(&mut self, old: &Record, new: Record) -> Option<usize> {
        let index = self.records.iter().position(|row| row == old)?;
        self.records[index] = new;
        Some(index)
    }

    /// Remove every data row equal to `record`, returning how many went.
    ///
    /// The header is never a candidate.
    pub fn remove_all(&mut self, record: &Record) -> usize {
        let before = self.records.len();
        self.records.retain(|row| row != record);
        before - self.records.len()
    }
}
