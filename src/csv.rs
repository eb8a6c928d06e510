//! CSV materialization for the export endpoints.
//!
//! The output format is fixed and must stay byte-stable: a UTF-8 byte-order
//! mark (so spreadsheet tools render Cyrillic correctly), one plain header
//! line, then one line per record with every field wrapped in double quotes
//! and embedded double quotes escaped by doubling.

use chrono::{DateTime, SecondsFormat, Utc};

/// Byte-order mark prepended to every export.
pub const UTF8_BOM: &str = "\u{feff}";

/// A CSV document under construction.
pub struct CsvDocument {
    buf: String,
}

impl CsvDocument {
    /// Start a document with the given header line (written verbatim).
    pub fn new(header: &str) -> Self {
        let mut buf = String::from(UTF8_BOM);
        buf.push_str(header);
        buf.push('\n');
        Self { buf }
    }

    /// Append one record. Every field is quoted; embedded quotes are doubled.
    pub fn push_row<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut first = true;
        for field in fields {
            if !first {
                self.buf.push(',');
            }
            first = false;
            self.buf.push('"');
            self.buf.push_str(&field.as_ref().replace('"', "\"\""));
            self.buf.push('"');
        }
        self.buf.push('\n');
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}

/// Timestamp format used in export rows: RFC3339 with milliseconds and a `Z`
/// suffix, e.g. `2026-08-05T12:00:00.000Z`.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}
