//! JSON Lines record source.
//!
//! One JSON object per line, discriminated by a `"type"` key:
//!
//! ```text
//! {"type":"customer","firstName":"Warren","middleInitial":"Q", ...}
//! {"type":"transaction","accountNumber":"1165965","transactionDate":"2011-01-22 00:13:29","amount":51.43}
//! ```
//!
//! Blank lines are skipped. Parse failures are annotated with the record
//! number for easier debugging.

use crate::error::SourceError;
use crate::record::{Aggregate, Customer, Tagged, Transaction};
use crate::reader::AggregationReader;
use crate::source::{RECORDS_READ_KEY, RecordSource, Restartable, StreamState, skip_records};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

/// Wire shape of one line: the domain struct plus a `"type"` discriminant.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum JsonRecord {
    Customer(Customer),
    Transaction(Transaction),
}

impl From<JsonRecord> for Tagged<Customer, Transaction> {
    fn from(record: JsonRecord) -> Self {
        match record {
            JsonRecord::Customer(customer) => Tagged::Parent(customer),
            JsonRecord::Transaction(transaction) => Tagged::Child(transaction),
        }
    }
}

/// Restartable [`RecordSource`] over a JSON Lines mixed file.
pub struct JsonLinesSource {
    path: PathBuf,
    lines: Option<Lines<BufReader<File>>>,
    records_read: u64,
}

impl JsonLinesSource {
    /// Create a source for `path`. No I/O happens until
    /// [`Restartable::open`].
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lines: None,
            records_read: 0,
        }
    }
}

impl RecordSource for JsonLinesSource {
    type Parent = Customer;
    type Child = Transaction;

    fn next_record(&mut self) -> Result<Option<Tagged<Customer, Transaction>>, SourceError> {
        let lines = self
            .lines
            .as_mut()
            .ok_or_else(|| SourceError::msg("JSON lines source not opened"))?;
        loop {
            let Some(line) = lines.next() else {
                return Ok(None);
            };
            let line = line
                .with_context(|| {
                    format!(
                        "read record #{} in {}",
                        self.records_read + 1,
                        self.path.display()
                    )
                })
                .map_err(SourceError::new)?;
            if line.trim().is_empty() {
                continue;
            }
            self.records_read += 1;
            let record: JsonRecord = serde_json::from_str(&line)
                .with_context(|| {
                    format!(
                        "parse record #{} in {}",
                        self.records_read,
                        self.path.display()
                    )
                })
                .map_err(SourceError::new)?;
            return Ok(Some(record.into()));
        }
    }
}

impl Restartable for JsonLinesSource {
    fn open(&mut self, state: Option<&StreamState>) -> Result<(), SourceError> {
        let file = File::open(&self.path)
            .with_context(|| format!("open {}", self.path.display()))
            .map_err(SourceError::new)?;
        self.lines = Some(BufReader::new(file).lines());
        self.records_read = 0;
        if let Some(state) = state {
            let path = self.path.clone();
            skip_records(self, state.get_or_zero(RECORDS_READ_KEY), &path)?;
        }
        Ok(())
    }

    fn save(&self, state: &mut StreamState) -> Result<(), SourceError> {
        state.put(RECORDS_READ_KEY, self.records_read);
        Ok(())
    }

    fn close(&mut self) -> Result<(), SourceError> {
        self.lines = None;
        Ok(())
    }
}

/// Read a whole JSON Lines file into aggregates, open-to-close.
///
/// # Errors
/// Fails on unreadable files, malformed records, or an input-contract
/// violation (transaction before the first customer).
pub fn read_jsonl_aggregates(
    path: impl AsRef<Path>,
) -> Result<Vec<Aggregate<Customer, Transaction>>> {
    let mut source = JsonLinesSource::new(path);
    source.open(None)?;
    let mut reader = AggregationReader::new(source);
    let aggregates = reader.read_all()?;
    reader.into_source().close()?;
    Ok(aggregates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_key_discriminates_record_kind() {
        let customer = r#"{"type":"customer","firstName":"Ann","middleInitial":"V","lastName":"Gates","address":"9247 Infinite Loop Drive","city":"Hollywood","state":"NE","zipCode":"37078"}"#;
        let transaction = r#"{"type":"transaction","accountNumber":"8116369","transactionDate":"2011-01-21 20:40:52","amount":-14.83}"#;

        let record: JsonRecord = serde_json::from_str(customer).unwrap();
        assert!(Tagged::from(record).is_parent());

        let record: JsonRecord = serde_json::from_str(transaction).unwrap();
        assert!(Tagged::from(record).is_child());
    }

    #[test]
    fn unknown_type_key_is_rejected() {
        let line = r#"{"type":"refund","accountNumber":"1"}"#;
        assert!(serde_json::from_str::<JsonRecord>(line).is_err());
    }
}
