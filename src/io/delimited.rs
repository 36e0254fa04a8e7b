//! Comma-delimited record source.
//!
//! Mixed files interleave customer and transaction lines; the record kind is
//! decided by field count:
//!
//! ```text
//! Warren,Q,Darrow,8272 4th Street,New York,IL,76091
//! 1165965,2011-01-22 00:13:29,51.43
//! ```
//!
//! Seven (or eight, see below) fields map to a customer, three to a
//! transaction. Some exports split the address column with an extra
//! delimiter (`...,8272,4th Street,...`); those eight-field lines are merged
//! back into seven during tokenizing, here, so downstream grouping never
//! sees the quirk.

use crate::error::SourceError;
use crate::record::{Aggregate, Customer, Tagged, Transaction};
use crate::reader::AggregationReader;
use crate::source::{RECORDS_READ_KEY, RecordSource, Restartable, StreamState, skip_records};
use anyhow::{Context, Result, bail};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Field counts recognized in a mixed customer/transaction file.
const TRANSACTION_FIELDS: usize = 3;
const CUSTOMER_FIELDS: usize = 7;
const CUSTOMER_FIELDS_SPLIT_ADDRESS: usize = 8;

/// Index of the address column, the one an extra delimiter can split.
const ADDRESS_FIELD: usize = 3;

/// Restartable [`RecordSource`] over a comma-delimited mixed file.
pub struct DelimitedSource {
    path: PathBuf,
    reader: Option<csv::Reader<File>>,
    records_read: u64,
}

impl DelimitedSource {
    /// Create a source for `path`. No I/O happens until
    /// [`Restartable::open`].
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            reader: None,
            records_read: 0,
        }
    }

    fn parse_record(record: &StringRecord) -> Result<Tagged<Customer, Transaction>> {
        match record.len() {
            TRANSACTION_FIELDS => {
                let transaction: Transaction = record.deserialize(None)?;
                Ok(Tagged::Child(transaction))
            }
            CUSTOMER_FIELDS => {
                let customer: Customer = record.deserialize(None)?;
                Ok(Tagged::Parent(customer))
            }
            CUSTOMER_FIELDS_SPLIT_ADDRESS => {
                let customer: Customer = merge_split_address(record).deserialize(None)?;
                Ok(Tagged::Parent(customer))
            }
            n => bail!("unexpected field count {n} (want 3, 7, or 8)"),
        }
    }
}

/// Re-join an address column that an extra delimiter split in two.
fn merge_split_address(record: &StringRecord) -> StringRecord {
    let mut fields: Vec<String> = Vec::with_capacity(CUSTOMER_FIELDS);
    for (i, field) in record.iter().enumerate() {
        if i == ADDRESS_FIELD + 1 {
            let address = &mut fields[ADDRESS_FIELD];
            address.push(' ');
            address.push_str(field);
        } else {
            fields.push(field.to_string());
        }
    }
    StringRecord::from(fields)
}

impl RecordSource for DelimitedSource {
    type Parent = Customer;
    type Child = Transaction;

    fn next_record(&mut self) -> Result<Option<Tagged<Customer, Transaction>>, SourceError> {
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| SourceError::msg("delimited source not opened"))?;
        let mut record = StringRecord::new();
        let got = reader
            .read_record(&mut record)
            .with_context(|| {
                format!(
                    "read record #{} in {}",
                    self.records_read + 1,
                    self.path.display()
                )
            })
            .map_err(SourceError::new)?;
        if !got {
            return Ok(None);
        }
        self.records_read += 1;
        Self::parse_record(&record)
            .with_context(|| {
                format!(
                    "parse record #{} in {}",
                    self.records_read,
                    self.path.display()
                )
            })
            .map(Some)
            .map_err(SourceError::new)
    }
}

impl Restartable for DelimitedSource {
    fn open(&mut self, state: Option<&StreamState>) -> Result<(), SourceError> {
        let file = File::open(&self.path)
            .with_context(|| format!("open {}", self.path.display()))
            .map_err(SourceError::new)?;
        self.reader = Some(
            ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .from_reader(file),
        );
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
        self.reader = None;
        Ok(())
    }
}

/// Read a whole delimited file into aggregates, open-to-close.
///
/// # Errors
/// Fails on unreadable files, malformed records, or an input-contract
/// violation (transaction before the first customer).
pub fn read_delimited_aggregates(
    path: impl AsRef<Path>,
) -> Result<Vec<Aggregate<Customer, Transaction>>> {
    let mut source = DelimitedSource::new(path);
    source.open(None)?;
    let mut reader = AggregationReader::new(source);
    let aggregates = reader.read_all()?;
    reader.into_source().close()?;
    Ok(aggregates)
}
