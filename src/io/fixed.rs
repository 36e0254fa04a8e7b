//! Fixed-width record source.
//!
//! Every line starts with a four-character record tag, then carries its
//! fields at the column offsets in [`layout`]:
//!
//! ```text
//! CUSTWarren     QDarrow         8272 4th Street          New York        IL76091
//! TRAN1165965         2011-01-22 00:13:29           51.43
//! ```
//!
//! Fields are space-padded and trimmed on read. Trailing padding on the last
//! column may be omitted. The layout is byte-indexed; records are expected
//! to be ASCII.

use crate::error::SourceError;
use crate::record::{
    Aggregate, Customer, TRANSACTION_DATE_FORMAT, Tagged, Transaction,
};
use crate::reader::AggregationReader;
use crate::source::{RECORDS_READ_KEY, RecordSource, Restartable, StreamState, skip_records};
use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDateTime;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Record tag opening a customer line.
pub const TAG_CUSTOMER: &str = "CUST";
/// Record tag opening a transaction line.
pub const TAG_TRANSACTION: &str = "TRAN";

/// Column offsets for both record layouts. Shared with the mock file writer
/// in [`crate::testing`].
pub mod layout {
    use std::ops::Range;

    /// Record tag column, common to both layouts.
    pub const TAG: Range<usize> = 0..4;

    // Customer layout.
    pub const FIRST_NAME: Range<usize> = 4..15;
    pub const MIDDLE_INITIAL: Range<usize> = 15..16;
    pub const LAST_NAME: Range<usize> = 16..32;
    pub const ADDRESS: Range<usize> = 32..57;
    pub const CITY: Range<usize> = 57..73;
    pub const STATE: Range<usize> = 73..75;
    pub const ZIP_CODE: Range<usize> = 75..80;

    // Transaction layout.
    pub const ACCOUNT_NUMBER: Range<usize> = 4..20;
    pub const TRANSACTION_DATE: Range<usize> = 20..39;
    pub const AMOUNT: Range<usize> = 39..51;
}

/// Restartable [`RecordSource`] over a tag-prefixed fixed-width file.
pub struct FixedWidthSource {
    path: PathBuf,
    lines: Option<Lines<BufReader<File>>>,
    records_read: u64,
}

impl FixedWidthSource {
    /// Create a source for `path`. No I/O happens until
    /// [`Restartable::open`].
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lines: None,
            records_read: 0,
        }
    }

    fn parse_line(line: &str) -> Result<Tagged<Customer, Transaction>> {
        match column(line, "record tag", layout::TAG)? {
            TAG_CUSTOMER => Ok(Tagged::Parent(Customer {
                first_name: column(line, "firstName", layout::FIRST_NAME)?.to_string(),
                middle_initial: column(line, "middleInitial", layout::MIDDLE_INITIAL)?.to_string(),
                last_name: column(line, "lastName", layout::LAST_NAME)?.to_string(),
                address: column(line, "address", layout::ADDRESS)?.to_string(),
                city: column(line, "city", layout::CITY)?.to_string(),
                state: column(line, "state", layout::STATE)?.to_string(),
                zip_code: tail_column(line, "zipCode", layout::ZIP_CODE.start)?.to_string(),
            })),
            TAG_TRANSACTION => {
                let date = column(line, "transactionDate", layout::TRANSACTION_DATE)?;
                let amount = tail_column(line, "amount", layout::AMOUNT.start)?;
                Ok(Tagged::Child(Transaction {
                    account_number: column(line, "accountNumber", layout::ACCOUNT_NUMBER)?
                        .to_string(),
                    transaction_date: NaiveDateTime::parse_from_str(
                        date,
                        TRANSACTION_DATE_FORMAT,
                    )
                    .with_context(|| format!("parse transactionDate {date:?}"))?,
                    amount: amount
                        .parse()
                        .with_context(|| format!("parse amount {amount:?}"))?,
                }))
            }
            tag => bail!("unknown record tag {tag:?} (want CUST or TRAN)"),
        }
    }
}

/// Slice a fixed column out of a line and trim its padding.
fn column<'a>(line: &'a str, name: &str, range: Range<usize>) -> Result<&'a str> {
    line.get(range.clone())
        .map(str::trim)
        .ok_or_else(|| anyhow!("line too short for {name} column ({}..{})", range.start, range.end))
}

/// Like [`column`] for the final column, where trailing padding is optional.
fn tail_column<'a>(line: &'a str, name: &str, start: usize) -> Result<&'a str> {
    line.get(start..)
        .map(str::trim)
        .ok_or_else(|| anyhow!("line too short for {name} column ({start}..)"))
}

impl RecordSource for FixedWidthSource {
    type Parent = Customer;
    type Child = Transaction;

    fn next_record(&mut self) -> Result<Option<Tagged<Customer, Transaction>>, SourceError> {
        let lines = self
            .lines
            .as_mut()
            .ok_or_else(|| SourceError::msg("fixed-width source not opened"))?;
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
            return Self::parse_line(&line)
                .with_context(|| {
                    format!(
                        "parse record #{} in {}",
                        self.records_read,
                        self.path.display()
                    )
                })
                .map(Some)
                .map_err(SourceError::new);
        }
    }
}

impl Restartable for FixedWidthSource {
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

/// Read a whole fixed-width file into aggregates, open-to-close.
///
/// # Errors
/// Fails on unreadable files, malformed records, or an input-contract
/// violation (transaction before the first customer).
pub fn read_fixed_aggregates(
    path: impl AsRef<Path>,
) -> Result<Vec<Aggregate<Customer, Transaction>>> {
    let mut source = FixedWidthSource::new(path);
    source.open(None)?;
    let mut reader = AggregationReader::new(source);
    let aggregates = reader.read_all()?;
    reader.into_source().close()?;
    Ok(aggregates)
}
