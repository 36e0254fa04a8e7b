//! XML record source.
//!
//! A single document whose child elements are `<customer>` and
//! `<transaction>` fragments in stream order:
//!
//! ```text
//! <records>
//!   <customer>
//!     <firstName>Warren</firstName>
//!     ...
//!   </customer>
//!   <transaction>
//!     <accountNumber>1165965</accountNumber>
//!     <transactionDate>2011-01-22 00:13:29</transactionDate>
//!     <amount>51.43</amount>
//!   </transaction>
//! </records>
//! ```
//!
//! Unlike the line-oriented sources, a document format has no cheap
//! record-at-a-time framing; [`Restartable::open`] parses the whole document
//! once and subsequent pulls walk the parsed fragments. Restart positions
//! are still record counts, so saved state stays interchangeable with the
//! other sources.

use crate::error::SourceError;
use crate::record::{Aggregate, Customer, Tagged, Transaction};
use crate::reader::AggregationReader;
use crate::source::{RECORDS_READ_KEY, RecordSource, Restartable, StreamState};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

#[derive(Deserialize)]
struct XmlDocument {
    #[serde(rename = "$value", default)]
    records: Vec<XmlRecord>,
}

/// Fragment element names map to record kinds.
#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum XmlRecord {
    Customer(Customer),
    Transaction(Transaction),
}

impl From<XmlRecord> for Tagged<Customer, Transaction> {
    fn from(record: XmlRecord) -> Self {
        match record {
            XmlRecord::Customer(customer) => Tagged::Parent(customer),
            XmlRecord::Transaction(transaction) => Tagged::Child(transaction),
        }
    }
}

/// Restartable [`RecordSource`] over an XML document of record fragments.
pub struct XmlSource {
    path: PathBuf,
    records: Option<Vec<Tagged<Customer, Transaction>>>,
    cursor: usize,
}

impl XmlSource {
    /// Create a source for `path`. No I/O happens until
    /// [`Restartable::open`].
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            records: None,
            cursor: 0,
        }
    }

    fn parse_document(text: &str) -> Result<Vec<Tagged<Customer, Transaction>>> {
        let document: XmlDocument = quick_xml::de::from_str(text)?;
        Ok(document.records.into_iter().map(Tagged::from).collect())
    }
}

impl RecordSource for XmlSource {
    type Parent = Customer;
    type Child = Transaction;

    fn next_record(&mut self) -> Result<Option<Tagged<Customer, Transaction>>, SourceError> {
        let records = self
            .records
            .as_ref()
            .ok_or_else(|| SourceError::msg("XML source not opened"))?;
        match records.get(self.cursor) {
            Some(record) => {
                self.cursor += 1;
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }
}

impl Restartable for XmlSource {
    fn open(&mut self, state: Option<&StreamState>) -> Result<(), SourceError> {
        let text = read_to_string(&self.path)
            .with_context(|| format!("open {}", self.path.display()))
            .map_err(SourceError::new)?;
        let records = Self::parse_document(&text)
            .with_context(|| format!("parse XML document {}", self.path.display()))
            .map_err(SourceError::new)?;
        let skip = state.map_or(0, |state| state.get_or_zero(RECORDS_READ_KEY)) as usize;
        if skip > records.len() {
            return Err(SourceError::msg(format!(
                "saved position {skip} is beyond the end of {}",
                self.path.display()
            )));
        }
        self.records = Some(records);
        self.cursor = skip;
        Ok(())
    }

    fn save(&self, state: &mut StreamState) -> Result<(), SourceError> {
        state.put(RECORDS_READ_KEY, self.cursor as u64);
        Ok(())
    }

    fn close(&mut self) -> Result<(), SourceError> {
        self.records = None;
        self.cursor = 0;
        Ok(())
    }
}

/// Read a whole XML document into aggregates, open-to-close.
///
/// # Errors
/// Fails on unreadable files, malformed documents, or an input-contract
/// violation (transaction before the first customer).
pub fn read_xml_aggregates(
    path: impl AsRef<Path>,
) -> Result<Vec<Aggregate<Customer, Transaction>>> {
    let mut source = XmlSource::new(path);
    source.open(None)?;
    let mut reader = AggregationReader::new(source);
    let aggregates = reader.read_all()?;
    reader.into_source().close()?;
    Ok(aggregates)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r"
        <records>
            <customer>
                <firstName>Warren</firstName>
                <middleInitial>Q</middleInitial>
                <lastName>Darrow</lastName>
                <address>8272 4th Street</address>
                <city>New York</city>
                <state>IL</state>
                <zipCode>76091</zipCode>
            </customer>
            <transaction>
                <accountNumber>1165965</accountNumber>
                <transactionDate>2011-01-22 00:13:29</transactionDate>
                <amount>51.43</amount>
            </transaction>
        </records>";

    #[test]
    fn fragments_parse_in_document_order() {
        let records = XmlSource::parse_document(DOC).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].is_parent());
        assert!(records[1].is_child());
    }

    #[test]
    fn malformed_document_is_rejected() {
        assert!(XmlSource::parse_document("<records><customer></records>").is_err());
    }
}
