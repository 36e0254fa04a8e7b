//! Mock input files for testing sources without fixture files on disk.
//!
//! Each builder renders a tagged record stream into one of the built-in
//! formats inside a temporary file that is deleted on drop.

#[cfg(any(
    feature = "io-delimited",
    feature = "io-fixed",
    feature = "io-xml"
))]
use crate::record::TRANSACTION_DATE_FORMAT;
#[cfg(any(
    feature = "io-delimited",
    feature = "io-fixed",
    feature = "io-jsonl",
    feature = "io-xml"
))]
use crate::record::{Customer, Tagged, Transaction};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A temporary file that is automatically deleted when dropped.
pub struct TempFilePath {
    #[allow(dead_code)]
    temp_file: NamedTempFile,
    path: PathBuf,
}

impl TempFilePath {
    /// Create a new temporary file with the given extension.
    ///
    /// # Errors
    /// Returns an error if the temporary file cannot be created.
    pub fn with_extension(extension: &str) -> std::io::Result<Self> {
        let temp_file = tempfile::Builder::new()
            .suffix(&format!(".{extension}"))
            .tempfile()?;
        let path = temp_file.path().to_path_buf();
        Ok(Self { temp_file, path })
    }

    /// Path to the temporary file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(any(
    feature = "io-delimited",
    feature = "io-fixed",
    feature = "io-jsonl",
    feature = "io-xml"
))]
fn write_lines(
    extension: &str,
    lines: impl IntoIterator<Item = String>,
) -> std::io::Result<TempFilePath> {
    use std::io::Write;

    let temp = TempFilePath::with_extension(extension)?;
    let mut file = std::fs::File::create(temp.path())?;
    for line in lines {
        writeln!(file, "{line}")?;
    }
    file.flush()?;
    Ok(temp)
}

/// Render records into a comma-delimited mixed file.
///
/// Field values must not themselves contain commas; tests exercising the
/// split-address quirk should write their file content by hand.
///
/// # Errors
/// Returns an error if the temporary file cannot be created or written.
#[cfg(feature = "io-delimited")]
pub fn mock_delimited_file(
    records: &[Tagged<Customer, Transaction>],
) -> std::io::Result<TempFilePath> {
    let lines = records.iter().map(|record| match record {
        Tagged::Parent(c) => format!(
            "{},{},{},{},{},{},{}",
            c.first_name, c.middle_initial, c.last_name, c.address, c.city, c.state, c.zip_code
        ),
        Tagged::Child(t) => format!(
            "{},{},{}",
            t.account_number,
            t.transaction_date.format(TRANSACTION_DATE_FORMAT),
            t.amount
        ),
    });
    write_lines("csv", lines.collect::<Vec<_>>())
}

/// Render records into a tag-prefixed fixed-width mixed file, using the
/// column layout from [`crate::io::fixed::layout`].
///
/// # Errors
/// Returns an error if the temporary file cannot be created or written.
#[cfg(feature = "io-fixed")]
pub fn mock_fixed_file(
    records: &[Tagged<Customer, Transaction>],
) -> std::io::Result<TempFilePath> {
    use crate::io::fixed::{TAG_CUSTOMER, TAG_TRANSACTION, layout};

    let width = |range: std::ops::Range<usize>| range.end - range.start;
    let lines = records.iter().map(|record| match record {
        Tagged::Parent(c) => format!(
            "{}{:<fw$}{:<mw$}{:<lw$}{:<aw$}{:<cw$}{:<sw$}{:<zw$}",
            TAG_CUSTOMER,
            c.first_name,
            c.middle_initial,
            c.last_name,
            c.address,
            c.city,
            c.state,
            c.zip_code,
            fw = width(layout::FIRST_NAME),
            mw = width(layout::MIDDLE_INITIAL),
            lw = width(layout::LAST_NAME),
            aw = width(layout::ADDRESS),
            cw = width(layout::CITY),
            sw = width(layout::STATE),
            zw = width(layout::ZIP_CODE),
        ),
        Tagged::Child(t) => format!(
            "{}{:<aw$}{:<dw$}{}",
            TAG_TRANSACTION,
            t.account_number,
            t.transaction_date.format(TRANSACTION_DATE_FORMAT).to_string(),
            t.amount,
            aw = width(layout::ACCOUNT_NUMBER),
            dw = width(layout::TRANSACTION_DATE),
        ),
    });
    write_lines("txt", lines.collect::<Vec<_>>())
}

/// Render records into a JSON Lines mixed file with `"type"` discriminants.
///
/// # Errors
/// Returns an error if the temporary file cannot be created or written.
#[cfg(feature = "io-jsonl")]
pub fn mock_jsonl_file(
    records: &[Tagged<Customer, Transaction>],
) -> std::io::Result<TempFilePath> {
    let mut lines = Vec::with_capacity(records.len());
    for record in records {
        let (kind, value) = match record {
            Tagged::Parent(c) => ("customer", serde_json::to_value(c)?),
            Tagged::Child(t) => ("transaction", serde_json::to_value(t)?),
        };
        let mut object = value;
        object
            .as_object_mut()
            .expect("records serialize to JSON objects")
            .insert("type".to_string(), serde_json::Value::String(kind.into()));
        lines.push(serde_json::to_string(&object)?);
    }
    write_lines("jsonl", lines)
}

/// Render records into a single XML document of record fragments.
///
/// Field values must not contain XML-reserved characters.
///
/// # Errors
/// Returns an error if the temporary file cannot be created or written.
#[cfg(feature = "io-xml")]
pub fn mock_xml_file(records: &[Tagged<Customer, Transaction>]) -> std::io::Result<TempFilePath> {
    let mut lines = vec!["<records>".to_string()];
    for record in records {
        match record {
            Tagged::Parent(c) => {
                lines.push("  <customer>".into());
                lines.push(format!("    <firstName>{}</firstName>", c.first_name));
                lines.push(format!(
                    "    <middleInitial>{}</middleInitial>",
                    c.middle_initial
                ));
                lines.push(format!("    <lastName>{}</lastName>", c.last_name));
                lines.push(format!("    <address>{}</address>", c.address));
                lines.push(format!("    <city>{}</city>", c.city));
                lines.push(format!("    <state>{}</state>", c.state));
                lines.push(format!("    <zipCode>{}</zipCode>", c.zip_code));
                lines.push("  </customer>".into());
            }
            Tagged::Child(t) => {
                lines.push("  <transaction>".into());
                lines.push(format!(
                    "    <accountNumber>{}</accountNumber>",
                    t.account_number
                ));
                lines.push(format!(
                    "    <transactionDate>{}</transactionDate>",
                    t.transaction_date.format(TRANSACTION_DATE_FORMAT)
                ));
                lines.push(format!("    <amount>{}</amount>", t.amount));
                lines.push("  </transaction>".into());
            }
        }
    }
    lines.push("</records>".to_string());
    write_lines("xml", lines)
}
