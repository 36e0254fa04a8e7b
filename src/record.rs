//! Record tag model: tagged records and the aggregates built from them.
//!
//! A flat batch file interleaves two record kinds: a **parent** record that
//! opens a new aggregate, and **child** records that attach to the most
//! recently opened one. Membership is positional — child records carry no
//! parent key — so the model is just a two-variant discriminated value,
//! [`Tagged`], plus the assembled [`Aggregate`].
//!
//! The concrete domain pair shipped with the built-in file sources is
//! [`Customer`] (parent) and [`Transaction`] (child). The aggregation
//! machinery in [`crate::reader`] treats both as opaque payload; nothing in
//! the core inspects their fields.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single record pulled from a flat stream, tagged with its kind.
///
/// End of stream is signalled by the source returning `Ok(None)`, never by a
/// variant of this enum.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Tagged<P, C> {
    /// Starts a new aggregate.
    Parent(P),
    /// Belongs to the most recently started aggregate.
    Child(C),
}

impl<P, C> Tagged<P, C> {
    /// `true` for the [`Tagged::Child`] variant.
    #[must_use]
    pub fn is_child(&self) -> bool {
        matches!(self, Tagged::Child(_))
    }

    /// `true` for the [`Tagged::Parent`] variant.
    #[must_use]
    pub fn is_parent(&self) -> bool {
        matches!(self, Tagged::Parent(_))
    }
}

/// One parent record plus its ordered, possibly empty, children.
///
/// Built exclusively by [`crate::reader::AggregationReader`]; once returned,
/// the caller owns it outright and the reader retains no alias to it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aggregate<P, C> {
    /// The parent record that opened this aggregate.
    pub parent: P,
    /// Child records in encounter order.
    pub children: Vec<C>,
}

impl<P, C> Aggregate<P, C> {
    /// Start an aggregate from its parent record, with no children yet.
    #[must_use]
    pub fn new(parent: P) -> Self {
        Self {
            parent,
            children: Vec::new(),
        }
    }

    /// Total records folded into this aggregate (parent included).
    #[must_use]
    pub fn record_count(&self) -> usize {
        1 + self.children.len()
    }
}

/// Customer identity and address fields, the parent record of the built-in
/// file sources.
///
/// Field renames keep the JSON/XML wire names (`firstName`, `zipCode`, ...)
/// stable across formats; the delimited and fixed-width sources rely on the
/// declaration order instead.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub first_name: String,
    pub middle_initial: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

impl fmt::Display for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}. {}",
            self.first_name, self.middle_initial, self.last_name
        )
    }
}

/// A single account transaction, the child record of the built-in file
/// sources.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub account_number: String,
    #[serde(with = "transaction_date_format")]
    pub transaction_date: NaiveDateTime,
    pub amount: f64,
}

/// Timestamp format used by every file format the built-in sources read,
/// e.g. `2011-01-22 00:13:29`.
pub const TRANSACTION_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Serde adapter for [`TRANSACTION_DATE_FORMAT`] timestamps.
pub mod transaction_date_format {
    use super::TRANSACTION_DATE_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    /// Serialize a timestamp in the flat-file format.
    ///
    /// # Errors
    /// Propagates serializer failures.
    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&dt.format(TRANSACTION_DATE_FORMAT).to_string())
    }

    /// Deserialize a timestamp in the flat-file format.
    ///
    /// # Errors
    /// Fails if the value is not a string or does not match the format.
    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(de)?;
        NaiveDateTime::parse_from_str(&raw, TRANSACTION_DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}

impl Aggregate<Customer, Transaction> {
    /// One-line summary in the tutorial output style:
    /// `Warren Q. Darrow has 2 transactions.`
    #[must_use]
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Aggregate<Customer, Transaction> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.children.is_empty() {
            write!(f, "{} has no transactions.", self.parent)
        } else {
            write!(
                f,
                "{} has {} transactions.",
                self.parent,
                self.children.len()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn customer() -> Customer {
        Customer {
            first_name: "Warren".into(),
            middle_initial: "Q".into(),
            last_name: "Darrow".into(),
            address: "8272 4th Street".into(),
            city: "New York".into(),
            state: "IL".into(),
            zip_code: "76091".into(),
        }
    }

    fn transaction() -> Transaction {
        Transaction {
            account_number: "1165965".into(),
            transaction_date: NaiveDate::from_ymd_opt(2011, 1, 22)
                .unwrap()
                .and_hms_opt(0, 13, 29)
                .unwrap(),
            amount: 51.43,
        }
    }

    #[test]
    fn summary_with_and_without_children() {
        let mut agg = Aggregate::new(customer());
        assert_eq!(agg.to_string(), "Warren Q. Darrow has no transactions.");
        agg.children.push(transaction());
        agg.children.push(transaction());
        assert_eq!(agg.to_string(), "Warren Q. Darrow has 2 transactions.");
        assert_eq!(agg.record_count(), 3);
    }

    #[test]
    fn transaction_json_round_trip_keeps_wire_names() {
        let json = serde_json::to_value(transaction()).unwrap();
        assert_eq!(json["accountNumber"], "1165965");
        assert_eq!(json["transactionDate"], "2011-01-22 00:13:29");
        let back: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(back, transaction());
    }
}
