//! Shared sample data: the same mixed customer/transaction stream the mock
//! file builders render into each format.

use crate::record::{Aggregate, Customer, Tagged, Transaction};
use chrono::NaiveDate;

fn customer(
    first: &str,
    middle: &str,
    last: &str,
    address: &str,
    city: &str,
    state: &str,
    zip: &str,
) -> Customer {
    Customer {
        first_name: first.into(),
        middle_initial: middle.into(),
        last_name: last.into(),
        address: address.into(),
        city: city.into(),
        state: state.into(),
        zip_code: zip.into(),
    }
}

fn transaction(account: &str, date: (i32, u32, u32, u32, u32, u32), amount: f64) -> Transaction {
    let (y, mo, d, h, mi, s) = date;
    Transaction {
        account_number: account.into(),
        transaction_date: NaiveDate::from_ymd_opt(y, mo, d)
            .and_then(|date| date.and_hms_opt(h, mi, s))
            .expect("fixture timestamp is valid"),
        amount,
    }
}

/// A well-formed mixed stream: three customers, the middle one with no
/// transactions.
#[must_use]
pub fn sample_stream() -> Vec<Tagged<Customer, Transaction>> {
    vec![
        Tagged::Parent(customer(
            "Warren",
            "Q",
            "Darrow",
            "8272 4th Street",
            "New York",
            "IL",
            "76091",
        )),
        Tagged::Child(transaction("1165965", (2011, 1, 22, 0, 13, 29), 51.43)),
        Tagged::Parent(customer(
            "Ann",
            "V",
            "Gates",
            "9247 Infinite Loop Drive",
            "Hollywood",
            "NE",
            "37078",
        )),
        Tagged::Parent(customer(
            "Erica",
            "I",
            "Jobs",
            "8875 Farnam Street",
            "Aurora",
            "IL",
            "36575",
        )),
        Tagged::Child(transaction("8116369", (2011, 1, 21, 20, 40, 52), -14.83)),
        Tagged::Child(transaction("8116369", (2011, 1, 21, 15, 50, 17), -45.45)),
        Tagged::Child(transaction("8116369", (2011, 1, 21, 16, 52, 46), -74.6)),
    ]
}

/// [`sample_stream`] grouped the way a correct aggregation reader groups it.
#[must_use]
pub fn sample_aggregates() -> Vec<Aggregate<Customer, Transaction>> {
    let mut aggregates = Vec::new();
    for record in sample_stream() {
        match record {
            Tagged::Parent(parent) => aggregates.push(Aggregate::new(parent)),
            Tagged::Child(child) => aggregates
                .last_mut()
                .expect("fixture starts with a parent")
                .children
                .push(child),
        }
    }
    aggregates
}
