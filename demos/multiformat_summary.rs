//! Demonstration of reading the same customer/transaction stream from all
//! four built-in formats.
//!
//! The demo renders one shared sample stream into a delimited, fixed-width,
//! JSON Lines, and XML file, reads each back through an aggregation reader,
//! and prints the per-customer summary lines.
//!
//! Run with:
//! ```bash
//! cargo run --example multiformat_summary
//! ```

use aggstream::testing::{
    mock_delimited_file, mock_fixed_file, mock_jsonl_file, mock_xml_file, sample_stream,
};
use aggstream::{
    Aggregate, Customer, Transaction, read_delimited_aggregates, read_fixed_aggregates,
    read_jsonl_aggregates, read_xml_aggregates,
};

fn print_summaries(format: &str, aggregates: &[Aggregate<Customer, Transaction>]) {
    println!("--- {format} ---");
    for aggregate in aggregates {
        println!("{aggregate}");
    }
    println!();
}

fn main() -> anyhow::Result<()> {
    println!("=== Aggstream Multi-Format Summary Demo ===\n");

    let records = sample_stream();

    let file = mock_delimited_file(&records)?;
    print_summaries("delimited", &read_delimited_aggregates(file.path())?);

    let file = mock_fixed_file(&records)?;
    print_summaries("fixed-width", &read_fixed_aggregates(file.path())?);

    let file = mock_jsonl_file(&records)?;
    print_summaries("JSON lines", &read_jsonl_aggregates(file.path())?);

    let file = mock_xml_file(&records)?;
    print_summaries("XML", &read_xml_aggregates(file.path())?);

    Ok(())
}
