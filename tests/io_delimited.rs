//! Tests for the comma-delimited record source.

#![cfg(feature = "io-delimited")]

use aggstream::io::delimited::{DelimitedSource, read_delimited_aggregates};
use aggstream::reader::AggregationReader;
use aggstream::source::{Restartable, StreamState};
use aggstream::testing::{TempFilePath, mock_delimited_file, sample_aggregates, sample_stream};
use std::io::Write;

#[test]
fn groups_a_mixed_file_end_to_end() {
    let file = mock_delimited_file(&sample_stream()).unwrap();
    let aggregates = read_delimited_aggregates(file.path()).unwrap();
    assert_eq!(aggregates, sample_aggregates());
}

#[test]
fn split_address_lines_group_like_clean_ones() {
    let file = TempFilePath::with_extension("csv").unwrap();
    let mut f = std::fs::File::create(file.path()).unwrap();
    // The address column has an extra comma; merging happens in the source.
    writeln!(f, "Warren,Q,Darrow,8272,4th Street,New York,IL,76091").unwrap();
    writeln!(f, "1165965,2011-01-22 00:13:29,51.43").unwrap();
    f.flush().unwrap();

    let aggregates = read_delimited_aggregates(file.path()).unwrap();
    assert_eq!(aggregates.len(), 1);
    assert_eq!(aggregates[0].parent.address, "8272 4th Street");
    assert_eq!(aggregates[0].children.len(), 1);
}

#[test]
fn malformed_records_report_their_record_number() {
    let file = TempFilePath::with_extension("csv").unwrap();
    let mut f = std::fs::File::create(file.path()).unwrap();
    writeln!(f, "Warren,Q,Darrow,8272 4th Street,New York,IL,76091").unwrap();
    writeln!(f, "1165965,not-a-date,51.43").unwrap();
    f.flush().unwrap();

    let err = read_delimited_aggregates(file.path()).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("record #2"), "got: {message}");
}

#[test]
fn transaction_before_any_customer_is_a_sequence_error() {
    let file = TempFilePath::with_extension("csv").unwrap();
    let mut f = std::fs::File::create(file.path()).unwrap();
    writeln!(f, "1165965,2011-01-22 00:13:29,51.43").unwrap();
    f.flush().unwrap();

    let err = read_delimited_aggregates(file.path()).unwrap_err();
    assert!(err.to_string().contains("no preceding parent"));
}

#[test]
fn save_and_reopen_reproduces_the_tail() {
    let file = mock_delimited_file(&sample_stream()).unwrap();

    let mut source = DelimitedSource::new(file.path());
    source.open(None).unwrap();
    let mut reader = AggregationReader::new(source);
    let full_run = reader.read_all().unwrap();
    assert_eq!(full_run.len(), 3);

    let mut source = DelimitedSource::new(file.path());
    source.open(None).unwrap();
    let mut reader = AggregationReader::new(source);
    reader.read_next().unwrap().unwrap();

    let mut state = StreamState::new();
    reader.save(&mut state).unwrap();
    reader.close().unwrap();

    let mut restored = AggregationReader::new(DelimitedSource::new(file.path()));
    restored.open(Some(&state)).unwrap();
    let tail = restored.read_all().unwrap();
    assert_eq!(tail, full_run[1..]);
}

#[test]
fn reading_before_open_is_a_source_error() {
    let file = mock_delimited_file(&sample_stream()).unwrap();
    let mut reader = AggregationReader::new(DelimitedSource::new(file.path()));
    let err = reader.read_next().unwrap_err();
    assert!(err.to_string().contains("not opened"));
}
