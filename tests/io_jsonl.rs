//! Tests for the JSON Lines record source.

#![cfg(feature = "io-jsonl")]

use aggstream::io::jsonl::{JsonLinesSource, read_jsonl_aggregates};
use aggstream::reader::AggregationReader;
use aggstream::source::{Restartable, StreamState};
use aggstream::testing::{TempFilePath, mock_jsonl_file, sample_aggregates, sample_stream};
use std::io::Write;

#[test]
fn groups_a_mixed_file_end_to_end() {
    let file = mock_jsonl_file(&sample_stream()).unwrap();
    let aggregates = read_jsonl_aggregates(file.path()).unwrap();
    assert_eq!(aggregates, sample_aggregates());
}

#[test]
fn blank_lines_are_skipped_and_do_not_shift_positions() {
    let rendered = mock_jsonl_file(&sample_stream()).unwrap();
    let file = TempFilePath::with_extension("jsonl").unwrap();
    let mut f = std::fs::File::create(file.path()).unwrap();
    for line in std::fs::read_to_string(rendered.path()).unwrap().lines() {
        writeln!(f).unwrap();
        writeln!(f, "{line}").unwrap();
    }
    f.flush().unwrap();

    let aggregates = read_jsonl_aggregates(file.path()).unwrap();
    assert_eq!(aggregates, sample_aggregates());

    // Restart positions count records, not lines, so a saved state from the
    // padded file still lands on a record boundary.
    let mut reader = AggregationReader::new(JsonLinesSource::new(file.path()));
    reader.open(None).unwrap();
    reader.read_next().unwrap().unwrap();
    let mut state = StreamState::new();
    reader.save(&mut state).unwrap();

    let mut restored = AggregationReader::new(JsonLinesSource::new(file.path()));
    restored.open(Some(&state)).unwrap();
    let tail = restored.read_all().unwrap();
    assert_eq!(tail, sample_aggregates()[1..]);
}

#[test]
fn malformed_records_report_their_record_number() {
    let file = TempFilePath::with_extension("jsonl").unwrap();
    let mut f = std::fs::File::create(file.path()).unwrap();
    writeln!(
        f,
        r#"{{"type":"customer","firstName":"Warren","middleInitial":"Q","lastName":"Darrow","address":"8272 4th Street","city":"New York","state":"IL","zipCode":"76091"}}"#
    )
    .unwrap();
    writeln!(f, r#"{{"type":"transaction","accountNumber":"#).unwrap();
    f.flush().unwrap();

    let err = read_jsonl_aggregates(file.path()).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("record #2"), "got: {message}");
}

#[test]
fn unknown_type_discriminant_is_a_source_error() {
    let file = TempFilePath::with_extension("jsonl").unwrap();
    let mut f = std::fs::File::create(file.path()).unwrap();
    writeln!(f, r#"{{"type":"refund","accountNumber":"1165965"}}"#).unwrap();
    f.flush().unwrap();

    assert!(read_jsonl_aggregates(file.path()).is_err());
}
