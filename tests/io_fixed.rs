//! Tests for the fixed-width record source.

#![cfg(feature = "io-fixed")]

use aggstream::io::fixed::{FixedWidthSource, read_fixed_aggregates};
use aggstream::reader::AggregationReader;
use aggstream::source::{Restartable, StreamState};
use aggstream::testing::{TempFilePath, mock_fixed_file, sample_aggregates, sample_stream};
use std::io::Write;

#[test]
fn groups_a_mixed_file_end_to_end() {
    let file = mock_fixed_file(&sample_stream()).unwrap();
    let aggregates = read_fixed_aggregates(file.path()).unwrap();
    assert_eq!(aggregates, sample_aggregates());
}

#[test]
fn blank_lines_are_skipped() {
    let rendered = mock_fixed_file(&sample_stream()).unwrap();
    let file = TempFilePath::with_extension("txt").unwrap();
    let mut f = std::fs::File::create(file.path()).unwrap();
    for line in std::fs::read_to_string(rendered.path()).unwrap().lines() {
        writeln!(f, "{line}").unwrap();
        writeln!(f).unwrap();
    }
    f.flush().unwrap();

    let aggregates = read_fixed_aggregates(file.path()).unwrap();
    assert_eq!(aggregates, sample_aggregates());
}

#[test]
fn unknown_record_tags_report_their_record_number() {
    let file = TempFilePath::with_extension("txt").unwrap();
    let mut f = std::fs::File::create(file.path()).unwrap();
    writeln!(f, "WHAT1165965         2011-01-22 00:13:29 51.43").unwrap();
    f.flush().unwrap();

    let err = read_fixed_aggregates(file.path()).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("unknown record tag"), "got: {message}");
    assert!(message.contains("record #1"), "got: {message}");
}

#[test]
fn save_and_reopen_reproduces_the_tail() {
    let file = mock_fixed_file(&sample_stream()).unwrap();

    let mut source = FixedWidthSource::new(file.path());
    source.open(None).unwrap();
    let mut reader = AggregationReader::new(source);
    let full_run = reader.read_all().unwrap();

    let mut reader = AggregationReader::new(FixedWidthSource::new(file.path()));
    reader.open(None).unwrap();
    reader.read_next().unwrap().unwrap();
    reader.read_next().unwrap().unwrap();

    let mut state = StreamState::new();
    reader.save(&mut state).unwrap();
    reader.close().unwrap();

    let mut restored = AggregationReader::new(FixedWidthSource::new(file.path()));
    restored.open(Some(&state)).unwrap();
    let tail = restored.read_all().unwrap();
    assert_eq!(tail, full_run[2..]);
}
