//! Tests for the XML record source.

#![cfg(feature = "io-xml")]

use aggstream::io::xml::{XmlSource, read_xml_aggregates};
use aggstream::reader::AggregationReader;
use aggstream::source::{Restartable, StreamState};
use aggstream::testing::{TempFilePath, mock_xml_file, sample_aggregates, sample_stream};
use std::io::Write;

#[test]
fn groups_a_mixed_document_end_to_end() {
    let file = mock_xml_file(&sample_stream()).unwrap();
    let aggregates = read_xml_aggregates(file.path()).unwrap();
    assert_eq!(aggregates, sample_aggregates());
}

#[test]
fn malformed_documents_fail_at_open() {
    let file = TempFilePath::with_extension("xml").unwrap();
    let mut f = std::fs::File::create(file.path()).unwrap();
    writeln!(f, "<records><customer></records>").unwrap();
    f.flush().unwrap();

    let mut source = XmlSource::new(file.path());
    let err = source.open(None).unwrap_err();
    assert!(err.to_string().contains("parse XML document"));
}

#[test]
fn save_and_reopen_reproduces_the_tail() {
    let file = mock_xml_file(&sample_stream()).unwrap();

    let mut reader = AggregationReader::new(XmlSource::new(file.path()));
    reader.open(None).unwrap();
    reader.read_next().unwrap().unwrap();

    let mut state = StreamState::new();
    reader.save(&mut state).unwrap();
    reader.close().unwrap();

    let mut restored = AggregationReader::new(XmlSource::new(file.path()));
    restored.open(Some(&state)).unwrap();
    let tail = restored.read_all().unwrap();
    assert_eq!(tail, sample_aggregates()[1..]);
}

#[test]
fn saved_position_beyond_the_document_is_rejected() {
    let file = mock_xml_file(&sample_stream()).unwrap();
    let mut state = StreamState::new();
    state.put(aggstream::RECORDS_READ_KEY, 99);

    let mut source = XmlSource::new(file.path());
    assert!(source.open(Some(&state)).is_err());
}
