//! Tests for the aggregation reader's grouping, lookahead, and error
//! behavior, driven by the in-memory source.

use aggstream::reader::AggregationReader;
use aggstream::testing::{VecSource, sample_aggregates, sample_stream};
use aggstream::{ReadError, Tagged};

fn reader(
    records: Vec<Tagged<&'static str, u32>>,
) -> AggregationReader<VecSource<&'static str, u32>> {
    AggregationReader::new(VecSource::new(records))
}

#[test]
fn groups_consecutive_children_under_preceding_parent() {
    // P1 C1 C2 P2 C3
    let mut reader = reader(vec![
        Tagged::Parent("p1"),
        Tagged::Child(1),
        Tagged::Child(2),
        Tagged::Parent("p2"),
        Tagged::Child(3),
    ]);

    let first = reader.read_next().unwrap().unwrap();
    assert_eq!(first.parent, "p1");
    assert_eq!(first.children, vec![1, 2]);

    let second = reader.read_next().unwrap().unwrap();
    assert_eq!(second.parent, "p2");
    assert_eq!(second.children, vec![3]);

    assert!(reader.read_next().unwrap().is_none());
}

#[test]
fn parents_without_children_yield_empty_aggregates() {
    let mut reader = reader(vec![Tagged::Parent("p1"), Tagged::Parent("p2")]);

    let first = reader.read_next().unwrap().unwrap();
    assert_eq!(first.parent, "p1");
    assert!(first.children.is_empty());

    let second = reader.read_next().unwrap().unwrap();
    assert_eq!(second.parent, "p2");
    assert!(second.children.is_empty());

    assert!(reader.read_next().unwrap().is_none());
}

#[test]
fn empty_input_is_end_of_stream_not_an_error() {
    let mut reader = reader(vec![]);
    assert!(reader.read_next().unwrap().is_none());
    // Exhaustion is sticky; later calls stay at end of stream.
    assert!(reader.read_next().unwrap().is_none());
    assert_eq!(reader.aggregates_emitted(), 0);
}

#[test]
fn leading_child_is_a_sequence_error() {
    let mut reader = reader(vec![Tagged::Child(1), Tagged::Parent("p1")]);

    let err = reader.read_next().unwrap_err();
    match &err {
        ReadError::Sequence { context } => {
            assert_eq!(context.aggregates_emitted, 0);
            assert_eq!(context.last_parent, None);
        }
        ReadError::Source { .. } => panic!("expected a sequence error, got {err}"),
    }
    assert_eq!(reader.aggregates_emitted(), 0);
}

#[test]
fn reader_pulls_exactly_one_record_beyond_each_aggregate() {
    // After the first aggregate (p1, [c1, c2]) is returned, the source must
    // have given up exactly one extra record: the buffered boundary parent.
    let mut reader = reader(vec![
        Tagged::Parent("p1"),
        Tagged::Child(1),
        Tagged::Child(2),
        Tagged::Parent("p2"),
        Tagged::Child(3),
        Tagged::Child(4),
    ]);

    let first = reader.read_next().unwrap().unwrap();
    assert_eq!(first.children.len(), 2);

    let source = reader.into_source();
    assert_eq!(source.records_read(), 4); // p1, c1, c2, and the buffered p2
    assert_eq!(source.remaining(), 2);
}

#[test]
fn source_failure_mid_aggregate_discards_the_partial_aggregate() {
    // P1 C1 <malformed> C2: the first read needs record #3 and must fail
    // without returning any part of p1's aggregate.
    let source = VecSource::new(vec![
        Tagged::Parent("p1"),
        Tagged::Child(1),
        Tagged::Child(2),
        Tagged::Child(3),
    ])
    .fail_at(2);
    let mut reader = AggregationReader::new(source);

    let err = reader.read_next().unwrap_err();
    match &err {
        ReadError::Source { error, context } => {
            assert!(error.to_string().contains("injected source failure"));
            assert_eq!(context.aggregates_emitted, 0);
            assert_eq!(context.last_parent.as_deref(), Some("p1"));
        }
        ReadError::Sequence { .. } => panic!("expected a source error, got {err}"),
    }
    assert_eq!(reader.aggregates_emitted(), 0);
}

#[test]
fn error_context_counts_aggregates_already_emitted() {
    let source = VecSource::new(vec![
        Tagged::Parent("p1"),
        Tagged::Child(1),
        Tagged::Parent("p2"),
        Tagged::Child(2),
        Tagged::Child(3),
    ])
    .fail_at(4);
    let mut reader = AggregationReader::new(source);

    assert!(reader.read_next().unwrap().is_some());
    let err = reader.read_next().unwrap_err();
    let context = err.context();
    assert_eq!(context.aggregates_emitted, 1);
    assert_eq!(context.last_parent.as_deref(), Some("p2"));
}

#[test]
fn read_all_collects_every_aggregate_in_order() {
    let mut reader = AggregationReader::new(VecSource::new(sample_stream()));
    let aggregates = reader.read_all().unwrap();
    assert_eq!(aggregates, sample_aggregates());
    assert_eq!(reader.aggregates_emitted(), 3);
    assert_eq!(reader.records_consumed(), 7);
}

#[test]
fn progress_counters_exclude_the_lookahead_cell() {
    let mut reader = reader(vec![
        Tagged::Parent("p1"),
        Tagged::Child(1),
        Tagged::Parent("p2"),
    ]);

    reader.read_next().unwrap().unwrap();
    // p2 sits in the lookahead cell: pulled, but not yet consumed.
    assert_eq!(reader.records_consumed(), 2);
    assert_eq!(reader.aggregates_emitted(), 1);
    assert_eq!(reader.last_parent(), Some("p1"));

    reader.read_next().unwrap().unwrap();
    assert_eq!(reader.records_consumed(), 3);
    assert_eq!(reader.last_parent(), Some("p2"));
}

#[test]
fn summary_lines_match_the_tutorial_output() {
    let mut reader = AggregationReader::new(VecSource::new(sample_stream()));
    let summaries: Vec<String> = reader
        .read_all()
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        summaries,
        vec![
            "Warren Q. Darrow has 1 transactions.",
            "Ann V. Gates has no transactions.",
            "Erica I. Jobs has 3 transactions.",
        ]
    );
}
