//! The aggregation reader: regroups a flat parent/child record stream into
//! aggregates using exactly one record of lookahead.
//!
//! Child records carry no parent key; membership is positional. The reader
//! therefore cannot know an aggregate is complete until it has pulled the
//! *next* record and found it is not a child. That one pulled-but-unassigned
//! record lives in a single-slot lookahead cell; no larger buffer is ever
//! needed because grouping is by immediate adjacency, not key matching.
//!
//! # Example
//!
//! ```
//! use aggstream::reader::AggregationReader;
//! use aggstream::testing::VecSource;
//! use aggstream::Tagged;
//!
//! # fn main() -> Result<(), aggstream::ReadError> {
//! let source = VecSource::new(vec![
//!     Tagged::Parent("p1"),
//!     Tagged::Child(10),
//!     Tagged::Child(11),
//!     Tagged::Parent("p2"),
//! ]);
//! let mut reader = AggregationReader::new(source);
//!
//! let first = reader.read_next()?.unwrap();
//! assert_eq!(first.parent, "p1");
//! assert_eq!(first.children, vec![10, 11]);
//!
//! let second = reader.read_next()?.unwrap();
//! assert_eq!(second.parent, "p2");
//! assert!(second.children.is_empty());
//!
//! assert!(reader.read_next()?.is_none());
//! # Ok(())
//! # }
//! ```

use crate::error::{ReadContext, ReadError, SourceError};
use crate::record::{Aggregate, Tagged};
use crate::source::{
    AGGREGATES_EMITTED_KEY, RECORDS_READ_KEY, RecordSource, Restartable, StreamState,
};
use std::fmt;
use std::mem;

/// Single-slot lookahead cell.
///
/// Holds a record iff it has been pulled from the source but not yet
/// assigned to an aggregate. `Exhausted` records a pending end-of-stream so
/// a finished source is never pulled again.
#[derive(Clone, Debug, PartialEq)]
enum Lookahead<P, C> {
    Empty,
    Holding(Tagged<P, C>),
    Exhausted,
}

/// Groups consecutive child records under the preceding parent record.
///
/// Wraps any [`RecordSource`] honoring the input contract from
/// [`crate::source`]. Single-threaded and pull-based: one `read_next` call
/// runs to completion before the next begins, and no other consumer may
/// share the wrapped source.
///
/// After a [`ReadError`] the reader must not be reused without a fresh
/// [`Restartable::open`]; the lookahead cell is left empty and further reads
/// are best-effort only.
pub struct AggregationReader<S: RecordSource> {
    source: S,
    lookahead: Lookahead<S::Parent, S::Child>,
    /// Records fully assigned to already-returned aggregates. Excludes the
    /// lookahead cell, so it is always a valid restart position.
    records_consumed: u64,
    aggregates_emitted: u64,
    last_parent: Option<String>,
}

impl<S> AggregationReader<S>
where
    S: RecordSource,
    S::Parent: fmt::Display,
{
    /// Wrap a record source. The source must be positioned at its first
    /// record (call [`Restartable::open`] first for lifecycle-managed
    /// sources).
    pub fn new(source: S) -> Self {
        Self {
            source,
            lookahead: Lookahead::Empty,
            records_consumed: 0,
            aggregates_emitted: 0,
            last_parent: None,
        }
    }

    /// Read the next fully-assembled aggregate, or `Ok(None)` at end of
    /// stream.
    ///
    /// The boundary record that terminated the returned aggregate (the next
    /// parent, if any) stays in the lookahead cell and is consumed by the
    /// following call.
    ///
    /// # Errors
    /// - [`ReadError::Source`] if the source fails mid-pull; the in-progress
    ///   aggregate is discarded, never returned partially.
    /// - [`ReadError::Sequence`] if a child record arrives with no preceding
    ///   parent.
    pub fn read_next(&mut self) -> Result<Option<Aggregate<S::Parent, S::Child>>, ReadError> {
        // Step 1: take the buffered boundary record, or pull a fresh one.
        let head = match mem::replace(&mut self.lookahead, Lookahead::Empty) {
            Lookahead::Holding(record) => record,
            Lookahead::Exhausted => {
                self.lookahead = Lookahead::Exhausted;
                return Ok(None);
            }
            Lookahead::Empty => match self.pull()? {
                Some(record) => record,
                None => {
                    self.lookahead = Lookahead::Exhausted;
                    return Ok(None);
                }
            },
        };

        // Step 2: the head of an aggregate must be a parent.
        let parent = match head {
            Tagged::Parent(parent) => parent,
            Tagged::Child(_) => return Err(self.sequence_error()),
        };
        self.last_parent = Some(parent.to_string());
        let mut aggregate = Aggregate::new(parent);

        // Step 3: append children until the next boundary record, which is
        // parked in the lookahead cell without being consumed.
        loop {
            match self.pull()? {
                Some(Tagged::Child(child)) => aggregate.children.push(child),
                Some(record @ Tagged::Parent(_)) => {
                    self.lookahead = Lookahead::Holding(record);
                    break;
                }
                None => {
                    self.lookahead = Lookahead::Exhausted;
                    break;
                }
            }
        }

        // Step 4: the aggregate is complete; ownership moves to the caller.
        self.records_consumed += aggregate.record_count() as u64;
        self.aggregates_emitted += 1;
        Ok(Some(aggregate))
    }

    /// Drain the stream, collecting every remaining aggregate in order.
    ///
    /// # Errors
    /// Stops at the first [`ReadError`]; aggregates read before the failure
    /// are dropped with the error (the error's context carries the count).
    pub fn read_all(&mut self) -> Result<Vec<Aggregate<S::Parent, S::Child>>, ReadError> {
        let mut aggregates = Vec::new();
        while let Some(aggregate) = self.read_next()? {
            aggregates.push(aggregate);
        }
        Ok(aggregates)
    }

    /// Aggregates returned so far.
    #[must_use]
    pub fn aggregates_emitted(&self) -> u64 {
        self.aggregates_emitted
    }

    /// Records assigned to already-returned aggregates. Never counts the
    /// lookahead cell, so this is always a valid restart position.
    #[must_use]
    pub fn records_consumed(&self) -> u64 {
        self.records_consumed
    }

    /// Identity line of the last well-formed parent record, if any.
    #[must_use]
    pub fn last_parent(&self) -> Option<&str> {
        self.last_parent.as_deref()
    }

    /// Give the wrapped source back, discarding reader state.
    pub fn into_source(self) -> S {
        self.source
    }

    fn pull(&mut self) -> Result<Option<Tagged<S::Parent, S::Child>>, ReadError> {
        self.source.next_record().map_err(|error| ReadError::Source {
            error,
            context: self.context(),
        })
    }

    fn sequence_error(&self) -> ReadError {
        ReadError::Sequence {
            context: self.context(),
        }
    }

    fn context(&self) -> ReadContext {
        ReadContext {
            aggregates_emitted: self.aggregates_emitted,
            last_parent: self.last_parent.clone(),
        }
    }
}

/// Checkpoint bridge: pass-through to the source's restart lifecycle, with
/// the saved position rewritten to exclude the lookahead cell.
///
/// `save` delegates to the source first, then overwrites
/// [`RECORDS_READ_KEY`] with the reader's consumed count — the buffered
/// boundary record is re-derived by re-pulling after restart, never
/// persisted. `open` clears the cell and restores the counters before
/// delegating, so a restored reader resumes exactly at the next aggregate.
///
/// `save` is valid at any aggregate boundary, i.e. between `read_next`
/// calls; there is no mid-aggregate moment observable from outside.
impl<S> Restartable for AggregationReader<S>
where
    S: RecordSource + Restartable,
{
    fn open(&mut self, state: Option<&StreamState>) -> Result<(), SourceError> {
        self.lookahead = Lookahead::Empty;
        self.last_parent = None;
        match state {
            Some(state) => {
                self.records_consumed = state.get_or_zero(RECORDS_READ_KEY);
                self.aggregates_emitted = state.get_or_zero(AGGREGATES_EMITTED_KEY);
            }
            None => {
                self.records_consumed = 0;
                self.aggregates_emitted = 0;
            }
        }
        self.source.open(state)
    }

    fn save(&self, state: &mut StreamState) -> Result<(), SourceError> {
        self.source.save(state)?;
        // The source recorded its raw position, which includes the record
        // sitting in the lookahead cell; rewind it to the last boundary.
        state.put(RECORDS_READ_KEY, self.records_consumed);
        state.put(AGGREGATES_EMITTED_KEY, self.aggregates_emitted);
        Ok(())
    }

    fn close(&mut self) -> Result<(), SourceError> {
        self.source.close()
    }
}
