//! Tagged record source contract and the restart lifecycle.
//!
//! A [`RecordSource`] produces an ordered stream of [`Tagged`] records,
//! already parsed out of whatever underlying format (delimited, fixed-width,
//! JSON lines, XML); the aggregation reader never sees raw bytes.
//!
//! Input contract every source must honor: between two parent records (or
//! between stream start/end and the nearest parent) only child records may
//! appear, and a child must never precede the first parent. The reader
//! surfaces violations as [`crate::error::ReadError::Sequence`].
//!
//! Sources that can resume after a restart also implement [`Restartable`],
//! a three-method `open`/`save`/`close` lifecycle exchanging a serializable
//! [`StreamState`]. Positions are stored as record counts under
//! [`RECORDS_READ_KEY`]; on `open` a source re-reads and discards that many
//! records to re-position itself, so transient reader state is never
//! persisted.

use crate::error::SourceError;
use crate::record::Tagged;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Shared state key: count of records fully consumed from a source.
///
/// Sources write their raw read count here on [`Restartable::save`]; the
/// aggregation reader then overwrites it with its lookahead-adjusted count.
/// On [`Restartable::open`] a source skips this many records.
pub const RECORDS_READ_KEY: &str = "records.read";

/// Reader-owned state key: aggregates returned so far, kept for job-level
/// progress reporting. Sources ignore it.
pub const AGGREGATES_EMITTED_KEY: &str = "aggregates.emitted";

/// An ordered, blocking, pull-based stream of tagged records.
pub trait RecordSource {
    /// Parent record payload type.
    type Parent;
    /// Child record payload type.
    type Child;

    /// Pull the next record, or `Ok(None)` at end of stream.
    ///
    /// # Errors
    /// Returns [`SourceError`] if the underlying record cannot be produced
    /// (I/O failure, malformed line, type mismatch).
    fn next_record(&mut self) -> Result<Option<Tagged<Self::Parent, Self::Child>>, SourceError>;
}

/// Restart capability for record sources (and readers wrapping them).
///
/// Lifecycle: `open` before the first record pull, `save` at any aggregate
/// boundary, `close` when done. `open` with a previously saved state must
/// position the stream so the next pull yields the first unconsumed record.
pub trait Restartable {
    /// Acquire the underlying resource and position the stream.
    ///
    /// With `None`, start from the beginning. With a saved state, skip the
    /// records counted under [`RECORDS_READ_KEY`].
    ///
    /// # Errors
    /// Returns [`SourceError`] if the resource cannot be opened or the saved
    /// position cannot be reached.
    fn open(&mut self, state: Option<&StreamState>) -> Result<(), SourceError>;

    /// Record the current position (and any progress counters) into `state`.
    ///
    /// # Errors
    /// Returns [`SourceError`] if position information is unavailable.
    fn save(&self, state: &mut StreamState) -> Result<(), SourceError>;

    /// Release the underlying resource. Idempotent.
    ///
    /// # Errors
    /// Returns [`SourceError`] if the resource cannot be released cleanly.
    fn close(&mut self) -> Result<(), SourceError>;
}

/// Serializable restart state exchanged through the [`Restartable`]
/// lifecycle: named `u64` counters, nothing else.
///
/// Keeping the value type to counters is deliberate — positions are record
/// counts, and anything richer (buffered records, parser state) must be
/// re-derivable from the source instead of persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamState {
    entries: BTreeMap<String, u64>,
}

impl StreamState {
    /// Empty state (fresh start).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a counter, replacing any previous value under `key`.
    pub fn put(&mut self, key: &str, value: u64) {
        self.entries.insert(key.to_string(), value);
    }

    /// Read a counter.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<u64> {
        self.entries.get(key).copied()
    }

    /// Read a counter, defaulting to zero when absent.
    #[must_use]
    pub fn get_or_zero(&self, key: &str) -> u64 {
        self.get(key).unwrap_or(0)
    }

    /// `true` when no counters are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Re-position a freshly opened source by reading and discarding `count`
/// records.
///
/// Shared by the file-backed sources' [`Restartable::open`] implementations;
/// skipping consumes real records so a saved position can never point inside
/// one.
#[cfg(any(feature = "io-delimited", feature = "io-fixed", feature = "io-jsonl"))]
pub(crate) fn skip_records<S: RecordSource>(
    source: &mut S,
    count: u64,
    path: &std::path::Path,
) -> Result<(), SourceError> {
    for _ in 0..count {
        if source.next_record()?.is_none() {
            return Err(SourceError::msg(format!(
                "saved position {count} is beyond the end of {}",
                path.display()
            )));
        }
    }
    Ok(())
}
