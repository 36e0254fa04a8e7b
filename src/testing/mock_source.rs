//! In-memory record source for testing grouping behavior without files.

use crate::error::SourceError;
use crate::record::Tagged;
use crate::source::{RECORDS_READ_KEY, RecordSource, Restartable, StreamState};

/// A [`RecordSource`] over a vector of tagged records.
///
/// Beyond plain playback it supports:
/// - **failure injection**: [`VecSource::fail_at`] makes the pull of the
///   record at a given index return a [`SourceError`], for exercising
///   mid-stream failure paths;
/// - **lookahead probing**: [`VecSource::records_read`] and
///   [`VecSource::remaining`] expose how far the consumer has actually
///   pulled, so tests can assert the one-record lookahead invariant.
///
/// Usable directly (no [`Restartable::open`] needed) or through the full
/// restart lifecycle.
pub struct VecSource<P, C> {
    records: Vec<Tagged<P, C>>,
    cursor: usize,
    fail_at: Option<usize>,
}

impl<P: Clone, C: Clone> VecSource<P, C> {
    /// Source that plays back `records` in order.
    #[must_use]
    pub fn new(records: Vec<Tagged<P, C>>) -> Self {
        Self {
            records,
            cursor: 0,
            fail_at: None,
        }
    }

    /// Make the pull of record `index` (0-based) fail with a
    /// [`SourceError`], simulating a malformed record. The failing pull does
    /// not advance, so retries keep failing.
    #[must_use]
    pub fn fail_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    /// Records pulled so far.
    #[must_use]
    pub fn records_read(&self) -> usize {
        self.cursor
    }

    /// Records not yet pulled.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.records.len() - self.cursor
    }
}

impl<P: Clone, C: Clone> RecordSource for VecSource<P, C> {
    type Parent = P;
    type Child = C;

    fn next_record(&mut self) -> Result<Option<Tagged<P, C>>, SourceError> {
        if self.fail_at == Some(self.cursor) {
            return Err(SourceError::msg(format!(
                "injected source failure at record #{}",
                self.cursor + 1
            )));
        }
        match self.records.get(self.cursor) {
            Some(record) => {
                self.cursor += 1;
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }
}

impl<P: Clone, C: Clone> Restartable for VecSource<P, C> {
    fn open(&mut self, state: Option<&StreamState>) -> Result<(), SourceError> {
        let skip = state.map_or(0, |state| state.get_or_zero(RECORDS_READ_KEY)) as usize;
        if skip > self.records.len() {
            return Err(SourceError::msg(format!(
                "saved position {skip} is beyond the end of the stream"
            )));
        }
        self.cursor = skip;
        Ok(())
    }

    fn save(&self, state: &mut StreamState) -> Result<(), SourceError> {
        state.put(RECORDS_READ_KEY, self.cursor as u64);
        Ok(())
    }

    fn close(&mut self) -> Result<(), SourceError> {
        Ok(())
    }
}
