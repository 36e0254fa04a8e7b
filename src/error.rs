//! Error taxonomy for record sources and the aggregation reader.
//!
//! Two failure stages exist and are kept distinct so the enclosing job can
//! report which one broke:
//!
//! - [`SourceError`] — the collaborator feeding the reader could not produce
//!   the next record (unreadable file, malformed line, type mismatch).
//! - [`ReadError::Sequence`] — the stream itself violated the input contract
//!   (a child record with no preceding parent).
//!
//! End of stream is not an error anywhere in this crate; sources signal it
//! with `Ok(None)`.

use std::fmt;
use thiserror::Error;

/// Failure raised by a record source while producing the next record.
///
/// Sources build these from `anyhow` errors so file/record context attached
/// with `.with_context(...)` travels intact to the caller.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct SourceError(#[from] anyhow::Error);

impl SourceError {
    /// Wrap any error as a source failure.
    pub fn new(err: impl Into<anyhow::Error>) -> Self {
        Self(err.into())
    }

    /// Create a source failure from a plain message.
    pub fn msg(msg: impl fmt::Display + fmt::Debug + Send + Sync + 'static) -> Self {
        Self(anyhow::Error::msg(msg))
    }
}

/// Best-known progress at the moment a read failed, for job-level reporting.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReadContext {
    /// Aggregates successfully returned before the failure.
    pub aggregates_emitted: u64,
    /// Identity line of the last well-formed parent record, if any.
    pub last_parent: Option<String>,
}

impl fmt::Display for ReadContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "after {} aggregate(s)", self.aggregates_emitted)?;
        match &self.last_parent {
            Some(parent) => write!(f, ", last parent {parent}"),
            None => write!(f, ", before any parent"),
        }
    }
}

/// Failure returned by [`crate::reader::AggregationReader::read_next`].
///
/// Neither variant is recoverable by the reader itself: the in-progress
/// aggregate is discarded and the reader must be reopened before reuse.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The underlying source failed; carries the source's own error chain.
    #[error("record source failed ({context}): {error}")]
    Source {
        #[source]
        error: SourceError,
        context: ReadContext,
    },
    /// A child record arrived with no preceding parent record.
    #[error("child record with no preceding parent record ({context})")]
    Sequence { context: ReadContext },
}

impl ReadError {
    /// Progress snapshot captured when the error was raised.
    #[must_use]
    pub fn context(&self) -> &ReadContext {
        match self {
            ReadError::Source { context, .. } | ReadError::Sequence { context } => context,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn source_error_keeps_anyhow_context() {
        let err: anyhow::Error = std::io::Error::other("disk gone").into();
        let err = Err::<(), _>(err)
            .context("parse record #3 in customers.csv")
            .unwrap_err();
        let err = SourceError::new(err);
        assert!(err.to_string().contains("record #3"));
    }

    #[test]
    fn read_error_display_includes_progress() {
        let err = ReadError::Sequence {
            context: ReadContext {
                aggregates_emitted: 2,
                last_parent: Some("Warren Q. Darrow".into()),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("no preceding parent"));
        assert!(msg.contains("after 2 aggregate(s)"));
        assert!(msg.contains("Warren Q. Darrow"));
    }
}
