//! # Aggstream
//!
//! A batch-file **record aggregation** library for Rust. Aggstream reads
//! flat, ordered streams of heterogeneous records — a *parent* record
//! optionally followed by zero or more *child* records — and re-assembles
//! them into aggregate objects, using exactly one record of lookahead.
//!
//! ## Key Features
//!
//! - **Positional grouping** - consecutive child records attach to the
//!   preceding parent; no parent keys required in the input
//! - **Single-slot lookahead** - the minimal buffering the format allows,
//!   with a documented invariant
//! - **Restartable reads** - an `open`/`save`/`close` lifecycle restores a
//!   reader to the last aggregate boundary after a job restart
//! - **Checkpoint store** - persisted, checksummed restart snapshots
//!   (feature `checkpointing`)
//! - **Four built-in sources** - delimited, fixed-width, JSON Lines, and XML
//!   files of mixed customer/transaction records (feature-gated)
//! - **Type-safe** - the core is generic over parent/child payloads and
//!   never inspects their fields
//!
//! ## Quick Start
//!
//! ```
//! use aggstream::reader::AggregationReader;
//! use aggstream::testing::VecSource;
//! use aggstream::Tagged;
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let source = VecSource::new(vec![
//!     Tagged::Parent("alpha"),
//!     Tagged::Child(1),
//!     Tagged::Child(2),
//!     Tagged::Parent("beta"),
//!     Tagged::Child(3),
//! ]);
//!
//! let mut reader = AggregationReader::new(source);
//! while let Some(aggregate) = reader.read_next()? {
//!     println!("{} has {} children", aggregate.parent, aggregate.children.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Tagged records
//!
//! A [`Tagged<P, C>`] value is either `Parent(P)` (starts a new aggregate)
//! or `Child(C)` (attaches to the most recent one). End of stream is
//! `Ok(None)` from the source, never a record variant.
//!
//! ### The aggregation reader
//!
//! [`AggregationReader`] wraps any [`RecordSource`] and yields
//! [`Aggregate`]s. Because children carry no parent key, the reader cannot
//! finish an aggregate until it has seen the *next* record and found it is
//! not a child; that boundary record waits in a single-slot lookahead cell
//! for the following call.
//!
//! ### The input contract
//!
//! Between two parent records only child records may appear, and a child
//! must never precede the first parent. Contract violations surface as
//! [`ReadError::Sequence`]; collaborator parse failures surface as
//! [`ReadError::Source`]. Neither is retried internally, and after an error
//! the reader must be reopened before reuse.
//!
//! ### Restart & checkpointing
//!
//! Sources that implement [`Restartable`] exchange a [`StreamState`] of
//! named counters through `open`/`save`/`close`. The reader passes the
//! lifecycle through to its source with one adjustment: the position it
//! saves excludes the lookahead cell, so the buffered boundary record is
//! re-derived by re-pulling after restart rather than persisted. With the
//! `checkpointing` feature, [`checkpoint::CheckpointStore`] persists those
//! states to disk with integrity checksums and retention.
//!
//! ## Built-in sources
//!
//! Each format module ships a restartable source over mixed
//! [`Customer`]/[`Transaction`] files plus an eager convenience function:
//!
//! ```no_run
//! # #[cfg(feature = "io-delimited")]
//! # fn demo() -> anyhow::Result<()> {
//! use aggstream::read_delimited_aggregates;
//!
//! for aggregate in read_delimited_aggregates("customers.csv")? {
//!     println!("{aggregate}");
//! }
//! # Ok(())
//! # }
//! # fn main() {}
//! ```
//!
//! ## Feature Flags
//!
//! - `io-delimited` - comma-delimited files (via the `csv` crate)
//! - `io-fixed` - tag-prefixed fixed-width files
//! - `io-jsonl` - JSON Lines files
//! - `io-xml` - XML documents of record fragments (via `quick-xml`)
//! - `checkpointing` - the on-disk checkpoint store
//!
//! ## Module Overview
//!
//! - [`record`] - tagged records, aggregates, and the customer/transaction
//!   domain pair
//! - [`source`] - the source contract, restart lifecycle, and stream state
//! - [`reader`] - the aggregation reader and its checkpoint bridge
//! - [`error`] - the `SourceError` / `ReadError` taxonomy
//! - [`io`] - the built-in format sources
//! - [`checkpoint`] - persisted restart snapshots
//! - [`testing`] - in-memory sources and mock input files

#[cfg_attr(docsrs, doc(cfg(feature = "checkpointing")))]
#[cfg(feature = "checkpointing")]
pub mod checkpoint;
pub mod error;
pub mod io;
pub mod reader;
pub mod record;
pub mod source;
pub mod testing;

// General re-exports
pub use error::{ReadContext, ReadError, SourceError};
pub use reader::AggregationReader;
pub use record::{Aggregate, Customer, Tagged, Transaction};
pub use source::{
    AGGREGATES_EMITTED_KEY, RECORDS_READ_KEY, RecordSource, Restartable, StreamState,
};

// Gated re-exports
#[cfg(feature = "io-delimited")]
pub use io::delimited::{DelimitedSource, read_delimited_aggregates};

#[cfg(feature = "io-fixed")]
pub use io::fixed::{FixedWidthSource, read_fixed_aggregates};

#[cfg(feature = "io-jsonl")]
pub use io::jsonl::{JsonLinesSource, read_jsonl_aggregates};

#[cfg(feature = "io-xml")]
pub use io::xml::{XmlSource, read_xml_aggregates};

#[cfg(feature = "checkpointing")]
pub use checkpoint::{CheckpointConfig, CheckpointPolicy, CheckpointStore};
