//! Testing utilities for aggregation readers and record sources.
//!
//! This module provides what tests of grouping behavior need without real
//! input files:
//!
//! - [`VecSource`]: an in-memory record source with failure injection and a
//!   remaining-records probe for lookahead assertions
//! - Mock file builders (`mock_*_file`): tempfile-backed sample files for
//!   each built-in format
//! - [`sample_stream`]: the shared mixed customer/transaction fixture the
//!   mock files are built from
//!
//! # Quick Start
//!
//! ```
//! use aggstream::reader::AggregationReader;
//! use aggstream::testing::{VecSource, sample_stream};
//!
//! # fn main() -> Result<(), aggstream::ReadError> {
//! let mut reader = AggregationReader::new(VecSource::new(sample_stream()));
//! let aggregates = reader.read_all()?;
//! assert_eq!(aggregates.len(), 3);
//! # Ok(())
//! # }
//! ```

mod fixtures;
mod mock_io;
mod mock_source;

pub use fixtures::{sample_aggregates, sample_stream};
pub use mock_io::TempFilePath;
#[cfg(feature = "io-delimited")]
pub use mock_io::mock_delimited_file;
#[cfg(feature = "io-fixed")]
pub use mock_io::mock_fixed_file;
#[cfg(feature = "io-jsonl")]
pub use mock_io::mock_jsonl_file;
#[cfg(feature = "io-xml")]
pub use mock_io::mock_xml_file;
pub use mock_source::VecSource;
