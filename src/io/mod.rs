//! Built-in tagged record sources, one module per file format.
//!
//! Each source parses one format into the uniform [`crate::record::Tagged`]
//! stream (customer parents, transaction children) and implements the
//! [`crate::source::Restartable`] lifecycle so a restarted job can resume
//! mid-file. Format quirks stay inside the owning module; the aggregation
//! reader never sees them.

#[cfg_attr(docsrs, doc(cfg(feature = "io-delimited")))]
#[cfg(feature = "io-delimited")]
pub mod delimited;

#[cfg_attr(docsrs, doc(cfg(feature = "io-fixed")))]
#[cfg(feature = "io-fixed")]
pub mod fixed;

#[cfg_attr(docsrs, doc(cfg(feature = "io-jsonl")))]
#[cfg(feature = "io-jsonl")]
pub mod jsonl;

#[cfg_attr(docsrs, doc(cfg(feature = "io-xml")))]
#[cfg(feature = "io-xml")]
pub mod xml;
