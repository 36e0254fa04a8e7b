//! Demonstration of checkpointed reading and restart recovery.
//!
//! A first pass reads part of a delimited file, checkpointing after every
//! aggregate, then "crashes". A second pass restores the latest snapshot and
//! resumes exactly at the next aggregate, without skipping or re-emitting
//! any customer.
//!
//! Run with:
//! ```bash
//! cargo run --example restart_recovery
//! ```

use aggstream::checkpoint::{CheckpointConfig, CheckpointPolicy, CheckpointStore};
use aggstream::io::delimited::DelimitedSource;
use aggstream::reader::AggregationReader;
use aggstream::source::{Restartable, StreamState};
use aggstream::testing::{mock_delimited_file, sample_stream};
use tempfile::TempDir;

fn main() -> anyhow::Result<()> {
    println!("=== Aggstream Restart Recovery Demo ===\n");

    let file = mock_delimited_file(&sample_stream())?;
    let checkpoint_dir = TempDir::new()?;
    let mut store = CheckpointStore::new(CheckpointConfig {
        directory: checkpoint_dir.path().to_path_buf(),
        policy: CheckpointPolicy::EveryAggregate,
        max_checkpoints: Some(5),
    })?;

    // First pass: read two aggregates, checkpointing at each boundary, then
    // stop as if the process died.
    println!("First pass (interrupted after two customers):");
    let mut reader = AggregationReader::new(DelimitedSource::new(file.path()));
    reader.open(None)?;
    for _ in 0..2 {
        if let Some(aggregate) = reader.read_next()? {
            println!("  {aggregate}");
            if store.should_checkpoint(reader.aggregates_emitted()) {
                let mut state = StreamState::new();
                reader.save(&mut state)?;
                store.save("restart-demo", &state)?;
            }
        }
    }
    drop(reader); // simulated crash: no close, no further reads

    // Second pass: restore the latest snapshot and finish the file.
    println!("\nSecond pass (restored from the latest checkpoint):");
    let restored = store.latest_state("restart-demo")?;
    let mut reader = AggregationReader::new(DelimitedSource::new(file.path()));
    reader.open(restored.as_ref())?;
    while let Some(aggregate) = reader.read_next()? {
        println!("  {aggregate}");
    }
    reader.close()?;

    println!("\nEvery customer was emitted exactly once across both passes.");
    Ok(())
}
