//! On-disk persistence of restart state for long-running batch jobs.
//!
//! The checkpoint store saves [`StreamState`] snapshots taken at aggregate
//! boundaries, so an interrupted job can reopen its reader from the last
//! committed position without re-emitting aggregates.
//!
//! # Usage
//!
//! ```no_run
//! use aggstream::checkpoint::{CheckpointConfig, CheckpointPolicy, CheckpointStore};
//! use aggstream::source::{Restartable, StreamState};
//! # use aggstream::io::delimited::DelimitedSource;
//! # use aggstream::reader::AggregationReader;
//! use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let mut store = CheckpointStore::new(CheckpointConfig {
//!     directory: "./checkpoints".into(),
//!     policy: CheckpointPolicy::EveryNAggregates(10),
//!     max_checkpoints: Some(5),
//! })?;
//!
//! let restored = store.latest_state("customer-job")?;
//! let mut reader = AggregationReader::new(DelimitedSource::new("customers.csv"));
//! reader.open(restored.as_ref())?;
//!
//! while let Some(aggregate) = reader.read_next()? {
//!     println!("{aggregate}");
//!     if store.should_checkpoint(reader.aggregates_emitted()) {
//!         let mut state = StreamState::new();
//!         reader.save(&mut state)?;
//!         store.save("customer-job", &state)?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Snapshots are postcard-encoded with a SHA-256 integrity checksum and a
//! monotonically increasing index in the filename; retention deletes the
//! lowest indices first.

use crate::source::StreamState;
use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{DirEntry, File, create_dir_all, read_dir, remove_file};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Configuration for the checkpoint store.
#[derive(Clone, Debug)]
pub struct CheckpointConfig {
    /// Directory where snapshot files are stored.
    pub directory: PathBuf,
    /// When to take a snapshot during a run.
    pub policy: CheckpointPolicy,
    /// Maximum snapshots to retain per job (oldest are deleted first).
    /// `None` keeps all snapshots.
    pub max_checkpoints: Option<usize>,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./aggstream_checkpoints"),
            policy: CheckpointPolicy::EveryAggregate,
            max_checkpoints: Some(10),
        }
    }
}

/// Policy for when snapshots are taken. Checkpoints are only ever valid at
/// aggregate boundaries, so policies count emitted aggregates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckpointPolicy {
    /// Snapshot after every aggregate.
    EveryAggregate,
    /// Snapshot after every N aggregates.
    EveryNAggregates(u64),
}

/// One persisted snapshot: restart state plus integrity metadata.
#[derive(Serialize, Deserialize)]
pub struct CheckpointSnapshot {
    /// Job the snapshot belongs to.
    pub job_id: String,
    /// Wall-clock creation time, milliseconds since epoch.
    pub timestamp: u64,
    /// SHA-256 over the encoded state and identity fields.
    pub checksum: String,
    /// The restart state itself.
    pub state: StreamState,
}

/// Manages snapshot creation, persistence, and recovery.
pub struct CheckpointStore {
    config: CheckpointConfig,
    next_index: u64,
}

impl CheckpointStore {
    /// Create a store, creating the snapshot directory if needed.
    ///
    /// The write index resumes above any snapshot already present, so
    /// restarted runs never overwrite earlier snapshots.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or scanned.
    pub fn new(config: CheckpointConfig) -> Result<Self> {
        create_dir_all(&config.directory).context("create checkpoint directory")?;
        let next_index = snapshot_files(&config.directory, None)?
            .iter()
            .map(|(index, _)| *index)
            .max()
            .map_or(0, |max| max + 1);
        Ok(Self { config, next_index })
    }

    /// Whether the policy calls for a snapshot after `aggregates_emitted`
    /// aggregates.
    #[must_use]
    pub fn should_checkpoint(&self, aggregates_emitted: u64) -> bool {
        match self.config.policy {
            CheckpointPolicy::EveryAggregate => true,
            CheckpointPolicy::EveryNAggregates(n) => {
                aggregates_emitted > 0 && aggregates_emitted.is_multiple_of(n.max(1))
            }
        }
    }

    /// Persist a snapshot of `state` for `job_id`.
    ///
    /// Must only be called at an aggregate boundary, i.e. with a state saved
    /// between two `read_next` calls.
    ///
    /// # Errors
    /// Returns an error if encoding or writing the snapshot file fails.
    pub fn save(&mut self, job_id: &str, state: &StreamState) -> Result<PathBuf> {
        let timestamp = current_timestamp_ms();
        let snapshot = CheckpointSnapshot {
            job_id: job_id.to_string(),
            timestamp,
            checksum: state_checksum(job_id, timestamp, state)?,
            state: state.clone(),
        };

        let filename = format!("checkpoint_{job_id}_{:012}.bin", self.next_index);
        let path = self.config.directory.join(filename);
        let encoded = postcard::to_allocvec(&snapshot).context("encode checkpoint snapshot")?;

        let mut file = File::create(&path)
            .with_context(|| format!("create {}", path.display()))?;
        file.write_all(&encoded).context("write checkpoint snapshot")?;
        file.sync_all().context("sync checkpoint snapshot")?;
        self.next_index += 1;

        self.enforce_retention(job_id)?;
        Ok(path)
    }

    /// Load the most recent snapshot's state for `job_id`, or `None` when no
    /// snapshot exists (fresh start).
    ///
    /// # Errors
    /// Returns an error if the directory cannot be read or the latest
    /// snapshot fails to decode or verify.
    pub fn latest_state(&self, job_id: &str) -> Result<Option<StreamState>> {
        let Some(path) = self.latest_snapshot_path(job_id)? else {
            return Ok(None);
        };
        Ok(Some(self.load(&path)?.state))
    }

    /// Path of the most recent snapshot for `job_id`, if any.
    ///
    /// # Errors
    /// Returns an error if the snapshot directory cannot be read.
    pub fn latest_snapshot_path(&self, job_id: &str) -> Result<Option<PathBuf>> {
        let mut files = snapshot_files(&self.config.directory, Some(job_id))?;
        files.sort_by_key(|(index, _)| *index);
        Ok(files.pop().map(|(_, entry)| entry.path()))
    }

    /// Load and verify one snapshot file.
    ///
    /// # Errors
    /// Returns an error on read/decode failure or a checksum mismatch.
    pub fn load(&self, path: &Path) -> Result<CheckpointSnapshot> {
        let mut file =
            File::open(path).with_context(|| format!("open {}", path.display()))?;
        let mut encoded = Vec::new();
        file.read_to_end(&mut encoded)
            .context("read checkpoint snapshot")?;

        let snapshot: CheckpointSnapshot =
            postcard::from_bytes(&encoded).context("decode checkpoint snapshot")?;

        let expected = state_checksum(&snapshot.job_id, snapshot.timestamp, &snapshot.state)?;
        if expected != snapshot.checksum {
            return Err(anyhow!(
                "checkpoint integrity check failed for {}: checksum mismatch",
                path.display()
            ));
        }
        Ok(snapshot)
    }

    /// Delete every snapshot belonging to `job_id`.
    ///
    /// # Errors
    /// Returns an error if the snapshot directory cannot be read.
    pub fn clear(&self, job_id: &str) -> Result<()> {
        for (_, entry) in snapshot_files(&self.config.directory, Some(job_id))? {
            remove_file(entry.path()).ok();
        }
        Ok(())
    }

    fn enforce_retention(&self, job_id: &str) -> Result<()> {
        let Some(max_checkpoints) = self.config.max_checkpoints else {
            return Ok(());
        };
        let mut files = snapshot_files(&self.config.directory, Some(job_id))?;
        if files.len() <= max_checkpoints {
            return Ok(());
        }
        files.sort_by_key(|(index, _)| *index);
        let to_delete = files.len() - max_checkpoints;
        for (_, entry) in files.iter().take(to_delete) {
            remove_file(entry.path()).ok();
        }
        Ok(())
    }
}

/// List snapshot files in `directory`, optionally filtered to one job,
/// paired with the index parsed from each filename.
fn snapshot_files(directory: &Path, job_id: Option<&str>) -> Result<Vec<(u64, DirEntry)>> {
    if !directory.exists() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in read_dir(directory).context("read checkpoint directory")? {
        let entry = entry.context("read checkpoint directory entry")?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Some(rest) = name.strip_prefix("checkpoint_") else {
            continue;
        };
        let Some(rest) = rest.strip_suffix(".bin") else {
            continue;
        };
        // Filename shape: checkpoint_<job>_<index>.bin
        let Some((job, index)) = rest.rsplit_once('_') else {
            continue;
        };
        if job_id.is_some_and(|wanted| wanted != job) {
            continue;
        }
        let Ok(index) = index.parse::<u64>() else {
            continue;
        };
        files.push((index, entry));
    }
    Ok(files)
}

/// SHA-256 over a snapshot's identity fields and encoded state.
fn state_checksum(job_id: &str, timestamp: u64, state: &StreamState) -> Result<String> {
    let encoded = postcard::to_allocvec(state).context("encode state for checksum")?;
    let mut hasher = Sha256::new();
    hasher.update(job_id.as_bytes());
    hasher.update(timestamp.to_le_bytes());
    hasher.update(&encoded);
    let digest = hasher.finalize();
    Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
}

/// Current timestamp in milliseconds since epoch.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
