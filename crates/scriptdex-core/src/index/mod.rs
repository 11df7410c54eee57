//! Content index: fingerprint -> record, behind a single process-wide lock.
//!
//! Crawl workers call [`ContentIndex::ingest`] concurrently. The lock covers
//! the record lookup/creation, the reference update, the first-sight blob
//! write, and the run phase, so "still accepting work?" is always read
//! consistently with a finalize that may already be in flight.

mod error;
mod record;

pub use error::IndexError;
pub use record::{Classification, ContentRecord};

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::fingerprint::Fingerprint;
use crate::store::BlobStore;

/// Lifecycle of a run: `Running -> (Cancelling) -> Finalizing -> Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Running,
    /// Interrupt received: ingests become no-ops, no new work is scheduled.
    Cancelling,
    Finalizing,
    Done,
}

/// What an [`ContentIndex::ingest`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// First sighting: record created and blob staged on disk.
    Stored,
    /// Content already known: only the reference map changed.
    Referenced,
    /// Run no longer accepting work; nothing changed.
    Ignored,
}

pub(crate) struct IndexState {
    pub(crate) phase: RunPhase,
    pub(crate) records: BTreeMap<Fingerprint, ContentRecord>,
}

/// Deduplicating script store for one run.
pub struct ContentIndex {
    pub(crate) store: BlobStore,
    pub(crate) state: Mutex<IndexState>,
}

impl ContentIndex {
    pub fn new(store: BlobStore) -> Self {
        Self {
            store,
            state: Mutex::new(IndexState {
                phase: RunPhase::Running,
                records: BTreeMap::new(),
            }),
        }
    }

    /// Index writing blobs into `output_dir` (created if missing).
    pub fn open(output_dir: &Path) -> Result<Self, IndexError> {
        Ok(Self::new(BlobStore::open(output_dir)?))
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, IndexState>, IndexError> {
        self.state.lock().map_err(|_| IndexError::Poisoned)
    }

    /// Records that `url` references `content` with `classification`.
    ///
    /// The blob is written only the first time its fingerprint is seen; a
    /// write failure is returned and leaves the index unchanged.
    pub fn ingest(
        &self,
        url: &str,
        content: &[u8],
        classification: Classification,
    ) -> Result<IngestOutcome, IndexError> {
        let fingerprint = Fingerprint::of(content);
        let mut state = self.lock()?;
        if state.phase != RunPhase::Running {
            tracing::debug!(url, phase = ?state.phase, "ingest ignored");
            return Ok(IngestOutcome::Ignored);
        }

        let outcome = match state.records.entry(fingerprint) {
            Entry::Occupied(mut entry) => {
                entry
                    .get_mut()
                    .references
                    .insert(url.to_string(), classification);
                IngestOutcome::Referenced
            }
            Entry::Vacant(entry) => {
                let path = self.store.stage(entry.key(), content)?;
                tracing::debug!(
                    url,
                    fingerprint = %entry.key(),
                    bytes = content.len(),
                    path = %path.display(),
                    "staged new blob"
                );
                let mut record = ContentRecord::new(content.to_vec());
                record.references.insert(url.to_string(), classification);
                entry.insert(record);
                IngestOutcome::Stored
            }
        };
        Ok(outcome)
    }

    /// Stops accepting work. Returns true if this call moved the run from
    /// `Running` to `Cancelling`.
    pub fn cancel(&self) -> Result<bool, IndexError> {
        let mut state = self.lock()?;
        if state.phase == RunPhase::Running {
            state.phase = RunPhase::Cancelling;
            tracing::info!("cancellation requested; draining in-flight work");
            return Ok(true);
        }
        Ok(false)
    }

    /// True while the run is `Running`.
    pub fn is_accepting(&self) -> bool {
        self.lock()
            .map(|s| s.phase == RunPhase::Running)
            .unwrap_or(false)
    }

    pub fn phase(&self) -> Result<RunPhase, IndexError> {
        Ok(self.lock()?.phase)
    }

    /// Number of distinct fingerprints ingested so far.
    pub fn len(&self) -> Result<usize, IndexError> {
        Ok(self.lock()?.records.len())
    }

    pub fn is_empty(&self) -> Result<bool, IndexError> {
        Ok(self.len()? == 0)
    }

    /// Snapshot of the record for `fingerprint`.
    pub fn record(&self, fingerprint: &Fingerprint) -> Result<Option<ContentRecord>, IndexError> {
        Ok(self.lock()?.records.get(fingerprint).cloned())
    }
}

#[cfg(test)]
mod tests;
