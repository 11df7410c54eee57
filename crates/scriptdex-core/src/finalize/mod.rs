//! Finalizer: turns the content-addressed working store into the readable,
//! caller-facing layout and JSON index.
//!
//! Runs once per index, after the crawl has completed or been cancelled. The
//! index lock is held for the whole pass, so no ingest can interleave with a
//! rename. Renames already applied are not rolled back if a later step fails.

mod plan;
mod write;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::fingerprint::Fingerprint;
use crate::index::{ContentIndex, ContentRecord, IndexError, RunPhase};

/// URL -> sorted, deduplicated paths of the blobs it depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FinalMapping(BTreeMap<String, Vec<String>>);

impl FinalMapping {
    pub fn get(&self, url: &str) -> Option<&[String]> {
        self.0.get(url).map(Vec::as_slice)
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.0.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(u, p)| (u.as_str(), p.as_slice()))
    }

    /// Reads an index file written by [`ContentIndex::finalize`].
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read(path)
            .with_context(|| format!("failed to read index {}", path.display()))?;
        serde_json::from_slice(&data)
            .with_context(|| format!("failed to parse index {}", path.display()))
    }
}

impl ContentIndex {
    /// Renames every blob to its final name, builds the URL mapping and writes
    /// it to `index_file`. Callable once; the index is empty and `Done`
    /// afterwards, whether or not this succeeded.
    pub fn finalize(&self, index_file: &Path) -> Result<FinalMapping, IndexError> {
        let mut state = self.lock()?;
        match state.phase {
            RunPhase::Finalizing | RunPhase::Done => return Err(IndexError::AlreadyFinalized),
            RunPhase::Running | RunPhase::Cancelling => {}
        }
        tracing::info!(
            cancelled = state.phase == RunPhase::Cancelling,
            blobs = state.records.len(),
            "finalizing index"
        );
        state.phase = RunPhase::Finalizing;
        let records = std::mem::take(&mut state.records);

        let result = self.finalize_records(&records, index_file);
        state.phase = RunPhase::Done;
        result
    }

    fn finalize_records(
        &self,
        records: &BTreeMap<Fingerprint, ContentRecord>,
        index_file: &Path,
    ) -> Result<FinalMapping, IndexError> {
        let mut inverted = plan::invert(records);
        let renames = plan::plan_renames(records, &mut inverted);

        // Two fingerprints must never share a file.
        let mut owners: HashMap<String, &Fingerprint> = HashMap::with_capacity(renames.len());
        for (fingerprint, name) in &renames {
            if let Some(other) = owners.insert(name.file_name(), fingerprint) {
                return Err(anyhow::anyhow!(
                    "blobs {} and {} both map to {}",
                    other,
                    fingerprint,
                    name
                )
                .into());
            }
        }

        for (fingerprint, name) in &renames {
            let path = self.store.commit(fingerprint, name)?;
            tracing::debug!(fingerprint = %fingerprint, path = %path.display(), "committed blob");
        }

        let mut mapping = BTreeMap::new();
        for (url, fingerprints) in inverted.refs {
            let mut paths: Vec<String> = fingerprints
                .iter()
                .filter_map(|fp| renames.get(fp))
                .map(|name| self.store.path_of(name).to_string_lossy().into_owned())
                .collect();
            paths.sort();
            paths.dedup();
            mapping.insert(url, paths);
        }
        let mapping = FinalMapping(mapping);

        write::write_index_atomic(index_file, &mapping)?;
        tracing::info!(
            path = %index_file.display(),
            urls = mapping.len(),
            blobs = renames.len(),
            "index written"
        );
        Ok(mapping)
    }
}
