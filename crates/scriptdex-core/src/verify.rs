//! Consistency check of a written index against the output directory.

use anyhow::Result;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::finalize::FinalMapping;
use crate::fingerprint::{fingerprint_path, Fingerprint};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    pub urls: usize,
    /// Distinct paths referenced by the index.
    pub files: usize,
    /// Referenced paths that do not exist.
    pub missing: Vec<PathBuf>,
    /// Groups of distinct files with identical content (dedup violated).
    pub duplicates: Vec<Vec<PathBuf>>,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.missing.is_empty() && self.duplicates.is_empty()
    }
}

/// Loads `index_file`, checks every path exists and that no two referenced
/// files share a fingerprint.
pub fn verify_index(index_file: &Path) -> Result<VerifyReport> {
    let mapping = FinalMapping::load(index_file)?;
    let paths: BTreeSet<PathBuf> = mapping
        .iter()
        .flat_map(|(_, paths)| paths.iter().map(PathBuf::from))
        .collect();

    let mut report = VerifyReport {
        urls: mapping.len(),
        files: paths.len(),
        ..VerifyReport::default()
    };
    let mut by_fingerprint: BTreeMap<Fingerprint, Vec<PathBuf>> = BTreeMap::new();
    for path in paths {
        if !path.is_file() {
            tracing::warn!(path = %path.display(), "indexed file missing");
            report.missing.push(path);
            continue;
        }
        let fp = fingerprint_path(&path)?;
        by_fingerprint.entry(fp).or_default().push(path);
    }
    report.duplicates = by_fingerprint
        .into_values()
        .filter(|group| group.len() > 1)
        .collect();
    Ok(report)
}
