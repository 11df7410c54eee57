//! Atomic index file write: temp file in the destination directory, then rename.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use super::FinalMapping;

pub(crate) fn write_index_atomic(path: &Path, mapping: &FinalMapping) -> Result<()> {
    let json = serde_json::to_vec_pretty(mapping).context("failed to serialize index")?;

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create index dir: {}", dir.display()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp index in {}", dir.display()))?;
    tmp.write_all(&json).context("failed to write index")?;
    tmp.as_file().sync_all().context("index sync failed")?;
    tmp.persist(path)
        .with_context(|| format!("failed to persist index to {}", path.display()))?;
    Ok(())
}
