//! Blob files in the output directory.
//!
//! Two-phase protocol: a blob is staged under its fingerprint name the first
//! time its content is seen, and committed (renamed) to its readable final
//! name by the finalizer once every reference is known.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::fingerprint::Fingerprint;
use crate::naming::BlobName;

/// Output directory holding one file per distinct fingerprint.
#[derive(Debug, Clone)]
pub struct BlobStore {
    dir: PathBuf,
}

impl BlobStore {
    /// Opens (and creates if missing) the output directory.
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output dir: {}", dir.display()))?;
        Ok(BlobStore {
            dir: dir.to_path_buf(),
        })
    }

    /// Full path of the file for `name`.
    pub fn path_of(&self, name: &BlobName) -> PathBuf {
        self.dir.join(name.file_name())
    }

    /// Phase one: write `content` under the fingerprint's staged name.
    /// A stale file left by an earlier run is truncated.
    pub fn stage(&self, fingerprint: &Fingerprint, content: &[u8]) -> Result<PathBuf> {
        let path = self.path_of(&BlobName::Staged(fingerprint.clone()));
        let mut file = File::create(&path)
            .with_context(|| format!("failed to create blob: {}", path.display()))?;
        file.write_all(content)
            .with_context(|| format!("failed to write blob: {}", path.display()))?;
        Ok(path)
    }

    /// Phase two: rename the staged blob to its final name.
    pub fn commit(&self, fingerprint: &Fingerprint, name: &BlobName) -> Result<PathBuf> {
        let from = self.path_of(&BlobName::Staged(fingerprint.clone()));
        let to = self.path_of(name);
        std::fs::rename(&from, &to).with_context(|| {
            format!("failed to rename {} to {}", from.display(), to.display())
        })?;
        Ok(to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_then_commit() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::open(&dir.path().join("out")).unwrap();
        let fp = Fingerprint::of(b"alert(1)");

        let staged = store.stage(&fp, b"alert(1)").unwrap();
        assert_eq!(staged.file_name().unwrap().to_string_lossy(), format!("{}.js", fp));
        assert_eq!(std::fs::read(&staged).unwrap(), b"alert(1)");

        let name = BlobName::Inline("https://x/b".to_string());
        let committed = store.commit(&fp, &name).unwrap();
        assert!(!staged.exists());
        assert_eq!(committed, dir.path().join("out").join("inline_https:%2F%2Fx%2Fb.js"));
        assert_eq!(std::fs::read(&committed).unwrap(), b"alert(1)");
    }

    #[test]
    fn commit_without_stage_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::open(dir.path()).unwrap();
        let fp = Fingerprint::of(b"missing");
        let err = store
            .commit(&fp, &BlobName::External(fp.to_string()))
            .unwrap_err();
        assert!(format!("{:#}", err).contains("failed to rename"));
    }
}
