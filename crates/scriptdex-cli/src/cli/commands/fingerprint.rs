//! Fingerprint command: print the content fingerprint of a file.

use anyhow::Result;
use scriptdex_core::fingerprint;
use std::path::Path;

/// Same digest the crawler uses to deduplicate script bodies.
pub async fn run_fingerprint(path: &Path) -> Result<()> {
    let fp = fingerprint::fingerprint_path(path)?;
    println!("{}  {}", fp, path.display());
    Ok(())
}
