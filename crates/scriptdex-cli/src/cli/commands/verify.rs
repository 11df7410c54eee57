//! Verify command: check a written index against the files it names.

use anyhow::{bail, Result};
use scriptdex_core::verify;
use std::path::Path;

pub async fn run_verify(index_file: &Path) -> Result<()> {
    let report = verify::verify_index(index_file)?;
    println!(
        "{} URLs, {} files referenced",
        report.urls, report.files
    );
    for path in &report.missing {
        println!("missing: {}", path.display());
    }
    for group in &report.duplicates {
        let names: Vec<String> = group.iter().map(|p| p.display().to_string()).collect();
        println!("duplicate content: {}", names.join(", "));
    }
    if !report.is_ok() {
        bail!(
            "index {} is inconsistent ({} missing, {} duplicate groups)",
            index_file.display(),
            report.missing.len(),
            report.duplicates.len()
        );
    }
    println!("ok");
    Ok(())
}
