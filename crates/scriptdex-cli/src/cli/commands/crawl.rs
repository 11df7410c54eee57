//! Crawl command: crawl, then finalize the index exactly once.

use anyhow::{Context, Result};
use scriptdex_core::config::ScriptdexConfig;
use scriptdex_core::crawl::{self, CrawlOptions};
use scriptdex_core::ContentIndex;
use std::sync::Arc;
use url::Url;

/// Runs the crawl from `url` and writes `cfg.index_file`.
///
/// Ctrl-C cancels the index: in-flight pages finish, nothing new is ingested,
/// and finalization still runs. A fatal ingest error skips finalization.
pub async fn run_crawl(cfg: &ScriptdexConfig, url: &str) -> Result<()> {
    let start_url = Url::parse(url).with_context(|| format!("invalid start URL: {}", url))?;
    let index = Arc::new(
        ContentIndex::open(&cfg.output_dir)
            .with_context(|| format!("cannot open output dir {}", cfg.output_dir.display()))?,
    );

    let watcher = {
        let index = Arc::clone(&index);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            match index.cancel() {
                Ok(true) => {
                    tracing::warn!("interrupted, finishing in-flight pages");
                    eprintln!("Interrupted: finishing in-flight pages, then writing the index.");
                }
                Ok(false) => {}
                Err(e) => tracing::error!("cancel failed: {}", e),
            }
        })
    };

    let opts = CrawlOptions::from_config(start_url, cfg);
    tracing::info!(
        start = %opts.start_url,
        max_depth = opts.max_depth,
        workers = opts.workers,
        output = %cfg.output_dir.display(),
        "crawl starting"
    );
    let result = crawl::crawl(Arc::clone(&index), opts).await;
    watcher.abort();
    let stats = result?;

    let index_file = cfg.index_file.clone();
    let finalizer = Arc::clone(&index);
    let mapping = tokio::task::spawn_blocking(move || finalizer.finalize(&index_file))
        .await
        .context("finalize task failed")??;

    println!(
        "{} pages visited ({} failed), {} inline and {} external scripts, {} script fetches failed",
        stats.pages_visited,
        stats.pages_failed,
        stats.inline_scripts,
        stats.external_scripts,
        stats.scripts_failed
    );
    if stats.cancelled {
        println!("crawl was interrupted; index covers pages seen so far");
    }
    println!(
        "{} URLs indexed in {}, files in {}",
        mapping.len(),
        cfg.index_file.display(),
        cfg.output_dir.display()
    );
    Ok(())
}
