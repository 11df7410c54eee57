//! Crawl loop feeding the content index.
//!
//! Breadth-first over same-host links, up to `workers` pages in flight. Each
//! page task runs under `spawn_blocking` (curl is blocking) and ingests every
//! inline and external script it finds. When the index stops accepting work
//! (Ctrl-C), no new pages are scheduled and in-flight ones are drained.

mod extract;
mod scope;
mod visit;

pub use extract::{extract_page, resolve, PageScripts};
pub use scope::CrawlScope;

use anyhow::Result;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tokio::task::JoinSet;
use url::Url;

use crate::config::ScriptdexConfig;
use crate::fetch::FetchOptions;
use crate::index::ContentIndex;
use crate::retry::RetryPolicy;

#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub start_url: Url,
    /// The start page is depth 1; links found at `max_depth` are not followed.
    pub max_depth: u32,
    pub workers: usize,
    pub filter_words: Vec<String>,
    pub fetch: FetchOptions,
    pub retry: RetryPolicy,
}

impl CrawlOptions {
    pub fn from_config(start_url: Url, cfg: &ScriptdexConfig) -> Self {
        Self {
            start_url,
            max_depth: cfg.max_depth,
            workers: cfg.workers,
            filter_words: cfg.filter_words.clone(),
            fetch: cfg.fetch.as_ref().map(FetchOptions::from).unwrap_or_default(),
            retry: cfg.retry.as_ref().map(RetryPolicy::from).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CrawlStats {
    pub pages_visited: usize,
    pub pages_failed: usize,
    pub inline_scripts: usize,
    pub external_scripts: usize,
    pub scripts_failed: usize,
    /// True if the crawl stopped because the index was cancelled.
    pub cancelled: bool,
}

impl CrawlStats {
    fn absorb(&mut self, report: &visit::PageReport) {
        if report.page_failed {
            self.pages_failed += 1;
        } else {
            self.pages_visited += 1;
        }
        self.inline_scripts += report.inline_scripts;
        self.external_scripts += report.external_scripts;
        self.scripts_failed += report.scripts_failed;
    }
}

/// Crawls from `opts.start_url`, ingesting scripts into `index`.
///
/// Returns once the frontier is exhausted or the index was cancelled and all
/// in-flight pages finished. An index (disk) error cancels the index, drains
/// the workers and is returned; the caller should not finalize in that case.
pub async fn crawl(index: Arc<ContentIndex>, opts: CrawlOptions) -> Result<CrawlStats> {
    let workers = opts.workers.max(1);
    let max_depth = opts.max_depth.max(1);
    let scope = CrawlScope::new(&opts.start_url, opts.filter_words.clone());
    let opts = Arc::new(opts);

    let mut stats = CrawlStats::default();
    let mut visited: HashSet<String> = HashSet::new();
    let mut frontier: VecDeque<(Url, u32)> = VecDeque::new();
    visited.insert(opts.start_url.as_str().to_string());
    frontier.push_back((opts.start_url.clone(), 1));

    let mut join_set = JoinSet::new();
    let mut fatal: Option<anyhow::Error> = None;

    loop {
        while fatal.is_none() && join_set.len() < workers && index.is_accepting() {
            let Some((page, depth)) = frontier.pop_front() else {
                break;
            };
            let index = Arc::clone(&index);
            let opts = Arc::clone(&opts);
            join_set.spawn_blocking(move || (depth, visit::visit_page(&index, &page, &opts)));
        }

        let Some(joined) = join_set.join_next().await else {
            break;
        };
        let failure = match joined {
            Ok((depth, Ok(report))) => {
                stats.absorb(&report);
                if depth < max_depth {
                    for link in report.links {
                        if scope.allows(&link) && visited.insert(link.as_str().to_string()) {
                            frontier.push_back((link, depth + 1));
                        }
                    }
                }
                None
            }
            Ok((_, Err(e))) => Some(anyhow::Error::from(e).context("ingest failed")),
            Err(e) => Some(anyhow::anyhow!("page task failed: {}", e)),
        };
        if let Some(e) = failure {
            tracing::error!("{:#}", e);
            if fatal.is_none() {
                index.cancel()?;
                fatal = Some(e);
            }
        }
    }

    if let Some(e) = fatal {
        return Err(e);
    }
    stats.cancelled = !index.is_accepting();
    tracing::info!(?stats, "crawl finished");
    Ok(stats)
}
