//! One page task: fetch, discover, ingest. Blocking (curl).

use url::Url;

use super::extract;
use super::CrawlOptions;
use crate::fetch::fetch_with_retry;
use crate::index::{Classification, ContentIndex, IndexError, IngestOutcome};

/// Result of visiting one page.
#[derive(Debug, Default)]
pub(crate) struct PageReport {
    pub(crate) links: Vec<Url>,
    pub(crate) page_failed: bool,
    pub(crate) inline_scripts: usize,
    pub(crate) external_scripts: usize,
    pub(crate) scripts_failed: usize,
}

/// Fetch and parse errors are logged and skipped; only index (disk) errors
/// are returned. Stops early, without error, once the index stops accepting.
pub(crate) fn visit_page(
    index: &ContentIndex,
    page: &Url,
    opts: &CrawlOptions,
) -> Result<PageReport, IndexError> {
    let mut report = PageReport::default();
    if !index.is_accepting() {
        return Ok(report);
    }

    tracing::info!(url = %page, "visit");
    let body = match fetch_with_retry(page.as_str(), &opts.fetch, &opts.retry) {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(url = %page, "page fetch failed: {}", e);
            report.page_failed = true;
            return Ok(report);
        }
    };
    let found = extract::extract_page(page, &String::from_utf8_lossy(&body));

    for text in &found.inline {
        if index.ingest(page.as_str(), text.as_bytes(), Classification::Inline)?
            == IngestOutcome::Ignored
        {
            return Ok(report);
        }
        report.inline_scripts += 1;
    }

    for src in &found.external {
        if !index.is_accepting() {
            return Ok(report);
        }
        let script = match fetch_with_retry(src.as_str(), &opts.fetch, &opts.retry) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(url = %page, src = %src, "script fetch failed: {}", e);
                report.scripts_failed += 1;
                continue;
            }
        };
        // Both the page and the script URL reference the body.
        index.ingest(page.as_str(), &script, Classification::External)?;
        index.ingest(src.as_str(), &script, Classification::External)?;
        report.external_scripts += 1;
    }

    report.links = found.links;
    Ok(report)
}
