//! Which discovered links the crawl follows.

use url::Url;

/// Follows links whose host ends with the start host (subdomains included)
/// and that contain none of the filter words.
#[derive(Debug, Clone)]
pub struct CrawlScope {
    host: String,
    filter_words: Vec<String>,
}

impl CrawlScope {
    pub fn new(start: &Url, filter_words: Vec<String>) -> Self {
        Self {
            host: start.host_str().unwrap_or_default().to_string(),
            filter_words: filter_words.into_iter().filter(|w| !w.is_empty()).collect(),
        }
    }

    pub fn allows(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        if !host.ends_with(&self.host) {
            return false;
        }
        !self.filter_words.iter().any(|w| url.as_str().contains(w.as_str()))
    }
}
