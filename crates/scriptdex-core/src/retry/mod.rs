//! Retry and backoff for page and script fetches.
//!
//! Classifies fetch failures (timeouts, throttling, connection errors, 5xx)
//! and decides exponential backoff, so a flaky CDN does not silently drop a
//! script from the index.

mod classify;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
