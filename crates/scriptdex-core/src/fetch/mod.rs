//! Blocking HTTP GET of pages and external scripts (libcurl).
//!
//! Runs in the current thread; the crawl loop calls it from `spawn_blocking`.

use std::time::Duration;

use crate::config::FetchConfig;
use crate::retry::{self, RetryPolicy};

/// Per-request curl settings.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub user_agent: Option<String>,
    /// Bodies larger than this abort the transfer.
    pub max_body_bytes: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::from(&FetchConfig::default())
    }
}

impl From<&FetchConfig> for FetchOptions {
    fn from(cfg: &FetchConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            timeout: Duration::from_secs(cfg.timeout_secs),
            user_agent: cfg.user_agent.clone(),
            max_body_bytes: cfg.max_body_bytes,
        }
    }
}

/// Why a single fetch failed. Always per-resource: the crawl logs and skips it.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, oversized body, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// Response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
}

/// GETs `url`, following redirects, and returns the body.
pub fn fetch(url: &str, opts: &FetchOptions) -> Result<Vec<u8>, FetchError> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(opts.connect_timeout)?;
    easy.timeout(opts.timeout)?;
    if let Some(ua) = &opts.user_agent {
        easy.useragent(ua)?;
    }

    let limit = opts.max_body_bytes;
    let mut body = Vec::new();
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            if body.len() as u64 + data.len() as u64 > limit {
                tracing::warn!(url, limit, "body too large, aborting transfer");
                return Ok(0);
            }
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(FetchError::Http(code));
    }
    Ok(body)
}

/// [`fetch`] with backoff on transient failures (timeouts, 5xx, throttling).
pub fn fetch_with_retry(
    url: &str,
    opts: &FetchOptions,
    policy: &RetryPolicy,
) -> Result<Vec<u8>, FetchError> {
    retry::run_with_retry(policy, || fetch(url, opts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    /// One-shot server answering every connection with `status` and `body`.
    fn serve(status: &'static str, body: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        std::thread::spawn(move || {
            for mut stream in listener.incoming().flatten() {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf);
                let head = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    status,
                    body.len()
                );
                let _ = stream.write_all(head.as_bytes());
                let _ = stream.write_all(body);
            }
        });
        format!("http://127.0.0.1:{}/app.js", port)
    }

    #[test]
    fn fetch_returns_body() {
        let url = serve("200 OK", b"console.log('hi');");
        let body = fetch(&url, &FetchOptions::default()).unwrap();
        assert_eq!(body, b"console.log('hi');");
    }

    #[test]
    fn fetch_non_2xx_is_http_error() {
        let url = serve("404 Not Found", b"missing");
        let err = fetch(&url, &FetchOptions::default()).unwrap_err();
        assert!(matches!(err, FetchError::Http(404)));
    }

    #[test]
    fn fetch_oversized_body_fails() {
        let url = serve("200 OK", b"0123456789");
        let opts = FetchOptions {
            max_body_bytes: 4,
            ..FetchOptions::default()
        };
        assert!(matches!(fetch(&url, &opts), Err(FetchError::Curl(_))));
    }
}
