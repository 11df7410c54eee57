//! CLI command handlers, one per file.

mod crawl;
mod fingerprint;
mod verify;

pub use crawl::run_crawl;
pub use fingerprint::run_fingerprint;
pub use verify::run_verify;
