//! Errors surfaced by ingestion and finalization.

/// Fatal index errors. Per-resource problems (fetch, URL parse) never reach
/// this type; they are logged and skipped by the crawl loop.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// `finalize` was already run (or is running) for this index.
    #[error("index already finalized")]
    AlreadyFinalized,
    /// A thread panicked while holding the index lock.
    #[error("index lock poisoned")]
    Poisoned,
    /// Blob write/rename or index file write/serialization failed.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
