pub mod config;
pub mod logging;

pub mod crawl;
pub mod fetch;
pub mod finalize;
pub mod fingerprint;
pub mod index;
pub mod naming;
pub mod retry;
pub mod store;
pub mod verify;

pub use finalize::FinalMapping;
pub use fingerprint::Fingerprint;
pub use index::{Classification, ContentIndex, IndexError, IngestOutcome, RunPhase};
