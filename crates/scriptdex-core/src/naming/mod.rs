//! Blob naming: staged (fingerprint) names and final readable names.
//!
//! Every blob file is `<token>.js` passed through [`sanitize_file_name`], where
//! the token is the bare fingerprint while staged, and `inline_<url|fp>` or
//! `extrnl_<url|fp>` once finalized.

mod sanitize;

pub use sanitize::{sanitize_file_name, MAX_NAME_BYTES};

use crate::fingerprint::Fingerprint;
use crate::index::Classification;
use std::fmt;

/// Fixed extension of every blob file.
pub const BLOB_EXTENSION: &str = "js";

pub const INLINE_PREFIX: &str = "inline_";
pub const EXTERNAL_PREFIX: &str = "extrnl_";

/// Name of a blob before sanitization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BlobName {
    /// Phase-one name: the bare fingerprint.
    Staged(Fingerprint),
    /// `inline_<token>`, token being a URL or a fingerprint.
    Inline(String),
    /// `extrnl_<token>`, token being a URL or a fingerprint.
    External(String),
}

impl BlobName {
    /// Final name for a classification and token (URL or fingerprint).
    pub fn classified(class: Classification, token: impl Into<String>) -> Self {
        match class {
            Classification::Inline => BlobName::Inline(token.into()),
            Classification::External => BlobName::External(token.into()),
        }
    }

    /// Sanitized file name, extension included.
    pub fn file_name(&self) -> String {
        sanitize_file_name(&format!("{}.{}", self, BLOB_EXTENSION))
    }
}

impl fmt::Display for BlobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlobName::Staged(fp) => write!(f, "{}", fp),
            BlobName::Inline(token) => write!(f, "{}{}", INLINE_PREFIX, token),
            BlobName::External(token) => write!(f, "{}{}", EXTERNAL_PREFIX, token),
        }
    }
}
