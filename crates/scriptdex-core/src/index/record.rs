//! Per-fingerprint record: the content and every URL referencing it.

use std::collections::BTreeMap;

/// How a URL references a script body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Classification {
    /// Body embedded directly in the page markup.
    Inline,
    /// Body fetched from a separate script URL.
    External,
}

/// One distinct script body and its references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRecord {
    content: Vec<u8>,
    /// URL -> classification. A URL appears at most once; re-adding it
    /// overwrites the classification.
    pub(crate) references: BTreeMap<String, Classification>,
}

impl ContentRecord {
    pub(crate) fn new(content: Vec<u8>) -> Self {
        Self {
            content,
            references: BTreeMap::new(),
        }
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn references(&self) -> &BTreeMap<String, Classification> {
        &self.references
    }

    /// URLs that reference this body inline.
    pub fn inline_urls(&self) -> impl Iterator<Item = &str> {
        self.references
            .iter()
            .filter(|(_, c)| **c == Classification::Inline)
            .map(|(u, _)| u.as_str())
    }
}
