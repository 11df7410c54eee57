//! Renaming heuristic: decides the final name of every fingerprint.
//!
//! Passes run in a fixed order and every map is ordered, so the same index
//! always produces the same names:
//!
//! 1. invert records into `url -> [fingerprint]` and `fingerprint -> class`
//! 2. single-URL naming: a URL with exactly one fingerprint names it
//!    (`extrnl_<url>` drops the URL from the output, `inline_<url>` keeps it)
//! 3. single-inline-page naming: a fingerprint inlined by exactly one URL is
//!    `inline_<url>`, overriding step 2
//! 4. fallback: `extrnl_<fp>` or `inline_<fp>`

use std::collections::BTreeMap;

use crate::fingerprint::Fingerprint;
use crate::index::{Classification, ContentRecord};
use crate::naming::BlobName;

/// Records turned inside out.
#[derive(Debug, Default)]
pub(crate) struct Inverted {
    /// URL -> fingerprints it references (ascending, no duplicates).
    pub(crate) refs: BTreeMap<String, Vec<Fingerprint>>,
    /// Effective classification per fingerprint.
    pub(crate) type_of: BTreeMap<Fingerprint, Classification>,
}

impl Inverted {
    /// Mixed classifications resolve to `External` if any reference is external.
    pub(crate) fn class_of(&self, fingerprint: &Fingerprint) -> Classification {
        self.type_of
            .get(fingerprint)
            .copied()
            .unwrap_or(Classification::Inline)
    }
}

pub(crate) fn invert(records: &BTreeMap<Fingerprint, ContentRecord>) -> Inverted {
    let mut inverted = Inverted::default();
    for (fingerprint, record) in records {
        for (url, class) in &record.references {
            inverted
                .refs
                .entry(url.clone())
                .or_default()
                .push(fingerprint.clone());
            inverted
                .type_of
                .entry(fingerprint.clone())
                .and_modify(|t| {
                    if *class == Classification::External {
                        *t = Classification::External;
                    }
                })
                .or_insert(*class);
        }
    }
    inverted
}

/// Final name per fingerprint. Total over `records`. Removes from
/// `inverted.refs` the URLs dropped by single-URL naming.
pub(crate) fn plan_renames(
    records: &BTreeMap<Fingerprint, ContentRecord>,
    inverted: &mut Inverted,
) -> BTreeMap<Fingerprint, BlobName> {
    let mut plan: BTreeMap<Fingerprint, BlobName> = BTreeMap::new();

    // Single-URL naming. The lexicographically first qualifying URL names the blob.
    let mut dropped = Vec::new();
    for (url, fingerprints) in &inverted.refs {
        let [fingerprint] = fingerprints.as_slice() else {
            continue;
        };
        let class = inverted.class_of(fingerprint);
        plan.entry(fingerprint.clone())
            .or_insert_with(|| BlobName::classified(class, url.clone()));
        if class == Classification::External {
            dropped.push(url.clone());
        }
    }
    for url in &dropped {
        inverted.refs.remove(url);
    }

    // Single-inline-page naming. A name claimed by several fingerprints is ambiguous and unused.
    let mut claims: BTreeMap<BlobName, Vec<&Fingerprint>> = BTreeMap::new();
    for (fingerprint, record) in records {
        let mut inline = record.inline_urls();
        if let (Some(url), None) = (inline.next(), inline.next()) {
            claims
                .entry(BlobName::Inline(url.to_string()))
                .or_default()
                .push(fingerprint);
        }
    }
    for (name, fingerprints) in claims {
        match fingerprints.as_slice() {
            [fingerprint] => {
                plan.insert((*fingerprint).clone(), name);
            }
            _ => tracing::debug!(
                name = %name,
                claimants = fingerprints.len(),
                "ambiguous inline name left unused"
            ),
        }
    }

    // Fallback.
    for fingerprint in records.keys() {
        if !plan.contains_key(fingerprint) {
            let name = BlobName::classified(inverted.class_of(fingerprint), fingerprint.to_string());
            plan.insert(fingerprint.clone(), name);
        }
    }

    tracing::debug!(
        renames = plan.len(),
        dropped_urls = dropped.len(),
        "rename plan ready"
    );
    plan
}
