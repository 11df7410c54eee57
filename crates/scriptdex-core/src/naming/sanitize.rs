//! Filesystem-safe, collision-free file names.

use sha2::{Digest, Sha256};

/// Length budget for a sanitized name, kept well below Linux NAME_MAX (255)
/// so the output directory can be copied into deeper trees.
pub const MAX_NAME_BYTES: usize = 200;

/// Hex characters of the hash prefix used for truncated names.
const HASH_PREFIX_LEN: usize = 16;

/// Longest extension kept intact when a name is truncated.
const MAX_EXT_LEN: usize = 8;

/// Sanitizes an arbitrary identifier (URL, fingerprint) into a file name.
///
/// - Bytes outside `[A-Za-z0-9-_.:=,+@~]` are percent-encoded, `%` included,
///   so two different identifiers never share a name
/// - A leading `.` is encoded (no hidden files, no `.` or `..`)
/// - Names over [`MAX_NAME_BYTES`] become `<hash16>_<head>.<ext>`: the hash of
///   the full input keeps them unique, the short extension survives
pub fn sanitize_file_name(name: &str) -> String {
    let encoded = encode(name);
    if encoded.len() <= MAX_NAME_BYTES {
        return encoded;
    }

    let (stem, ext) = split_extension(name);
    let stem = encode(stem);
    let prefix = &hex::encode(Sha256::digest(name.as_bytes()))[..HASH_PREFIX_LEN];

    // Encoded output is pure ASCII, so every index is a char boundary.
    let reserved = HASH_PREFIX_LEN + 1 + ext.map(|e| e.len() + 1).unwrap_or(0);
    let take = MAX_NAME_BYTES.saturating_sub(reserved).min(stem.len());
    match ext {
        Some(ext) => format!("{}_{}.{}", prefix, &stem[..take], ext),
        None => format!("{}_{}", prefix, &stem[..take]),
    }
}

fn encode(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, b) in name.bytes().enumerate() {
        let safe = b.is_ascii_alphanumeric()
            || matches!(b, b'-' | b'_' | b':' | b'=' | b',' | b'+' | b'@' | b'~')
            || (b == b'.' && i > 0);
        if safe {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

/// Splits off a short alphanumeric extension (`"a/b.js"` → `("a/b", Some("js"))`).
fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.len() <= MAX_EXT_LEN
                && ext.bytes().all(|b| b.is_ascii_alphanumeric()) =>
        {
            (stem, Some(ext))
        }
        _ => (name, None),
    }
}
