//! Lightweight input validation helpers. Keep logic minimal and deterministic.
//!
//! Both functions are total: they classify any string and never fail. Callers
//! branch on the boolean to reject input before touching storage.

use crate::ShortCode;

/// Classify a string as a well-formed long URL.
///
/// Accepts an optional `http://`/`https://` prefix (either may be followed by
/// `www.`), then a host of lowercase alphanumeric labels joined by single `.`
/// or `-` separators ending in a 2-5 letter top-level label, an optional
/// 1-5 digit port, and an optional `/...` remainder. We keep this
/// intentionally light to avoid heavy parsing crates: the check is lexical
/// shape only, never network resolution.
pub fn is_well_formed_url(input: &str) -> bool {
    if input.is_empty() {
        return false;
    }
    let rest = input
        .strip_prefix("http://www.")
        .or_else(|| input.strip_prefix("https://www."))
        .or_else(|| input.strip_prefix("http://"))
        .or_else(|| input.strip_prefix("https://"))
        .unwrap_or(input);

    // Anything from the first slash on is the path and is accepted as-is.
    let authority = match rest.find('/') {
        Some(i) => &rest[..i],
        None => rest,
    };

    let (host, port) = match authority.split_once(':') {
        Some((h, p)) => (h, Some(p)),
        None => (authority, None),
    };

    if let Some(p) = port {
        if p.is_empty() || p.len() > 5 || !p.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
    }

    is_well_formed_host(host)
}

/// Host shape: alnum labels joined by single `.`/`-` separators, with the
/// final dot-separated label being 2-5 ASCII letters.
fn is_well_formed_host(host: &str) -> bool {
    let bytes = host.as_bytes();
    if bytes.is_empty() {
        return false;
    }

    let is_label_byte = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    let mut prev_was_separator = true; // host must not start with a separator
    let mut saw_dot = false;
    for &b in bytes {
        match b {
            b'.' | b'-' => {
                if prev_was_separator {
                    return false;
                }
                saw_dot |= b == b'.';
                prev_was_separator = true;
            }
            _ if is_label_byte(b) => prev_was_separator = false,
            _ => return false,
        }
    }
    if prev_was_separator || !saw_dot {
        return false;
    }

    // Top-level label: 2-5 letters after the last dot.
    let tld = &host[host.rfind('.').map(|i| i + 1).unwrap_or(0)..];
    (2..=5).contains(&tld.len()) && tld.bytes().all(|b| b.is_ascii_lowercase())
}

/// Classify a string as a well-formed short code using the same rules as
/// `ShortCode::new`.
pub fn is_well_formed_code(input: &str) -> bool {
    ShortCode::new(input).is_ok()
}
