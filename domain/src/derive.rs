//! Deterministic short-code derivation.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};

use crate::{ShortCode, CODE_LEN};

/// Derive the short code for a long URL.
///
/// Computes SHA-256 over the exact byte sequence of the URL, encodes the
/// digest with the URL-safe base64 alphabet, and keeps the first ten
/// characters. Identical input always yields the identical code; that
/// determinism is what makes creation idempotent. No salting or chaining is
/// applied, so two distinct URLs sharing a digest prefix would share a code;
/// the service layer detects and reports that case.
pub fn derive_code(long_url: &str) -> ShortCode {
    let digest = Sha256::digest(long_url.as_bytes());
    let encoded = URL_SAFE_NO_PAD.encode(digest);
    let truncated = &encoded[..CODE_LEN];
    // Valid by construction — the URL-safe alphabet is a subset of the code charset
    ShortCode::new(truncated).expect("base64url output is a valid code")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::is_well_formed_code;

    #[test]
    fn derives_known_vectors() {
        assert_eq!(derive_code("https://example.com").as_str(), "EAaArVRs5q");
        assert_eq!(
            derive_code("https://example.com/page").as_str(),
            "NkHF8idMVH"
        );
        assert_eq!(derive_code("http://example.com").as_str(), "8OamqXBCpP");
    }

    #[test]
    fn derivation_is_stable() {
        let a = derive_code("https://example.com/some/long/path?with=query");
        let b = derive_code("https://example.com/some/long/path?with=query");
        assert_eq!(a, b);
    }

    #[test]
    fn derived_codes_pass_code_validation() {
        for url in [
            "https://example.com",
            "https://example.com/",
            "example.com:8080/x",
            "https://www.example.co.uk/path?a=1",
        ] {
            assert!(is_well_formed_code(derive_code(url).as_str()));
        }
    }

    #[test]
    fn distinct_inputs_yield_distinct_codes() {
        // The scheme byte matters: the digest runs over the exact input.
        assert_ne!(
            derive_code("https://example.com"),
            derive_code("http://example.com")
        );
        assert_ne!(
            derive_code("https://example.com"),
            derive_code("https://example.com/")
        );
    }
}
