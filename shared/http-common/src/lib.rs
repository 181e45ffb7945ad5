//! Shared HTTP utilities for the URL shortener workspace.
//!
//! Provides the JSON response envelope used by every endpoint: all responses
//! carry a `success` boolean, with `data` on the happy path and `error`
//! otherwise.

// ============================================================================
// JSON Response Helpers (framework-agnostic)
// ============================================================================

/// Create a success JSON body.
///
/// Returns: `{"success": true, "data": "<data>"}`
pub fn json_ok(data: &str) -> serde_json::Value {
    serde_json::json!({"success": true, "data": data})
}

/// Create an error JSON body.
///
/// Returns: `{"success": false, "error": "<message>"}`
pub fn json_err(message: &str) -> serde_json::Value {
    serde_json::json!({"success": false, "error": message})
}

// ============================================================================
// Canonical error messages
// ============================================================================

// Wire-visible strings; clients match on these.
pub const ERR_INVALID_URL: &str = "Invalid URL";
pub const ERR_INVALID_SHORT_URL: &str = "Invalid Short-URL";
pub const ERR_NO_URL_FOUND: &str = "No URL found";
pub const ERR_CREATE_FAILED: &str = "Error while creating Short-URL";
pub const ERR_RESOLVE_FAILED: &str = "Error while decoding Short-URL";
