//! Structural validation of bearer tokens.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Returns true if `token` could be a bearer credential.
///
/// The token must be non-empty visible ASCII. A three-segment token is
/// treated as a JWT and its header and payload must decode as base64url.
#[must_use]
pub fn is_structurally_valid(token: &str) -> bool {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_graphic()) {
        return false;
    }

    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return true;
    }
    segments[..2].iter().all(|segment| {
        !segment.is_empty() && URL_SAFE_NO_PAD.decode(segment.trim_end_matches('=')).is_ok()
    })
}
