//! Link destination safety check used in safe mode.

use std::sync::LazyLock;

use regex::Regex;

static UNSAFE_PROTOCOL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:javascript|vbscript|file|data):").unwrap());

static SAFE_DATA_PROTOCOL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^data:image/(?:png|gif|jpeg|webp)").unwrap());

/// Whether a link or image destination could run script when followed.
///
/// `javascript:`, `vbscript:`, `file:` and `data:` URLs are unsafe, except
/// `data:` URLs for PNG, GIF, JPEG and WebP images. Matching is
/// case-insensitive and anchored at the start of the destination.
///
/// # Examples
///
/// ```
/// use cm_renderer::is_potentially_unsafe;
///
/// assert!(is_potentially_unsafe("JavaScript:alert(1)"));
/// assert!(!is_potentially_unsafe("data:image/png;base64,AAAA"));
/// assert!(!is_potentially_unsafe("https://example.com"));
/// ```
pub fn is_potentially_unsafe(url: &str) -> bool {
    UNSAFE_PROTOCOL.is_match(url) && !SAFE_DATA_PROTOCOL.is_match(url)
}
