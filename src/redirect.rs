//! Trailing-slash redirect target construction (spec §4.F.5, §6): toggling
//! the trailing slash on the raw (still-escaped) request path, preserving
//! the query string, and percent-encoding any non-ASCII byte that slips in.

use crate::enums::HttpMethod;

/// Adds or removes a single trailing `/`. The root path `/` never loses its
/// slash (there is nothing shorter to redirect to).
pub fn toggle_trailing_slash(path: &str) -> String {
    if path == "/" {
        return "/".to_string();
    }
    match path.strip_suffix('/') {
        Some(stripped) => stripped.to_string(),
        None => format!("{path}/"),
    }
}

/// Percent-encodes every non-ASCII byte, leaving existing `%XX` escapes and
/// ASCII reserved characters untouched — the path is assumed already
/// escaped by the caller, this only guards bytes a trailing-slash toggle
/// could not itself have introduced as invalid.
fn percent_encode_non_ascii(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        if byte.is_ascii() {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

/// Builds the `Location` value for a TSR redirect: the raw path with its
/// trailing slash toggled, non-ASCII bytes escaped, and the original query
/// string (if any) reattached unchanged.
pub fn redirect_target(raw_path: &str, query: Option<&str>) -> String {
    let mut target = percent_encode_non_ascii(&toggle_trailing_slash(raw_path));
    if let Some(q) = query {
        target.push('?');
        target.push_str(q);
    }
    target
}

/// The redirect status for a TSR candidate: 301 for GET (historically safe
/// to cache and replay), 308 for every other method (preserves the method
/// and body across the redirect, which 301 does not guarantee).
pub fn redirect_status(method: &HttpMethod) -> u16 {
    if *method == HttpMethod::Get {
        301
    } else {
        308
    }
}

/// An HTML body is only worth sending for a GET redirect, and only when the
/// caller hasn't already committed to a different content type.
pub fn redirect_body(method: &HttpMethod, content_type_already_set: bool, location: &str) -> Option<String> {
    if content_type_already_set || *method != HttpMethod::Get {
        return None;
    }
    Some(format!(
        "<html><head><title>Moved Permanently</title></head><body>Redirecting to <a href=\"{location}\">{location}</a></body></html>"
    ))
}
