//! Cursor pagination via the product feed's `Link` response header.
//!
//! Each page response carries a `Link` header with URLs for adjacent pages,
//! and the cursor for the next page rides in that URL's `page_info` query
//! parameter:
//!
//! ```text
//! <https://shop.example/products.json?limit=250&page_info=CURSOR>; rel="next"
//! ```
//!
//! The last page has no `rel="next"` segment.

/// Extracts the next-page cursor from a `Link` header value.
///
/// Returns `None` when the header is absent, has no `rel="next"` segment,
/// or the next URL carries no `page_info` parameter.
#[must_use]
pub fn next_page_cursor(link_header: Option<&str>) -> Option<String> {
    link_header?
        .split(',')
        .map(str::trim)
        .find(|segment| segment.contains(r#"rel="next""#))
        .and_then(cursor_from_segment)
}

/// Pulls `page_info` out of one `<URL>; rel="next"` directive.
fn cursor_from_segment(segment: &str) -> Option<String> {
    let start = segment.find('<')? + 1;
    let end = segment.find('>')?;
    if start >= end {
        return None;
    }
    let url = &segment[start..end];

    let query = &url[url.find('?')? + 1..];
    for pair in query.split('&') {
        if let Some(value) = pair.strip_prefix("page_info=") {
            // Cursors are base64url and need no percent-decoding.
            let value = value.split('#').next().unwrap_or(value);
            if !value.is_empty() {
                return Some(value.to_owned());
            }
        }
    }
    None
}
