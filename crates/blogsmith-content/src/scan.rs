//! Low-level HTML tag scanning.
//!
//! Generated article bodies are semi-structured HTML; the analysis and
//! enrichment passes need tag positions, attributes, and element extents, but
//! never a full DOM. This module walks the byte stream once per query and
//! hands out spans into the original string. See [`crate::headings`] and
//! [`crate::merge`] for how the pieces compose.

/// How a scanned tag closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Open,
    Close,
    SelfClosing,
}

/// One tag occurrence in document order. `start..end` spans the full tag
/// text including the angle brackets.
#[derive(Debug, Clone)]
pub struct Tag {
    pub name: String,
    pub kind: TagKind,
    pub start: usize,
    pub end: usize,
    attrs: Vec<(String, String)>,
}

impl Tag {
    /// Look up an attribute value by case-insensitive name. Bare attributes
    /// (no `=`) report an empty value.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        let lower = name.to_lowercase();
        self.attrs
            .iter()
            .find(|(n, _)| *n == lower)
            .map(|(_, v)| v.as_str())
    }

    /// `true` if the space-separated `class` attribute contains `class_name`.
    #[must_use]
    pub fn has_class(&self, class_name: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class_name))
    }
}

/// Byte extents of a complete element: the open tag, its inner content, and
/// the matching close tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementSpan {
    pub open_start: usize,
    pub content_start: usize,
    pub content_end: usize,
    pub end: usize,
}

/// Scan every tag in `html` in document order. Comments and doctype
/// declarations are skipped; malformed trailing fragments are dropped.
#[must_use]
pub fn tags(html: &str) -> Vec<Tag> {
    let bytes = html.as_bytes();
    let len = bytes.len();
    let mut out = Vec::new();
    let mut i = 0;

    while i < len {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }

        // Comment / doctype / processing junk: skip to its terminator.
        if i + 1 < len && bytes[i + 1] == b'!' {
            if html[i..].starts_with("<!--") {
                match html[i + 4..].find("-->") {
                    Some(rel) => i += 4 + rel + 3,
                    None => break,
                }
            } else {
                match html[i..].find('>') {
                    Some(rel) => i += rel + 1,
                    None => break,
                }
            }
            continue;
        }

        let (is_close, name_start) = if i + 1 < len && bytes[i + 1] == b'/' {
            (true, i + 2)
        } else {
            (false, i + 1)
        };

        // A '<' not followed by a letter is literal text.
        if name_start >= len || !bytes[name_start].is_ascii_alphabetic() {
            i += 1;
            continue;
        }

        let mut j = name_start;
        while j < len && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'-') {
            j += 1;
        }
        let name = html[name_start..j].to_lowercase();

        // Find the closing '>' while honoring quoted attribute values.
        let mut quote: Option<u8> = None;
        let mut tag_end = None;
        let mut k = j;
        while k < len {
            match (quote, bytes[k]) {
                (Some(q), b) if b == q => quote = None,
                (None, b'"' | b'\'') => quote = Some(bytes[k]),
                (None, b'>') => {
                    tag_end = Some(k);
                    break;
                }
                _ => {}
            }
            k += 1;
        }
        let Some(gt) = tag_end else { break };

        let raw_attrs = &html[j..gt];
        let self_closing = raw_attrs.trim_end().ends_with('/') || is_void_element(&name);
        let kind = if is_close {
            TagKind::Close
        } else if self_closing {
            TagKind::SelfClosing
        } else {
            TagKind::Open
        };

        out.push(Tag {
            name,
            kind,
            start: i,
            end: gt + 1,
            attrs: if is_close {
                Vec::new()
            } else {
                parse_attrs(raw_attrs)
            },
        });
        i = gt + 1;
    }

    out
}

/// Elements that never have content or a closing tag.
fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link" | "meta"
            | "source" | "track" | "wbr"
    )
}

/// Parse `name=value` pairs from the text between a tag's name and its `>`.
/// Values may be double-quoted, single-quoted, or unquoted; names are
/// lowercased; entity references inside values are decoded.
fn parse_attrs(raw: &str) -> Vec<(String, String)> {
    let bytes = raw.as_bytes();
    let len = bytes.len();
    let mut attrs = Vec::new();
    let mut i = 0;

    while i < len {
        while i < len && (bytes[i].is_ascii_whitespace() || bytes[i] == b'/') {
            i += 1;
        }
        if i >= len {
            break;
        }

        let name_start = i;
        while i < len
            && !bytes[i].is_ascii_whitespace()
            && bytes[i] != b'='
            && bytes[i] != b'/'
        {
            i += 1;
        }
        if i == name_start {
            i += 1;
            continue;
        }
        let name = raw[name_start..i].to_lowercase();

        while i < len && bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        if i >= len || bytes[i] != b'=' {
            attrs.push((name, String::new()));
            continue;
        }
        i += 1;
        while i < len && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= len {
            attrs.push((name, String::new()));
            break;
        }

        let value = if bytes[i] == b'"' || bytes[i] == b'\'' {
            let q = bytes[i];
            i += 1;
            let value_start = i;
            while i < len && bytes[i] != q {
                i += 1;
            }
            let v = &raw[value_start..i];
            i = (i + 1).min(len);
            v
        } else {
            let value_start = i;
            while i < len && !bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            &raw[value_start..i]
        };
        attrs.push((name, decode_entities(value)));
    }

    attrs
}

/// Resolve the full span of the element opened by `open`, tracking nesting
/// depth of same-named tags. Self-closing and void tags span only
/// themselves. Returns `None` for an open tag with no matching close.
#[must_use]
pub fn element_span(html: &str, open: &Tag) -> Option<ElementSpan> {
    if open.kind == TagKind::SelfClosing {
        return Some(ElementSpan {
            open_start: open.start,
            content_start: open.end,
            content_end: open.end,
            end: open.end,
        });
    }
    if open.kind == TagKind::Close {
        return None;
    }

    let mut depth = 1u32;
    for tag in tags(&html[open.end..]) {
        if tag.name != open.name {
            continue;
        }
        match tag.kind {
            TagKind::Open => depth += 1,
            TagKind::Close => {
                depth -= 1;
                if depth == 0 {
                    return Some(ElementSpan {
                        open_start: open.start,
                        content_start: open.end,
                        content_end: open.end + tag.start,
                        end: open.end + tag.end,
                    });
                }
            }
            TagKind::SelfClosing => {}
        }
    }
    None
}

/// Replace every tag with a single space and decode common entity
/// references. Word boundaries at tag edges survive (`"a</p><p>b"` stays two
/// words); callers normalize whitespace as needed.
#[must_use]
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut cursor = 0;
    for tag in tags(html) {
        if tag.start > cursor {
            out.push_str(&html[cursor..tag.start]);
        }
        out.push(' ');
        cursor = tag.end;
    }
    if cursor < html.len() {
        out.push_str(&html[cursor..]);
    }
    decode_entities(&out)
}

/// Stripped text with runs of whitespace collapsed to single spaces and the
/// ends trimmed. This is the form used for title matching.
#[must_use]
pub fn text_content(html: &str) -> String {
    strip_tags(html)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Count whitespace-separated tokens in the stripped text.
#[must_use]
pub fn word_count(html: &str) -> usize {
    strip_tags(html).split_whitespace().count()
}

/// Decode the entity references that show up in generated copy: the named
/// set (`&amp;` `&lt;` `&gt;` `&quot;` `&apos;` `&nbsp;` `&#39;`) plus
/// decimal numeric references. Unknown references pass through untouched.
#[must_use]
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let Some(semi) = tail[..tail.len().min(12)].find(';') else {
            out.push('&');
            rest = &tail[1..];
            continue;
        };
        let entity = &tail[1..semi];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some(' '),
            _ => entity
                .strip_prefix('#')
                .and_then(|digits| digits.parse::<u32>().ok())
                .and_then(char::from_u32),
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
