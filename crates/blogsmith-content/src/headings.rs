//! Heading hierarchy analysis for generated article bodies.
//!
//! Extracts `h1`-`h6` elements in document order and runs a fixed set of
//! structural rules, producing a 0-100 score. Pure over the input string;
//! the [`crate::validator`] folds the findings into its overall verdict.

use serde::Serialize;

use crate::scan::{element_span, tags, text_content, TagKind};

/// One extracted heading, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    /// 1 for `h1` through 6 for `h6`.
    pub level: u8,
    /// Inner text with markup stripped and whitespace collapsed.
    pub text: String,
    /// The `id` attribute, when present.
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingReport {
    pub score: i32,
    pub h1_count: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub headings: Vec<Heading>,
}

/// Extract headings and evaluate the hierarchy rules.
#[must_use]
pub fn analyze(html: &str) -> HeadingReport {
    let headings = extract_headings(html);
    let h1_count = headings.iter().filter(|h| h.level == 1).count();
    let h2_count = headings.iter().filter(|h| h.level == 2).count();

    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    check_title_heading(h1_count, &mut errors);
    check_level_skips(&headings, &mut errors);
    check_orphan_deep_headings(&headings, &mut errors);
    check_section_headings(&headings, h2_count, &mut warnings);

    let h2_with_id = headings
        .iter()
        .filter(|h| h.level == 2 && h.id.is_some())
        .count();

    let mut score = 100i32;
    score -= 15 * i32::try_from(errors.len()).unwrap_or(i32::MAX / 15);
    score -= 5 * i32::try_from(warnings.len()).unwrap_or(i32::MAX / 5);
    if h1_count == 1 {
        score += 10;
    }
    if (4..=7).contains(&h2_count) {
        score += 10;
    }
    // >= 80% of section headings carry an anchor id.
    if h2_count > 0 && h2_with_id * 5 >= h2_count * 4 {
        score += 5;
    }

    HeadingReport {
        score: score.clamp(0, 100),
        h1_count,
        errors,
        warnings,
        headings,
    }
}

/// Scan `h1`-`h6` open tags and resolve each to its inner text. Headings
/// whose close tag never appears are dropped.
fn extract_headings(html: &str) -> Vec<Heading> {
    let mut headings = Vec::new();
    for tag in tags(html) {
        if tag.kind != TagKind::Open {
            continue;
        }
        let Some(level) = heading_level(&tag.name) else {
            continue;
        };
        let Some(span) = element_span(html, &tag) else {
            continue;
        };
        headings.push(Heading {
            level,
            text: text_content(&html[span.content_start..span.content_end]),
            id: tag.attr("id").map(str::to_string),
        });
    }
    headings
}

fn heading_level(name: &str) -> Option<u8> {
    match name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// Exactly one `h1` is required.
fn check_title_heading(h1_count: usize, errors: &mut Vec<String>) {
    if h1_count == 0 {
        errors.push("missing title heading: no h1 found".to_string());
    } else if h1_count > 1 {
        errors.push(format!(
            "duplicate title heading: {h1_count} h1 elements found"
        ));
    }
}

/// A heading may go at most one level deeper than its immediate predecessor.
/// Jumping shallower by any amount is fine.
fn check_level_skips(headings: &[Heading], errors: &mut Vec<String>) {
    for pair in headings.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        if cur.level > prev.level + 1 {
            errors.push(format!(
                "heading level skip: h{} \"{}\" directly follows h{}",
                cur.level, cur.text, prev.level
            ));
        }
    }
}

/// A heading at level 4 or deeper needs a parent exactly one level up,
/// found by scanning backward. Hitting a heading two or more levels up
/// first, or the start of the document, means the heading is orphaned.
fn check_orphan_deep_headings(headings: &[Heading], errors: &mut Vec<String>) {
    for (i, heading) in headings.iter().enumerate() {
        if heading.level < 4 {
            continue;
        }
        let parent_level = heading.level - 1;
        let mut found = false;
        for earlier in headings[..i].iter().rev() {
            if earlier.level == parent_level {
                found = true;
                break;
            }
            if earlier.level <= heading.level - 2 {
                break;
            }
        }
        if !found {
            errors.push(format!(
                "orphan deep heading: h{} \"{}\" has no h{} ancestor",
                heading.level, heading.text, parent_level
            ));
        }
    }
}

/// Section-count expectations. Both halves are advisory only.
fn check_section_headings(headings: &[Heading], h2_count: usize, warnings: &mut Vec<String>) {
    if headings.len() > 1 && h2_count == 0 {
        warnings.push("no section headings: expected at least one h2".to_string());
    }
    if headings.len() > 4 && h2_count < 3 {
        warnings.push(format!(
            "few section headings: {} h2 for {} headings",
            h2_count,
            headings.len()
        ));
    }
}

#[cfg(test)]
#[path = "headings_test.rs"]
mod tests;
