//! Structural validation of generated article bodies.
//!
//! The validator decides whether an article is publishable as-is or needs
//! review: placeholder tokens and a broken title heading are hard failures,
//! hierarchy problems and thin sectioning only cost score. Natural-language
//! quality is out of scope.

use regex::Regex;
use serde::Serialize;

use crate::headings;
use crate::scan::word_count;

/// Articles scoring below this, or carrying any hard issue, are not
/// publishable.
pub const PASS_THRESHOLD: i32 = 70;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub passed: bool,
    pub score: i32,
    pub issues: Vec<String>,
    pub word_count: usize,
    /// Set when a placeholder token or a missing/duplicate title heading was
    /// found. Forces `passed = false` regardless of score.
    pub hard_issue: bool,
}

/// Validate an article body against its word-count window.
#[must_use]
pub fn validate(html: &str, target_min: i32, target_max: i32) -> ValidationReport {
    validate_generated(html, target_min, target_max, false)
}

/// Full validation entry point for the generation pipeline.
/// `selection_fallback` marks articles whose product selection fell back to
/// unscored catalog order; the fallback costs score so it stays visible.
#[must_use]
pub fn validate_generated(
    html: &str,
    target_min: i32,
    target_max: i32,
    selection_fallback: bool,
) -> ValidationReport {
    let mut issues = Vec::new();
    let mut hard_issue = false;
    let mut soft_issues = 0i32;

    // Placeholders anywhere in the raw body are leftovers from an
    // incomplete generation and make the article unpublishable.
    for (label, pattern) in placeholder_patterns() {
        if let Some(found) = pattern.find(html) {
            issues.push(format!("{label}: \"{}\"", found.as_str()));
            hard_issue = true;
        }
    }

    let word_count = word_count(html);
    let below_target = (word_count as i64) * 10 < i64::from(target_min) * 8;
    if below_target {
        issues.push(format!(
            "word count {word_count} is below 80% of the {target_min}-{target_max} word target"
        ));
    }

    let heading_report = headings::analyze(html);
    let title_broken = heading_report.h1_count != 1;
    if title_broken {
        hard_issue = true;
    }
    for error in &heading_report.errors {
        // Title errors ride the hard flag; skip and orphan findings only
        // cost score.
        if !error.contains("title heading") {
            soft_issues += 1;
        }
        issues.push(format!("heading: {error}"));
    }

    let min_sections = min_section_count(target_min);
    let h2_count = heading_report
        .headings
        .iter()
        .filter(|h| h.level == 2)
        .count();
    if h2_count < min_sections {
        issues.push(format!(
            "section density: {h2_count} h2 headings for a {target_min}-word target; expected at least {min_sections}"
        ));
        soft_issues += 1;
    }

    if selection_fallback {
        issues.push("product selection fell back to catalog order".to_string());
        soft_issues += 1;
    }

    let mut score = 100i32;
    if hard_issue {
        score -= 30;
    }
    score -= 5 * soft_issues;
    if below_target {
        score -= 10;
    }
    let score = score.clamp(0, 100);

    ValidationReport {
        passed: score >= PASS_THRESHOLD && !hard_issue,
        score,
        issues,
        word_count,
        hard_issue,
    }
}

/// How many section headings a body of the target length should carry.
fn min_section_count(target_min: i32) -> usize {
    usize::try_from(target_min / 300).unwrap_or(0).max(3)
}

/// The fixed placeholder pattern set. Uppercase bracket tokens catch
/// unresolved template fields; the instruction set catches bracketed notes
/// the model left for itself; the literal markers catch filler text.
fn placeholder_patterns() -> Vec<(&'static str, Regex)> {
    vec![
        (
            "unresolved template token",
            Regex::new(r"\[[A-Z][A-Z0-9_]{2,}\]").expect("valid template token regex"),
        ),
        (
            "leftover instruction marker",
            Regex::new(r"(?i)\[(?:insert|add|include|your|placeholder|todo|to complete)[^\]]*\]")
                .expect("valid instruction marker regex"),
        ),
        (
            "filler text",
            Regex::new(r"(?i)lorem ipsum").expect("valid filler text regex"),
        ),
        (
            "unfinished note",
            Regex::new(r"TODO:").expect("valid unfinished note regex"),
        ),
    ]
}

#[cfg(test)]
#[path = "validator_test.rs"]
mod tests;
