//! Offline article checker: runs the generation validator and heading
//! analyzer against a local HTML file and prints the combined report.

use std::fmt::Write as _;
use std::path::Path;

use blogsmith_content::{analyze, validate, HeadingReport, ValidationReport};

/// Check a local HTML file against the word-count window `min..=max`.
///
/// # Errors
///
/// Returns an error only when the file cannot be read; a failing article
/// still prints its report and exits successfully.
pub(crate) fn run_check(file: &Path, min: i32, max: i32) -> anyhow::Result<()> {
    let html = std::fs::read_to_string(file)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", file.display()))?;

    let validation = validate(&html, min, max);
    let headings = analyze(&html);
    print!("{}", render_report(file, min, max, &validation, &headings));

    Ok(())
}

fn render_report(
    file: &Path,
    min: i32,
    max: i32,
    validation: &ValidationReport,
    headings: &HeadingReport,
) -> String {
    let mut out = String::new();
    let verdict = if validation.passed { "passed" } else { "failed" };

    let _ = writeln!(
        out,
        "{}: {verdict} (score {})",
        file.display(),
        validation.score
    );
    let _ = writeln!(
        out,
        "  words: {} (target {min}-{max})",
        validation.word_count
    );
    if validation.issues.is_empty() {
        let _ = writeln!(out, "  issues: none");
    } else {
        let _ = writeln!(out, "  issues:");
        for issue in &validation.issues {
            let _ = writeln!(out, "    - {issue}");
        }
    }

    let _ = writeln!(
        out,
        "  headings: {} (h1 x{}), structure score {}",
        headings.headings.len(),
        headings.h1_count,
        headings.score
    );
    for heading in &headings.headings {
        let _ = writeln!(out, "    h{} {}", heading.level, heading.text);
    }
    for error in &headings.errors {
        let _ = writeln!(out, "    error: {error}");
    }
    for warning in &headings.warnings {
        let _ = writeln!(out, "    warning: {warning}");
    }

    out
}
