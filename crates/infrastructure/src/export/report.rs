//! Text and JSON renderings of a [`SuiteReport`].

use std::fmt::Write;

use bookcheck_application::suite::{ScenarioOutcome, SuiteReport};

use crate::serialization::{SerializationError, to_json_stable};

/// Renders the report as a human-readable summary, one line per scenario
/// followed by indented field mismatches.
#[must_use]
pub fn render_text(report: &SuiteReport) -> String {
    let mut out = String::new();
    for outcome in &report.outcomes {
        render_outcome(&mut out, outcome);
    }
    let _ = writeln!(
        out,
        "{} scenario(s): {} passed, {} failed ({:.1}%) in {} ms",
        report.total,
        report.passed,
        report.failed,
        report.pass_rate(),
        report.duration_ms
    );
    out
}

fn render_outcome(out: &mut String, outcome: &ScenarioOutcome) {
    let verdict = if outcome.passed { "PASS" } else { "FAIL" };
    let booking = outcome
        .booking_id
        .map(|id| format!("booking {id}, "))
        .unwrap_or_default();
    let _ = write!(
        out,
        "{verdict} {} ({booking}{} ms)",
        outcome.scenario, outcome.duration_ms
    );
    match &outcome.error {
        // Mismatches get their own lines below.
        Some(_) if !outcome.mismatches.is_empty() => {
            let _ = writeln!(out, ": {} field(s) drifted", outcome.mismatches.len());
        }
        Some(failure) => {
            let _ = writeln!(out, ": {}", failure.message);
        }
        None => out.push('\n'),
    }
    for mismatch in &outcome.mismatches {
        let _ = writeln!(out, "    {mismatch}");
    }
}

/// Renders the report as stable, pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if the report cannot be serialized.
pub fn render_json(report: &SuiteReport) -> Result<String, SerializationError> {
    to_json_stable(report)
}
