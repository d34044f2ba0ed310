use crate::types::QueryResponse;
use std::fmt::Write;

/// Plain-text rendering of a response for terminal display.
pub fn render_response(response: &QueryResponse) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Summary ===");
    let _ = writeln!(out, "{}", response.summary);

    if !response.clarification_question.is_empty() {
        let _ = writeln!(out, "\n=== Clarification Needed ===");
        let _ = writeln!(out, "{}", response.clarification_question);
    }

    let _ = writeln!(out, "\n=== Generated SQL ({}) ===", response.dialect.label());
    let _ = writeln!(out, "{}", response.sql);

    if !response.assumptions.is_empty() {
        let _ = writeln!(out, "\n=== Assumptions ===");
        for assumption in &response.assumptions {
            let _ = writeln!(out, "- {}", assumption);
        }
    }

    let _ = writeln!(out, "\n=== Quality Checks ===");
    for (key, passed) in response.quality_checks.entries() {
        let mark = if passed { "x" } else { " " };
        let _ = writeln!(out, "[{}] {}", mark, key.replace('_', " "));
    }

    if !response.parameters.is_empty() {
        let _ = writeln!(out, "\n=== Query Parameters ===");
        for (key, value) in &response.parameters {
            let _ = writeln!(out, "{}: {}", key, value);
        }
    }

    out
}
