//! Diagnostic assertion helpers for validation tests.

use beanscope::{Diagnostic, Severity};

/// Codes of all diagnostics, in order.
pub fn codes_of(diagnostics: &[Diagnostic]) -> Vec<&str> {
    diagnostics.iter().filter_map(Diagnostic::code).collect()
}

/// Get only error-level diagnostics.
pub fn errors(diagnostics: &[Diagnostic]) -> Vec<&Diagnostic> {
    diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .collect()
}

/// Assert there are no diagnostics at all.
pub fn assert_clean(diagnostics: &[Diagnostic]) {
    assert!(
        diagnostics.is_empty(),
        "Expected no diagnostics, got {}:\n{}",
        diagnostics.len(),
        diagnostics
            .iter()
            .map(|d| format!("  {d}"))
            .collect::<Vec<_>>()
            .join("\n")
    );
}
