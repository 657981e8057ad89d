//! Diagnostic collection for validation runs.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::base::{Diagnostic, ResourceName, Severity};
use crate::model::Bean;

/// Key of the auxiliary datum naming what a diagnostic is about.
pub const SUBJECT_KEY: &str = "subject";

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Collects diagnostics during validation.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    /// Report a problem with `bean`, attached to `line` of its resource.
    pub fn bean_problem(
        &mut self,
        severity: Severity,
        bean: &Bean,
        line: u32,
        code: &'static str,
        message: impl Into<Arc<str>>,
        subject: Option<&str>,
    ) {
        let mut diagnostic = Diagnostic::new(severity, bean.resource().clone(), line, message)
            .with_code(code)
            .with_bean(bean.name());
        if let Some(subject) = subject {
            diagnostic = diagnostic.with_data(SUBJECT_KEY, subject);
        }
        self.add(diagnostic);
    }

    /// Report an error at the bean's own start line.
    pub fn bean_error(&mut self, bean: &Bean, code: &'static str, message: impl Into<Arc<str>>, subject: Option<&str>) {
        self.bean_problem(Severity::Error, bean, bean.start_line(), code, message, subject);
    }

    /// Report a warning at the bean's own start line.
    pub fn bean_warning(&mut self, bean: &Bean, code: &'static str, message: impl Into<Arc<str>>, subject: Option<&str>) {
        self.bean_problem(Severity::Warning, bean, bean.start_line(), code, message, subject);
    }

    /// Get all diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Get diagnostics for a specific resource.
    pub fn diagnostics_for_resource(&self, resource: &ResourceName) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| &d.resource == resource)
            .collect()
    }

    /// Get the number of errors.
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    /// Get the number of warnings.
    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_warning()).count()
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Take all diagnostics, leaving the collector empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Clear all diagnostics.
    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }

    /// Get the collected diagnostics, deduplicated.
    ///
    /// A config validated in several sets reports the same set-independent
    /// problem once per set.
    pub fn finish(self) -> Vec<Diagnostic> {
        let mut seen = FxHashSet::default();
        self.diagnostics
            .into_iter()
            .filter(|d| seen.insert(d.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::base::{SourceLocation, codes};
    use crate::syntax::{BeanDefinition, BeanDefinitionHolder};

    fn bean() -> Bean {
        let holder = BeanDefinitionHolder::new(
            "a",
            BeanDefinition::with_class("Foo", SourceLocation::at_line("beans.xml", 7)),
        );
        Bean::new("beans.xml", holder)
    }

    #[test]
    fn test_counts() {
        let bean = bean();
        let mut collector = DiagnosticCollector::new();
        collector.bean_error(&bean, codes::CLASS_NOT_FOUND, "Class 'Foo' not found", Some("Foo"));
        collector.bean_warning(&bean, codes::UNDEFINED_REFERENCED_BEAN, "Referenced bean 'b' not found", None);

        assert_eq!(collector.error_count(), 1);
        assert_eq!(collector.warning_count(), 1);
        assert!(collector.has_errors());

        let first = &collector.diagnostics()[0];
        assert_eq!(first.line, 7);
        assert_eq!(first.bean_id.as_deref(), Some("a"));
        assert_eq!(first.data[0].1.as_ref(), "Foo");
        assert_eq!(collector.diagnostics_for_resource(&"beans.xml".into()).len(), 2);
    }

    #[test]
    fn test_finish_deduplicates() {
        let bean = bean();
        let mut collector = DiagnosticCollector::new();
        for _ in 0..3 {
            collector.bean_error(&bean, codes::CLASS_NOT_FOUND, "Class 'Foo' not found", Some("Foo"));
        }
        assert_eq!(collector.finish().len(), 1);
    }

    #[test]
    fn test_take_empties() {
        let bean = bean();
        let mut collector = DiagnosticCollector::new();
        collector.bean_error(&bean, codes::CLASS_NOT_FOUND, "Class 'Foo' not found", None);
        assert_eq!(collector.take().len(), 1);
        assert!(collector.diagnostics().is_empty());
        collector.bean_error(&bean, codes::CLASS_NOT_FOUND, "Class 'Foo' not found", None);
        collector.clear();
        assert!(!collector.has_errors());
    }
}
