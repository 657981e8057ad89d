//! Diagnostics: problems found while reading or validating a config.
//!
//! Parse problems and validation results share one type so a host can
//! clear and republish them wholesale per resource.

use std::fmt;
use std::sync::Arc;

use super::location::{ResourceName, SourceLocation};

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A diagnostic message attached to a resource line.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    /// The resource containing this diagnostic.
    pub resource: ResourceName,
    /// Line (1-indexed, `0` when unknown).
    pub line: u32,
    /// Severity level.
    pub severity: Severity,
    /// Machine readable code, see [`codes`].
    pub code: Option<Arc<str>>,
    /// The diagnostic message.
    pub message: Arc<str>,
    /// Name of the bean the diagnostic is about.
    pub bean_id: Option<Arc<str>>,
    /// Extra key/value data for tooling (quick fixes etc.).
    pub data: Vec<(Arc<str>, Arc<str>)>,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        resource: impl Into<ResourceName>,
        line: u32,
        message: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            resource: resource.into(),
            line,
            severity,
            code: None,
            message: message.into(),
            bean_id: None,
            data: Vec::new(),
        }
    }

    /// Create a new error diagnostic.
    pub fn error(resource: impl Into<ResourceName>, line: u32, message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Error, resource, line, message)
    }

    /// Create a new warning diagnostic.
    pub fn warning(
        resource: impl Into<ResourceName>,
        line: u32,
        message: impl Into<Arc<str>>,
    ) -> Self {
        Self::new(Severity::Warning, resource, line, message)
    }

    /// Create a diagnostic positioned at a source location.
    pub fn at(severity: Severity, location: &SourceLocation, message: impl Into<Arc<str>>) -> Self {
        Self::new(
            severity,
            location.resource.clone(),
            location.start_line,
            message,
        )
    }

    /// Set the error code.
    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Set the bean the diagnostic is about.
    pub fn with_bean(mut self, bean_id: impl Into<Arc<str>>) -> Self {
        self.bean_id = Some(bean_id.into());
        self
    }

    /// Attach tooling data.
    pub fn with_data(mut self, key: impl Into<Arc<str>>, value: impl Into<Arc<str>>) -> Self {
        self.data.push((key.into(), value.into()));
        self
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.resource, self.line, self.severity)?;
        if let Some(code) = &self.code {
            write!(f, " [{code}]")?;
        }
        write!(f, ": {}", self.message)
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Machine readable codes attached to diagnostics.
pub mod codes {
    // ========================================================================
    // READER
    // ========================================================================

    /// Problem reported while reading the document.
    pub const PARSING_FAILED: &str = "PARSING_FAILED";

    // ========================================================================
    // REGISTRATION
    // ========================================================================

    /// Bean overrides another bean (same file or config set).
    pub const BEAN_OVERRIDE: &str = "BEAN_OVERRIDE";
    /// Duplicate or overriding alias.
    pub const INVALID_BEAN_ALIAS: &str = "INVALID_BEAN_ALIAS";
    /// Alias points to a missing bean.
    pub const UNDEFINED_ALIAS_TARGET: &str = "UNDEFINED_ALIAS_TARGET";
    /// Structural self-validation of a definition failed.
    pub const INVALID_BEAN_DEFINITION: &str = "INVALID_BEAN_DEFINITION";

    // ========================================================================
    // TYPE SYSTEM
    // ========================================================================

    pub const CLASS_NOT_FOUND: &str = "CLASS_NOT_FOUND";
    pub const NO_CONSTRUCTOR: &str = "NO_CONSTRUCTOR";
    pub const UNDEFINED_INIT_METHOD: &str = "UNDEFINED_INIT_METHOD";
    pub const UNDEFINED_DESTROY_METHOD: &str = "UNDEFINED_DESTROY_METHOD";
    pub const NO_SETTER: &str = "NO_SETTER";
    pub const NO_GETTER: &str = "NO_GETTER";

    // ========================================================================
    // REFERENCES
    // ========================================================================

    pub const UNDEFINED_PARENT_BEAN: &str = "UNDEFINED_PARENT_BEAN";
    pub const UNDEFINED_REFERENCED_BEAN: &str = "UNDEFINED_REFERENCED_BEAN";
    pub const INVALID_REFERENCED_BEAN: &str = "INVALID_REFERENCED_BEAN";
    pub const UNDEFINED_FACTORY_BEAN: &str = "UNDEFINED_FACTORY_BEAN";
    pub const INVALID_FACTORY_BEAN: &str = "INVALID_FACTORY_BEAN";
    pub const UNDEFINED_FACTORY_BEAN_METHOD: &str = "UNDEFINED_FACTORY_BEAN_METHOD";
    pub const UNDEFINED_DEPENDS_ON_BEAN: &str = "UNDEFINED_DEPENDS_ON_BEAN";
    pub const INVALID_DEPENDS_ON_BEAN: &str = "INVALID_DEPENDS_ON_BEAN";
}
