//! Error types for model management operations.

use thiserror::Error;

/// Errors raised while managing projects, configs and config sets.
///
/// Reading and validating configs never fails with this type: document
/// problems become diagnostics on the config instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// The model registry has been closed.
    #[error("Model is closed")]
    Closed,

    /// No project with this name is registered.
    #[error("Unknown project: {0}")]
    UnknownProject(String),

    /// An element with this name already exists in its owner.
    #[error("Duplicate {kind}: {name}")]
    Duplicate { kind: &'static str, name: String },

    /// An external `/<project>/<path>` name that no project can resolve.
    #[error("Unresolvable external config name: {0}")]
    UnresolvedExternalName(String),

    /// A locator failed to scan its source.
    #[error("Config locator '{locator}' failed: {message}")]
    Locator { locator: String, message: String },
}

impl ModelError {
    pub fn duplicate_project(name: impl Into<String>) -> Self {
        Self::Duplicate {
            kind: "project",
            name: name.into(),
        }
    }

    pub fn duplicate_config(name: impl Into<String>) -> Self {
        Self::Duplicate {
            kind: "config",
            name: name.into(),
        }
    }

    pub fn duplicate_config_set(name: impl Into<String>) -> Self {
        Self::Duplicate {
            kind: "config set",
            name: name.into(),
        }
    }

    pub fn locator(locator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Locator {
            locator: locator.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(ModelError::duplicate_config("a.xml").to_string(), "Duplicate config: a.xml");
        assert_eq!(
            ModelError::UnknownProject("p".into()).to_string(),
            "Unknown project: p"
        );
    }
}
