//! Parse events: the stream a document reader hands to the model.

use smol_str::SmolStr;

use super::definition::BeanDefinitionHolder;
use crate::base::constants::{
    DEFAULT_AUTOWIRE, DEFAULT_DEPENDENCY_CHECK, DEFAULT_LAZY_INIT, DEFAULT_MERGE,
};
use crate::base::{Severity, SourceLocation};

/// Defaults declared on the document root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentDefaults {
    pub lazy_init: SmolStr,
    pub autowire: SmolStr,
    pub dependency_check: SmolStr,
    pub init_method: Option<SmolStr>,
    pub destroy_method: Option<SmolStr>,
    pub merge: SmolStr,
}

impl Default for DocumentDefaults {
    fn default() -> Self {
        Self {
            lazy_init: SmolStr::new_static(DEFAULT_LAZY_INIT),
            autowire: SmolStr::new_static(DEFAULT_AUTOWIRE),
            dependency_check: SmolStr::new_static(DEFAULT_DEPENDENCY_CHECK),
            init_method: None,
            destroy_method: None,
            merge: SmolStr::new_static(DEFAULT_MERGE),
        }
    }
}

impl DocumentDefaults {
    pub fn is_lazy_init(&self) -> bool {
        self.lazy_init == "true"
    }

    pub fn is_merge(&self) -> bool {
        self.merge == "true"
    }
}

/// A namespace-specific structural element and the beans it declares.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentDefinition {
    pub name: SmolStr,
    pub namespace_uri: SmolStr,
    /// Attributes of the element, for namespace interpreters.
    pub attributes: Vec<(SmolStr, SmolStr)>,
    pub beans: Vec<BeanDefinitionHolder>,
    pub nested: Vec<ComponentDefinition>,
    pub location: SourceLocation,
}

impl ComponentDefinition {
    pub fn new(
        name: impl Into<SmolStr>,
        namespace_uri: impl Into<SmolStr>,
        location: SourceLocation,
    ) -> Self {
        Self {
            name: name.into(),
            namespace_uri: namespace_uri.into(),
            attributes: Vec::new(),
            beans: Vec::new(),
            nested: Vec::new(),
            location,
        }
    }

    pub fn with_attribute(mut self, key: impl Into<SmolStr>, value: impl Into<SmolStr>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn with_bean(mut self, bean: BeanDefinitionHolder) -> Self {
        self.beans.push(bean);
        self
    }

    pub fn with_nested(mut self, component: ComponentDefinition) -> Self {
        self.nested.push(component);
        self
    }
}

/// Problem reported by the reader.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Problem {
    pub severity: Severity,
    pub message: SmolStr,
    pub location: SourceLocation,
}

impl Problem {
    pub fn error(message: impl Into<SmolStr>, location: SourceLocation) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            location,
        }
    }

    pub fn warning(message: impl Into<SmolStr>, location: SourceLocation) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            location,
        }
    }
}

/// One event of the parse stream, in document order.
#[derive(Clone, Debug, PartialEq)]
pub enum DocumentEvent {
    DefaultsRegistered(DocumentDefaults),
    BeanRegistered(BeanDefinitionHolder),
    AliasRegistered {
        bean_name: SmolStr,
        alias: SmolStr,
        location: SourceLocation,
    },
    ComponentRegistered(ComponentDefinition),
    ImportProcessed {
        resource: SmolStr,
        location: SourceLocation,
    },
    /// Non-fatal problem; processing continues.
    Problem(Problem),
    /// Terminal failure; no further events follow for this document.
    Fatal(Problem),
}
