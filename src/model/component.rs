//! Structural components and pluggable namespace interpretation.
//!
//! Elements of foreign namespaces arrive as [`ComponentDefinition`]s. An
//! [`ElementInterpreter`] chosen by namespace URI decides whether one becomes
//! a plain bean, a [`Component`], or nothing at all. Registration is explicit:
//! hosts build a [`NamespaceRegistry`] and hand it to the project.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::bean::Bean;
use crate::base::{ResourceName, SourceLocation};
use crate::syntax::{BeanDefinitionHolder, ComponentDefinition};

/// A namespace element grouping the beans it declares.
#[derive(Debug)]
pub struct Component {
    pub name: SmolStr,
    pub namespace_uri: SmolStr,
    pub location: SourceLocation,
    beans: Vec<Arc<Bean>>,
    components: Vec<Arc<Component>>,
}

impl Component {
    /// Build the model element for a definition declared in `resource`.
    pub fn from_definition(resource: &ResourceName, definition: &ComponentDefinition) -> Self {
        Self {
            name: definition.name.clone(),
            namespace_uri: definition.namespace_uri.clone(),
            location: definition.location.clone(),
            beans: definition
                .beans
                .iter()
                .map(|holder| Arc::new(Bean::new(resource.clone(), holder.clone())))
                .collect(),
            components: definition
                .nested
                .iter()
                .map(|nested| Arc::new(Component::from_definition(resource, nested)))
                .collect(),
        }
    }

    pub fn beans(&self) -> &[Arc<Bean>] {
        &self.beans
    }

    pub fn components(&self) -> &[Arc<Component>] {
        &self.components
    }

    /// Find a bean by name in this component or any nested one.
    pub fn find_bean(&self, name: &str) -> Option<Arc<Bean>> {
        self.beans
            .iter()
            .find(|b| b.name() == name)
            .cloned()
            .or_else(|| self.components.iter().find_map(|c| c.find_bean(name)))
    }

    /// All beans of this component and nested components, depth first.
    pub fn all_beans(&self) -> Vec<Arc<Bean>> {
        let mut out = self.beans.clone();
        for nested in &self.components {
            out.extend(nested.all_beans());
        }
        out
    }
}

/// What a namespace element turns into.
#[derive(Clone, Debug)]
pub enum Interpreted {
    Bean(BeanDefinitionHolder),
    Component(ComponentDefinition),
    Ignore,
}

/// Strategy deciding how a namespace element enters the model.
pub trait ElementInterpreter: Send + Sync {
    fn interpret(&self, definition: &ComponentDefinition) -> Interpreted;
}

/// A single bean with no nested parts is promoted to a top-level bean;
/// anything else stays a component.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultInterpreter;

impl ElementInterpreter for DefaultInterpreter {
    fn interpret(&self, definition: &ComponentDefinition) -> Interpreted {
        match definition.beans.as_slice() {
            [single] if definition.nested.is_empty() => Interpreted::Bean(single.clone()),
            _ => Interpreted::Component(definition.clone()),
        }
    }
}

/// Interpreters keyed by namespace URI, with a fallback.
#[derive(Clone)]
pub struct NamespaceRegistry {
    interpreters: FxHashMap<SmolStr, Arc<dyn ElementInterpreter>>,
    default: Arc<dyn ElementInterpreter>,
}

impl Default for NamespaceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NamespaceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut uris: Vec<_> = self.interpreters.keys().collect();
        uris.sort();
        f.debug_struct("NamespaceRegistry")
            .field("namespaces", &uris)
            .finish_non_exhaustive()
    }
}

impl NamespaceRegistry {
    pub fn new() -> Self {
        Self {
            interpreters: FxHashMap::default(),
            default: Arc::new(DefaultInterpreter),
        }
    }

    /// Builder-style registration.
    pub fn with(
        mut self,
        namespace_uri: impl Into<SmolStr>,
        interpreter: impl ElementInterpreter + 'static,
    ) -> Self {
        self.register(namespace_uri, Arc::new(interpreter));
        self
    }

    pub fn register(
        &mut self,
        namespace_uri: impl Into<SmolStr>,
        interpreter: Arc<dyn ElementInterpreter>,
    ) {
        self.interpreters.insert(namespace_uri.into(), interpreter);
    }

    /// Replace the fallback interpreter.
    pub fn set_default(&mut self, interpreter: Arc<dyn ElementInterpreter>) {
        self.default = interpreter;
    }

    pub fn interpreter_for(&self, namespace_uri: &str) -> &dyn ElementInterpreter {
        self.interpreters
            .get(namespace_uri)
            .map(|i| i.as_ref())
            .unwrap_or(self.default.as_ref())
    }

    pub fn interpret(&self, definition: &ComponentDefinition) -> Interpreted {
        self.interpreter_for(&definition.namespace_uri)
            .interpret(definition)
    }
}
