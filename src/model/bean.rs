//! Beans: model elements wrapping one raw definition.

use std::fmt;
use std::sync::{Arc, OnceLock};

use smol_str::SmolStr;

use super::value::{ValueNode, resolve_value};
use crate::base::{ResourceName, SourceLocation};
use crate::syntax::{BeanDefinition, BeanDefinitionHolder, MethodOverride};

/// Stable identity of a bean.
///
/// Top-level beans are identified by resource and name. Inner beans have no
/// reliable name, so they are identified structurally by owner and line.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BeanId {
    Named {
        resource: ResourceName,
        name: SmolStr,
    },
    Inner {
        owner: Arc<BeanId>,
        line: u32,
    },
}

impl BeanId {
    pub fn named(resource: impl Into<ResourceName>, name: impl Into<SmolStr>) -> Self {
        BeanId::Named {
            resource: resource.into(),
            name: name.into(),
        }
    }

    pub fn inner(owner: &BeanId, line: u32) -> Self {
        BeanId::Inner {
            owner: Arc::new(owner.clone()),
            line,
        }
    }

    /// Resource the bean is declared in.
    pub fn resource(&self) -> &ResourceName {
        match self {
            BeanId::Named { resource, .. } => resource,
            BeanId::Inner { owner, .. } => owner.resource(),
        }
    }

    /// The top-level bean this id belongs to.
    pub fn top_level(&self) -> &BeanId {
        match self {
            BeanId::Named { .. } => self,
            BeanId::Inner { owner, .. } => owner.top_level(),
        }
    }
}

impl fmt::Display for BeanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BeanId::Named { resource, name } => write!(f, "{resource}#{name}"),
            BeanId::Inner { owner, line } => write!(f, "{owner}/inner@{line}"),
        }
    }
}

/// A constructor argument with its resolved value.
#[derive(Clone, Debug)]
pub struct BeanConstructorArgument {
    pub index: Option<usize>,
    pub type_name: Option<SmolStr>,
    pub name: Option<SmolStr>,
    pub value: ValueNode,
    pub location: SourceLocation,
}

/// A property with its resolved value.
#[derive(Clone, Debug)]
pub struct BeanProperty {
    pub name: SmolStr,
    pub value: ValueNode,
    pub location: SourceLocation,
}

/// A declared bean.
///
/// Value fields never change after creation; constructor arguments,
/// properties and method overrides are resolved on first access and cached.
#[derive(Debug)]
pub struct Bean {
    id: BeanId,
    holder: BeanDefinitionHolder,
    inner: bool,
    constructor_arguments: OnceLock<Vec<BeanConstructorArgument>>,
    properties: OnceLock<Vec<BeanProperty>>,
    method_overrides: OnceLock<Vec<MethodOverride>>,
}

impl Bean {
    /// A top-level (or component) bean declared in `resource`.
    pub fn new(resource: impl Into<ResourceName>, holder: BeanDefinitionHolder) -> Self {
        let id = BeanId::named(resource, holder.name.clone());
        Self::with_id(id, holder, false)
    }

    /// An anonymous bean nested inside a value.
    pub fn inner(id: BeanId, holder: BeanDefinitionHolder) -> Self {
        Self::with_id(id, holder, true)
    }

    fn with_id(id: BeanId, holder: BeanDefinitionHolder, inner: bool) -> Self {
        Self {
            id,
            holder,
            inner,
            constructor_arguments: OnceLock::new(),
            properties: OnceLock::new(),
            method_overrides: OnceLock::new(),
        }
    }

    pub fn id(&self) -> &BeanId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.holder.name
    }

    pub fn aliases(&self) -> &[SmolStr] {
        &self.holder.aliases
    }

    /// The raw definition as declared.
    pub fn definition(&self) -> &BeanDefinition {
        &self.holder.definition
    }

    pub fn holder(&self) -> &BeanDefinitionHolder {
        &self.holder
    }

    pub fn class_name(&self) -> Option<&str> {
        self.definition().class_name.as_deref()
    }

    pub fn parent_name(&self) -> Option<&str> {
        self.definition().parent_name.as_deref()
    }

    pub fn is_child(&self) -> bool {
        self.definition().is_child()
    }

    pub fn is_abstract(&self) -> bool {
        self.definition().is_abstract
    }

    pub fn is_inner(&self) -> bool {
        self.inner
    }

    pub fn is_infrastructure(&self) -> bool {
        self.definition().is_infrastructure()
    }

    pub fn location(&self) -> &SourceLocation {
        &self.definition().location
    }

    pub fn resource(&self) -> &ResourceName {
        self.id.resource()
    }

    pub fn start_line(&self) -> u32 {
        self.location().start_line
    }

    pub fn constructor_arguments(&self) -> &[BeanConstructorArgument] {
        self.constructor_arguments.get_or_init(|| {
            self.definition()
                .constructor_arguments
                .iter()
                .map(|arg| BeanConstructorArgument {
                    index: arg.index,
                    type_name: arg.type_name.clone(),
                    name: arg.name.clone(),
                    value: resolve_value(&self.id, &arg.value),
                    location: arg.location.clone(),
                })
                .collect()
        })
    }

    pub fn properties(&self) -> &[BeanProperty] {
        self.properties.get_or_init(|| {
            self.definition()
                .properties
                .values()
                .map(|p| BeanProperty {
                    name: p.name.clone(),
                    value: resolve_value(&self.id, &p.value),
                    location: p.location.clone(),
                })
                .collect()
        })
    }

    pub fn property(&self, name: &str) -> Option<&BeanProperty> {
        self.properties().iter().find(|p| p.name == name)
    }

    /// Method overrides, duplicates removed.
    pub fn method_overrides(&self) -> &[MethodOverride] {
        self.method_overrides.get_or_init(|| {
            let mut overrides: Vec<MethodOverride> = Vec::new();
            for method_override in &self.definition().method_overrides {
                if !overrides.contains(method_override) {
                    overrides.push(method_override.clone());
                }
            }
            overrides
        })
    }

    /// Inner beans nested directly in this bean's arguments and properties.
    pub fn inner_beans(&self) -> Vec<Arc<Bean>> {
        self.constructor_arguments()
            .iter()
            .map(|a| &a.value)
            .chain(self.properties().iter().map(|p| &p.value))
            .flat_map(ValueNode::inner_beans)
            .collect()
    }

    /// Inner beans at any depth.
    pub fn inner_beans_recursive(&self) -> Vec<Arc<Bean>> {
        let mut out = Vec::new();
        for bean in self.inner_beans() {
            let nested = bean.inner_beans_recursive();
            out.push(bean);
            out.extend(nested);
        }
        out
    }

    /// Constructor argument declared first in the source.
    pub fn first_constructor_argument(&self) -> Option<&BeanConstructorArgument> {
        self.constructor_arguments()
            .iter()
            .min_by_key(|a| a.location.start_line)
    }
}

impl PartialEq for Bean {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Bean {}

impl std::hash::Hash for Bean {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
