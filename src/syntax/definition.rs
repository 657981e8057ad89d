//! Raw bean definitions.
//!
//! A [`BeanDefinition`] is the flat record the reader produces for one
//! `<bean>` element. Scalar fields are `Option`s so that "not declared" can be
//! told apart from a declared value; that distinction drives the inheritance
//! merge in [`BeanDefinition::override_from`].

use std::collections::BTreeMap;

use indexmap::IndexMap;
use smol_str::SmolStr;
use thiserror::Error;

use super::value::RawValue;
use crate::base::SourceLocation;

// ============================================================================
// FLAGS
// ============================================================================

/// Autowire mode of a bean.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Autowire {
    No,
    ByName,
    ByType,
    Constructor,
    AutoDetect,
}

impl Autowire {
    /// Parse the markup form. `"default"` yields `None` (defer to document defaults).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "no" => Some(Autowire::No),
            "byName" => Some(Autowire::ByName),
            "byType" => Some(Autowire::ByType),
            "constructor" => Some(Autowire::Constructor),
            "autodetect" => Some(Autowire::AutoDetect),
            _ => None,
        }
    }

    pub fn is_enabled(self) -> bool {
        self != Autowire::No
    }
}

/// Role hint of a bean.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Role {
    #[default]
    Application,
    Support,
    /// Framework-internal bean, excluded from user facing checks.
    Infrastructure,
}

// ============================================================================
// CONSTRUCTOR ARGUMENTS
// ============================================================================

/// One `<constructor-arg>`.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstructorArgument {
    pub index: Option<usize>,
    pub type_name: Option<SmolStr>,
    pub name: Option<SmolStr>,
    pub value: RawValue,
    pub location: SourceLocation,
}

impl ConstructorArgument {
    pub fn new(value: RawValue, location: SourceLocation) -> Self {
        Self {
            index: None,
            type_name: None,
            name: None,
            value,
            location,
        }
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_type(mut self, type_name: impl Into<SmolStr>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    fn same_content(&self, other: &ConstructorArgument) -> bool {
        self.value == other.value && self.type_name == other.type_name && self.name == other.name
    }
}

/// Indexed and positional constructor arguments of one definition.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConstructorArgumentValues {
    indexed: BTreeMap<usize, ConstructorArgument>,
    generic: Vec<ConstructorArgument>,
}

impl ConstructorArgumentValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an argument, dispatching on whether it carries an index.
    pub fn add(&mut self, argument: ConstructorArgument) {
        match argument.index {
            Some(index) => {
                self.indexed.insert(index, argument);
            }
            None => self.generic.push(argument),
        }
    }

    pub fn indexed(&self) -> &BTreeMap<usize, ConstructorArgument> {
        &self.indexed
    }

    pub fn generic(&self) -> &[ConstructorArgument] {
        &self.generic
    }

    /// Total number of declared arguments.
    pub fn len(&self) -> usize {
        self.indexed.len() + self.generic.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexed.is_empty() && self.generic.is_empty()
    }

    /// All arguments, indexed first in index order, then positional ones.
    pub fn iter(&self) -> impl Iterator<Item = &ConstructorArgument> {
        self.indexed.values().chain(self.generic.iter())
    }

    /// Merge `other` on top: indexed entries replace, positional entries are
    /// appended unless an equal one is already present.
    pub fn merge_from(&mut self, other: &ConstructorArgumentValues) {
        for (index, argument) in &other.indexed {
            self.indexed.insert(*index, argument.clone());
        }
        for argument in &other.generic {
            if !self.generic.iter().any(|a| a.same_content(argument)) {
                self.generic.push(argument.clone());
            }
        }
    }
}

// ============================================================================
// PROPERTIES AND METHOD OVERRIDES
// ============================================================================

/// One `<property>`.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyValue {
    pub name: SmolStr,
    pub value: RawValue,
    pub location: SourceLocation,
}

impl PropertyValue {
    pub fn new(name: impl Into<SmolStr>, value: RawValue, location: SourceLocation) -> Self {
        Self {
            name: name.into(),
            value,
            location,
        }
    }
}

/// `<lookup-method>` or `<replaced-method>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MethodOverride {
    Lookup {
        method_name: SmolStr,
        bean_name: SmolStr,
        location: SourceLocation,
    },
    Replace {
        method_name: SmolStr,
        replacer_bean_name: SmolStr,
        location: SourceLocation,
    },
}

impl MethodOverride {
    pub fn method_name(&self) -> &str {
        match self {
            MethodOverride::Lookup { method_name, .. } | MethodOverride::Replace { method_name, .. } => {
                method_name
            }
        }
    }

    /// The bean supplying the override.
    pub fn bean_name(&self) -> &str {
        match self {
            MethodOverride::Lookup { bean_name, .. } => bean_name,
            MethodOverride::Replace {
                replacer_bean_name, ..
            } => replacer_bean_name,
        }
    }

    pub fn location(&self) -> &SourceLocation {
        match self {
            MethodOverride::Lookup { location, .. } | MethodOverride::Replace { location, .. } => {
                location
            }
        }
    }
}

// ============================================================================
// BEAN DEFINITION
// ============================================================================

/// Structural problems found by [`BeanDefinition::validate`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DefinitionError {
    #[error(
        "Cannot combine static factory method with method overrides: the static factory method must create the instance"
    )]
    FactoryMethodWithOverrides,
    #[error("Bean definition requires a class, a parent bean or a factory bean")]
    MissingClass,
    #[error("Factory method requires a class or a factory bean")]
    FactoryMethodWithoutTarget,
}

/// Flat declaration of one bean.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BeanDefinition {
    pub class_name: Option<SmolStr>,
    pub parent_name: Option<SmolStr>,
    pub scope: Option<SmolStr>,
    pub is_abstract: bool,
    pub lazy_init: Option<bool>,
    pub autowire: Option<Autowire>,
    pub dependency_check: Option<SmolStr>,
    pub role: Option<Role>,
    pub depends_on: Vec<SmolStr>,
    pub factory_bean_name: Option<SmolStr>,
    pub factory_method_name: Option<SmolStr>,
    pub init_method_name: Option<SmolStr>,
    pub destroy_method_name: Option<SmolStr>,
    pub constructor_arguments: ConstructorArgumentValues,
    pub properties: IndexMap<SmolStr, PropertyValue>,
    pub method_overrides: Vec<MethodOverride>,
    pub location: SourceLocation,
}

impl BeanDefinition {
    pub fn new(location: SourceLocation) -> Self {
        Self {
            location,
            ..Self::default()
        }
    }

    /// A definition declaring its class.
    pub fn with_class(class_name: impl Into<SmolStr>, location: SourceLocation) -> Self {
        Self {
            class_name: Some(class_name.into()),
            location,
            ..Self::default()
        }
    }

    /// A child definition inheriting from `parent_name`.
    pub fn with_parent(parent_name: impl Into<SmolStr>, location: SourceLocation) -> Self {
        Self {
            parent_name: Some(parent_name.into()),
            location,
            ..Self::default()
        }
    }

    pub fn is_child(&self) -> bool {
        self.parent_name.is_some()
    }

    pub fn role(&self) -> Role {
        self.role.unwrap_or_default()
    }

    pub fn is_infrastructure(&self) -> bool {
        self.role() == Role::Infrastructure
    }

    pub fn is_singleton(&self) -> bool {
        matches!(self.scope.as_deref(), None | Some("") | Some("singleton"))
    }

    /// Autowiring is off unless declared otherwise.
    pub fn autowire(&self) -> Autowire {
        self.autowire.unwrap_or(Autowire::No)
    }

    pub fn add_property(&mut self, property: PropertyValue) {
        self.properties.insert(property.name.clone(), property);
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// Apply the fields `other` declares on top of this definition.
    ///
    /// Used to flatten an inheritance chain: start from a copy of the root and
    /// call this for each descendant in root-to-child order. `abstract` is
    /// never inherited and the parent name is left alone; every other field
    /// only changes when `other` sets it.
    pub fn override_from(&mut self, other: &BeanDefinition) {
        if other.class_name.is_some() {
            self.class_name.clone_from(&other.class_name);
        }
        if other.scope.as_deref().is_some_and(|s| !s.is_empty()) {
            self.scope.clone_from(&other.scope);
        }
        self.is_abstract = other.is_abstract;
        if other.lazy_init.is_some() {
            self.lazy_init = other.lazy_init;
        }
        if other.autowire.is_some() {
            self.autowire = other.autowire;
        }
        if other.dependency_check.is_some() {
            self.dependency_check.clone_from(&other.dependency_check);
        }
        if other.role.is_some() {
            self.role = other.role;
        }
        if !other.depends_on.is_empty() {
            self.depends_on.clone_from(&other.depends_on);
        }
        if other.factory_bean_name.is_some() {
            self.factory_bean_name.clone_from(&other.factory_bean_name);
        }
        if other.factory_method_name.is_some() {
            self.factory_method_name.clone_from(&other.factory_method_name);
        }
        if other.init_method_name.as_deref().is_some_and(|m| !m.is_empty()) {
            self.init_method_name.clone_from(&other.init_method_name);
        }
        if other.destroy_method_name.as_deref().is_some_and(|m| !m.is_empty()) {
            self.destroy_method_name.clone_from(&other.destroy_method_name);
        }
        self.constructor_arguments
            .merge_from(&other.constructor_arguments);
        for property in other.properties.values() {
            self.add_property(property.clone());
        }
        for method_override in &other.method_overrides {
            if !self.method_overrides.contains(method_override) {
                self.method_overrides.push(method_override.clone());
            }
        }
        self.location = other.location.clone();
    }

    /// Structural self-check of a root (or already merged) definition.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if !self.method_overrides.is_empty() && self.factory_method_name.is_some() {
            return Err(DefinitionError::FactoryMethodWithOverrides);
        }
        if self.is_abstract {
            return Ok(());
        }
        if self.class_name.is_none()
            && self.parent_name.is_none()
            && self.factory_bean_name.is_none()
        {
            return Err(if self.factory_method_name.is_some() {
                DefinitionError::FactoryMethodWithoutTarget
            } else {
                DefinitionError::MissingClass
            });
        }
        Ok(())
    }
}

/// A definition together with the names it is registered under.
#[derive(Clone, Debug, PartialEq)]
pub struct BeanDefinitionHolder {
    pub name: SmolStr,
    pub aliases: Vec<SmolStr>,
    pub definition: BeanDefinition,
}

impl BeanDefinitionHolder {
    pub fn new(name: impl Into<SmolStr>, definition: BeanDefinition) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            definition,
        }
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }
}
