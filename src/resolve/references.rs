//! Reference graph: which beans a bean, argument or property depends on.
//!
//! The walk is depth first. Every bean is marked visited before its own
//! references are collected, so cycles stop expanding instead of looping,
//! and references are kept in an insertion-ordered set so each
//! `(kind, source, target, context)` is reported once.

use std::sync::Arc;

use indexmap::IndexSet;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tracing::trace;

use super::lookup::bean_class;
use super::merge::merged_bean_definition;
use crate::base::constants::{INTERCEPTOR_NAMES_PROPERTY, PROXY_FACTORY_BEAN_CLASS};
use crate::model::{Bean, BeanId, Component, LookupContext, ValueNode};
use crate::syntax::BeanDefinition;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReferenceKind {
    /// Explicit by-name reference in a value.
    Standard,
    /// Child bean to an ancestor.
    Parent,
    /// Bean to its factory bean.
    Factory,
    DependsOn,
    /// Lookup-method bean or method replacer.
    MethodOverride,
    /// Name listed in an interceptor list property.
    Interceptor,
}

/// Which part of a bean a reference originates from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SourceMember {
    Bean,
    /// Position in the bean's constructor argument list.
    ConstructorArgument(usize),
    Property(SmolStr),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ReferenceSource {
    pub bean: Arc<Bean>,
    pub member: SourceMember,
}

impl ReferenceSource {
    pub fn bean(bean: &Arc<Bean>) -> Self {
        Self {
            bean: bean.clone(),
            member: SourceMember::Bean,
        }
    }

    fn member(bean: &Arc<Bean>, member: SourceMember) -> Self {
        Self {
            bean: bean.clone(),
            member,
        }
    }

    fn is_bean(&self, target: &Bean) -> bool {
        self.member == SourceMember::Bean && self.bean.id() == target.id()
    }
}

/// One edge of the reference graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BeanReference {
    pub kind: ReferenceKind,
    pub source: ReferenceSource,
    pub target: Arc<Bean>,
    /// Name of the config or config set the target was looked up in.
    pub context: SmolStr,
    /// Set when the edge was found inside one of the source's inner beans.
    pub inner: bool,
}

/// Starting point of a reference walk.
#[derive(Clone, Debug)]
pub enum ReferenceElement {
    Bean(Arc<Bean>),
    ConstructorArgument { bean: Arc<Bean>, index: usize },
    Property { bean: Arc<Bean>, name: SmolStr },
    Component(Arc<Component>),
}

/// Treat a list property of beans of one type as a list of bean names.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct InterceptorRule {
    pub type_name: SmolStr,
    pub property_name: SmolStr,
}

impl InterceptorRule {
    pub fn new(type_name: impl Into<SmolStr>, property_name: impl Into<SmolStr>) -> Self {
        Self {
            type_name: type_name.into(),
            property_name: property_name.into(),
        }
    }
}

impl Default for InterceptorRule {
    /// `interceptorNames` of a proxy factory bean.
    fn default() -> Self {
        Self::new(PROXY_FACTORY_BEAN_CLASS, INTERCEPTOR_NAMES_PROPERTY)
    }
}

/// A bean name found in a value, before lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NamedReference<'a> {
    pub kind: ReferenceKind,
    pub bean_name: &'a str,
}

/// Collect the bean names a value refers to.
///
/// Lists, sets and both keys and values of maps are traversed. Inner beans
/// are not entered; they are beans in their own right. With
/// `interceptor_list` set, literal list elements are bean names too.
pub fn value_references<'a>(value: &'a ValueNode, interceptor_list: bool) -> Vec<NamedReference<'a>> {
    let mut out = Vec::new();
    collect_value_references(value, interceptor_list, &mut out);
    out
}

fn collect_value_references<'a>(value: &'a ValueNode, interceptor_list: bool, out: &mut Vec<NamedReference<'a>>) {
    match value {
        ValueNode::Reference { bean_name, .. } | ValueNode::NameReference { bean_name } => {
            out.push(NamedReference {
                kind: ReferenceKind::Standard,
                bean_name,
            })
        }
        ValueNode::List(items) if interceptor_list => {
            for item in items {
                if let ValueNode::TypedString(s) = item {
                    out.push(NamedReference {
                        kind: ReferenceKind::Interceptor,
                        bean_name: &s.value,
                    });
                }
            }
        }
        ValueNode::List(items) | ValueNode::Set(items) => {
            for item in items {
                collect_value_references(item, false, out);
            }
        }
        ValueNode::Map(entries) => {
            for entry in entries {
                collect_value_references(&entry.key, false, out);
                collect_value_references(&entry.value, false, out);
            }
        }
        ValueNode::TypedString(_) | ValueNode::InnerBean(_) | ValueNode::Properties(_) | ValueNode::Null => {}
    }
}

/// Bean names a definition refers to outside its values.
pub fn definition_references(definition: &BeanDefinition) -> Vec<NamedReference<'_>> {
    let mut out = Vec::new();
    if let Some(factory) = &definition.factory_bean_name {
        out.push(NamedReference {
            kind: ReferenceKind::Factory,
            bean_name: factory,
        });
    }
    for name in &definition.depends_on {
        out.push(NamedReference {
            kind: ReferenceKind::DependsOn,
            bean_name: name,
        });
    }
    for method_override in &definition.method_overrides {
        out.push(NamedReference {
            kind: ReferenceKind::MethodOverride,
            bean_name: method_override.bean_name(),
        });
    }
    out
}

/// Computes reference graphs. Holds the configurable interceptor rules.
#[derive(Clone, Debug)]
pub struct ReferenceResolver {
    rules: Vec<InterceptorRule>,
}

impl Default for ReferenceResolver {
    fn default() -> Self {
        Self {
            rules: vec![InterceptorRule::default()],
        }
    }
}

impl ReferenceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the interceptor rules.
    pub fn with_rules(mut self, rules: Vec<InterceptorRule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn rules(&self) -> &[InterceptorRule] {
        &self.rules
    }

    /// Whether `property` of `bean` matches an interceptor rule.
    pub fn is_interceptor_property(&self, bean: &Bean, property: &str, context: &dyn LookupContext) -> bool {
        let matching: Vec<&InterceptorRule> =
            self.rules.iter().filter(|r| r.property_name == property).collect();
        if matching.is_empty() {
            return false;
        }
        let Some(class_name) = bean_class(bean, context) else {
            return false;
        };
        matching.iter().any(|r| r.type_name == class_name)
    }

    /// References of `element`, looked up in `context`.
    ///
    /// With `recursive` each target's own references are collected too.
    pub fn bean_references(
        &self,
        element: &ReferenceElement,
        context: &dyn LookupContext,
        recursive: bool,
    ) -> IndexSet<BeanReference> {
        let mut walk = Walk {
            resolver: self,
            context,
            context_name: SmolStr::new(context.context_name()),
            recursive,
            references: IndexSet::new(),
            visited: FxHashSet::default(),
        };
        walk.start(element);
        walk.references
    }
}

/// References of `element` with the default interceptor rule.
pub fn bean_references(
    element: &ReferenceElement,
    context: &dyn LookupContext,
    recursive: bool,
) -> IndexSet<BeanReference> {
    ReferenceResolver::default().bean_references(element, context, recursive)
}

struct Walk<'a> {
    resolver: &'a ReferenceResolver,
    context: &'a dyn LookupContext,
    context_name: SmolStr,
    recursive: bool,
    references: IndexSet<BeanReference>,
    visited: FxHashSet<BeanId>,
}

impl Walk<'_> {
    /// Walk `element`. A starting bean counts as visited so cycles back to it stop.
    fn start(&mut self, element: &ReferenceElement) {
        if let ReferenceElement::Bean(bean) = element {
            self.visited.insert(bean.id().clone());
        }
        self.element(element);
    }

    fn element(&mut self, element: &ReferenceElement) {
        match element {
            ReferenceElement::Bean(bean) => self.bean(bean),
            ReferenceElement::Component(component) => self.component(component),
            ReferenceElement::ConstructorArgument { bean, index } => {
                if let Some(argument) = bean.constructor_arguments().get(*index) {
                    let source = ReferenceSource::member(bean, SourceMember::ConstructorArgument(*index));
                    self.value(&source, &argument.value, false);
                }
            }
            ReferenceElement::Property { bean, name } => {
                if let Some(property) = bean.property(name) {
                    let interceptors = self.resolver.is_interceptor_property(bean, name, self.context);
                    let source = ReferenceSource::member(bean, SourceMember::Property(name.clone()));
                    self.value(&source, &property.value, interceptors);
                }
            }
        }
    }

    fn component(&mut self, component: &Component) {
        for bean in component.beans() {
            self.visit(bean);
        }
        for nested in component.components() {
            self.component(nested);
        }
    }

    /// Collect the references of `bean` unless it was already visited.
    fn visit(&mut self, bean: &Arc<Bean>) {
        // Marked before recursing so cycles end here
        if self.visited.insert(bean.id().clone()) {
            self.bean(bean);
        }
    }

    /// Record an edge. Returns the target if it still needs expanding.
    fn add(&mut self, kind: ReferenceKind, source: &ReferenceSource, target: Arc<Bean>) -> Option<Arc<Bean>> {
        if source.is_bean(&target) {
            return None;
        }
        let expand = !self.visited.contains(target.id());
        let inserted = self.references.insert(BeanReference {
            kind,
            source: source.clone(),
            target: target.clone(),
            context: self.context_name.clone(),
            inner: false,
        });
        (inserted && expand).then_some(target)
    }

    fn link(&mut self, kind: ReferenceKind, source: &ReferenceSource, name: &str) {
        let Some(target) = self.context.resolve(name) else {
            return;
        };
        if let Some(target) = self.add(kind, source, target) {
            if self.recursive {
                self.visit(&target);
            }
        }
    }

    fn value(&mut self, source: &ReferenceSource, value: &ValueNode, interceptor_list: bool) {
        for reference in value_references(value, interceptor_list) {
            self.link(reference.kind, source, reference.bean_name);
        }
    }

    fn bean(&mut self, bean: &Arc<Bean>) {
        trace!(bean = %bean.id(), recursive = self.recursive, "collecting references");
        let source = ReferenceSource::bean(bean);

        if let Some(parent_name) = bean.parent_name() {
            self.parents(bean, &source, parent_name);
        }

        let merged: BeanDefinition;
        let definition = if self.recursive {
            merged = merged_bean_definition(bean, self.context);
            &merged
        } else {
            bean.definition()
        };
        for reference in definition_references(definition) {
            self.link(reference.kind, &source, reference.bean_name);
        }

        for (index, argument) in bean.constructor_arguments().iter().enumerate() {
            let source = ReferenceSource::member(bean, SourceMember::ConstructorArgument(index));
            self.value(&source, &argument.value, false);
        }
        for property in bean.properties() {
            let interceptors = self
                .resolver
                .is_interceptor_property(bean, &property.name, self.context);
            let source = ReferenceSource::member(bean, SourceMember::Property(property.name.clone()));
            self.value(&source, &property.value, interceptors);
        }

        // Inner beans are walked on their own and credited to this bean
        for inner in bean.inner_beans() {
            let nested = self
                .resolver
                .bean_references(&ReferenceElement::Bean(inner), self.context, false);
            for reference in nested {
                if reference.target.id() == bean.id() {
                    continue;
                }
                self.references.insert(BeanReference {
                    source: source.clone(),
                    inner: true,
                    ..reference
                });
            }
        }
    }

    /// Parent edge, plus every further ancestor when walking recursively.
    fn parents(&mut self, bean: &Arc<Bean>, source: &ReferenceSource, parent_name: &str) {
        let Some(parent) = self.context.resolve(parent_name) else {
            return;
        };
        let Some(parent) = self.add(ReferenceKind::Parent, source, parent) else {
            return;
        };
        if !self.recursive {
            return;
        }
        let mut names: FxHashSet<SmolStr> = FxHashSet::default();
        names.insert(SmolStr::new(bean.name()));
        names.insert(SmolStr::new(parent.name()));
        self.visit(&parent);

        let mut current = parent;
        while let Some(next_name) = current.parent_name().map(SmolStr::new) {
            if !names.insert(next_name.clone()) {
                trace!(bean = %bean.id(), "parent chain cycle");
                break;
            }
            let Some(next) = self.context.resolve(&next_name) else {
                break;
            };
            if let Some(next) = self.add(ReferenceKind::Parent, source, next.clone()) {
                self.visit(&next);
            }
            current = next;
        }
    }
}
