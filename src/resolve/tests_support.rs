//! In-memory lookup context for resolver unit tests.

use std::sync::Arc;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::base::SourceLocation;
use crate::model::{Alias, Bean, Component, ContextKind, LookupContext};
use crate::syntax::{BeanDefinition, BeanDefinitionHolder};

#[derive(Default)]
pub(crate) struct StaticContext {
    beans: IndexMap<SmolStr, Arc<Bean>>,
    aliases: IndexMap<SmolStr, Arc<Alias>>,
}

impl StaticContext {
    pub(crate) fn with_definition(mut self, name: &str, definition: BeanDefinition) -> Self {
        let bean = Arc::new(Bean::new("test.xml", BeanDefinitionHolder::new(name, definition)));
        self.beans.insert(SmolStr::new(name), bean);
        self
    }

    pub(crate) fn with_alias(mut self, alias: &str, bean: &str) -> Self {
        let alias = Alias::new(alias, bean, SourceLocation::unknown("test.xml"));
        self.aliases.insert(alias.name.clone(), Arc::new(alias));
        self
    }
}

impl LookupContext for StaticContext {
    fn context_name(&self) -> &str {
        "test.xml"
    }

    fn context_kind(&self) -> ContextKind {
        ContextKind::Config
    }

    fn bean(&self, name: &str) -> Option<Arc<Bean>> {
        self.beans.get(name).cloned()
    }

    fn alias(&self, name: &str) -> Option<Arc<Alias>> {
        self.aliases.get(name).cloned()
    }

    fn aliases(&self) -> Vec<Arc<Alias>> {
        self.aliases.values().cloned().collect()
    }

    fn components(&self) -> Vec<Arc<Component>> {
        Vec::new()
    }

    fn beans(&self) -> Vec<Arc<Bean>> {
        self.beans.values().cloned().collect()
    }
}

/// Context of `(name, class, parent)` beans declared on consecutive lines.
pub(crate) fn context(beans: &[(&str, Option<&str>, Option<&str>)]) -> StaticContext {
    let mut ctx = StaticContext::default();
    for (line, (name, class_name, parent_name)) in beans.iter().enumerate() {
        let mut definition = BeanDefinition::new(SourceLocation::at_line("test.xml", line as u32 + 1));
        definition.class_name = class_name.map(SmolStr::new);
        definition.parent_name = parent_name.map(SmolStr::new);
        ctx = ctx.with_definition(name, definition);
    }
    ctx
}
