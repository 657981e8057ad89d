//! Scratch bean registry used while validating one config.
//!
//! Every validation pass builds a fresh registry from the members of a config
//! set (or from the config alone) and registers beans in order, so name and
//! alias clashes surface as [`RegistryError`]s exactly where they happen.

use std::sync::Arc;

use indexmap::IndexMap;
use smol_str::SmolStr;
use thiserror::Error;
use tracing::trace;

use crate::base::{ResourceName, SourceLocation};
use crate::model::{Alias, Bean, Component, ContextKind, LookupContext};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error(
        "Cannot register bean definition for bean '{name}': there is already a bean '{name}' bound from '{existing}'"
    )]
    DuplicateBean { name: SmolStr, existing: ResourceName },

    #[error(
        "Cannot register alias '{alias}' for bean '{bean}': it is already registered for bean '{existing}'"
    )]
    DuplicateAlias {
        alias: SmolStr,
        bean: SmolStr,
        existing: SmolStr,
    },

    #[error("Alias '{0}' is the same as the bean name")]
    AliasEqualsName(SmolStr),

    #[error("No bean named '{0}' is defined")]
    UnknownBean(SmolStr),
}

/// Name → bean table with an alias table and override policy.
#[derive(Debug)]
pub struct ScratchRegistry {
    name: SmolStr,
    kind: ContextKind,
    beans: IndexMap<SmolStr, Arc<Bean>>,
    aliases: IndexMap<SmolStr, Arc<Alias>>,
    components: Vec<Arc<Component>>,
    allow_bean_overriding: bool,
    allow_alias_overriding: bool,
}

impl ScratchRegistry {
    /// Registry for a config validated on its own.
    pub fn for_config(name: impl Into<SmolStr>) -> Self {
        Self::new(name, ContextKind::Config, false, false)
    }

    /// Registry for a config validated as member of a set.
    pub fn for_config_set(
        name: impl Into<SmolStr>,
        allow_bean_overriding: bool,
        allow_alias_overriding: bool,
    ) -> Self {
        Self::new(
            name,
            ContextKind::ConfigSet,
            allow_bean_overriding,
            allow_alias_overriding,
        )
    }

    pub fn new(
        name: impl Into<SmolStr>,
        kind: ContextKind,
        allow_bean_overriding: bool,
        allow_alias_overriding: bool,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            beans: IndexMap::new(),
            aliases: IndexMap::new(),
            components: Vec::new(),
            allow_bean_overriding,
            allow_alias_overriding,
        }
    }

    pub fn allow_bean_overriding(&self) -> bool {
        self.allow_bean_overriding
    }

    pub fn allow_alias_overriding(&self) -> bool {
        self.allow_alias_overriding
    }

    /// Register a bean under its name. On failure the earlier bean stays.
    pub fn register_bean(&mut self, bean: &Arc<Bean>) -> Result<(), RegistryError> {
        let name = SmolStr::new(bean.name());
        if let Some(existing) = self.beans.get(&name) {
            if !self.allow_bean_overriding {
                return Err(RegistryError::DuplicateBean {
                    name,
                    existing: existing.resource().clone(),
                });
            }
        }
        trace!(bean = %bean.id(), registry = %self.name, "registering bean");
        self.beans.insert(name, bean.clone());
        Ok(())
    }

    /// Register `alias` for `bean_name`.
    pub fn register_alias(
        &mut self,
        alias: &str,
        bean_name: &str,
        location: &SourceLocation,
    ) -> Result<(), RegistryError> {
        if alias == bean_name {
            return Err(RegistryError::AliasEqualsName(SmolStr::new(alias)));
        }
        if let Some(existing) = self.aliases.get(alias) {
            if existing.bean_name == bean_name {
                return Ok(());
            }
            if !self.allow_alias_overriding {
                return Err(RegistryError::DuplicateAlias {
                    alias: SmolStr::new(alias),
                    bean: SmolStr::new(bean_name),
                    existing: existing.bean_name.clone(),
                });
            }
        }
        self.aliases.insert(
            SmolStr::new(alias),
            Arc::new(Alias::new(alias, bean_name, location.clone())),
        );
        Ok(())
    }

    pub fn register_component(&mut self, component: Arc<Component>) {
        self.components.push(component);
    }

    /// Register everything a config declares, ignoring clashes.
    ///
    /// Used for the other members of a set; their own problems are reported
    /// when they are validated themselves.
    pub fn register_all(&mut self, context: &dyn LookupContext) {
        for bean in context.beans() {
            let _ = self.register_bean(&bean);
            for alias in bean.aliases() {
                let _ = self.register_alias(alias, bean.name(), bean.location());
            }
        }
        for alias in context.aliases() {
            let _ = self.register_alias(&alias.name, &alias.bean_name, &alias.location);
        }
        for component in context.components() {
            self.register_component(component);
        }
    }

    pub fn contains_bean(&self, name: &str) -> bool {
        self.beans.contains_key(name)
    }

    pub fn contains_alias(&self, name: &str) -> bool {
        self.aliases.contains_key(name)
    }

    /// Bean registered under `name` or one of its aliases.
    pub fn definition(&self, name: &str) -> Result<Arc<Bean>, RegistryError> {
        self.resolve(name)
            .ok_or_else(|| RegistryError::UnknownBean(SmolStr::new(name)))
    }

    pub fn len(&self) -> usize {
        self.beans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beans.is_empty()
    }
}

impl LookupContext for ScratchRegistry {
    fn context_name(&self) -> &str {
        &self.name
    }

    fn context_kind(&self) -> ContextKind {
        self.kind
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
        self.components.clone()
    }

    fn beans(&self) -> Vec<Arc<Bean>> {
        self.beans.values().cloned().collect()
    }
}
