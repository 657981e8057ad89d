//! Lookup context: the one capability the resolvers need.
//!
//! Both a single [`Config`](super::Config) and a
//! [`ConfigSet`](super::ConfigSet) answer "which bean is called `name` here",
//! so inheritance merge, reference walk and validation are written once
//! against this trait.

use std::sync::Arc;

use super::alias::Alias;
use super::bean::Bean;
use super::component::Component;

/// Kind of lookup context, for messages and reference records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContextKind {
    Config,
    ConfigSet,
}

pub trait LookupContext: Send + Sync {
    /// Name of the config or config set.
    fn context_name(&self) -> &str;

    fn context_kind(&self) -> ContextKind;

    /// Bean registered directly under `name`.
    fn bean(&self, name: &str) -> Option<Arc<Bean>>;

    fn alias(&self, name: &str) -> Option<Arc<Alias>>;

    /// All standalone aliases, in declaration order.
    fn aliases(&self) -> Vec<Arc<Alias>>;

    /// Top-level components.
    fn components(&self) -> Vec<Arc<Component>>;

    /// All top-level beans, in declaration order.
    fn beans(&self) -> Vec<Arc<Bean>>;

    /// Look a name up as a bean, then as an alias, then inside components.
    fn resolve(&self, name: &str) -> Option<Arc<Bean>> {
        if let Some(bean) = self.bean(name) {
            return Some(bean);
        }
        if let Some(bean) = self.alias(name).and_then(|alias| self.bean(&alias.bean_name)) {
            return Some(bean);
        }
        self.components().iter().find_map(|c| c.find_bean(name))
    }
}
