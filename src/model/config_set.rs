//! Config sets: named, ordered groups of configs forming one bean namespace.
//!
//! The merged view is built lazily on first query and dropped whenever the
//! membership or an override policy changes, or a member config reloads.

use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::{debug, trace};

use super::alias::Alias;
use super::bean::Bean;
use super::component::Component;
use super::config::Config;
use super::context::{ContextKind, LookupContext};

/// Resolves member names to configs (usually the owning project).
pub trait ConfigResolver: Send + Sync {
    fn resolve_config(&self, name: &str) -> Option<Arc<Config>>;
}

#[derive(Clone, Debug, Default)]
struct SetSettings {
    configs: Vec<SmolStr>,
    allow_alias_overriding: bool,
    allow_bean_overriding: bool,
    incomplete: bool,
}

#[derive(Debug, Default)]
struct MergedIndex {
    configs: Vec<Arc<Config>>,
    beans: IndexMap<SmolStr, Arc<Bean>>,
    aliases: IndexMap<SmolStr, Arc<Alias>>,
    components: Vec<Arc<Component>>,
    class_index: FxHashMap<SmolStr, Vec<Arc<Bean>>>,
}

pub struct ConfigSet {
    name: SmolStr,
    self_ref: Weak<ConfigSet>,
    resolver: Weak<dyn ConfigResolver>,
    settings: RwLock<SetSettings>,
    merged: RwLock<Option<Arc<MergedIndex>>>,
    populate_lock: Mutex<()>,
}

impl ConfigSet {
    /// An empty set. Bean and alias overriding are allowed by default.
    pub fn new(name: impl Into<SmolStr>, resolver: Weak<dyn ConfigResolver>) -> Arc<Self> {
        let name = name.into();
        Arc::new_cyclic(|self_ref| Self {
            name,
            self_ref: self_ref.clone(),
            resolver,
            settings: RwLock::new(SetSettings {
                allow_alias_overriding: true,
                allow_bean_overriding: true,
                ..SetSettings::default()
            }),
            merged: RwLock::new(None),
            populate_lock: Mutex::new(()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // ========================================================================
    // MEMBERSHIP AND POLICIES
    // ========================================================================

    /// Member names in merge order.
    pub fn config_names(&self) -> Vec<SmolStr> {
        self.settings.read().configs.clone()
    }

    pub fn has_config(&self, name: &str) -> bool {
        self.settings.read().configs.iter().any(|c| c == name)
    }

    /// Append a member. Returns `false` if it was already present.
    pub fn add_config(&self, name: impl Into<SmolStr>) -> bool {
        let name = name.into();
        {
            let mut settings = self.settings.write();
            if settings.configs.contains(&name) {
                return false;
            }
            settings.configs.push(name);
        }
        self.reset();
        true
    }

    pub fn remove_config(&self, name: &str) -> bool {
        let removed = {
            let mut settings = self.settings.write();
            let before = settings.configs.len();
            settings.configs.retain(|c| c != name);
            settings.configs.len() != before
        };
        if removed {
            self.reset();
        }
        removed
    }

    pub fn allow_alias_overriding(&self) -> bool {
        self.settings.read().allow_alias_overriding
    }

    pub fn set_allow_alias_overriding(&self, allow: bool) {
        self.settings.write().allow_alias_overriding = allow;
        self.reset();
    }

    pub fn allow_bean_overriding(&self) -> bool {
        self.settings.read().allow_bean_overriding
    }

    pub fn set_allow_bean_overriding(&self, allow: bool) {
        self.settings.write().allow_bean_overriding = allow;
        self.reset();
    }

    /// An incomplete set does not declare every bean its members reference.
    pub fn is_incomplete(&self) -> bool {
        self.settings.read().incomplete
    }

    pub fn set_incomplete(&self, incomplete: bool) {
        self.settings.write().incomplete = incomplete;
        self.reset();
    }

    // ========================================================================
    // MERGED VIEW
    // ========================================================================

    pub fn is_populated(&self) -> bool {
        self.merged.read().is_some()
    }

    /// Drop the merged view; the next query rebuilds it.
    pub fn reset(&self) {
        let _guard = self.populate_lock.lock();
        if self.merged.write().take().is_some() {
            debug!(config_set = %self.name, "config set reset");
        }
    }

    fn merged(&self) -> Arc<MergedIndex> {
        if let Some(merged) = &*self.merged.read() {
            return merged.clone();
        }
        let _guard = self.populate_lock.lock();
        if let Some(merged) = &*self.merged.read() {
            return merged.clone();
        }
        let merged = Arc::new(self.merge());
        *self.merged.write() = Some(merged.clone());
        merged
    }

    fn merge(&self) -> MergedIndex {
        let settings = self.settings.read().clone();
        let mut index = MergedIndex::default();
        let Some(resolver) = self.resolver.upgrade() else {
            trace!(config_set = %self.name, "resolver gone, merging nothing");
            return index;
        };

        for name in &settings.configs {
            let Some(config) = resolver.resolve_config(name) else {
                trace!(config_set = %self.name, config = %name, "member config not found");
                continue;
            };
            config.register_dependent(&self.self_ref);

            for alias in config.aliases() {
                if settings.allow_alias_overriding || !index.aliases.contains_key(&alias.name) {
                    index.aliases.insert(alias.name.clone(), alias);
                }
            }
            for bean in config.beans() {
                let name = SmolStr::new(bean.name());
                if settings.allow_bean_overriding || !index.beans.contains_key(&name) {
                    index.beans.insert(name, bean);
                }
            }
            index.components.extend(config.components());
            for class_name in config.bean_classes() {
                let beans = config.beans_of_class(&class_name);
                index.class_index.entry(class_name).or_default().extend(beans);
            }
            index.configs.push(config);
        }

        debug!(
            config_set = %self.name,
            configs = index.configs.len(),
            beans = index.beans.len(),
            "config set merged"
        );
        index
    }

    /// Resolved member configs, in merge order.
    pub fn configs(&self) -> Vec<Arc<Config>> {
        self.merged().configs.clone()
    }

    pub fn bean(&self, name: &str) -> Option<Arc<Bean>> {
        self.merged().beans.get(name).cloned()
    }

    pub fn beans(&self) -> Vec<Arc<Bean>> {
        self.merged().beans.values().cloned().collect()
    }

    pub fn alias(&self, name: &str) -> Option<Arc<Alias>> {
        self.merged().aliases.get(name).cloned()
    }

    pub fn aliases(&self) -> Vec<Arc<Alias>> {
        self.merged().aliases.values().cloned().collect()
    }

    pub fn components(&self) -> Vec<Arc<Component>> {
        self.merged().components.clone()
    }

    pub fn is_bean_class(&self, class_name: &str) -> bool {
        self.merged().class_index.contains_key(class_name)
    }

    pub fn beans_of_class(&self, class_name: &str) -> Vec<Arc<Bean>> {
        self.merged()
            .class_index
            .get(class_name)
            .cloned()
            .unwrap_or_default()
    }

    pub fn bean_classes(&self) -> Vec<SmolStr> {
        let mut classes: Vec<SmolStr> = self.merged().class_index.keys().cloned().collect();
        classes.sort();
        classes
    }
}

impl std::fmt::Debug for ConfigSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigSet")
            .field("name", &self.name)
            .field("settings", &*self.settings.read())
            .field("populated", &self.is_populated())
            .finish_non_exhaustive()
    }
}

impl LookupContext for ConfigSet {
    fn context_name(&self) -> &str {
        self.name()
    }

    fn context_kind(&self) -> ContextKind {
        ContextKind::ConfigSet
    }

    fn bean(&self, name: &str) -> Option<Arc<Bean>> {
        ConfigSet::bean(self, name)
    }

    fn alias(&self, name: &str) -> Option<Arc<Alias>> {
        ConfigSet::alias(self, name)
    }

    fn aliases(&self) -> Vec<Arc<Alias>> {
        ConfigSet::aliases(self)
    }

    fn components(&self) -> Vec<Arc<Component>> {
        ConfigSet::components(self)
    }

    fn beans(&self) -> Vec<Arc<Bean>> {
        ConfigSet::beans(self)
    }
}

#[cfg(all(test, feature = "xml"))]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::model::{ConfigEnvironment, ConfigOrigin};
    use crate::syntax::InMemoryDocuments;

    struct Configs(FxHashMap<String, Arc<Config>>);

    impl ConfigResolver for Configs {
        fn resolve_config(&self, name: &str) -> Option<Arc<Config>> {
            self.0.get(name).cloned()
        }
    }

    fn configs(docs: &[(&str, &str)]) -> Arc<Configs> {
        let mut source = InMemoryDocuments::new();
        for (name, content) in docs {
            source = source.with(name, content);
        }
        let env = Arc::new(ConfigEnvironment::xml(Arc::new(source)));
        Arc::new(Configs(
            docs.iter()
                .map(|(name, _)| {
                    let config = Arc::new(Config::new(*name, ConfigOrigin::Manual, env.clone()));
                    (name.to_string(), config)
                })
                .collect(),
        ))
    }

    fn set_of(resolver: &Arc<Configs>, names: &[&str]) -> Arc<ConfigSet> {
        let weak: Weak<dyn ConfigResolver> = Arc::downgrade(resolver) as Weak<dyn ConfigResolver>;
        let set = ConfigSet::new("set", weak);
        for name in names {
            set.add_config(*name);
        }
        set
    }

    const A: &str = r#"<beans><bean id="x" class="com.A"/><alias name="x" alias="ax"/></beans>"#;
    const B: &str = r#"<beans><bean id="x" class="com.B"/><bean id="y" class="com.B"/><alias name="y" alias="ax"/></beans>"#;

    #[test]
    fn test_later_config_overrides() {
        let resolver = configs(&[("a.xml", A), ("b.xml", B)]);
        let set = set_of(&resolver, &["a.xml", "b.xml"]);

        assert_eq!(set.bean("x").unwrap().class_name(), Some("com.B"));
        assert_eq!(set.alias("ax").unwrap().bean_name, "y");
        assert_eq!(set.beans().len(), 2);
        assert_eq!(set.beans_of_class("com.B").len(), 2);
        assert_eq!(set.bean_classes(), vec!["com.A", "com.B"]);
    }

    #[test]
    fn test_overriding_disabled_keeps_first() {
        let resolver = configs(&[("a.xml", A), ("b.xml", B)]);
        let set = set_of(&resolver, &["a.xml", "b.xml"]);
        set.set_allow_bean_overriding(false);
        set.set_allow_alias_overriding(false);

        assert_eq!(set.bean("x").unwrap().class_name(), Some("com.A"));
        assert_eq!(set.alias("ax").unwrap().bean_name, "x");
    }

    #[test]
    fn test_membership_change_resets() {
        let resolver = configs(&[("a.xml", A), ("b.xml", B)]);
        let set = set_of(&resolver, &["a.xml"]);
        assert_eq!(set.beans().len(), 1);
        assert!(set.is_populated());

        assert!(!set.add_config("a.xml"));
        assert!(set.add_config("b.xml"));
        assert!(!set.is_populated());
        assert_eq!(set.beans().len(), 2);

        assert!(set.remove_config("a.xml"));
        assert_eq!(set.config_names(), vec!["b.xml"]);
        assert_eq!(set.bean("x").unwrap().class_name(), Some("com.B"));
    }

    #[test]
    fn test_member_reload_resets_set() {
        let resolver = configs(&[("a.xml", A)]);
        let set = set_of(&resolver, &["a.xml", "missing.xml"]);
        assert_eq!(set.configs().len(), 1);
        assert!(set.is_populated());

        resolver.0["a.xml"].reload();
        assert!(!set.is_populated());
        assert!(set.bean("x").is_some());
    }

    #[test]
    fn test_resolve_through_alias() {
        let resolver = configs(&[("a.xml", A)]);
        let set = set_of(&resolver, &["a.xml"]);
        assert_eq!(set.resolve("ax").unwrap().name(), "x");
        assert!(set.resolve("nope").is_none());
    }
}
