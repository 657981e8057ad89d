//! Projects: named containers of configs and config sets.

use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::RwLock;
use smol_str::SmolStr;
use tracing::debug;

use super::locator::ConfigLocator;
use super::settings::ProjectSettings;
use crate::error::ModelError;
use crate::model::{Config, ConfigEnvironment, ConfigOrigin, ConfigResolver, ConfigSet};

#[derive(Debug, Default)]
struct ProjectState {
    configs: IndexMap<SmolStr, Arc<Config>>,
    config_sets: IndexMap<SmolStr, Arc<ConfigSet>>,
    /// Locator id → names of the config sets it contributed.
    auto_sets: IndexMap<SmolStr, Vec<SmolStr>>,
}

/// Owns configs (manual and auto-detected) and config sets.
///
/// Config names are unique within a project. Config sets may reference
/// configs of other projects with the external form `/<project>/<name>`,
/// which is resolved through the model registry the project belongs to.
pub struct Project {
    name: SmolStr,
    self_ref: Weak<Project>,
    env: Arc<ConfigEnvironment>,
    settings: RwLock<ProjectSettings>,
    state: RwLock<ProjectState>,
    external: RwLock<Option<Weak<dyn ConfigResolver>>>,
}

impl Project {
    pub fn new(name: impl Into<SmolStr>, env: ConfigEnvironment, settings: ProjectSettings) -> Arc<Self> {
        let env = env.with_imports_enabled(settings.imports_enabled);
        let name = name.into();
        Arc::new_cyclic(|self_ref| Self {
            name,
            self_ref: self_ref.clone(),
            env: Arc::new(env),
            settings: RwLock::new(settings),
            state: RwLock::new(ProjectState::default()),
            external: RwLock::new(None),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn environment(&self) -> &Arc<ConfigEnvironment> {
        &self.env
    }

    pub fn settings(&self) -> ProjectSettings {
        self.settings.read().clone()
    }

    /// Toggle import processing; every config is reloaded.
    pub fn set_imports_enabled(&self, enabled: bool) {
        {
            let mut settings = self.settings.write();
            if settings.imports_enabled == enabled {
                return;
            }
            settings.imports_enabled = enabled;
        }
        self.env.set_imports_enabled(enabled);
        for config in self.configs() {
            config.reload();
        }
    }

    pub(crate) fn attach_external(&self, resolver: Weak<dyn ConfigResolver>) {
        *self.external.write() = Some(resolver);
    }

    fn resolver_ref(&self) -> Weak<dyn ConfigResolver> {
        self.self_ref.clone()
    }

    // ========================================================================
    // CONFIGS
    // ========================================================================

    pub fn add_config(&self, name: impl Into<SmolStr>) -> Result<Arc<Config>, ModelError> {
        self.insert_config(name.into(), ConfigOrigin::Manual)
    }

    fn insert_config(&self, name: SmolStr, origin: ConfigOrigin) -> Result<Arc<Config>, ModelError> {
        let mut state = self.state.write();
        if state.configs.contains_key(&name) {
            return Err(ModelError::duplicate_config(name.as_str()));
        }
        let config = Arc::new(Config::new(name.as_str(), origin, self.env.clone()));
        state.configs.insert(name, config.clone());
        Ok(config)
    }

    /// Remove a config and drop its name from every config set.
    pub fn remove_config(&self, name: &str) -> bool {
        let (removed, sets) = {
            let mut state = self.state.write();
            let removed = state.configs.shift_remove(name).is_some();
            let sets: Vec<_> = state.config_sets.values().cloned().collect();
            (removed, sets)
        };
        if removed {
            // Outside the project lock: resetting a set waits for its merge,
            // and a merge resolves configs through this project
            for set in sets {
                set.remove_config(name);
            }
            debug!(project = %self.name, config = name, "config removed");
        }
        removed
    }

    pub fn config(&self, name: &str) -> Option<Arc<Config>> {
        self.state.read().configs.get(name).cloned()
    }

    pub fn has_config(&self, name: &str) -> bool {
        self.state.read().configs.contains_key(name)
    }

    pub fn configs(&self) -> Vec<Arc<Config>> {
        self.state.read().configs.values().cloned().collect()
    }

    pub fn is_auto_detected(&self, name: &str) -> bool {
        self.config(name)
            .is_some_and(|c| matches!(c.origin(), ConfigOrigin::AutoDetected { .. }))
    }

    /// Names of configs auto-detected by `locator`.
    pub fn auto_detected(&self, locator: &str) -> Vec<SmolStr> {
        self.state
            .read()
            .configs
            .iter()
            .filter(|(_, c)| matches!(c.origin(), ConfigOrigin::AutoDetected { locator: l } if l == locator))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Replace every config previously detected by `locator` with `names`.
    ///
    /// Configs whose name survives keep their (possibly populated) model;
    /// names already present as manual configs are left manual.
    pub fn replace_auto_detected<I, S>(&self, locator: &str, names: I) -> Vec<Arc<Config>>
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        let names: Vec<SmolStr> = names.into_iter().map(Into::into).collect();
        let stale: Vec<SmolStr> = self
            .auto_detected(locator)
            .into_iter()
            .filter(|n| !names.contains(n))
            .collect();
        for name in &stale {
            self.remove_config(name);
        }

        let mut added = Vec::new();
        for name in names {
            if self.has_config(&name) {
                continue;
            }
            let origin = ConfigOrigin::AutoDetected {
                locator: SmolStr::new(locator),
            };
            if let Ok(config) = self.insert_config(name, origin) {
                added.push(config);
            }
        }
        debug!(
            project = %self.name,
            locator,
            added = added.len(),
            removed = stale.len(),
            "auto-detected configs replaced"
        );
        added
    }

    /// Remove every config and config set contributed by `locator`.
    pub fn remove_auto_detected(&self, locator: &str) {
        for name in self.auto_detected(locator) {
            self.remove_config(&name);
        }
        let sets = self.state.write().auto_sets.shift_remove(locator).unwrap_or_default();
        for name in sets {
            self.remove_config_set(&name);
        }
    }

    /// Run `locator` and replace its auto-detected configs with the result.
    pub fn detect(&self, locator: &dyn ConfigLocator) -> Result<Vec<Arc<Config>>, ModelError> {
        let settings = self.settings();
        let names = locator.locate(&settings)?;
        Ok(self.replace_auto_detected(locator.id(), names))
    }

    // ========================================================================
    // CONFIG SETS
    // ========================================================================

    pub fn add_config_set(&self, name: impl Into<SmolStr>) -> Result<Arc<ConfigSet>, ModelError> {
        let name = name.into();
        let mut state = self.state.write();
        if state.config_sets.contains_key(&name) {
            return Err(ModelError::duplicate_config_set(name.as_str()));
        }
        let set = ConfigSet::new(name.clone(), self.resolver_ref());
        state.config_sets.insert(name, set.clone());
        Ok(set)
    }

    /// Add a config set owned by `locator`; removed with its auto-detected configs.
    pub fn add_auto_detected_config_set(
        &self,
        locator: &str,
        name: impl Into<SmolStr>,
    ) -> Result<Arc<ConfigSet>, ModelError> {
        let name = name.into();
        let set = self.add_config_set(name.clone())?;
        self.state
            .write()
            .auto_sets
            .entry(SmolStr::new(locator))
            .or_default()
            .push(name);
        Ok(set)
    }

    pub fn remove_config_set(&self, name: &str) -> bool {
        let mut state = self.state.write();
        for names in state.auto_sets.values_mut() {
            names.retain(|n| n != name);
        }
        state.config_sets.shift_remove(name).is_some()
    }

    pub fn config_set(&self, name: &str) -> Option<Arc<ConfigSet>> {
        self.state.read().config_sets.get(name).cloned()
    }

    pub fn config_sets(&self) -> Vec<Arc<ConfigSet>> {
        self.state.read().config_sets.values().cloned().collect()
    }

    /// Config sets of this project that include `config`.
    pub fn config_sets_of(&self, config: &str) -> Vec<Arc<ConfigSet>> {
        let external = self.external_name(config);
        self.config_sets()
            .into_iter()
            .filter(|set| set.has_config(config) || set.has_config(&external))
            .collect()
    }

    /// External form of a config name of this project.
    pub fn external_name(&self, config: &str) -> String {
        format!("/{}/{}", self.name, config)
    }

    fn local_name<'a>(&self, external: &'a str) -> Option<&'a str> {
        external
            .strip_prefix('/')?
            .strip_prefix(self.name.as_str())?
            .strip_prefix('/')
    }
}

impl ConfigResolver for Project {
    fn resolve_config(&self, name: &str) -> Option<Arc<Config>> {
        if !name.starts_with('/') {
            return self.config(name);
        }
        if let Some(local) = self.local_name(name) {
            return self.config(local);
        }
        let external = self.external.read().clone()?;
        external.upgrade()?.resolve_config(name)
    }
}

impl std::fmt::Debug for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("Project")
            .field("name", &self.name)
            .field("configs", &state.configs.keys().collect::<Vec<_>>())
            .field("config_sets", &state.config_sets.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
