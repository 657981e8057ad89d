//! The model registry: an explicitly owned, openable collection of projects
//! with typed change notification.

use std::sync::{Arc, Weak};
use std::sync::atomic::{AtomicBool, Ordering};

use indexmap::IndexMap;
use parking_lot::RwLock;
use smol_str::SmolStr;
use tracing::debug;
use uuid::Uuid;

use super::beans_project::Project;
use crate::error::ModelError;
use crate::model::{Config, ConfigResolver, ConfigSet};

/// Something that happened to the model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModelEvent {
    ModelOpened,
    ModelClosed,
    ProjectAdded(SmolStr),
    ProjectRemoved(SmolStr),
    ConfigReset { project: SmolStr, config: SmolStr },
    ConfigSetReset { project: SmolStr, config_set: SmolStr },
}

/// Handle returned by [`BeansModel::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

pub trait ModelListener: Send + Sync {
    fn on_event(&self, event: &ModelEvent);
}

impl<F> ModelListener for F
where
    F: Fn(&ModelEvent) + Send + Sync,
{
    fn on_event(&self, event: &ModelEvent) {
        self(event)
    }
}

#[derive(Default)]
struct ModelState {
    open: AtomicBool,
    projects: RwLock<IndexMap<SmolStr, Arc<Project>>>,
    listeners: RwLock<Vec<(SubscriptionId, Arc<dyn ModelListener>)>>,
}

impl ModelState {
    fn project(&self, name: &str) -> Option<Arc<Project>> {
        self.projects.read().get(name).cloned()
    }

    fn projects(&self) -> Vec<Arc<Project>> {
        self.projects.read().values().cloned().collect()
    }

    /// Notify listeners from a snapshot so no lock is held during callbacks.
    fn fire(&self, event: ModelEvent) {
        let listeners: Vec<_> = self.listeners.read().iter().map(|(_, l)| l.clone()).collect();
        for listener in listeners {
            listener.on_event(&event);
        }
    }
}

impl ConfigResolver for ModelState {
    /// Resolves external names of the form `/<project>/<config>`.
    fn resolve_config(&self, name: &str) -> Option<Arc<Config>> {
        let (project, config) = split_external_name(name)?;
        self.project(project)?.config(config)
    }
}

/// Split `/<project>/<config>` into its parts.
pub fn split_external_name(name: &str) -> Option<(&str, &str)> {
    let (project, config) = name.strip_prefix('/')?.split_once('/')?;
    (!project.is_empty() && !config.is_empty()).then_some((project, config))
}

/// Registry of projects.
///
/// Created closed; [`open`](Self::open) it before adding projects. Hosts own
/// the registry and pass it to whatever needs it.
#[derive(Clone, Default)]
pub struct BeansModel {
    state: Arc<ModelState>,
}

impl BeansModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.state.open.load(Ordering::Acquire)
    }

    pub fn open(&self) {
        if !self.state.open.swap(true, Ordering::AcqRel) {
            debug!("beans model opened");
            self.state.fire(ModelEvent::ModelOpened);
        }
    }

    /// Close the model and drop all projects.
    pub fn close(&self) {
        if self.state.open.swap(false, Ordering::AcqRel) {
            self.state.projects.write().clear();
            debug!("beans model closed");
            self.state.fire(ModelEvent::ModelClosed);
        }
    }

    fn ensure_open(&self) -> Result<(), ModelError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(ModelError::Closed)
        }
    }

    // ========================================================================
    // PROJECTS
    // ========================================================================

    pub fn add_project(&self, project: Arc<Project>) -> Result<(), ModelError> {
        self.ensure_open()?;
        let name = SmolStr::new(project.name());
        {
            let mut projects = self.state.projects.write();
            if projects.contains_key(&name) {
                return Err(ModelError::duplicate_project(name.as_str()));
            }
            let resolver: Weak<dyn ConfigResolver> = Arc::<ModelState>::downgrade(&self.state);
            project.attach_external(resolver);
            projects.insert(name.clone(), project);
        }
        self.state.fire(ModelEvent::ProjectAdded(name));
        Ok(())
    }

    pub fn remove_project(&self, name: &str) -> Result<Arc<Project>, ModelError> {
        self.ensure_open()?;
        let project = self
            .state
            .projects
            .write()
            .shift_remove(name)
            .ok_or_else(|| ModelError::UnknownProject(name.to_string()))?;
        self.state.fire(ModelEvent::ProjectRemoved(SmolStr::new(name)));
        Ok(project)
    }

    pub fn project(&self, name: &str) -> Option<Arc<Project>> {
        self.state.project(name)
    }

    pub fn projects(&self) -> Vec<Arc<Project>> {
        self.state.projects()
    }

    // ========================================================================
    // CONFIGS
    // ========================================================================

    /// Find a config by external name, or by plain name in the first project
    /// that has it.
    pub fn config(&self, name: &str) -> Option<(Arc<Project>, Arc<Config>)> {
        if let Some((project, config)) = split_external_name(name) {
            let project = self.state.project(project)?;
            let config = project.config(config)?;
            return Some((project, config));
        }
        self.state
            .projects()
            .into_iter()
            .find_map(|p| p.config(name).map(|c| (p, c)))
    }

    /// Config sets of any project that include the config.
    pub fn config_sets_of(&self, project: &Project, config: &str) -> Vec<(Arc<Project>, Arc<ConfigSet>)> {
        let external = project.external_name(config);
        let mut sets = Vec::new();
        for candidate in self.state.projects() {
            let own = candidate.name() == project.name();
            for set in candidate.config_sets() {
                if set.has_config(&external) || (own && set.has_config(config)) {
                    sets.push((candidate.clone(), set));
                }
            }
        }
        sets
    }

    /// Reset a config and every config set containing it.
    pub fn reload(&self, name: &str) -> Result<(), ModelError> {
        self.ensure_open()?;
        let (project, config) = self
            .config(name)
            .ok_or_else(|| ModelError::UnresolvedExternalName(name.to_string()))?;
        self.reload_config(&project, &config);
        Ok(())
    }

    fn reload_config(&self, project: &Arc<Project>, config: &Config) {
        config.reload();
        self.state.fire(ModelEvent::ConfigReset {
            project: SmolStr::new(project.name()),
            config: SmolStr::new(config.name()),
        });
        for (owner, set) in self.config_sets_of(project, config.name()) {
            set.reset();
            self.state.fire(ModelEvent::ConfigSetReset {
                project: SmolStr::new(owner.name()),
                config_set: SmolStr::new(set.name()),
            });
        }
    }

    /// Reload every config whose document changed since it was read.
    /// Returns the external names of the reloaded configs.
    pub fn refresh_changed(&self) -> Result<Vec<String>, ModelError> {
        self.ensure_open()?;
        let mut reloaded = Vec::new();
        for project in self.state.projects() {
            for config in project.configs() {
                if config.resource_changed() {
                    self.reload_config(&project, &config);
                    reloaded.push(project.external_name(config.name()));
                }
            }
        }
        Ok(reloaded)
    }

    // ========================================================================
    // SUBSCRIPTIONS
    // ========================================================================

    pub fn subscribe(&self, listener: impl ModelListener + 'static) -> SubscriptionId {
        let id = SubscriptionId(Uuid::new_v4());
        self.state.listeners.write().push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.state.listeners.write();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }
}

impl std::fmt::Debug for BeansModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BeansModel")
            .field("open", &self.is_open())
            .field("projects", &self.state.projects.read().keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
