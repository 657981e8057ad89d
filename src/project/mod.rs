//! Project management.
//!
//! - [`Project`] - Owns configs (manual and auto-detected) and config sets
//! - [`BeansModel`] - Registry of projects with open/close and subscriptions
//! - [`ConfigLocator`], [`DirectoryLocator`] - Config discovery
//! - [`ProjectSettings`] - Per-project switches

mod beans_project;
mod locator;
mod registry;
mod settings;

pub use beans_project::Project;
pub use locator::{ConfigLocator, DirectoryLocator, StaticLocator};
pub use registry::{BeansModel, ModelEvent, ModelListener, SubscriptionId, split_external_name};
pub use settings::ProjectSettings;
