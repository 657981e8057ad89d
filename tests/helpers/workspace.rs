//! Workspace helpers: projects backed by in-memory documents.

use std::sync::Arc;

use beanscope::syntax::InMemoryDocuments;
use beanscope::types::ClassBuilder;
use beanscope::{Config, ConfigEnvironment, Project, ProjectSettings, TypeIndex};

/// Wrap bean declarations in a `<beans>` root. The body starts on line 2.
pub fn beans(body: &str) -> String {
    format!("<beans>\n{body}\n</beans>")
}

/// A project named `demo` with one config per `(name, body)` pair.
pub struct Workspace {
    pub docs: Arc<InMemoryDocuments>,
    pub project: Arc<Project>,
}

impl Workspace {
    pub fn new(files: &[(&str, &str)]) -> Self {
        Self::with_settings(files, ProjectSettings::default())
    }

    pub fn with_settings(files: &[(&str, &str)], settings: ProjectSettings) -> Self {
        let docs = Arc::new(InMemoryDocuments::new());
        for (name, body) in files {
            docs.insert(name, &beans(body));
        }
        let project = Project::new("demo", ConfigEnvironment::xml(docs.clone()), settings);
        for (name, _) in files {
            project.add_config(*name).expect("config names are unique");
        }
        Self { docs, project }
    }

    pub fn config(&self, name: &str) -> Arc<Config> {
        self.project
            .config(name)
            .unwrap_or_else(|| panic!("no config named '{name}'"))
    }

    /// Replace the document behind `name` without reloading anything.
    pub fn edit(&self, name: &str, body: &str) {
        self.docs.insert(name, &beans(body));
    }
}

/// Classes used across the scenarios.
pub fn type_index() -> Arc<TypeIndex> {
    Arc::new(
        TypeIndex::new()
            .with(ClassBuilder::new("Foo").property("bar").property("x").property("y"))
            .with(ClassBuilder::new("Bar").constructor(0))
            .with(ClassBuilder::new("Factory").method("make", 0)),
    )
}
