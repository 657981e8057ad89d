use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::component::NamespaceRegistry;
use crate::syntax::{DocumentReader, DocumentSource};

/// Collaborators every config of a project reads through.
pub struct ConfigEnvironment {
    source: Arc<dyn DocumentSource>,
    reader: Arc<dyn DocumentReader>,
    namespaces: NamespaceRegistry,
    imports_enabled: AtomicBool,
}

impl ConfigEnvironment {
    pub fn new(source: Arc<dyn DocumentSource>, reader: Arc<dyn DocumentReader>) -> Self {
        Self {
            source,
            reader,
            namespaces: NamespaceRegistry::new(),
            imports_enabled: AtomicBool::new(true),
        }
    }

    /// Environment reading `<beans>` markup with the bundled XML reader.
    #[cfg(feature = "xml")]
    pub fn xml(source: Arc<dyn DocumentSource>) -> Self {
        Self::new(source, Arc::new(crate::syntax::XmlReader::new()))
    }

    pub fn with_namespaces(mut self, namespaces: NamespaceRegistry) -> Self {
        self.namespaces = namespaces;
        self
    }

    pub fn with_imports_enabled(self, enabled: bool) -> Self {
        self.imports_enabled.store(enabled, Ordering::Relaxed);
        self
    }

    pub fn source(&self) -> &dyn DocumentSource {
        self.source.as_ref()
    }

    pub fn reader(&self) -> &dyn DocumentReader {
        self.reader.as_ref()
    }

    pub fn namespaces(&self) -> &NamespaceRegistry {
        &self.namespaces
    }

    pub fn imports_enabled(&self) -> bool {
        self.imports_enabled.load(Ordering::Relaxed)
    }

    /// Takes effect on the next populate of each config.
    pub fn set_imports_enabled(&self, enabled: bool) {
        self.imports_enabled.store(enabled, Ordering::Relaxed);
    }
}

impl fmt::Debug for ConfigEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigEnvironment")
            .field("namespaces", &self.namespaces)
            .field("imports_enabled", &self.imports_enabled())
            .finish_non_exhaustive()
    }
}
