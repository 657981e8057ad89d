//! Single-document config model.
//!
//! A [`Config`] is created with its name only and populated from its
//! document on first read. Population is double-checked under a dedicated
//! mutex: readers that find the config unread queue behind whoever is
//! parsing, and the parsed contents are built completely before the state
//! lock is taken to publish them. `reload` flips the state back to unread
//! and then resets every config set that merged this config.

use std::sync::{Arc, OnceLock, Weak};

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::{debug, trace, warn};

use super::alias::Alias;
use super::bean::Bean;
use super::component::{Component, Interpreted};
use super::config_set::ConfigSet;
use super::context::{ContextKind, LookupContext};
use super::environment::ConfigEnvironment;
use crate::base::constants::INNER_CLASS_SEPARATOR;
use crate::base::{Diagnostic, ResourceName, Severity, SourceLocation, codes, has_placeholder};
use crate::syntax::{BeanDefinitionHolder, DocumentDefaults, DocumentEvent};

/// Reader messages that are expected in tooling and never surfaced.
const IGNORABLE_PROBLEMS: &[&str] = &["Resource location contains placeholder"];

/// How a config came to exist.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConfigOrigin {
    /// Added explicitly by the user.
    Manual,
    /// Discovered by a locator; bulk-replaced when the locator re-runs.
    AutoDetected { locator: SmolStr },
    /// Pulled in by an `<import>` of another config.
    Imported { importer: ResourceName },
}

/// An `<import>` and the configs it pulled in.
#[derive(Clone, Debug)]
pub struct Import {
    pub resource: SmolStr,
    pub location: SourceLocation,
    configs: Vec<Arc<Config>>,
}

impl Import {
    /// Imported configs (empty when imports are disabled or failed).
    pub fn configs(&self) -> &[Arc<Config>] {
        &self.configs
    }
}

/// Everything read from one document. Immutable once published.
#[derive(Debug, Default)]
pub struct ConfigContents {
    beans: IndexMap<SmolStr, Arc<Bean>>,
    aliases: IndexMap<SmolStr, Arc<Alias>>,
    components: Vec<Arc<Component>>,
    imports: Vec<Import>,
    problems: Vec<Diagnostic>,
    defaults: DocumentDefaults,
    stamp: Option<u64>,
    class_index: OnceLock<FxHashMap<SmolStr, Vec<Arc<Bean>>>>,
}

impl ConfigContents {
    pub fn beans(&self) -> &IndexMap<SmolStr, Arc<Bean>> {
        &self.beans
    }

    pub fn aliases(&self) -> &IndexMap<SmolStr, Arc<Alias>> {
        &self.aliases
    }

    pub fn components(&self) -> &[Arc<Component>] {
        &self.components
    }

    pub fn imports(&self) -> &[Import] {
        &self.imports
    }

    pub fn problems(&self) -> &[Diagnostic] {
        &self.problems
    }

    pub fn defaults(&self) -> &DocumentDefaults {
        &self.defaults
    }

    pub fn stamp(&self) -> Option<u64> {
        self.stamp
    }

    fn imported_configs(&self) -> impl Iterator<Item = &Arc<Config>> {
        self.imports.iter().flat_map(|i| i.configs.iter())
    }

    /// Class name → beans of that class, computed once per population.
    pub fn class_index(&self) -> &FxHashMap<SmolStr, Vec<Arc<Bean>>> {
        self.class_index.get_or_init(|| {
            let mut index: FxHashMap<SmolStr, Vec<Arc<Bean>>> = FxHashMap::default();
            let top_level = self
                .beans
                .values()
                .cloned()
                .chain(self.components.iter().flat_map(|c| c.all_beans()));
            for bean in top_level {
                let nested = bean.inner_beans_recursive();
                for candidate in std::iter::once(bean).chain(nested) {
                    if let Some(class_name) = candidate.class_name() {
                        if !has_placeholder(class_name) {
                            index
                                .entry(normalize_class_name(class_name))
                                .or_default()
                                .push(candidate.clone());
                        }
                    }
                }
            }
            index
        })
    }
}

/// Strip a nested-class suffix: `com.example.Outer$Inner` → `com.example.Outer`.
pub fn normalize_class_name(class_name: &str) -> SmolStr {
    match class_name.find(INNER_CLASS_SEPARATOR) {
        Some(pos) => SmolStr::new(&class_name[..pos]),
        None => SmolStr::new(class_name),
    }
}

#[derive(Debug)]
enum ConfigState {
    Unread,
    Populated(Arc<ConfigContents>),
}

/// Model of one configuration document.
#[derive(Debug)]
pub struct Config {
    name: ResourceName,
    origin: ConfigOrigin,
    env: Arc<ConfigEnvironment>,
    /// Configs importing this one, outermost first.
    import_chain: Vec<ResourceName>,
    state: RwLock<ConfigState>,
    populate_lock: Mutex<()>,
    dependents: Mutex<Vec<Weak<ConfigSet>>>,
}

impl Config {
    pub fn new(name: impl Into<ResourceName>, origin: ConfigOrigin, env: Arc<ConfigEnvironment>) -> Self {
        Self::with_chain(name.into(), origin, env, Vec::new())
    }

    fn with_chain(
        name: ResourceName,
        origin: ConfigOrigin,
        env: Arc<ConfigEnvironment>,
        import_chain: Vec<ResourceName>,
    ) -> Self {
        Self {
            name,
            origin,
            env,
            import_chain,
            state: RwLock::new(ConfigState::Unread),
            populate_lock: Mutex::new(()),
            dependents: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn resource(&self) -> &ResourceName {
        &self.name
    }

    pub fn origin(&self) -> &ConfigOrigin {
        &self.origin
    }

    pub fn is_imported(&self) -> bool {
        matches!(self.origin, ConfigOrigin::Imported { .. })
    }

    pub fn environment(&self) -> &Arc<ConfigEnvironment> {
        &self.env
    }

    pub fn is_populated(&self) -> bool {
        matches!(*self.state.read(), ConfigState::Populated(_))
    }

    // ========================================================================
    // POPULATION
    // ========================================================================

    /// Populated contents, reading the document on first call.
    pub fn contents(&self) -> Arc<ConfigContents> {
        if let ConfigState::Populated(contents) = &*self.state.read() {
            return contents.clone();
        }
        let _guard = self.populate_lock.lock();
        if let ConfigState::Populated(contents) = &*self.state.read() {
            return contents.clone();
        }
        let contents = Arc::new(self.read_contents());
        debug!(
            config = %self.name,
            beans = contents.beans.len(),
            problems = contents.problems.len(),
            "config populated"
        );
        *self.state.write() = ConfigState::Populated(contents.clone());
        contents
    }

    /// Drop all cached state and reset every config set merging this config.
    pub fn reload(&self) {
        {
            let _guard = self.populate_lock.lock();
            *self.state.write() = ConfigState::Unread;
        }
        debug!(config = %self.name, "config reset");

        // Fan out after releasing our locks; sets take their own locks
        let dependents: Vec<Weak<ConfigSet>> = self.dependents.lock().clone();
        for set in dependents.iter().filter_map(Weak::upgrade) {
            set.reset();
        }
        self.dependents.lock().retain(|w| w.strong_count() > 0);
    }

    /// Whether the document (or an imported one) changed since population.
    pub fn resource_changed(&self) -> bool {
        let contents = match &*self.state.read() {
            ConfigState::Populated(contents) => contents.clone(),
            ConfigState::Unread => return false,
        };
        if self.env.source().modification_stamp(self.name.as_str()) != contents.stamp {
            return true;
        }
        contents.imported_configs().any(|c| c.resource_changed())
    }

    pub(crate) fn register_dependent(&self, set: &Weak<ConfigSet>) {
        let mut dependents = self.dependents.lock();
        if !dependents.iter().any(|w| w.ptr_eq(set)) {
            dependents.push(set.clone());
        }
    }

    fn read_contents(&self) -> ConfigContents {
        let mut builder = ContentsBuilder::new(self.name.clone());
        let events = match self.env.source().read(self.name.as_str()) {
            Ok(document) => {
                builder.contents.stamp = Some(document.stamp);
                self.env.reader().read(&document)
            }
            Err(error) => {
                warn!(config = %self.name, "failed to load document: {error}");
                builder.problem(
                    Severity::Error,
                    &error.to_string(),
                    SourceLocation::unknown(self.name.clone()),
                );
                Vec::new()
            }
        };

        for event in events {
            match event {
                DocumentEvent::DefaultsRegistered(defaults) => builder.contents.defaults = defaults,
                DocumentEvent::BeanRegistered(holder) => builder.add_bean(holder),
                DocumentEvent::AliasRegistered {
                    bean_name,
                    alias,
                    location,
                } => builder.add_alias(Alias::new(alias, bean_name, location)),
                DocumentEvent::ComponentRegistered(definition) => {
                    match self.env.namespaces().interpret(&definition) {
                        Interpreted::Bean(holder) => builder.add_bean(holder),
                        Interpreted::Component(definition) => builder
                            .contents
                            .components
                            .push(Arc::new(Component::from_definition(&self.name, &definition))),
                        Interpreted::Ignore => {}
                    }
                }
                DocumentEvent::ImportProcessed { resource, location } => {
                    let import = self.import(resource, location, &mut builder);
                    builder.contents.imports.push(import);
                }
                DocumentEvent::Problem(problem) => {
                    builder.problem(problem.severity, &problem.message, problem.location)
                }
                DocumentEvent::Fatal(problem) => {
                    warn!(config = %self.name, "reading halted: {}", problem.message);
                    builder.problem(problem.severity, &problem.message, problem.location);
                    break;
                }
            }
        }
        builder.contents
    }

    fn import(&self, resource: SmolStr, location: SourceLocation, builder: &mut ContentsBuilder) -> Import {
        let mut import = Import {
            resource,
            location,
            configs: Vec::new(),
        };
        if !self.env.imports_enabled() {
            return import;
        }
        let target = resolve_import_path(self.name.as_str(), &import.resource);
        if target == self.name.as_str() || self.import_chain.iter().any(|r| r.as_str() == target) {
            builder.problem(
                Severity::Warning,
                &format!("Import cycle detected for resource '{target}'"),
                import.location.clone(),
            );
            return import;
        }
        if !self.env.source().exists(&target) {
            builder.problem(
                Severity::Error,
                &format!(
                    "Failed to import bean definitions from relative location '{}'",
                    import.resource
                ),
                import.location.clone(),
            );
            return import;
        }
        trace!(config = %self.name, import = %target, "import resolved");
        let mut chain = self.import_chain.clone();
        chain.push(self.name.clone());
        import.configs.push(Arc::new(Config::with_chain(
            ResourceName::from(target),
            ConfigOrigin::Imported {
                importer: self.name.clone(),
            },
            self.env.clone(),
            chain,
        )));
        import
    }

    // ========================================================================
    // QUERIES (all populate on first use)
    // ========================================================================

    /// Own beans followed by beans of imported configs.
    pub fn beans(&self) -> Vec<Arc<Bean>> {
        let contents = self.contents();
        let mut beans: Vec<_> = contents.beans.values().cloned().collect();
        for config in contents.imported_configs() {
            beans.extend(config.beans());
        }
        beans
    }

    pub fn bean(&self, name: &str) -> Option<Arc<Bean>> {
        let contents = self.contents();
        contents
            .beans
            .get(name)
            .cloned()
            .or_else(|| contents.imported_configs().find_map(|c| c.bean(name)))
    }

    pub fn aliases(&self) -> Vec<Arc<Alias>> {
        let contents = self.contents();
        let mut aliases: Vec<_> = contents.aliases.values().cloned().collect();
        for config in contents.imported_configs() {
            aliases.extend(config.aliases());
        }
        aliases
    }

    pub fn alias(&self, name: &str) -> Option<Arc<Alias>> {
        let contents = self.contents();
        contents
            .aliases
            .get(name)
            .cloned()
            .or_else(|| contents.imported_configs().find_map(|c| c.alias(name)))
    }

    pub fn components(&self) -> Vec<Arc<Component>> {
        let contents = self.contents();
        let mut components = contents.components.clone();
        for config in contents.imported_configs() {
            components.extend(config.components());
        }
        components
    }

    pub fn imports(&self) -> Vec<Import> {
        self.contents().imports.clone()
    }

    /// Parse problems of this document and of imported ones.
    pub fn problems(&self) -> Vec<Diagnostic> {
        let contents = self.contents();
        let mut problems = contents.problems.clone();
        for config in contents.imported_configs() {
            problems.extend(config.problems());
        }
        problems
    }

    pub fn defaults(&self) -> DocumentDefaults {
        self.contents().defaults.clone()
    }

    /// Whether any bean (inner beans included) uses `class_name`.
    pub fn is_bean_class(&self, class_name: &str) -> bool {
        let contents = self.contents();
        contents.class_index().contains_key(class_name)
            || contents.imported_configs().any(|c| c.is_bean_class(class_name))
    }

    /// Beans whose class is `class_name`.
    pub fn beans_of_class(&self, class_name: &str) -> Vec<Arc<Bean>> {
        let contents = self.contents();
        let mut beans = contents
            .class_index()
            .get(class_name)
            .cloned()
            .unwrap_or_default();
        for config in contents.imported_configs() {
            beans.extend(config.beans_of_class(class_name));
        }
        beans
    }

    /// All bean class names, sorted.
    pub fn bean_classes(&self) -> Vec<SmolStr> {
        let contents = self.contents();
        let mut classes: Vec<SmolStr> = contents.class_index().keys().cloned().collect();
        for config in contents.imported_configs() {
            classes.extend(config.bean_classes());
        }
        classes.sort();
        classes.dedup();
        classes
    }
}

impl LookupContext for Config {
    fn context_name(&self) -> &str {
        self.name()
    }

    fn context_kind(&self) -> ContextKind {
        ContextKind::Config
    }

    fn bean(&self, name: &str) -> Option<Arc<Bean>> {
        Config::bean(self, name)
    }

    fn alias(&self, name: &str) -> Option<Arc<Alias>> {
        Config::alias(self, name)
    }

    fn aliases(&self) -> Vec<Arc<Alias>> {
        Config::aliases(self)
    }

    fn components(&self) -> Vec<Arc<Component>> {
        Config::components(self)
    }

    fn beans(&self) -> Vec<Arc<Bean>> {
        Config::beans(self)
    }
}

struct ContentsBuilder {
    resource: ResourceName,
    contents: ConfigContents,
}

impl ContentsBuilder {
    fn new(resource: ResourceName) -> Self {
        Self {
            resource,
            contents: ConfigContents::default(),
        }
    }

    fn add_bean(&mut self, holder: BeanDefinitionHolder) {
        if self.contents.beans.contains_key(&holder.name) {
            // Already reported by the reader; the first declaration stays
            trace!(config = %self.resource, bean = %holder.name, "duplicate bean ignored");
            return;
        }
        let bean = Arc::new(Bean::new(self.resource.clone(), holder));
        self.contents.beans.insert(SmolStr::new(bean.name()), bean);
    }

    fn add_alias(&mut self, alias: Alias) {
        self.contents
            .aliases
            .entry(alias.name.clone())
            .or_insert_with(|| Arc::new(alias));
    }

    fn problem(&mut self, severity: Severity, message: &str, location: SourceLocation) {
        if IGNORABLE_PROBLEMS.iter().any(|m| message.contains(m)) {
            trace!(config = %self.resource, "ignored problem: {message}");
            return;
        }
        self.contents.problems.push(
            Diagnostic::at(severity, &location, message).with_code(codes::PARSING_FAILED),
        );
    }
}

/// Resolve an import location against the importing resource.
///
/// `classpath:`/`file:` prefixes and a leading `/` make the location
/// root-relative; anything else is relative to the importing resource's
/// directory. `.` and `..` segments are normalized.
pub fn resolve_import_path(importing: &str, location: &str) -> String {
    let stripped = ["classpath*:", "classpath:", "file:"]
        .iter()
        .find_map(|prefix| location.strip_prefix(prefix));
    let (base, relative) = match stripped {
        Some(rest) => ("", rest.trim_start_matches('/')),
        None if location.starts_with('/') => ("", location.trim_start_matches('/')),
        None => (
            importing.rfind('/').map(|pos| &importing[..pos]).unwrap_or(""),
            location,
        ),
    };

    let mut segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

#[cfg(all(test, feature = "xml"))]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::syntax::{Document, DocumentReader, InMemoryDocuments, XmlReader};

    struct CountingReader {
        reads: AtomicUsize,
    }

    impl DocumentReader for CountingReader {
        fn read(&self, document: &Document) -> Vec<DocumentEvent> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(5));
            XmlReader::new().read(document)
        }
    }

    fn config_for(docs: InMemoryDocuments, name: &str) -> Config {
        let env = Arc::new(ConfigEnvironment::xml(Arc::new(docs)));
        Config::new(name, ConfigOrigin::Manual, env)
    }

    #[test]
    fn test_lazy_population() {
        let docs = InMemoryDocuments::new().with(
            "beans.xml",
            r#"<beans><bean id="a" class="com.example.Foo"/><alias name="a" alias="x"/></beans>"#,
        );
        let config = config_for(docs, "beans.xml");
        assert!(!config.is_populated());
        assert_eq!(config.beans().len(), 1);
        assert!(config.is_populated());
        assert_eq!(config.alias("x").unwrap().bean_name, "a");
    }

    #[test]
    fn test_populate_once_under_concurrency() {
        let docs = Arc::new(InMemoryDocuments::new().with("beans.xml", r#"<beans><bean id="a" class="Foo"/></beans>"#));
        let reader = Arc::new(CountingReader {
            reads: AtomicUsize::new(0),
        });
        let env = Arc::new(ConfigEnvironment::new(docs, reader.clone()));
        let config = Arc::new(Config::new("beans.xml", ConfigOrigin::Manual, env));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let config = config.clone();
                std::thread::spawn(move || config.beans().len())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 1);
        }
        assert_eq!(reader.reads.load(Ordering::SeqCst), 1);

        config.reload();
        assert!(!config.is_populated());
        config.beans();
        assert_eq!(reader.reads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_missing_document_degrades_to_problem() {
        let config = config_for(InMemoryDocuments::new(), "missing.xml");
        assert!(config.beans().is_empty());
        let problems = config.problems();
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].code(), Some(codes::PARSING_FAILED));
        assert!(config.is_populated());
    }

    #[test]
    fn test_malformed_document_keeps_nothing() {
        let docs = InMemoryDocuments::new().with("bad.xml", "<beans>\n<bean id=\"a\" class=\"Foo\">\n</beans>");
        let config = config_for(docs, "bad.xml");
        assert!(config.beans().is_empty());
        assert_eq!(config.problems().len(), 1);
        assert!(config.problems()[0].is_error());
    }

    #[test]
    fn test_imports_and_cycles() {
        let docs = InMemoryDocuments::new()
            .with(
                "conf/main.xml",
                r#"<beans><import resource="sub/other.xml"/><import resource="${x}.xml"/><bean id="a" class="A"/></beans>"#,
            )
            .with(
                "conf/sub/other.xml",
                r#"<beans><import resource="../main.xml"/><bean id="b" class="B$Inner"/></beans>"#,
            );
        let config = config_for(docs, "conf/main.xml");

        let names: Vec<_> = config.beans().iter().map(|b| b.name().to_string()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(config.bean("b").is_some());
        assert!(config.is_bean_class("B"));
        assert_eq!(config.bean_classes(), vec!["A", "B"]);

        // placeholder import is ignorable, the cycle back to main.xml is not
        let problems = config.problems();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].message.contains("Import cycle"));
        assert_eq!(problems[0].resource.as_str(), "conf/sub/other.xml");
    }

    #[test]
    fn test_imports_disabled() {
        let docs = InMemoryDocuments::new()
            .with("a.xml", r#"<beans><import resource="b.xml"/></beans>"#)
            .with("b.xml", r#"<beans><bean id="b" class="B"/></beans>"#);
        let env = Arc::new(ConfigEnvironment::xml(Arc::new(docs)).with_imports_enabled(false));
        let config = Config::new("a.xml", ConfigOrigin::Manual, env);
        assert!(config.beans().is_empty());
        assert_eq!(config.imports().len(), 1);
        assert!(config.imports()[0].configs().is_empty());
    }

    #[test]
    fn test_resource_changed() {
        let docs = Arc::new(InMemoryDocuments::new().with("a.xml", "<beans/>"));
        let env = Arc::new(ConfigEnvironment::xml(docs.clone()));
        let config = Config::new("a.xml", ConfigOrigin::Manual, env);
        assert!(!config.resource_changed());
        config.beans();
        assert!(!config.resource_changed());
        docs.insert("a.xml", r#"<beans><bean id="n" class="N"/></beans>"#);
        assert!(config.resource_changed());
        config.reload();
        assert_eq!(config.beans().len(), 1);
    }

    #[test]
    fn test_resolve_import_path() {
        assert_eq!(resolve_import_path("conf/main.xml", "other.xml"), "conf/other.xml");
        assert_eq!(resolve_import_path("conf/main.xml", "../x/y.xml"), "x/y.xml");
        assert_eq!(resolve_import_path("conf/main.xml", "/root.xml"), "root.xml");
        assert_eq!(resolve_import_path("conf/main.xml", "classpath:/a/b.xml"), "a/b.xml");
        assert_eq!(resolve_import_path("main.xml", "./b.xml"), "b.xml");
    }

    #[test]
    fn test_normalize_class_name() {
        assert_eq!(normalize_class_name("com.Outer$Inner"), "com.Outer");
        assert_eq!(normalize_class_name("com.Plain"), "com.Plain");
    }
}
