//! The validator: checks a config against its config sets and the type system.
//!
//! A config is validated once per config set it belongs to. Each pass builds a
//! [`ScratchRegistry`] from the set members in declared order, validating the
//! config's own beans when its turn comes, and then (only for complete sets)
//! checks that every reference can be satisfied. A config in no set is
//! validated against a registry built from itself alone.
//!
//! Nothing here aborts on a bad bean; every problem becomes a diagnostic and
//! the run continues. The only early exit is cancellation.

use std::sync::Arc;

use rayon::prelude::*;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::diagnostics::{DiagnosticCollector, SUBJECT_KEY};
use super::registry::ScratchRegistry;
use super::settings::ValidatorSettings;
use crate::base::placeholder::strip_factory_bean_prefix;
use crate::base::{
    Diagnostic, Severity, codes, has_placeholder, is_factory_bean_reference,
    nested_property_separator_index, property_name_tokens,
};
use crate::model::{Bean, BeanId, Config, ConfigSet, LookupContext, ValueNode};
use crate::project::Project;
use crate::resolve::{MergeCache, ReferenceResolver, bean_class, value_references};
use crate::types::{Arity, Staticness, TypeQuery, TypeRef, capitalize};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("validation canceled")]
    Canceled,
}

const INVALID_TARGET: &str = "is invalid (abstract or no bean class and no factory bean)";

// ============================================================================
// VALIDATOR
// ============================================================================

pub struct Validator {
    types: Arc<dyn TypeQuery>,
    settings: ValidatorSettings,
    references: ReferenceResolver,
}

impl Validator {
    pub fn new(types: Arc<dyn TypeQuery>) -> Self {
        Self::with_settings(types, ValidatorSettings::default())
    }

    pub fn with_settings(types: Arc<dyn TypeQuery>, settings: ValidatorSettings) -> Self {
        let references = ReferenceResolver::new().with_rules(settings.interceptor_rules.clone());
        Self {
            types,
            settings,
            references,
        }
    }

    pub fn settings(&self) -> &ValidatorSettings {
        &self.settings
    }

    /// Validate `config` within every config set of `project` that contains it.
    ///
    /// The result holds the config's parse problems followed by the
    /// validation diagnostics, deduplicated.
    pub fn validate(
        &self,
        project: &Project,
        config: &Config,
        cancel: &CancellationToken,
    ) -> Result<Vec<Diagnostic>, ValidationError> {
        let sets = project.config_sets_of(config.name());
        self.validate_in(config, &sets, project.name(), cancel)
    }

    /// Validate `config` within the given sets. Type lookups use `scope`.
    pub fn validate_in(
        &self,
        config: &Config,
        sets: &[Arc<ConfigSet>],
        scope: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Diagnostic>, ValidationError> {
        let mut run = Run::new(self, scope, cancel);
        run.check_canceled()?;
        run.collector.extend(config.problems());

        for set in sets {
            run.check_canceled()?;
            run.validate_in_set(config, set)?;
        }

        if sets.is_empty() {
            debug!(config = config.name(), "validating config");
            let mut registry = ScratchRegistry::for_config(config.name());
            run.reset();
            run.validate_config(config, None, &mut registry)?;
            run.validate_references(config, None, &registry)?;
        }

        Ok(run.collector.finish())
    }

    /// Validate every config of `project` in parallel.
    ///
    /// Results keep the project's config order. Cancellation of any config
    /// cancels the whole batch.
    pub fn validate_project(
        &self,
        project: &Project,
        cancel: &CancellationToken,
    ) -> Result<Vec<(SmolStr, Vec<Diagnostic>)>, ValidationError> {
        let configs = project.configs();
        debug!(project = project.name(), configs = configs.len(), "validating project");
        configs
            .par_iter()
            .map(|config| {
                self.validate(project, config, cancel)
                    .map(|diagnostics| (SmolStr::new(config.name()), diagnostics))
            })
            .collect()
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// VALIDATION RUN
// ============================================================================

/// State of one `validate` call.
struct Run<'a> {
    validator: &'a Validator,
    scope: &'a str,
    cancel: &'a CancellationToken,
    collector: DiagnosticCollector,
    /// Beans whose registration failed in the current pass.
    unregistered: FxHashSet<BeanId>,
    merges: MergeCache,
}

impl<'a> Run<'a> {
    fn new(validator: &'a Validator, scope: &'a str, cancel: &'a CancellationToken) -> Self {
        Self {
            validator,
            scope,
            cancel,
            collector: DiagnosticCollector::new(),
            unregistered: FxHashSet::default(),
            merges: MergeCache::new(),
        }
    }

    /// Forget per-pass state before a new registry is built.
    fn reset(&mut self) {
        self.unregistered.clear();
        self.merges = MergeCache::new();
    }

    fn check_canceled(&self) -> Result<(), ValidationError> {
        if self.cancel.is_cancelled() {
            debug!("validation canceled");
            return Err(ValidationError::Canceled);
        }
        Ok(())
    }

    fn settings(&self) -> &'a ValidatorSettings {
        &self.validator.settings
    }

    fn types(&self) -> &'a dyn TypeQuery {
        self.validator.types.as_ref()
    }

    fn find_type(&self, class_name: &str) -> Option<TypeRef> {
        self.types().find_type(class_name, self.scope)
    }

    fn skips(&self, bean: &Bean) -> bool {
        self.settings().skip_infrastructure && bean.is_infrastructure()
    }

    fn ignores(&self, name: &str) -> bool {
        has_placeholder(name) || self.settings().is_ignorable(name)
    }

    fn validate_in_set(&mut self, config: &Config, set: &ConfigSet) -> Result<(), ValidationError> {
        debug!(config = config.name(), config_set = set.name(), "validating config in set");
        let mut registry = ScratchRegistry::for_config_set(
            set.name(),
            set.allow_bean_overriding(),
            set.allow_alias_overriding(),
        );
        self.reset();

        let mut validated = false;
        for member in set.configs() {
            if std::ptr::eq(member.as_ref(), config) {
                self.validate_config(config, Some(set), &mut registry)?;
                validated = true;
            } else {
                registry.register_all(member.as_ref());
            }
        }
        // Member not resolvable through the set (e.g. external name gone)
        if !validated {
            self.validate_config(config, Some(set), &mut registry)?;
        }

        if !set.is_incomplete() {
            self.validate_references(config, Some(set), &registry)?;
        }
        Ok(())
    }

    // ========================================================================
    // REGISTRATION AND BEAN CHECKS
    // ========================================================================

    fn validate_config(
        &mut self,
        config: &Config,
        set: Option<&ConfigSet>,
        registry: &mut ScratchRegistry,
    ) -> Result<(), ValidationError> {
        for bean in config.beans() {
            self.validate_bean(&bean, set, registry)?;
        }

        for alias in config.aliases() {
            self.check_canceled()?;
            if let Err(err) = registry.register_alias(&alias.name, &alias.bean_name, &alias.location) {
                self.collector.add(
                    Diagnostic::at(Severity::Error, &alias.location, err.to_string())
                        .with_code(codes::INVALID_BEAN_ALIAS)
                        .with_bean(alias.bean_name.as_str())
                        .with_data(SUBJECT_KEY, alias.name.as_str()),
                );
            }
        }

        for component in config.components() {
            registry.register_component(component);
        }
        Ok(())
    }

    fn validate_bean(
        &mut self,
        bean: &Arc<Bean>,
        set: Option<&ConfigSet>,
        registry: &mut ScratchRegistry,
    ) -> Result<(), ValidationError> {
        self.check_canceled()?;
        trace!(bean = %bean.id(), "validating bean");

        // Inner beans are anonymous and never registered
        if !bean.is_inner() {
            self.register(bean, set, registry);
        }
        if self.skips(bean) {
            return Ok(());
        }

        let definition = bean.definition();
        if let (Some(class_name), Some(method), None) = (
            definition.class_name.as_deref(),
            definition.factory_method_name.as_deref(),
            definition.factory_bean_name.as_deref(),
        ) {
            self.validate_factory_method(bean, class_name, method, Staticness::Static, Arity::Any);
        }

        if !bean.is_child() {
            self.validate_root_bean(bean);
        }

        for inner in bean.inner_beans() {
            self.validate_bean(&inner, set, registry)?;
        }
        Ok(())
    }

    fn register(&mut self, bean: &Arc<Bean>, set: Option<&ConfigSet>, registry: &mut ScratchRegistry) {
        if let Err(err) = registry.register_bean(bean) {
            let message = match set {
                Some(set) => format!("Overrides another bean within config set '{}'", set.name()),
                None => err.to_string(),
            };
            self.collector
                .bean_error(bean, codes::BEAN_OVERRIDE, message, set.map(ConfigSet::name));
            self.unregistered.insert(bean.id().clone());
        }
        for alias in bean.aliases() {
            if let Err(err) = registry.register_alias(alias, bean.name(), bean.location()) {
                self.collector
                    .bean_error(bean, codes::INVALID_BEAN_ALIAS, err.to_string(), Some(alias.as_str()));
            }
        }
    }

    fn validate_root_bean(&mut self, bean: &Bean) {
        let definition = bean.definition();
        if let Err(err) = definition.validate() {
            self.collector.bean_error(
                bean,
                codes::INVALID_BEAN_DEFINITION,
                format!("Invalid bean definition: {err}"),
                None,
            );
        }

        let Some(class_name) = definition.class_name.as_deref() else {
            return;
        };
        if has_placeholder(class_name) {
            return;
        }
        let Some(ty) = self.find_type(class_name) else {
            if !bean.is_abstract() {
                self.collector.bean_error(
                    bean,
                    codes::CLASS_NOT_FOUND,
                    format!("Class '{class_name}' not found"),
                    Some(class_name),
                );
            }
            return;
        };

        if !bean.is_abstract() {
            self.validate_constructor(bean, &ty);
        }
        if !self
            .types()
            .implements_interface(&ty, &self.settings().factory_bean_interface)
        {
            self.validate_lifecycle_methods(bean, &ty);
        }
        self.validate_properties(bean, &ty);
    }

    fn validate_constructor(&mut self, bean: &Bean, ty: &TypeRef) {
        let definition = bean.definition();
        let count = definition.constructor_arguments.len();
        if count == 0
            || definition.factory_bean_name.is_some()
            || definition.factory_method_name.is_some()
            || definition.autowire().is_enabled()
        {
            return;
        }
        if self.types().has_constructor(ty, count, true) {
            return;
        }
        let line = bean
            .first_constructor_argument()
            .map_or(bean.start_line(), |arg| arg.location.start_line);
        let noun = if count == 1 { "argument" } else { "arguments" };
        self.collector.bean_problem(
            Severity::Error,
            bean,
            line,
            codes::NO_CONSTRUCTOR,
            format!(
                "No public constructor with {count} {noun} defined in class '{}'",
                ty.qualified_name()
            ),
            Some(ty.qualified_name()),
        );
    }

    fn validate_lifecycle_methods(&mut self, bean: &Bean, ty: &TypeRef) {
        let definition = bean.definition();
        let methods = [
            (definition.init_method_name.as_deref(), "Init", codes::UNDEFINED_INIT_METHOD),
            (definition.destroy_method_name.as_deref(), "Destroy", codes::UNDEFINED_DESTROY_METHOD),
        ];
        for (method, label, code) in methods {
            let Some(method) = method else {
                continue;
            };
            if has_placeholder(method) {
                continue;
            }
            let found = self
                .types()
                .find_method(ty, method, Arity::Exactly(0), true, Staticness::Instance);
            if found.is_none() {
                self.collector.bean_error(
                    bean,
                    code,
                    format!(
                        "{label}-method '{method}' not found in bean class '{}'",
                        ty.qualified_name()
                    ),
                    Some(method),
                );
            }
        }
    }

    fn validate_properties(&mut self, bean: &Bean, ty: &TypeRef) {
        let class_name = ty.qualified_name();
        for property in bean.properties() {
            let name = property.name.as_str();
            if has_placeholder(name) {
                continue;
            }
            let line = property.location.start_line;

            if let Some(pos) = nested_property_separator_index(name, false) {
                let segment = &name[..pos];
                let tokens = property_name_tokens(segment);
                if !self.has_getter(ty, &tokens.actual_name) {
                    self.collector.bean_problem(
                        Severity::Error,
                        bean,
                        line,
                        codes::NO_GETTER,
                        format!("No getter found for nested property '{segment}' in class '{class_name}'"),
                        Some(name),
                    );
                }
                continue;
            }

            let tokens = property_name_tokens(name);
            // Keyed names like `items[0]` need a writable leading property
            let property_name = tokens.actual_name.as_str();
            if !self.types().has_writable_property(ty, property_name) {
                self.collector.bean_problem(
                    Severity::Error,
                    bean,
                    line,
                    codes::NO_SETTER,
                    format!("No setter found for property '{property_name}' in class '{class_name}'"),
                    Some(name),
                );
            }
        }
    }

    fn has_getter(&self, ty: &TypeRef, property: &str) -> bool {
        let property = capitalize(property);
        ["get", "is"].iter().any(|prefix| {
            self.types()
                .find_method(
                    ty,
                    &format!("{prefix}{property}"),
                    Arity::Exactly(0),
                    true,
                    Staticness::Instance,
                )
                .is_some()
        })
    }

    fn validate_factory_method(
        &mut self,
        bean: &Bean,
        class_name: &str,
        method: &str,
        staticness: Staticness,
        arity: Arity,
    ) {
        if has_placeholder(class_name) || has_placeholder(method) {
            return;
        }
        let Some(ty) = self.find_type(class_name) else {
            self.collector.bean_error(
                bean,
                codes::CLASS_NOT_FOUND,
                format!("Factory bean class '{class_name}' not found"),
                Some(class_name),
            );
            return;
        };
        if self
            .types()
            .find_method(&ty, method, arity, true, staticness)
            .is_none()
        {
            let label = match staticness {
                Staticness::Static => "Static",
                _ => "Instance",
            };
            self.collector.bean_error(
                bean,
                codes::UNDEFINED_FACTORY_BEAN_METHOD,
                format!("{label} factory method '{method}' in factory bean class '{class_name}' not found"),
                Some(method),
            );
        }
    }

    // ========================================================================
    // REFERENCE CHECKS
    // ========================================================================

    fn validate_references(
        &mut self,
        config: &Config,
        set: Option<&ConfigSet>,
        registry: &ScratchRegistry,
    ) -> Result<(), ValidationError> {
        debug!(
            config = config.name(),
            config_set = set.map(ConfigSet::name),
            "validating references"
        );
        for bean in config.beans() {
            self.check_canceled()?;
            if self.unregistered.contains(bean.id()) || self.skips(&bean) {
                continue;
            }
            self.validate_parent(&bean, set, registry);
            self.validate_bean_references(&bean, registry);

            for inner in bean.inner_beans_recursive() {
                self.check_canceled()?;
                if self.skips(&inner) {
                    continue;
                }
                self.validate_parent(&inner, set, registry);
                self.validate_bean_references(&inner, registry);
            }
        }

        for alias in config.aliases() {
            self.check_canceled()?;
            if self.ignores(&alias.bean_name) || registry.resolve(&alias.bean_name).is_some() {
                continue;
            }
            self.collector.add(
                Diagnostic::at(
                    Severity::Warning,
                    &alias.location,
                    format!(
                        "Alias '{}' refers to undefined bean '{}'",
                        alias.name, alias.bean_name
                    ),
                )
                .with_code(codes::UNDEFINED_ALIAS_TARGET)
                .with_bean(alias.bean_name.as_str())
                .with_data(SUBJECT_KEY, alias.name.as_str()),
            );
        }
        Ok(())
    }

    fn validate_parent(&mut self, bean: &Bean, set: Option<&ConfigSet>, registry: &ScratchRegistry) {
        let Some(parent) = bean.parent_name() else {
            return;
        };
        if parent == bean.name() {
            self.collector.bean_error(
                bean,
                codes::UNDEFINED_PARENT_BEAN,
                "Bean name and parent bean name are the same",
                Some(parent),
            );
            return;
        }
        if self.ignores(parent) || registry.resolve(parent).is_some() {
            return;
        }
        let message = match set {
            Some(set) => format!("Parent bean '{parent}' not found in config set '{}'", set.name()),
            None => format!("Parent bean '{parent}' not found"),
        };
        self.collector
            .bean_warning(bean, codes::UNDEFINED_PARENT_BEAN, message, Some(parent));
    }

    fn validate_bean_references(&mut self, bean: &Bean, registry: &ScratchRegistry) {
        for argument in bean.constructor_arguments() {
            self.validate_value(bean, argument.location.start_line, &argument.value, false, registry);
        }
        for property in bean.properties() {
            let interceptors = self
                .validator
                .references
                .is_interceptor_property(bean, &property.name, registry);
            self.validate_value(bean, property.location.start_line, &property.value, interceptors, registry);
        }

        for name in &bean.definition().depends_on {
            if self.ignores(name) {
                continue;
            }
            match registry.definition(name) {
                Ok(target) => {
                    if self.is_invalid_target(&target, registry) {
                        self.collector.bean_error(
                            bean,
                            codes::INVALID_DEPENDS_ON_BEAN,
                            format!("Referenced depends-on bean '{name}' {INVALID_TARGET}"),
                            Some(name.as_str()),
                        );
                    }
                }
                Err(_) => self.collector.bean_warning(
                    bean,
                    codes::UNDEFINED_DEPENDS_ON_BEAN,
                    format!("Depends-on bean '{name}' not found"),
                    Some(name.as_str()),
                ),
            }
        }

        let merged = self.merges.merged(bean, registry);
        match (
            merged.factory_bean_name.as_deref(),
            merged.factory_method_name.as_deref(),
        ) {
            (Some(factory), None) => self.collector.bean_error(
                bean,
                codes::UNDEFINED_FACTORY_BEAN_METHOD,
                format!("No factory method specified for factory bean '{factory}'"),
                Some(factory),
            ),
            (Some(factory), Some(method)) => self.validate_factory_bean(bean, factory, method, registry),
            _ => {}
        }
    }

    fn validate_value(
        &mut self,
        bean: &Bean,
        line: u32,
        value: &ValueNode,
        interceptors: bool,
        registry: &ScratchRegistry,
    ) {
        for reference in value_references(value, interceptors) {
            let name = reference.bean_name;
            if self.ignores(name) {
                continue;
            }
            match registry.resolve(name) {
                Some(target) => {
                    if self.is_invalid_target(&target, registry) {
                        self.collector.bean_problem(
                            Severity::Error,
                            bean,
                            line,
                            codes::INVALID_REFERENCED_BEAN,
                            format!("Referenced bean '{name}' {INVALID_TARGET}"),
                            Some(name),
                        );
                    }
                }
                None if is_factory_bean_reference(name) => {
                    self.validate_factory_reference(bean, line, name, registry)
                }
                None => self.collector.bean_problem(
                    Severity::Warning,
                    bean,
                    line,
                    codes::UNDEFINED_REFERENCED_BEAN,
                    format!("Referenced bean '{name}' not found"),
                    Some(name),
                ),
            }
        }
    }

    /// `&name` refers to the factory itself rather than its product.
    fn validate_factory_reference(&mut self, bean: &Bean, line: u32, name: &str, registry: &ScratchRegistry) {
        let factory = strip_factory_bean_prefix(name);
        let Ok(target) = registry.definition(factory) else {
            self.collector.bean_problem(
                Severity::Warning,
                bean,
                line,
                codes::UNDEFINED_FACTORY_BEAN,
                format!("Referenced factory bean '{factory}' not found"),
                Some(name),
            );
            return;
        };
        let Some(class_name) = bean_class(&target, registry) else {
            return;
        };
        if has_placeholder(&class_name) {
            return;
        }
        match self.find_type(&class_name) {
            None => self.collector.bean_problem(
                Severity::Warning,
                bean,
                line,
                codes::INVALID_REFERENCED_BEAN,
                format!("Referenced factory bean '{factory}' implementation class not found"),
                Some(name),
            ),
            Some(ty) => {
                if !self
                    .types()
                    .implements_interface(&ty, &self.settings().factory_bean_interface)
                {
                    self.collector.bean_problem(
                        Severity::Error,
                        bean,
                        line,
                        codes::INVALID_FACTORY_BEAN,
                        format!("Referenced factory bean '{factory}' does not implement the FactoryBean interface"),
                        Some(name),
                    );
                }
            }
        }
    }

    fn validate_factory_bean(&mut self, bean: &Bean, factory: &str, method: &str, registry: &ScratchRegistry) {
        if factory == bean.name() {
            self.collector.bean_error(
                bean,
                codes::UNDEFINED_FACTORY_BEAN,
                "Bean name and factory bean name are the same",
                Some(factory),
            );
            return;
        }
        if self.ignores(factory) {
            return;
        }
        let Ok(target) = registry.definition(factory) else {
            self.collector.bean_error(
                bean,
                codes::UNDEFINED_FACTORY_BEAN,
                format!("Factory bean '{factory}' not found"),
                Some(factory),
            );
            return;
        };

        let target = self.merges.merged(&target, registry);
        let class_name = match target.class_name.as_deref() {
            Some(class_name) if !target.is_abstract => class_name,
            _ => {
                self.collector.bean_error(
                    bean,
                    codes::INVALID_FACTORY_BEAN,
                    format!("Invalid factory bean '{factory}'"),
                    Some(factory),
                );
                return;
            }
        };

        // Arguments of a concrete bean are the factory method's arguments
        let arity = if !bean.is_abstract() && !bean.is_child() {
            Arity::Exactly(bean.definition().constructor_arguments.len())
        } else {
            Arity::Any
        };
        self.validate_factory_method(bean, class_name, method, Staticness::Instance, arity);
    }

    fn is_invalid_target(&self, target: &Bean, registry: &ScratchRegistry) -> bool {
        let merged = self.merges.merged(target, registry);
        merged.is_abstract || (merged.class_name.is_none() && merged.factory_bean_name.is_none())
    }
}
