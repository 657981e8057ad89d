//! Interpretation of `<beans>` documents into parse events.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use super::tree::XmlElement;
use crate::base::constants::{BEAN_NAME_DELIMITERS, BEANS_NAMESPACE_URI, INNER_BEAN_NAME};
use crate::base::{ResourceName, SourceLocation, has_placeholder};
use crate::syntax::definition::{
    Autowire, BeanDefinition, BeanDefinitionHolder, ConstructorArgument, MethodOverride,
    PropertyValue, Role,
};
use crate::syntax::events::{ComponentDefinition, DocumentDefaults, DocumentEvent, Problem};
use crate::syntax::value::RawValue;

/// Walks one document tree and collects events in document order.
pub(crate) struct BeansInterpreter {
    resource: ResourceName,
    events: Vec<DocumentEvent>,
    used_names: FxHashSet<SmolStr>,
}

impl BeansInterpreter {
    pub fn new(resource: ResourceName) -> Self {
        Self {
            resource,
            events: Vec::new(),
            used_names: FxHashSet::default(),
        }
    }

    pub fn interpret(mut self, root: &XmlElement) -> Vec<DocumentEvent> {
        if !is_beans_element(root, "beans") {
            self.events.push(DocumentEvent::Fatal(Problem::error(
                format!(
                    "Unable to locate bean definitions root element, found '{}'",
                    root.local_name
                ),
                self.location(root),
            )));
            return self.events;
        }
        self.events
            .push(DocumentEvent::DefaultsRegistered(read_defaults(root)));
        self.beans_element(root);
        self.events
    }

    // ========================================================================
    // TOP LEVEL
    // ========================================================================

    fn beans_element(&mut self, beans: &XmlElement) {
        for child in &beans.children {
            if !is_beans_namespace(child) {
                let component = self.component(child);
                self.events.push(DocumentEvent::ComponentRegistered(component));
                continue;
            }
            match child.local_name.as_str() {
                "bean" => {
                    let holder = self.bean_element(child, false);
                    self.events.push(DocumentEvent::BeanRegistered(holder));
                }
                "alias" => self.alias_element(child),
                "import" => self.import_element(child),
                // Nested <beans> (profiles) contribute their beans to the document
                "beans" => self.beans_element(child),
                "description" => {}
                other => self.warning(format!("Unexpected element '{other}'"), child),
            }
        }
    }

    fn alias_element(&mut self, element: &XmlElement) {
        let name = element.non_empty_attribute("name");
        let alias = element.non_empty_attribute("alias");
        match (name, alias) {
            (Some(name), Some(alias)) => self.events.push(DocumentEvent::AliasRegistered {
                bean_name: name.into(),
                alias: alias.into(),
                location: self.location(element),
            }),
            (None, _) => self.error("Name must not be empty", element),
            (_, None) => self.error("Alias must not be empty", element),
        }
    }

    fn import_element(&mut self, element: &XmlElement) {
        let Some(resource) = element.non_empty_attribute("resource") else {
            self.error("Resource location must not be empty", element);
            return;
        };
        if has_placeholder(resource) {
            self.warning("Resource location contains placeholder", element);
            return;
        }
        self.events.push(DocumentEvent::ImportProcessed {
            resource: resource.into(),
            location: self.location(element),
        });
    }

    /// Element of a foreign namespace.
    fn component(&mut self, element: &XmlElement) -> ComponentDefinition {
        let name = element
            .non_empty_attribute("id")
            .unwrap_or(element.local_name.as_str());
        let mut component = ComponentDefinition::new(
            name,
            element.namespace_uri.as_deref().unwrap_or_default(),
            self.location(element),
        );
        component.attributes = element
            .attributes
            .iter()
            .map(|(k, v)| (SmolStr::new(k), SmolStr::new(v)))
            .collect();
        for child in &element.children {
            if is_beans_element(child, "bean") {
                let holder = self.bean_element(child, false);
                component.beans.push(holder);
            } else if !is_beans_namespace(child) {
                let nested = self.component(child);
                component.nested.push(nested);
            }
        }
        component
    }

    // ========================================================================
    // BEANS
    // ========================================================================

    fn bean_element(&mut self, element: &XmlElement, inner: bool) -> BeanDefinitionHolder {
        let id = element.non_empty_attribute("id");
        let mut aliases: Vec<SmolStr> = element
            .attribute("name")
            .map(|names| {
                names
                    .split(BEAN_NAME_DELIMITERS)
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(SmolStr::new)
                    .collect()
            })
            .unwrap_or_default();

        let definition = self.bean_definition(element);

        let name: SmolStr = match id {
            Some(id) => id.into(),
            None if !aliases.is_empty() => aliases.remove(0),
            None if inner => SmolStr::new_static(INNER_BEAN_NAME),
            None => self.generate_name(&definition),
        };

        if !inner {
            for candidate in std::iter::once(&name).chain(aliases.iter()) {
                if !self.used_names.insert(candidate.clone()) {
                    self.error(
                        format!("Bean name '{candidate}' is already used in this <beans> element"),
                        element,
                    );
                }
            }
        }

        BeanDefinitionHolder {
            name,
            aliases,
            definition,
        }
    }

    fn generate_name(&self, definition: &BeanDefinition) -> SmolStr {
        let base = match (&definition.class_name, &definition.parent_name, &definition.factory_bean_name) {
            (Some(class), _, _) => class.to_string(),
            (None, Some(parent), _) => format!("{parent}$child"),
            (None, None, Some(factory)) => format!("{factory}$created"),
            (None, None, None) => "bean".to_string(),
        };
        (0..)
            .map(|counter| SmolStr::new(format!("{base}#{counter}")))
            .find(|candidate| !self.used_names.contains(candidate))
            .unwrap_or_else(|| SmolStr::new(base))
    }

    fn bean_definition(&mut self, element: &XmlElement) -> BeanDefinition {
        let mut bd = BeanDefinition::new(self.location(element));
        bd.class_name = element.non_empty_attribute("class").map(SmolStr::new);
        bd.parent_name = element.non_empty_attribute("parent").map(SmolStr::new);
        bd.is_abstract = element.attribute("abstract") == Some("true");
        bd.lazy_init = match element.attribute("lazy-init") {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        };
        bd.scope = element.non_empty_attribute("scope").map(SmolStr::new);
        if element.attribute("singleton") == Some("false") {
            bd.scope = Some(SmolStr::new_static("prototype"));
        }
        bd.autowire = element.attribute("autowire").and_then(Autowire::parse);
        bd.dependency_check = element
            .non_empty_attribute("dependency-check")
            .filter(|v| *v != "default")
            .map(SmolStr::new);
        bd.role = match element.attribute("role") {
            Some("infrastructure") => Some(Role::Infrastructure),
            Some("support") => Some(Role::Support),
            Some("application") => Some(Role::Application),
            _ => None,
        };
        bd.depends_on = element
            .attribute("depends-on")
            .map(|names| {
                names
                    .split(BEAN_NAME_DELIMITERS)
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(SmolStr::new)
                    .collect()
            })
            .unwrap_or_default();
        bd.factory_bean_name = element.non_empty_attribute("factory-bean").map(SmolStr::new);
        bd.factory_method_name = element.non_empty_attribute("factory-method").map(SmolStr::new);
        bd.init_method_name = element.non_empty_attribute("init-method").map(SmolStr::new);
        bd.destroy_method_name = element.non_empty_attribute("destroy-method").map(SmolStr::new);

        for child in element.children.iter().filter(|c| is_beans_namespace(c)) {
            match child.local_name.as_str() {
                "constructor-arg" => self.constructor_arg_element(child, &mut bd),
                "property" => self.property_element(child, &mut bd),
                "lookup-method" => {
                    match (child.non_empty_attribute("name"), child.non_empty_attribute("bean")) {
                        (Some(method), Some(bean)) => bd.method_overrides.push(MethodOverride::Lookup {
                            method_name: method.into(),
                            bean_name: bean.into(),
                            location: self.location(child),
                        }),
                        _ => self.error("Tag 'lookup-method' requires 'name' and 'bean' attributes", child),
                    }
                }
                "replaced-method" => {
                    match (child.non_empty_attribute("name"), child.non_empty_attribute("replacer")) {
                        (Some(method), Some(replacer)) => {
                            bd.method_overrides.push(MethodOverride::Replace {
                                method_name: method.into(),
                                replacer_bean_name: replacer.into(),
                                location: self.location(child),
                            })
                        }
                        _ => self.error(
                            "Tag 'replaced-method' requires 'name' and 'replacer' attributes",
                            child,
                        ),
                    }
                }
                _ => {}
            }
        }
        bd
    }

    fn constructor_arg_element(&mut self, element: &XmlElement, bd: &mut BeanDefinition) {
        let value = self.property_value(element, "<constructor-arg> element");
        let mut argument = ConstructorArgument::new(value, self.location(element));
        if let Some(index) = element.non_empty_attribute("index") {
            match index.parse::<usize>() {
                Ok(index) => {
                    if bd.constructor_arguments.indexed().contains_key(&index) {
                        self.error(format!("Ambiguous constructor-arg entries for index {index}"), element);
                        return;
                    }
                    argument.index = Some(index);
                }
                Err(_) => {
                    self.error("Attribute 'index' of tag 'constructor-arg' must be an integer", element);
                    return;
                }
            }
        }
        argument.type_name = element.non_empty_attribute("type").map(SmolStr::new);
        argument.name = element.non_empty_attribute("name").map(SmolStr::new);
        bd.constructor_arguments.add(argument);
    }

    fn property_element(&mut self, element: &XmlElement, bd: &mut BeanDefinition) {
        let Some(name) = element.non_empty_attribute("name") else {
            self.error("Tag 'property' must have a 'name' attribute", element);
            return;
        };
        if bd.properties.contains_key(name) {
            self.error(format!("Multiple 'property' definitions for property '{name}'"), element);
            return;
        }
        let value = self.property_value(element, &format!("<property> element for property '{name}'"));
        bd.add_property(PropertyValue::new(name, value, self.location(element)));
    }

    // ========================================================================
    // VALUES
    // ========================================================================

    fn property_value(&mut self, element: &XmlElement, what: &str) -> RawValue {
        let sub_element = element
            .children
            .iter()
            .find(|c| !(is_beans_namespace(c) && matches!(c.local_name.as_str(), "description" | "meta")));
        let has_ref = element.has_attribute("ref");
        let has_value = element.has_attribute("value");

        if (has_ref && has_value) || ((has_ref || has_value) && sub_element.is_some()) {
            self.error(
                format!("{what} is only allowed to contain either 'ref' attribute OR 'value' attribute OR sub-element"),
                element,
            );
        }

        if has_ref {
            match element.non_empty_attribute("ref") {
                Some(name) => RawValue::reference(name),
                None => {
                    self.error(format!("{what} contains empty 'ref' attribute"), element);
                    RawValue::Null
                }
            }
        } else if let Some(value) = element.attribute("value") {
            RawValue::string(value)
        } else if let Some(child) = sub_element {
            self.value_element(child)
        } else {
            self.error(format!("{what} must specify a ref or value"), element);
            RawValue::Null
        }
    }

    fn value_element(&mut self, element: &XmlElement) -> RawValue {
        if !is_beans_namespace(element) {
            // Custom namespace values are opaque without a handler
            return RawValue::Null;
        }
        match element.local_name.as_str() {
            "bean" => RawValue::inner_bean(self.bean_element(element, true)),
            "ref" => {
                if let Some(name) = element
                    .non_empty_attribute("bean")
                    .or_else(|| element.non_empty_attribute("local"))
                {
                    RawValue::reference(name)
                } else if let Some(name) = element.non_empty_attribute("parent") {
                    RawValue::Reference {
                        bean_name: name.into(),
                        to_parent: true,
                    }
                } else {
                    self.error("'bean', 'local' or 'parent' is required for <ref> element", element);
                    RawValue::Null
                }
            }
            "idref" => match element
                .non_empty_attribute("bean")
                .or_else(|| element.non_empty_attribute("local"))
            {
                Some(name) => RawValue::NameReference {
                    bean_name: name.into(),
                },
                None => {
                    self.error("Either 'bean' or 'local' is required for <idref> element", element);
                    RawValue::Null
                }
            },
            "value" => RawValue::TypedString {
                value: element.text.as_str().into(),
                type_name: element.non_empty_attribute("type").map(SmolStr::new),
            },
            "null" => RawValue::Null,
            "list" | "array" => RawValue::List(self.collection_items(element)),
            "set" => RawValue::Set(self.collection_items(element)),
            "map" => RawValue::Map(
                element
                    .children
                    .iter()
                    .filter(|c| is_beans_element(c, "entry"))
                    .map(|entry| self.map_entry(entry))
                    .collect(),
            ),
            "props" => RawValue::Properties(
                element
                    .children
                    .iter()
                    .filter(|c| is_beans_element(c, "prop"))
                    .filter_map(|prop| {
                        prop.non_empty_attribute("key")
                            .map(|key| (SmolStr::new(key), SmolStr::new(prop.text.trim())))
                    })
                    .collect(),
            ),
            other => {
                self.error(format!("Unknown property sub-element: <{other}>"), element);
                RawValue::Null
            }
        }
    }

    fn collection_items(&mut self, element: &XmlElement) -> Vec<RawValue> {
        element
            .children
            .iter()
            .filter(|c| !is_beans_element(c, "description"))
            .map(|c| self.value_element(c))
            .collect()
    }

    fn map_entry(&mut self, entry: &XmlElement) -> (RawValue, RawValue) {
        let key_element = entry.children.iter().find(|c| is_beans_element(c, "key"));
        let key = if let Some(key) = entry.attribute("key") {
            RawValue::string(key)
        } else if let Some(key_ref) = entry.non_empty_attribute("key-ref") {
            RawValue::reference(key_ref)
        } else if let Some(inner) = key_element.and_then(|k| k.children.first()) {
            self.value_element(inner)
        } else {
            self.error("<entry> element must specify a key", entry);
            RawValue::Null
        };

        let value_element = entry.children.iter().find(|c| !is_beans_element(c, "key"));
        let value = if let Some(value) = entry.attribute("value") {
            RawValue::string(value)
        } else if let Some(value_ref) = entry.non_empty_attribute("value-ref") {
            RawValue::reference(value_ref)
        } else if let Some(inner) = value_element {
            self.value_element(inner)
        } else {
            self.error("<entry> element must specify a value", entry);
            RawValue::Null
        };
        (key, value)
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    fn location(&self, element: &XmlElement) -> SourceLocation {
        SourceLocation::new(self.resource.clone(), element.start_line, element.end_line)
    }

    fn error(&mut self, message: impl Into<SmolStr>, element: &XmlElement) {
        let location = self.location(element);
        self.events
            .push(DocumentEvent::Problem(Problem::error(message, location)));
    }

    fn warning(&mut self, message: impl Into<SmolStr>, element: &XmlElement) {
        let location = self.location(element);
        self.events
            .push(DocumentEvent::Problem(Problem::warning(message, location)));
    }
}

fn read_defaults(root: &XmlElement) -> DocumentDefaults {
    let mut defaults = DocumentDefaults::default();
    if let Some(v) = root.non_empty_attribute("default-lazy-init") {
        defaults.lazy_init = v.into();
    }
    if let Some(v) = root.non_empty_attribute("default-autowire") {
        defaults.autowire = v.into();
    }
    if let Some(v) = root.non_empty_attribute("default-dependency-check") {
        defaults.dependency_check = v.into();
    }
    defaults.init_method = root.non_empty_attribute("default-init-method").map(SmolStr::new);
    defaults.destroy_method = root
        .non_empty_attribute("default-destroy-method")
        .map(SmolStr::new);
    if let Some(v) = root.non_empty_attribute("default-merge") {
        defaults.merge = v.into();
    }
    defaults
}

fn is_beans_namespace(element: &XmlElement) -> bool {
    matches!(element.namespace_uri.as_deref(), None | Some("") | Some(BEANS_NAMESPACE_URI))
}

fn is_beans_element(element: &XmlElement, local_name: &str) -> bool {
    is_beans_namespace(element) && element.local_name == local_name
}
