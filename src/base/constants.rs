//! Domain constants shared by the reader, the model and the validator.

/// Prefix of a property placeholder, e.g. `${jdbc.url}`.
pub const PLACEHOLDER_PREFIX: &str = "${";
/// Suffix of a property placeholder.
pub const PLACEHOLDER_SUFFIX: &str = "}";

/// Sigil marking a reference to the factory itself rather than its product.
pub const FACTORY_BEAN_PREFIX: char = '&';

/// Name given to anonymous beans nested in a value.
pub const INNER_BEAN_NAME: &str = "(inner bean)";

/// Separator between the outer and nested class name of a binary class name.
pub const INNER_CLASS_SEPARATOR: char = '$';

/// Characters used to split the `name` attribute into bean name + aliases.
pub const BEAN_NAME_DELIMITERS: &[char] = &[',', ';', ' '];

// Property path syntax
pub const NESTED_PROPERTY_SEPARATOR: char = '.';
pub const PROPERTY_KEY_PREFIX: char = '[';
pub const PROPERTY_KEY_SUFFIX: char = ']';

// Document defaults used when a document declares none
pub const DEFAULT_LAZY_INIT: &str = "default";
pub const DEFAULT_AUTOWIRE: &str = "no";
pub const DEFAULT_DEPENDENCY_CHECK: &str = "none";
pub const DEFAULT_MERGE: &str = "false";

// Well-known framework types
pub const FACTORY_BEAN_INTERFACE: &str = "org.springframework.beans.factory.FactoryBean";
pub const PROXY_FACTORY_BEAN_CLASS: &str = "org.springframework.aop.framework.ProxyFactoryBean";
pub const INTERCEPTOR_NAMES_PROPERTY: &str = "interceptorNames";

/// Namespace URI of the core bean elements.
pub const BEANS_NAMESPACE_URI: &str = "http://www.springframework.org/schema/beans";

/// Default file suffixes treated as configuration documents.
pub const DEFAULT_CONFIG_SUFFIXES: &[&str] = &["xml"];
