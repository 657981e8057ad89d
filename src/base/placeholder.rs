//! Placeholder and factory-bean sigil detection.
//!
//! Values containing `${...}` are resolved outside the model, so every
//! validation that would look them up must bail out before touching the
//! registry or the type system.

use super::constants::{FACTORY_BEAN_PREFIX, PLACEHOLDER_PREFIX, PLACEHOLDER_SUFFIX};

/// Check whether the whole value is a placeholder, e.g. `${beanRef}`.
pub fn is_placeholder(value: &str) -> bool {
    value.starts_with(PLACEHOLDER_PREFIX) && value.ends_with(PLACEHOLDER_SUFFIX)
}

/// Check whether the value contains a placeholder anywhere, e.g. `com.${pkg}.Foo`.
pub fn has_placeholder(value: &str) -> bool {
    match value.find(PLACEHOLDER_PREFIX) {
        Some(start) => value[start + PLACEHOLDER_PREFIX.len()..].contains(PLACEHOLDER_SUFFIX),
        None => false,
    }
}

/// Check whether a bean name refers to a factory itself, e.g. `&myFactory`.
pub fn is_factory_bean_reference(name: &str) -> bool {
    name.starts_with(FACTORY_BEAN_PREFIX)
}

/// Strip the factory-bean sigil (first occurrence only).
pub fn strip_factory_bean_prefix(name: &str) -> &str {
    name.strip_prefix(FACTORY_BEAN_PREFIX).unwrap_or(name)
}
