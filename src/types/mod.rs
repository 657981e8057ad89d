//! Type-system collaborator.
//!
//! The model never introspects classes itself. Everything it needs to know
//! about the host type system goes through the narrow [`TypeQuery`] trait.
//! [`TypeIndex`] is an in-memory implementation suitable for tests and for
//! hosts that can describe their classes up front.

mod index;

pub use index::{ClassBuilder, ClassInfo, MethodInfo, TypeIndex};

use smol_str::SmolStr;

/// Handle to a type found by a [`TypeQuery`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeRef {
    qualified_name: SmolStr,
}

impl TypeRef {
    pub fn new(qualified_name: impl Into<SmolStr>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
        }
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }
}

/// Handle to a method found by a [`TypeQuery`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodRef {
    pub declaring_type: SmolStr,
    pub name: SmolStr,
    pub arg_count: usize,
    pub is_static: bool,
}

/// Which methods a lookup accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Staticness {
    Static,
    Instance,
    Any,
}

impl Staticness {
    pub fn accepts(self, is_static: bool) -> bool {
        match self {
            Staticness::Static => is_static,
            Staticness::Instance => !is_static,
            Staticness::Any => true,
        }
    }
}

/// Argument count filter for method lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Arity {
    /// Any number of arguments.
    Any,
    Exactly(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Any => true,
            Arity::Exactly(n) => n == count,
        }
    }
}

/// Read-only queries against the host type system.
///
/// `scope` names the project the lookup happens in; implementations that only
/// know one class path may ignore it.
pub trait TypeQuery: Send + Sync {
    /// Find a type by its fully-qualified name.
    fn find_type(&self, qualified_name: &str, scope: &str) -> Option<TypeRef>;

    /// Whether the type has a public constructor taking `arg_count` arguments.
    fn has_constructor(&self, ty: &TypeRef, arg_count: usize, allow_subtype_match: bool) -> bool;

    /// Find a method by name and arity.
    fn find_method(
        &self,
        ty: &TypeRef,
        name: &str,
        arity: Arity,
        include_inherited: bool,
        staticness: Staticness,
    ) -> Option<MethodRef>;

    /// Whether the type exposes a setter for the property.
    fn has_writable_property(&self, ty: &TypeRef, property_name: &str) -> bool;

    /// Whether the type implements (directly or inherited) the given interface.
    fn implements_interface(&self, ty: &TypeRef, interface_name: &str) -> bool;
}

/// Capitalize the first character, as used to derive accessor names.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
