//! In-memory type index.

use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use super::{Arity, MethodRef, Staticness, TypeQuery, TypeRef, capitalize};

/// A method signature known to the index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodInfo {
    pub name: SmolStr,
    pub arg_count: usize,
    pub is_static: bool,
}

/// Description of one class or interface.
#[derive(Clone, Debug, Default)]
pub struct ClassInfo {
    pub qualified_name: SmolStr,
    pub super_class: Option<SmolStr>,
    pub interfaces: Vec<SmolStr>,
    pub is_interface: bool,
    /// Arities of public constructors. An empty list means only the implicit
    /// no-arg constructor.
    pub constructors: Vec<usize>,
    pub methods: Vec<MethodInfo>,
}

/// Fluent builder for [`ClassInfo`].
#[derive(Debug)]
pub struct ClassBuilder {
    info: ClassInfo,
}

impl ClassBuilder {
    pub fn new(qualified_name: impl Into<SmolStr>) -> Self {
        Self {
            info: ClassInfo {
                qualified_name: qualified_name.into(),
                ..ClassInfo::default()
            },
        }
    }

    pub fn extends(mut self, super_class: impl Into<SmolStr>) -> Self {
        self.info.super_class = Some(super_class.into());
        self
    }

    pub fn implements(mut self, interface: impl Into<SmolStr>) -> Self {
        self.info.interfaces.push(interface.into());
        self
    }

    pub fn interface(mut self) -> Self {
        self.info.is_interface = true;
        self
    }

    pub fn constructor(mut self, arg_count: usize) -> Self {
        self.info.constructors.push(arg_count);
        self
    }

    pub fn method(mut self, name: impl Into<SmolStr>, arg_count: usize) -> Self {
        self.info.methods.push(MethodInfo {
            name: name.into(),
            arg_count,
            is_static: false,
        });
        self
    }

    pub fn static_method(mut self, name: impl Into<SmolStr>, arg_count: usize) -> Self {
        self.info.methods.push(MethodInfo {
            name: name.into(),
            arg_count,
            is_static: true,
        });
        self
    }

    /// Add a `setXxx(value)` accessor.
    pub fn setter(self, property: &str) -> Self {
        self.method(format!("set{}", capitalize(property)), 1)
    }

    /// Add a `getXxx()` accessor.
    pub fn getter(self, property: &str) -> Self {
        self.method(format!("get{}", capitalize(property)), 0)
    }

    /// Add both accessors of a read/write property.
    pub fn property(self, property: &str) -> Self {
        self.getter(property).setter(property)
    }

    pub fn build(self) -> ClassInfo {
        self.info
    }
}

/// Type index keyed by fully-qualified name.
#[derive(Clone, Debug, Default)]
pub struct TypeIndex {
    classes: FxHashMap<SmolStr, ClassInfo>,
}

impl TypeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, class: ClassInfo) {
        self.classes.insert(class.qualified_name.clone(), class);
    }

    /// Builder-style insert.
    pub fn with(mut self, class: ClassBuilder) -> Self {
        self.insert(class.build());
        self
    }

    pub fn class(&self, qualified_name: &str) -> Option<&ClassInfo> {
        self.classes.get(qualified_name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Walk the class and its superclasses, stopping on cycles or unknown types.
    fn hierarchy<'a>(&'a self, start: &'a ClassInfo) -> Vec<&'a ClassInfo> {
        let mut chain = vec![start];
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        seen.insert(start.qualified_name.as_str());
        let mut current = start;
        while let Some(super_name) = current.super_class.as_deref() {
            if !seen.insert(super_name) {
                break;
            }
            match self.classes.get(super_name) {
                Some(super_class) => {
                    chain.push(super_class);
                    current = super_class;
                }
                None => break,
            }
        }
        chain
    }

    fn interface_closure(&self, class: &ClassInfo, out: &mut FxHashSet<SmolStr>) {
        for interface in &class.interfaces {
            if out.insert(interface.clone()) {
                if let Some(info) = self.classes.get(interface.as_str()) {
                    self.interface_closure(info, out);
                }
            }
        }
        if class.is_interface {
            if let Some(super_name) = class.super_class.as_deref() {
                if out.insert(SmolStr::new(super_name)) {
                    if let Some(info) = self.classes.get(super_name) {
                        self.interface_closure(info, out);
                    }
                }
            }
        }
    }
}

impl TypeQuery for TypeIndex {
    fn find_type(&self, qualified_name: &str, _scope: &str) -> Option<TypeRef> {
        // Binary names of nested classes use '$'; accept the source form too
        self.classes
            .get(qualified_name)
            .or_else(|| self.classes.get(qualified_name.replace('$', ".").as_str()))
            .map(|c| TypeRef::new(c.qualified_name.clone()))
    }

    fn has_constructor(&self, ty: &TypeRef, arg_count: usize, allow_subtype_match: bool) -> bool {
        let Some(class) = self.classes.get(ty.qualified_name()) else {
            return false;
        };
        if class.constructors.is_empty() {
            return arg_count == 0;
        }
        if class.constructors.contains(&arg_count) {
            return true;
        }
        // Subtype matching cannot change arity, only argument types
        let _ = allow_subtype_match;
        false
    }

    fn find_method(
        &self,
        ty: &TypeRef,
        name: &str,
        arity: Arity,
        include_inherited: bool,
        staticness: Staticness,
    ) -> Option<MethodRef> {
        let class = self.classes.get(ty.qualified_name())?;
        let chain = if include_inherited {
            self.hierarchy(class)
        } else {
            vec![class]
        };
        chain.into_iter().find_map(|c| {
            c.methods
                .iter()
                .find(|m| {
                    m.name == name && arity.accepts(m.arg_count) && staticness.accepts(m.is_static)
                })
                .map(|m| MethodRef {
                    declaring_type: c.qualified_name.clone(),
                    name: m.name.clone(),
                    arg_count: m.arg_count,
                    is_static: m.is_static,
                })
        })
    }

    fn has_writable_property(&self, ty: &TypeRef, property_name: &str) -> bool {
        let setter = format!("set{}", capitalize(property_name));
        self.find_method(ty, &setter, Arity::Exactly(1), true, Staticness::Instance)
            .is_some()
    }

    fn implements_interface(&self, ty: &TypeRef, interface_name: &str) -> bool {
        let Some(class) = self.classes.get(ty.qualified_name()) else {
            return false;
        };
        let mut interfaces = FxHashSet::default();
        for c in self.hierarchy(class) {
            self.interface_closure(c, &mut interfaces);
        }
        interfaces.contains(interface_name)
    }
}
