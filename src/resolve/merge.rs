//! Bean definition inheritance: flattening child → parent chains.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use crate::model::{Bean, BeanId, LookupContext};
use crate::syntax::BeanDefinition;

/// The definition `bean` has once its parent chain is flattened.
///
/// The chain is collected child first, then applied root first: a copy of
/// the root definition receives each descendant's declared fields in turn, so
/// the child always wins. The walk stops at a missing parent, at a parent
/// naming the bean itself and at any definition already on the chain. When
/// the top of the collected chain is not a root definition the original
/// definition is returned unmerged.
pub fn merged_bean_definition(bean: &Bean, context: &dyn LookupContext) -> BeanDefinition {
    if !bean.is_child() {
        return bean.definition().clone();
    }

    let ancestors = ancestors(bean, context);
    let Some(root) = ancestors.last() else {
        return bean.definition().clone();
    };
    if root.is_child() {
        trace!(bean = %bean.id(), "inheritance chain has no root, left unmerged");
        return bean.definition().clone();
    }

    let mut merged = root.definition().clone();
    for ancestor in ancestors.iter().rev().skip(1) {
        merged.override_from(ancestor.definition());
    }
    merged.override_from(bean.definition());
    merged
}

/// Ancestors of `bean`, nearest first.
fn ancestors(bean: &Bean, context: &dyn LookupContext) -> Vec<Arc<Bean>> {
    let mut visited: FxHashSet<BeanId> = FxHashSet::default();
    visited.insert(bean.id().clone());
    let mut chain: Vec<Arc<Bean>> = Vec::new();

    let mut current_name = bean.name().to_owned();
    let mut parent_name = bean.parent_name().map(str::to_owned);
    while let Some(name) = parent_name {
        if name == current_name {
            break;
        }
        let Some(parent) = context.resolve(&name) else {
            break;
        };
        if !visited.insert(parent.id().clone()) {
            trace!(bean = %bean.id(), parent = %name, "parent chain cycle");
            break;
        }
        current_name = name;
        parent_name = parent.parent_name().map(str::to_owned);
        chain.push(parent);
    }
    chain
}

/// Memoizes merged definitions for one context during one run.
///
/// Keyed by bean identity only; create one cache per context.
#[derive(Debug, Default)]
pub struct MergeCache {
    entries: Mutex<FxHashMap<BeanId, Arc<BeanDefinition>>>,
}

impl MergeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merged(&self, bean: &Bean, context: &dyn LookupContext) -> Arc<BeanDefinition> {
        if let Some(merged) = self.entries.lock().get(bean.id()) {
            return merged.clone();
        }
        let merged = Arc::new(merged_bean_definition(bean, context));
        self.entries
            .lock()
            .entry(bean.id().clone())
            .or_insert(merged)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use smol_str::SmolStr;

    use super::*;
    use crate::base::SourceLocation;
    use crate::resolve::tests_support::{StaticContext, context};
    use crate::syntax::{PropertyValue, RawValue};

    fn definition(class_name: Option<&str>, parent: Option<&str>, props: &[(&str, &str)]) -> BeanDefinition {
        let mut definition = BeanDefinition::new(SourceLocation::at_line("test.xml", 1));
        definition.class_name = class_name.map(SmolStr::new);
        definition.parent_name = parent.map(SmolStr::new);
        for (name, value) in props {
            definition.add_property(PropertyValue::new(
                *name,
                RawValue::string(*value),
                SourceLocation::at_line("test.xml", 1),
            ));
        }
        definition
    }

    fn property(definition: &BeanDefinition, name: &str) -> Option<String> {
        definition
            .property(name)
            .and_then(|p| p.value.as_str().map(str::to_owned))
    }

    #[test]
    fn test_child_inherits_and_overrides() {
        let ctx = StaticContext::default()
            .with_definition("base", definition(Some("Foo"), None, &[("x", "1"), ("y", "0")]))
            .with_definition("child", definition(None, Some("base"), &[("y", "2")]));
        let merged = merged_bean_definition(&ctx.resolve("child").unwrap(), &ctx);

        assert_eq!(merged.class_name.as_deref(), Some("Foo"));
        assert_eq!(property(&merged, "x").as_deref(), Some("1"));
        assert_eq!(property(&merged, "y").as_deref(), Some("2"));
        assert!(!merged.is_child());
    }

    #[test]
    fn test_three_level_chain_applies_root_first() {
        let ctx = StaticContext::default()
            .with_definition("a", definition(Some("A"), None, &[("p", "a"), ("q", "a")]))
            .with_definition("b", definition(Some("B"), Some("a"), &[("p", "b")]))
            .with_definition("c", definition(None, Some("b"), &[("q", "c")]));
        let merged = merged_bean_definition(&ctx.resolve("c").unwrap(), &ctx);

        assert_eq!(merged.class_name.as_deref(), Some("B"));
        assert_eq!(property(&merged, "p").as_deref(), Some("b"));
        assert_eq!(property(&merged, "q").as_deref(), Some("c"));
    }

    #[test]
    fn test_parent_found_through_alias() {
        let ctx = StaticContext::default()
            .with_definition("base", definition(Some("Foo"), None, &[]))
            .with_definition("child", definition(None, Some("b"), &[]))
            .with_alias("b", "base");
        let merged = merged_bean_definition(&ctx.resolve("child").unwrap(), &ctx);
        assert_eq!(merged.class_name.as_deref(), Some("Foo"));
    }

    #[test]
    fn test_cycle_and_missing_parent_return_original() {
        let ctx = context(&[("x", None, Some("y")), ("y", None, Some("x")), ("m", None, Some("missing")), ("s", None, Some("s"))]);
        for name in ["x", "m", "s"] {
            let bean = ctx.resolve(name).unwrap();
            assert_eq!(&merged_bean_definition(&bean, &ctx), bean.definition());
        }
    }

    #[test]
    fn test_cache_memoizes() {
        let ctx = context(&[("base", Some("Foo"), None), ("child", None, Some("base"))]);
        let cache = MergeCache::new();
        let child = ctx.resolve("child").unwrap();
        let first = cache.merged(&child, &ctx);
        let second = cache.merged(&child, &ctx);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }
}
