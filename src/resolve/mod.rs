//! Model utilities: algorithms over a [`LookupContext`](crate::model::LookupContext).
//!
//! - [`lookup`] - Bean lookup with alias fallback, class resolution through parents
//! - [`merge`] - Inheritance merge (`merged_bean_definition`) and a per-run cache
//! - [`references`] - Reference graph with cycle breaking
//!
//! Everything here is written once against the lookup capability, so the
//! same code serves a single config and a merged config set.

pub mod lookup;
pub mod merge;
pub mod references;

#[cfg(test)]
mod tests_support;

pub use lookup::{bean_class, config_sets_of, find_bean, first_constructor_argument, inner_beans};
pub use merge::{MergeCache, merged_bean_definition};
pub use references::{
    BeanReference, InterceptorRule, NamedReference, ReferenceElement, ReferenceKind,
    ReferenceResolver, ReferenceSource, SourceMember, bean_references, definition_references,
    value_references,
};
