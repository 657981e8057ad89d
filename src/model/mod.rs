//! In-memory model of bean configuration.
//!
//! This module builds the element tree the resolvers and the validator work
//! on:
//! - [`Config`] - One document, populated lazily and reloadable
//! - [`ConfigSet`] - Ordered group of configs merged into one namespace
//! - [`Bean`], [`Alias`], [`Component`] - Elements declared by a config
//! - [`ValueNode`] - Resolved argument and property values
//! - [`LookupContext`] - Name lookup shared by configs and config sets
//!
//! Elements are shared as `Arc`s and never mutated after creation. Changing a
//! document means reloading its config, which publishes a fresh element tree.

mod alias;
mod bean;
mod component;
mod config;
mod config_set;
mod context;
mod environment;
mod value;

pub use alias::Alias;
pub use bean::{Bean, BeanConstructorArgument, BeanId, BeanProperty};
pub use component::{Component, DefaultInterpreter, ElementInterpreter, Interpreted, NamespaceRegistry};
pub use config::{Config, ConfigContents, ConfigOrigin, Import, normalize_class_name, resolve_import_path};
pub use config_set::{ConfigResolver, ConfigSet};
pub use context::{ContextKind, LookupContext};
pub use environment::ConfigEnvironment;
pub use value::{MapEntry, TypedString, ValueNode, resolve_value, value_name};
