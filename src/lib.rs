//! # beanscope
//!
//! Core library for modelling, merging and validating declarative
//! bean-wiring configuration files.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! validation → Scratch registry, diagnostics, Validator with cancellation
//!   ↓
//! resolve    → Lookup with alias fallback, inheritance merge, reference graph
//!   ↓
//! project    → Project, BeansModel registry, config locators
//!   ↓
//! model      → Bean, values, Alias, Component, Config, ConfigSet, LookupContext
//!   ↓
//! syntax     → Raw bean definitions, document events, document sources, XML reader
//!   ↓
//! types      → TypeQuery trait, in-memory TypeIndex
//!   ↓
//! base       → SourceLocation, Diagnostic, constants, placeholder and property paths
//! ```

// ============================================================================
// MODULES (dependency order: base → types → syntax → model → project → resolve → validation)
// ============================================================================

/// Foundation types: SourceLocation, Diagnostic, constants
pub mod base;

/// Type-system collaborator: TypeQuery, TypeIndex
pub mod types;

/// Raw definitions and document events, document sources, XML reader
pub mod syntax;

/// Semantic model: beans, configs, config sets
pub mod model;

/// Project management: projects, model registry, locators
pub mod project;

/// Model utilities: lookup, inheritance merge, reference graph
pub mod resolve;

/// Validation of configs within their config sets
pub mod validation;

mod error;

pub use error::ModelError;

// Re-export the types most hosts touch
pub use base::{Diagnostic, ResourceName, Severity, SourceLocation, codes};
pub use model::{Bean, Config, ConfigEnvironment, ConfigSet, LookupContext};
pub use project::{BeansModel, Project, ProjectSettings};
pub use types::{TypeIndex, TypeQuery};
pub use validation::{ValidationError, Validator, ValidatorSettings};
