//! Foundation types for the beanscope toolchain.
//!
//! This module provides fundamental types used throughout the model:
//! - [`SourceLocation`], [`ResourceName`] - Opaque source positions handed out by the reader
//! - [`Diagnostic`], [`Severity`], [`codes`] - Problems reported by the reader and the validator
//! - [`placeholder`] - `${...}` placeholder and `&factory` sigil detection
//! - [`property_path`] - Nested/indexed property path parsing (`foo.bar`, `foo[key]`)
//! - Domain constants (defaults, well-known type names, sigils)
//!
//! This module has NO dependencies on other beanscope modules.

pub mod constants;
mod diagnostic;
mod location;
pub mod placeholder;
pub mod property_path;

pub use diagnostic::{Diagnostic, Severity, codes};
pub use location::{ResourceName, SourceLocation};
pub use placeholder::{has_placeholder, is_factory_bean_reference, is_placeholder};
pub use property_path::{PropertyTokens, nested_property_separator_index, property_name_tokens};
