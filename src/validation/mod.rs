//! Validation: diagnostics for a config in the context of its config sets.
//!
//! - [`Validator`] - Per-config and per-project validation with cooperative cancellation
//! - [`ScratchRegistry`] - Name and alias table rebuilt for every validation pass
//! - [`DiagnosticCollector`] - Accumulates and deduplicates diagnostics
//! - [`ValidatorSettings`] - Ignorable beans, interceptor rules, factory contract

mod diagnostics;
mod registry;
mod settings;
mod validator;

pub use diagnostics::{DiagnosticCollector, SUBJECT_KEY};
pub use registry::{RegistryError, ScratchRegistry};
pub use settings::ValidatorSettings;
pub use validator::{ValidationError, Validator};
