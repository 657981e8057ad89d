//! Model layer tests
//!
//! - Lazy population and reload of configs
//! - Config set merge and override policy
//! - Model registry fan-out and staleness

pub mod tests_config;
pub mod tests_config_set;
pub mod tests_registry;
