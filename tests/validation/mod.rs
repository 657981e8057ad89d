//! Validator tests: end-to-end scenarios over in-memory projects.

pub mod tests_config_sets;
pub mod tests_scenarios;
