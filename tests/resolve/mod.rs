//! Model utility tests: inheritance merge and reference graph.

pub mod tests_merge;
pub mod tests_references;
