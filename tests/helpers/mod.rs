//! Shared test helpers: in-memory workspaces, type fixtures, diagnostic assertions.

pub mod diagnostic_helpers;
pub mod source_fixtures;
pub mod workspace;
