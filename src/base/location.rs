/// Source location tracking for model elements
///
/// The markup reader hands every parse event a location token. The model only
/// ever asks it for the resource and the line numbers, so the token is a plain
/// value type here.
use std::fmt;
use std::sync::Arc;

/// Name of the resource (document) an element was read from.
///
/// Cheap to clone; identical names compare equal regardless of allocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceName(Arc<str>);

impl ResourceName {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ResourceName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// A location in a source document (1-indexed lines, `0` when unknown)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub resource: ResourceName,
    pub start_line: u32,
    pub end_line: u32,
}

impl SourceLocation {
    pub fn new(resource: impl Into<ResourceName>, start_line: u32, end_line: u32) -> Self {
        Self {
            resource: resource.into(),
            start_line,
            end_line: end_line.max(start_line),
        }
    }

    /// Create a location spanning a single line
    pub fn at_line(resource: impl Into<ResourceName>, line: u32) -> Self {
        Self::new(resource, line, line)
    }

    /// Location of a whole resource, used when no finer position is known
    pub fn unknown(resource: impl Into<ResourceName>) -> Self {
        Self::new(resource, 0, 0)
    }

    pub fn start_line(&self) -> u32 {
        self.start_line
    }

    pub fn resource(&self) -> &ResourceName {
        &self.resource
    }

    /// Check if a line falls within this location
    pub fn contains_line(&self, line: u32) -> bool {
        line >= self.start_line && line <= self.end_line
    }
}
