//! XML reader for `<beans>` documents.
//!
//! Two passes: quick-xml events are folded into a small element tree with
//! line numbers, then the tree is interpreted into [`DocumentEvent`]s.
//! Broken markup yields a single [`DocumentEvent::Fatal`].

mod interpret;
mod tree;

use tracing::warn;

use super::events::{DocumentEvent, Problem};
use super::reader::DocumentReader;
use super::source::Document;
use crate::base::{ResourceName, SourceLocation};

/// [`DocumentReader`] for Spring-style `<beans>` markup.
#[derive(Clone, Copy, Debug, Default)]
pub struct XmlReader;

impl XmlReader {
    pub fn new() -> Self {
        Self
    }

    /// Read markup directly, without a [`Document`].
    pub fn read_str(&self, resource: impl Into<ResourceName>, content: &str) -> Vec<DocumentEvent> {
        let resource = resource.into();
        match tree::parse_tree(content) {
            Ok(root) => interpret::BeansInterpreter::new(resource).interpret(&root),
            Err(error) => {
                warn!(resource = %resource, line = error.line, "malformed document: {}", error.message);
                vec![DocumentEvent::Fatal(Problem::error(
                    error.message,
                    SourceLocation::at_line(resource, error.line),
                ))]
            }
        }
    }
}

impl DocumentReader for XmlReader {
    fn read(&self, document: &Document) -> Vec<DocumentEvent> {
        self.read_str(&*document.name, &document.content)
    }
}
