//! Document readers turn loaded content into the parse event stream.

use rustc_hash::FxHashMap;

use super::events::{DocumentEvent, Problem};
use super::source::Document;
use crate::base::SourceLocation;

/// Converts a document into parse events.
///
/// Readers never fail: unreadable content is reported as a
/// [`DocumentEvent::Fatal`] event.
pub trait DocumentReader: Send + Sync {
    fn read(&self, document: &Document) -> Vec<DocumentEvent>;
}

/// Reader replaying pre-built event streams, keyed by resource name.
///
/// For hosts that parse documents elsewhere and only hand over the events.
#[derive(Clone, Debug, Default)]
pub struct ScriptedReader {
    scripts: FxHashMap<String, Vec<DocumentEvent>>,
}

impl ScriptedReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, events: Vec<DocumentEvent>) -> Self {
        self.scripts.insert(name.into(), events);
        self
    }
}

impl DocumentReader for ScriptedReader {
    fn read(&self, document: &Document) -> Vec<DocumentEvent> {
        match self.scripts.get(&*document.name) {
            Some(events) => events.clone(),
            None => vec![DocumentEvent::Fatal(Problem::error(
                format!("No events recorded for '{}'", document.name),
                SourceLocation::unknown(&*document.name),
            ))],
        }
    }
}
