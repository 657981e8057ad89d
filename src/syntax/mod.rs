//! Syntax layer: raw bean definitions and the parse event stream.
//!
//! The markup parser is an external collaborator. Everything above this
//! layer consumes [`DocumentEvent`]s, never markup:
//!
//! ```text
//! DocumentSource ──read──▶ Document ──DocumentReader──▶ Vec<DocumentEvent>
//! ```
//!
//! [`XmlReader`] (feature `xml`) is the bundled reader for `<beans>` markup;
//! [`ScriptedReader`] replays events produced elsewhere.

pub mod definition;
pub mod events;
mod reader;
mod source;
pub mod value;
#[cfg(feature = "xml")]
mod xml;

pub use definition::{
    Autowire, BeanDefinition, BeanDefinitionHolder, ConstructorArgument, ConstructorArgumentValues,
    DefinitionError, MethodOverride, PropertyValue, Role,
};
pub use events::{ComponentDefinition, DocumentDefaults, DocumentEvent, Problem};
pub use reader::{DocumentReader, ScriptedReader};
pub use source::{Document, DocumentError, DocumentSource, FileSystemDocuments, InMemoryDocuments};
pub use value::RawValue;
#[cfg(feature = "xml")]
pub use xml::XmlReader;
