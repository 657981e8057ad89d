//! Minimal element tree built from quick-xml events.
//!
//! Keeps only what the bean interpreter needs: resolved namespace, local
//! name, attributes, text and 1-indexed start/end lines.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use rustc_hash::FxHashMap;

/// Error raised when the markup itself is broken.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TreeError {
    pub message: String,
    pub line: u32,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct XmlElement {
    pub local_name: String,
    pub namespace_uri: Option<String>,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    pub text: String,
    pub start_line: u32,
    pub end_line: u32,
}

impl XmlElement {
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute value, treating an empty string as absent.
    pub fn non_empty_attribute(&self, key: &str) -> Option<&str> {
        self.attribute(key).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attribute(key).is_some()
    }
}

/// Byte offset to line lookup.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(content: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(
            content
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { starts }
    }

    fn line_of(&self, offset: usize) -> u32 {
        self.starts.partition_point(|&start| start <= offset) as u32
    }
}

/// Parse `content` into its root element.
pub(crate) fn parse_tree(content: &str) -> Result<XmlElement, TreeError> {
    let lines = LineIndex::new(content);
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<(XmlElement, FxHashMap<String, String>)> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let event = reader.read_event();
        let position = reader.buffer_position() as usize;
        match event {
            Ok(Event::Start(ref e)) => {
                let start = position.saturating_sub(e.len() + 2);
                let (element, scope) = open_element(e, lines.line_of(start), &stack)?;
                stack.push((element, scope));
            }
            Ok(Event::Empty(ref e)) => {
                let start = position.saturating_sub(e.len() + 3);
                let (mut element, _) = open_element(e, lines.line_of(start), &stack)?;
                element.end_line = lines.line_of(position.saturating_sub(1));
                attach(element, &mut stack, &mut root);
            }
            Ok(Event::End(_)) => {
                if let Some((mut element, _)) = stack.pop() {
                    element.end_line = lines.line_of(position.saturating_sub(1));
                    attach(element, &mut stack, &mut root);
                }
            }
            Ok(Event::Text(ref t)) => {
                if let Some((top, _)) = stack.last_mut() {
                    let text = t.unescape().map_err(|e| TreeError {
                        message: e.to_string(),
                        line: lines.line_of(position),
                    })?;
                    top.text.push_str(&text);
                }
            }
            Ok(Event::CData(c)) => {
                if let Some((top, _)) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(TreeError {
                    message: e.to_string(),
                    line: lines.line_of(reader.error_position() as usize),
                });
            }
            _ => {}
        }
    }

    if let Some((open, _)) = stack.last() {
        return Err(TreeError {
            message: format!("Element '{}' is not closed", open.local_name),
            line: open.start_line,
        });
    }
    root.ok_or_else(|| TreeError {
        message: "Premature end of file".to_string(),
        line: 1,
    })
}

fn attach(
    element: XmlElement,
    stack: &mut [(XmlElement, FxHashMap<String, String>)],
    root: &mut Option<XmlElement>,
) {
    match stack.last_mut() {
        Some((parent, _)) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

fn open_element(
    e: &BytesStart<'_>,
    line: u32,
    stack: &[(XmlElement, FxHashMap<String, String>)],
) -> Result<(XmlElement, FxHashMap<String, String>), TreeError> {
    let error = |message: String| TreeError { message, line };
    let qname = std::str::from_utf8(e.name().as_ref())
        .map_err(|e| error(format!("Invalid tag name: {e}")))?
        .to_string();

    let mut scope = FxHashMap::default();
    let mut attributes = Vec::new();
    for attr_result in e.attributes() {
        let attr = attr_result.map_err(|e| error(format!("Attribute error: {e}")))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| error(format!("Attribute key error: {e}")))?;
        let value = attr
            .unescape_value()
            .map_err(|e| error(format!("Attribute value error: {e}")))?
            .into_owned();
        if key == "xmlns" {
            scope.insert(String::new(), value);
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            scope.insert(prefix.to_string(), value);
        } else {
            attributes.push((key.to_string(), value));
        }
    }

    let (prefix, local_name) = match qname.split_once(':') {
        Some((prefix, local)) => (prefix, local),
        None => ("", qname.as_str()),
    };
    let namespace_uri = scope.get(prefix).cloned().or_else(|| {
        stack
            .iter()
            .rev()
            .find_map(|(_, outer)| outer.get(prefix).cloned())
    });

    let element = XmlElement {
        local_name: local_name.to_string(),
        namespace_uri,
        attributes,
        start_line: line,
        end_line: line,
        ..XmlElement::default()
    };
    Ok((element, scope))
}
