//! Property path parsing.
//!
//! Property names may address nested (`address.street`) and indexed or
//! mapped (`items[0]`, `map['a.b']`) properties. The validator only checks the
//! accessor of the leading segment, so all we need is the first separator and
//! the actual name of a segment with its keys stripped.

use super::constants::{NESTED_PROPERTY_SEPARATOR, PROPERTY_KEY_PREFIX, PROPERTY_KEY_SUFFIX};

/// Tokens of a single property path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyTokens {
    /// Name without any keys, e.g. `map` for `map[key]`.
    pub actual_name: String,
    /// Canonical form with normalized (unquoted) keys.
    pub canonical_name: String,
    /// Keys in order of appearance, quotes removed.
    pub keys: Vec<String>,
}

impl PropertyTokens {
    pub fn has_keys(&self) -> bool {
        !self.keys.is_empty()
    }
}

/// Index of the first (or last) nested property separator, ignoring dots
/// inside keys like `map[my.key]`.
pub fn nested_property_separator_index(path: &str, last: bool) -> Option<usize> {
    let mut in_key = false;
    let chars: Vec<(usize, char)> = path.char_indices().collect();
    let iter: Box<dyn Iterator<Item = &(usize, char)>> = if last {
        Box::new(chars.iter().rev())
    } else {
        Box::new(chars.iter())
    };
    for &(idx, c) in iter {
        match c {
            PROPERTY_KEY_PREFIX | PROPERTY_KEY_SUFFIX => in_key = !in_key,
            NESTED_PROPERTY_SEPARATOR if !in_key => return Some(idx),
            _ => {}
        }
    }
    None
}

/// Split a property segment into its actual name and keys.
pub fn property_name_tokens(property_name: &str) -> PropertyTokens {
    let mut actual_name: Option<&str> = None;
    let mut keys = Vec::new();
    let mut search_from = 0;

    while let Some(rel_start) = property_name[search_from..].find(PROPERTY_KEY_PREFIX) {
        let key_start = search_from + rel_start;
        let Some(rel_end) = property_name[key_start + 1..].find(PROPERTY_KEY_SUFFIX) else {
            break;
        };
        let key_end = key_start + 1 + rel_end;
        if actual_name.is_none() {
            actual_name = Some(&property_name[..key_start]);
        }
        keys.push(unquote(&property_name[key_start + 1..key_end]).to_string());
        search_from = key_end + 1;
    }

    let actual_name = actual_name.unwrap_or(property_name).to_string();
    let mut canonical_name = actual_name.clone();
    for key in &keys {
        canonical_name.push(PROPERTY_KEY_PREFIX);
        canonical_name.push_str(key);
        canonical_name.push(PROPERTY_KEY_SUFFIX);
    }

    PropertyTokens {
        actual_name,
        canonical_name,
        keys,
    }
}

fn unquote(key: &str) -> &str {
    for quote in ['\'', '"'] {
        if key.len() >= 2 && key.starts_with(quote) && key.ends_with(quote) {
            return &key[1..key.len() - 1];
        }
    }
    key
}
