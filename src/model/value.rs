//! Value resolver: raw values into typed value nodes.
//!
//! Inner beans become real [`Bean`]s identified relative to their owner, so
//! the reference walk and the validator can treat them like any other bean.

use std::sync::Arc;

use smol_str::SmolStr;

use super::bean::{Bean, BeanId};
use crate::syntax::RawValue;

/// A literal value with an optional declared target type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypedString {
    pub value: SmolStr,
    pub type_name: Option<SmolStr>,
}

/// Entry of a map value. Keys may be any value.
#[derive(Clone, Debug)]
pub struct MapEntry {
    pub key: ValueNode,
    pub value: ValueNode,
}

/// Resolved value held by a constructor argument or property.
#[derive(Clone, Debug)]
pub enum ValueNode {
    TypedString(TypedString),
    /// Runtime reference to another bean.
    Reference { bean_name: SmolStr, to_parent: bool },
    /// The bean name itself used as a value (`<idref>`).
    NameReference { bean_name: SmolStr },
    InnerBean(Arc<Bean>),
    List(Vec<ValueNode>),
    Set(Vec<ValueNode>),
    Map(Vec<MapEntry>),
    Properties(Vec<(SmolStr, SmolStr)>),
    Null,
}

impl ValueNode {
    pub fn as_typed_string(&self) -> Option<&str> {
        match self {
            ValueNode::TypedString(s) => Some(&s.value),
            _ => None,
        }
    }

    /// Referenced bean name for `Reference` and `NameReference`.
    pub fn referenced_bean_name(&self) -> Option<&str> {
        match self {
            ValueNode::Reference { bean_name, .. } | ValueNode::NameReference { bean_name } => {
                Some(bean_name)
            }
            _ => None,
        }
    }

    /// Inner beans nested directly in this value (not inside other inner beans).
    pub fn inner_beans(&self) -> Vec<Arc<Bean>> {
        let mut out = Vec::new();
        self.collect_inner_beans(&mut out);
        out
    }

    fn collect_inner_beans(&self, out: &mut Vec<Arc<Bean>>) {
        match self {
            ValueNode::InnerBean(bean) => out.push(bean.clone()),
            ValueNode::List(items) | ValueNode::Set(items) => {
                for item in items {
                    item.collect_inner_beans(out);
                }
            }
            ValueNode::Map(entries) => {
                for entry in entries {
                    entry.key.collect_inner_beans(out);
                    entry.value.collect_inner_beans(out);
                }
            }
            _ => {}
        }
    }
}

/// Convert a raw value into a value node owned by `owner`.
pub fn resolve_value(owner: &BeanId, raw: &RawValue) -> ValueNode {
    match raw {
        RawValue::TypedString { value, type_name } => ValueNode::TypedString(TypedString {
            value: value.clone(),
            type_name: type_name.clone(),
        }),
        RawValue::Reference {
            bean_name,
            to_parent,
        } => ValueNode::Reference {
            bean_name: bean_name.clone(),
            to_parent: *to_parent,
        },
        RawValue::NameReference { bean_name } => ValueNode::NameReference {
            bean_name: bean_name.clone(),
        },
        RawValue::InnerBean(holder) => {
            let id = BeanId::inner(owner, holder.definition.location.start_line);
            ValueNode::InnerBean(Arc::new(Bean::inner(id, (**holder).clone())))
        }
        RawValue::List(items) => {
            ValueNode::List(items.iter().map(|i| resolve_value(owner, i)).collect())
        }
        RawValue::Set(items) => {
            ValueNode::Set(items.iter().map(|i| resolve_value(owner, i)).collect())
        }
        RawValue::Map(entries) => ValueNode::Map(
            entries
                .iter()
                .map(|(k, v)| MapEntry {
                    key: resolve_value(owner, k),
                    value: resolve_value(owner, v),
                })
                .collect(),
        ),
        RawValue::Properties(props) => ValueNode::Properties(props.clone()),
        RawValue::Null => ValueNode::Null,
    }
}

/// Short display form of a value, as shown in outlines and messages.
pub fn value_name(value: &ValueNode) -> String {
    match value {
        ValueNode::TypedString(s) => format!("\"{}\"", s.value),
        ValueNode::InnerBean(bean) => match (bean.class_name(), bean.parent_name()) {
            (Some(class), _) => format!("bean [{class}]"),
            (None, parent) => format!("bean <{}>", parent.unwrap_or_default()),
        },
        ValueNode::Reference { bean_name, .. } => format!("reference <{bean_name}>"),
        ValueNode::NameReference { bean_name } => format!("idref <{bean_name}>"),
        ValueNode::Null => "<null>".to_string(),
        ValueNode::List(items) | ValueNode::Set(items) => {
            let joined = items.iter().map(value_name).collect::<Vec<_>>().join(", ");
            abbreviate(&format!("[{joined}]"))
        }
        ValueNode::Map(entries) => {
            let joined = entries
                .iter()
                .map(|e| format!("{}={}", value_name(&e.key), value_name(&e.value)))
                .collect::<Vec<_>>()
                .join(", ");
            abbreviate(&format!("{{{joined}}}"))
        }
        ValueNode::Properties(props) => {
            let joined = props
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(", ");
            abbreviate(&format!("{{{joined}}}"))
        }
    }
}

/// Keep long values readable: first 12 and last 13 characters.
fn abbreviate(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= 30 {
        return text.to_string();
    }
    let head: String = chars[..12].iter().collect();
    let tail: String = chars[chars.len() - 13..].iter().collect();
    format!("{head} .. {tail}")
}
