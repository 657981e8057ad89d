//! Raw values as produced by the document reader.
//!
//! These mirror the markup one to one; the model layer turns them into
//! value nodes (see `model::value`).

use smol_str::SmolStr;

use super::definition::BeanDefinitionHolder;

/// A property or constructor-argument value before resolution.
#[derive(Clone, Debug, PartialEq)]
pub enum RawValue {
    /// Literal string, optionally with a declared target type.
    TypedString {
        value: SmolStr,
        type_name: Option<SmolStr>,
    },
    /// `<ref bean="x"/>` or `ref="x"`; `to_parent` for `<ref parent="x"/>`.
    Reference { bean_name: SmolStr, to_parent: bool },
    /// `<idref bean="x"/>`: the bean name itself is the value.
    NameReference { bean_name: SmolStr },
    /// Anonymous bean nested in the value.
    InnerBean(Box<BeanDefinitionHolder>),
    List(Vec<RawValue>),
    Set(Vec<RawValue>),
    Map(Vec<(RawValue, RawValue)>),
    Properties(Vec<(SmolStr, SmolStr)>),
    Null,
}

impl RawValue {
    pub fn string(value: impl Into<SmolStr>) -> Self {
        Self::TypedString {
            value: value.into(),
            type_name: None,
        }
    }

    pub fn reference(bean_name: impl Into<SmolStr>) -> Self {
        Self::Reference {
            bean_name: bean_name.into(),
            to_parent: false,
        }
    }

    pub fn inner_bean(holder: BeanDefinitionHolder) -> Self {
        Self::InnerBean(Box::new(holder))
    }

    /// The literal string if this is a typed string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RawValue::TypedString { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Names of all beans referenced anywhere inside this value, inner beans excluded.
    pub fn referenced_bean_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_references(&mut names);
        names
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            RawValue::Reference { bean_name, .. } | RawValue::NameReference { bean_name } => {
                out.push(bean_name)
            }
            RawValue::List(items) | RawValue::Set(items) => {
                for item in items {
                    item.collect_references(out);
                }
            }
            RawValue::Map(entries) => {
                for (key, value) in entries {
                    key.collect_references(out);
                    value.collect_references(out);
                }
            }
            RawValue::TypedString { .. }
            | RawValue::InnerBean(_)
            | RawValue::Properties(_)
            | RawValue::Null => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referenced_names_walk_collections() {
        let value = RawValue::Map(vec![
            (RawValue::reference("k"), RawValue::string("v")),
            (
                RawValue::string("x"),
                RawValue::List(vec![
                    RawValue::reference("a"),
                    RawValue::NameReference {
                        bean_name: "b".into(),
                    },
                ]),
            ),
        ]);
        assert_eq!(value.referenced_bean_names(), vec!["k", "a", "b"]);
    }

    #[test]
    fn test_as_str() {
        assert_eq!(RawValue::string("1").as_str(), Some("1"));
        assert_eq!(RawValue::Null.as_str(), None);
    }
}
