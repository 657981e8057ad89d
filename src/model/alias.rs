use smol_str::SmolStr;

use crate::base::{ResourceName, SourceLocation};

/// Alias binding `name` to a target bean, scoped to the config declaring it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Alias {
    pub name: SmolStr,
    pub bean_name: SmolStr,
    pub location: SourceLocation,
}

impl Alias {
    pub fn new(name: impl Into<SmolStr>, bean_name: impl Into<SmolStr>, location: SourceLocation) -> Self {
        Self {
            name: name.into(),
            bean_name: bean_name.into(),
            location,
        }
    }

    pub fn resource(&self) -> &ResourceName {
        &self.location.resource
    }
}
