use smol_str::SmolStr;

use crate::base::constants::DEFAULT_CONFIG_SUFFIXES;

/// Per-project settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectSettings {
    /// Read `<import>`ed documents as sub-configs.
    pub imports_enabled: bool,
    /// File suffixes (without the dot) locators treat as config documents.
    pub config_suffixes: Vec<SmolStr>,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            imports_enabled: true,
            config_suffixes: DEFAULT_CONFIG_SUFFIXES.iter().map(|s| SmolStr::new(s)).collect(),
        }
    }
}

impl ProjectSettings {
    pub fn with_imports_enabled(mut self, enabled: bool) -> Self {
        self.imports_enabled = enabled;
        self
    }

    pub fn with_config_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.config_suffixes = suffixes.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `name` ends in one of the configured suffixes.
    pub fn is_config_name(&self, name: &str) -> bool {
        self.config_suffixes.iter().any(|suffix| {
            name.strip_suffix(suffix.as_str())
                .is_some_and(|stem| stem.ends_with('.') && stem.len() > 1)
        })
    }
}
