//! Config discovery.
//!
//! A [`ConfigLocator`] produces the names of documents that should be
//! auto-detected as configs. Names are relative to the document source the
//! project reads through, with `/` separators.

use std::path::{Path, PathBuf};

use smol_str::SmolStr;
use tracing::{debug, trace};
use walkdir::WalkDir;

use super::settings::ProjectSettings;
use crate::error::ModelError;

pub trait ConfigLocator: Send + Sync {
    /// Stable id; auto-detected configs are grouped by it.
    fn id(&self) -> &str;

    /// Names of config documents, sorted.
    fn locate(&self, settings: &ProjectSettings) -> Result<Vec<SmolStr>, ModelError>;
}

/// Finds config files below a directory by suffix.
#[derive(Clone, Debug)]
pub struct DirectoryLocator {
    id: SmolStr,
    root: PathBuf,
    /// Subdirectories never descended into (e.g. `target`, `.git`).
    excluded: Vec<SmolStr>,
}

impl DirectoryLocator {
    pub fn new(id: impl Into<SmolStr>, root: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            root: root.into(),
            excluded: Vec::new(),
        }
    }

    pub fn with_excluded(mut self, directory: impl Into<SmolStr>) -> Self {
        self.excluded.push(directory.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn relative_name(&self, path: &Path) -> Option<SmolStr> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<&str> = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<_>>()?;
        Some(SmolStr::new(parts.join("/")))
    }
}

impl ConfigLocator for DirectoryLocator {
    fn id(&self) -> &str {
        &self.id
    }

    fn locate(&self, settings: &ProjectSettings) -> Result<Vec<SmolStr>, ModelError> {
        if !self.root.is_dir() {
            return Err(ModelError::locator(
                self.id.as_str(),
                format!("{} is not a directory", self.root.display()),
            ));
        }

        let walker = WalkDir::new(&self.root).into_iter().filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || entry
                    .file_name()
                    .to_str()
                    .is_none_or(|name| !self.excluded.iter().any(|e| e == name))
        });

        let mut names = Vec::new();
        for entry in walker.filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = self.relative_name(entry.path()) else {
                trace!(path = %entry.path().display(), "skipping non UTF-8 path");
                continue;
            };
            if settings.is_config_name(&name) {
                names.push(name);
            }
        }
        names.sort();
        debug!(locator = %self.id, found = names.len(), "config files located");
        Ok(names)
    }
}

/// A fixed list of names; handy for hosts that discover configs themselves.
#[derive(Clone, Debug)]
pub struct StaticLocator {
    id: SmolStr,
    names: Vec<SmolStr>,
}

impl StaticLocator {
    pub fn new<I, S>(id: impl Into<SmolStr>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        Self {
            id: id.into(),
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl ConfigLocator for StaticLocator {
    fn id(&self) -> &str {
        &self.id
    }

    fn locate(&self, settings: &ProjectSettings) -> Result<Vec<SmolStr>, ModelError> {
        let mut names: Vec<SmolStr> = self
            .names
            .iter()
            .filter(|n| settings.is_config_name(n))
            .cloned()
            .collect();
        names.sort();
        Ok(names)
    }
}
