//! Input types for an analysis session.

use std::sync::Arc;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::base::FileId;

/// The set of all source files in the snapshot.
///
/// This is an input — the host sets it explicitly, and analysis derives
/// from it. Paths are kept only for display in errors and diagnostics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceRoot {
    files: IndexMap<FileId, Arc<str>>,
}

impl SourceRoot {
    /// Create a new empty source root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file to the source root.
    pub fn insert(&mut self, file: FileId, path: impl Into<Arc<str>>) {
        self.files.insert(file, path.into());
    }

    /// Remove a file from the source root.
    pub fn remove(&mut self, file: FileId) -> Option<Arc<str>> {
        self.files.swap_remove(&file)
    }

    /// Get the path for a file.
    pub fn path(&self, file: FileId) -> Option<&str> {
        self.files.get(&file).map(|s| s.as_ref())
    }

    /// Check if a file exists in the source root.
    pub fn contains(&self, file: FileId) -> bool {
        self.files.contains_key(&file)
    }

    /// Iterate over all files.
    pub fn iter(&self) -> impl Iterator<Item = (FileId, &str)> + '_ {
        self.files.iter().map(|(&id, path)| (id, path.as_ref()))
    }

    /// Get the number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if the source root is empty.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Session configuration.
///
/// The default importing scopes are configuration, not syntax: every file
/// sees them without writing an import. They are also the reason those
/// scopes are "axiomatically large" — the presentation layer never itemizes
/// them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Fully qualified names imported individually into every file
    /// (`pkg.Name` form).
    pub default_simple_imports: Vec<SmolStr>,
    /// Packages star-imported into every file.
    pub default_star_imports: Vec<SmolStr>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_simple_imports: Vec::new(),
            default_star_imports: vec![
                SmolStr::new("kite"),
                SmolStr::new("kite.collections"),
                SmolStr::new("kite.text"),
            ],
        }
    }
}

impl AnalysisConfig {
    /// A configuration with no default imports at all. Default importing
    /// scopes still appear in every tower — empty.
    pub fn bare() -> Self {
        Self {
            default_simple_imports: Vec::new(),
            default_star_imports: Vec::new(),
        }
    }
}
