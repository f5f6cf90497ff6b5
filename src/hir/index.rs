//! The package symbol index — the cross-file lookup the external-conflict
//! pass queries.
//!
//! [`PackageSymbolIndex`] is the abstraction; [`PackageIndex`] is the
//! in-crate implementation: a per-package index over top-level declarations
//! with per-file add/remove, so hosts can rebuild the affected file on every
//! structural edit. Name buckets are insertion-ordered — enumeration order
//! is part of the contract, because the conflict pass must process
//! candidates deterministically.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::base::{FileId, Name};
use super::error::UnresolvedExternalSymbol;
use super::ids::DeclId;
use super::symbols::{DeclKind, Declarations};

/// Push-style enumeration of same-named top-level symbols of one package.
///
/// `resolve_declaration` forces a symbol to its fully resolved declaration;
/// it is synchronous and may block on the host's resolution machinery. A
/// failed resolution must not abort the caller's pass.
pub trait PackageSymbolIndex {
    fn process_functions_by_name(&self, name: Name, f: &mut dyn FnMut(DeclId));
    fn process_properties_by_name(&self, name: Name, f: &mut dyn FnMut(DeclId));
    fn process_classifiers_by_name(&self, name: Name, f: &mut dyn FnMut(DeclId));

    /// Force a symbol to its resolved declaration (blocking).
    fn resolve_declaration(&self, symbol: DeclId) -> Result<DeclId, UnresolvedExternalSymbol>;

    /// The file containing a declaration, if the index knows it.
    fn containing_file(&self, decl: DeclId) -> Option<FileId>;
}

/// Externally supplied visibility predicate.
pub trait VisibilityFilter {
    fn is_visible(&self, decl: DeclId, from: FileId) -> bool;
}

/// The permissive filter: everything is visible everywhere.
#[derive(Copy, Clone, Debug, Default)]
pub struct AlwaysVisible;

impl VisibilityFilter for AlwaysVisible {
    fn is_visible(&self, _decl: DeclId, _from: FileId) -> bool {
        true
    }
}

/// In-crate [`PackageSymbolIndex`] over one package's top-level declarations.
#[derive(Debug, Default)]
pub struct PackageIndex {
    package: Option<Name>,
    functions: IndexMap<Name, Vec<DeclId>>,
    properties: IndexMap<Name, Vec<DeclId>>,
    classifiers: IndexMap<Name, Vec<DeclId>>,
    by_file: FxHashMap<FileId, Vec<DeclId>>,
    containing_file: FxHashMap<DeclId, FileId>,
}

impl PackageIndex {
    /// Create an index for one package; `None` is the root package.
    pub fn new(package: Option<Name>) -> Self {
        Self {
            package,
            ..Self::default()
        }
    }

    /// Index the top-level declarations of a file that belong to this
    /// index's package. Re-adding a file replaces its previous entries.
    pub fn add_file(&mut self, decls: &Declarations, file: FileId) {
        self.remove_file(file);

        let mut file_decls = Vec::new();
        for &id in decls.decls_in_file(file) {
            let decl = decls.get(id);
            if decl.container.is_some() {
                continue;
            }
            if let Some(package) = self.package {
                if decls.package_of(id) != Some(package) {
                    continue;
                }
            }
            let bucket = match &decl.kind {
                DeclKind::Function { .. } => &mut self.functions,
                DeclKind::Property { .. } => &mut self.properties,
                DeclKind::Class { .. } | DeclKind::TypeAlias { .. } => &mut self.classifiers,
                DeclKind::Constructor { .. } => continue,
            };
            bucket.entry(decl.name).or_default().push(id);
            self.containing_file.insert(id, file);
            file_decls.push(id);
        }
        self.by_file.insert(file, file_decls);
    }

    /// Remove all of a file's entries.
    pub fn remove_file(&mut self, file: FileId) {
        let Some(ids) = self.by_file.remove(&file) else {
            return;
        };
        for id in ids {
            self.containing_file.remove(&id);
            for bucket in [&mut self.functions, &mut self.properties, &mut self.classifiers] {
                bucket.retain(|_, entries| {
                    entries.retain(|&e| e != id);
                    !entries.is_empty()
                });
            }
        }
    }

    /// Number of indexed declarations.
    pub fn len(&self) -> usize {
        self.containing_file.len()
    }

    /// Whether the index holds nothing.
    pub fn is_empty(&self) -> bool {
        self.containing_file.is_empty()
    }
}

impl PackageSymbolIndex for PackageIndex {
    fn process_functions_by_name(&self, name: Name, f: &mut dyn FnMut(DeclId)) {
        if let Some(entries) = self.functions.get(&name) {
            entries.iter().copied().for_each(f);
        }
    }

    fn process_properties_by_name(&self, name: Name, f: &mut dyn FnMut(DeclId)) {
        if let Some(entries) = self.properties.get(&name) {
            entries.iter().copied().for_each(f);
        }
    }

    fn process_classifiers_by_name(&self, name: Name, f: &mut dyn FnMut(DeclId)) {
        if let Some(entries) = self.classifiers.get(&name) {
            entries.iter().copied().for_each(f);
        }
    }

    fn resolve_declaration(&self, symbol: DeclId) -> Result<DeclId, UnresolvedExternalSymbol> {
        // Declarations behind this index are already in final form.
        Ok(symbol)
    }

    fn containing_file(&self, decl: DeclId) -> Option<FileId> {
        self.containing_file.get(&decl).copied()
    }
}
