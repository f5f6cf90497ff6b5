//! A reference [`ScopeProvider`] over the declarations arena.
//!
//! Hosts with their own symbol infrastructure implement [`ScopeProvider`]
//! themselves; this one derives every primitive scope from [`Declarations`]
//! containment plus registered imports and locals, and is what the tests
//! build towers with.
//!
//! There is no inheritance model here, so `member_scope` and
//! `declared_member_scope` coincide.

use rustc_hash::FxHashMap;

use crate::base::{FileId, Interner, Name};
use crate::syntax::SyntaxNodeId;
use super::input::AnalysisConfig;
use super::ids::DeclId;
use super::scope::{Scope, ScopeEntry};
use super::symbols::{DeclKind, DeclOrigin, Declarations, SyntheticKind};
use super::tower::ScopeProvider;
use super::types::{TyId, TyKind, TyStore};

/// The resolved import directives of one file.
#[derive(Clone, Debug, Default)]
pub struct FileImports {
    /// `import pkg.Name` — (package, imported name) pairs.
    pub simple: Vec<(Name, Name)>,
    /// `import pkg.*` — star-imported packages.
    pub star: Vec<Name>,
}

/// Derives scopes from the declarations arena.
///
/// Build it once the snapshot's declarations are all allocated; the package
/// partition is computed at construction.
pub struct DeclarationScopeProvider<'a> {
    decls: &'a Declarations,
    types: &'a TyStore,
    interner: &'a Interner,
    config: &'a AnalysisConfig,
    root_package: Name,
    by_package: FxHashMap<Name, Vec<DeclId>>,
    imports: FxHashMap<FileId, FileImports>,
    locals: FxHashMap<(FileId, SyntaxNodeId), Vec<DeclId>>,
}

impl<'a> DeclarationScopeProvider<'a> {
    pub fn new(
        decls: &'a Declarations,
        types: &'a TyStore,
        interner: &'a Interner,
        config: &'a AnalysisConfig,
    ) -> Self {
        let mut by_package: FxHashMap<Name, Vec<DeclId>> = FxHashMap::default();
        for (id, decl) in decls.iter() {
            if decl.container.is_none() && !matches!(decl.kind, DeclKind::Constructor { .. }) {
                if let Some(package) = decls.package_of(id) {
                    by_package.entry(package).or_default().push(id);
                }
            }
        }
        Self {
            decls,
            types,
            interner,
            config,
            root_package: interner.intern(""),
            by_package,
            imports: FxHashMap::default(),
            locals: FxHashMap::default(),
        }
    }

    /// Register a file's resolved import directives.
    pub fn add_file_imports(&mut self, file: FileId, imports: FileImports) {
        self.imports.insert(file, imports);
    }

    /// Register a local declaration introduced by a block-like node.
    pub fn add_local(&mut self, file: FileId, node: SyntaxNodeId, decl: DeclId) {
        self.locals.entry((file, node)).or_default().push(decl);
    }

    fn scope_of(&self, ids: impl IntoIterator<Item = DeclId>) -> Scope {
        let mut builder = Scope::builder();
        for id in ids {
            let decl = self.decls.get(id);
            if decl.kind.is_classifier() {
                builder.add_classifier(decl.name, ScopeEntry::Decl(id));
            } else {
                builder.add_callable(decl.name, ScopeEntry::Decl(id));
            }
        }
        builder.build()
    }

    fn package_members(&self, package: Name) -> &[DeclId] {
        self.by_package.get(&package).map(Vec::as_slice).unwrap_or(&[])
    }

    fn single_import_scope(&self, pairs: impl Iterator<Item = (Name, Name)>) -> Scope {
        let mut builder = Scope::builder();
        for (package, name) in pairs {
            for &id in self.package_members(package) {
                let decl = self.decls.get(id);
                if decl.name != name {
                    continue;
                }
                if decl.kind.is_classifier() {
                    builder.add_classifier(decl.name, ScopeEntry::Decl(id));
                } else {
                    builder.add_callable(decl.name, ScopeEntry::Decl(id));
                }
            }
        }
        builder.build()
    }
}

impl ScopeProvider for DeclarationScopeProvider<'_> {
    fn member_scope(&self, class: DeclId) -> Scope {
        match &self.decls.get(class).kind {
            DeclKind::Class { members, .. } => self.scope_of(members.iter().copied()),
            _ => Scope::empty(),
        }
    }

    fn delegated_member_scope(&self, class: DeclId) -> Scope {
        match &self.decls.get(class).kind {
            DeclKind::Class { members, .. } => self.scope_of(members.iter().copied().filter(|&m| {
                self.decls.get(m).origin == DeclOrigin::Synthetic(SyntheticKind::DelegationField)
            })),
            _ => Scope::empty(),
        }
    }

    fn static_member_scope(&self, class: DeclId) -> Scope {
        match &self.decls.get(class).kind {
            DeclKind::Class { members, .. } => self.scope_of(
                members
                    .iter()
                    .copied()
                    .filter(|&m| self.decls.get(m).kind.is_classifier()),
            ),
            _ => Scope::empty(),
        }
    }

    fn file_scope(&self, file: FileId) -> Scope {
        self.scope_of(
            self.decls
                .decls_in_file(file)
                .iter()
                .copied()
                .filter(|&id| self.decls.get(id).container.is_none())
                .filter(|&id| !matches!(self.decls.get(id).kind, DeclKind::Constructor { .. })),
        )
    }

    fn package_scope(&self, package: Option<Name>) -> Scope {
        let package = package.unwrap_or(self.root_package);
        self.scope_of(self.package_members(package).iter().copied())
    }

    fn type_scope(&self, ty: TyId) -> Option<Scope> {
        match self.types.kind(ty) {
            TyKind::Error { .. } | TyKind::Flexible | TyKind::Intersection => None,
            TyKind::TypeParameter { .. } => Some(Scope::empty()),
            TyKind::DefinitelyNotNull { inner } => self.type_scope(*inner),
            TyKind::Class { class_id, .. } => Some(
                self.decls
                    .classifier(*class_id)
                    .map(|class| self.member_scope(class))
                    .unwrap_or_else(Scope::empty),
            ),
        }
    }

    fn local_scope(&self, file: FileId, node: SyntaxNodeId) -> Scope {
        self.locals
            .get(&(file, node))
            .map(|ids| self.scope_of(ids.iter().copied()))
            .unwrap_or_else(Scope::empty)
    }

    fn value_parameter_scope(&self, function: DeclId) -> Scope {
        let params = match &self.decls.get(function).kind {
            DeclKind::Function { params, .. } | DeclKind::Constructor { params, .. } => params,
            _ => return Scope::empty(),
        };
        let mut builder = Scope::builder();
        for (index, param) in params.iter().enumerate() {
            builder.add_callable(
                param.name,
                ScopeEntry::ValueParameter {
                    owner: function,
                    index: index as u32,
                },
            );
        }
        builder.build()
    }

    fn type_parameter_scope(&self, owner: DeclId) -> Scope {
        let type_params = match &self.decls.get(owner).kind {
            DeclKind::Function { type_params, .. }
            | DeclKind::Constructor { type_params, .. }
            | DeclKind::Class { type_params, .. } => type_params,
            _ => return Scope::empty(),
        };
        let mut builder = Scope::builder();
        for (index, tp) in type_params.iter().enumerate() {
            builder.add_classifier(
                tp.name,
                ScopeEntry::TypeParameter {
                    owner,
                    index: index as u32,
                },
            );
        }
        builder.build()
    }

    fn explicit_import_scope(&self, file: FileId, star: bool) -> Scope {
        let Some(imports) = self.imports.get(&file) else {
            return Scope::empty();
        };
        if star {
            Scope::composite(
                imports
                    .star
                    .iter()
                    .map(|&package| self.scope_of(self.package_members(package).iter().copied())),
            )
        } else {
            self.single_import_scope(imports.simple.iter().copied())
        }
    }

    fn default_import_scope(&self, star: bool) -> Scope {
        if star {
            Scope::composite(self.config.default_star_imports.iter().map(|package| {
                let package = self.interner.intern(package);
                self.scope_of(self.package_members(package).iter().copied())
            }))
        } else {
            self.single_import_scope(self.config.default_simple_imports.iter().filter_map(|fq| {
                let (package, name) = fq.rsplit_once('.')?;
                Some((self.interner.intern(package), self.interner.intern(name)))
            }))
        }
    }
}
