//! Scopes, scope kinds, and the scope tower.
//!
//! A [`Scope`] is an immutable, cheaply clonable set of named entities,
//! partitioned into callables and classifiers. Scopes are *produced* by a
//! [`ScopeProvider`](super::tower::ScopeProvider); the tower builder only
//! orders and tags them, and the resulting [`ScopeContext`] list order *is*
//! the name-lookup priority — consumers must never re-sort it.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::base::Name;
use super::ids::DeclId;
use super::types::TyId;

/// Sentinel for a scope whose tower position could not be determined.
///
/// A defensive fallback — the builder never produces it intentionally.
pub const UNKNOWN_INDEX: u32 = u32::MAX;

/// An entity a scope can hold.
///
/// Type and value parameters are embedded in their owner's declaration
/// rather than allocated in the arena, so they get positional handles.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ScopeEntry {
    Decl(DeclId),
    TypeParameter { owner: DeclId, index: u32 },
    ValueParameter { owner: DeclId, index: u32 },
}

#[derive(Debug, Default)]
struct ScopeData {
    // IndexMap: scope enumeration order is part of the rendering contract.
    callables: IndexMap<Name, Vec<ScopeEntry>>,
    classifiers: IndexMap<Name, Vec<ScopeEntry>>,
}

/// An immutable queryable set of named callables and classifiers.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    data: Arc<ScopeData>,
}

impl Scope {
    /// The empty scope.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Start building a scope.
    pub fn builder() -> ScopeBuilder {
        ScopeBuilder::default()
    }

    /// Merge several scopes, earlier ones first.
    pub fn composite(scopes: impl IntoIterator<Item = Scope>) -> Scope {
        let mut builder = Scope::builder();
        for scope in scopes {
            for (&name, entries) in &scope.data.callables {
                for &entry in entries {
                    builder.add_callable(name, entry);
                }
            }
            for (&name, entries) in &scope.data.classifiers {
                for &entry in entries {
                    builder.add_classifier(name, entry);
                }
            }
        }
        builder.build()
    }

    /// Callables with the given name.
    pub fn callables_by_name(&self, name: Name) -> &[ScopeEntry] {
        self.data
            .callables
            .get(&name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Classifiers with the given name.
    pub fn classifiers_by_name(&self, name: Name) -> &[ScopeEntry] {
        self.data
            .classifiers
            .get(&name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Iterate callables in insertion order.
    pub fn callables(&self) -> impl Iterator<Item = (Name, ScopeEntry)> + '_ {
        self.data
            .callables
            .iter()
            .flat_map(|(&name, entries)| entries.iter().map(move |&e| (name, e)))
    }

    /// Iterate classifiers in insertion order.
    pub fn classifiers(&self) -> impl Iterator<Item = (Name, ScopeEntry)> + '_ {
        self.data
            .classifiers
            .iter()
            .flat_map(|(&name, entries)| entries.iter().map(move |&e| (name, e)))
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.data.callables.values().map(Vec::len).sum::<usize>()
            + self.data.classifiers.values().map(Vec::len).sum::<usize>()
    }

    /// Whether the scope has no entries.
    pub fn is_empty(&self) -> bool {
        self.data.callables.is_empty() && self.data.classifiers.is_empty()
    }
}

/// Builder for [`Scope`].
#[derive(Debug, Default)]
pub struct ScopeBuilder {
    data: ScopeData,
}

impl ScopeBuilder {
    /// Add a callable entry.
    pub fn add_callable(&mut self, name: Name, entry: ScopeEntry) -> &mut Self {
        self.data.callables.entry(name).or_default().push(entry);
        self
    }

    /// Add a classifier entry.
    pub fn add_classifier(&mut self, name: Name, entry: ScopeEntry) -> &mut Self {
        self.data.classifiers.entry(name).or_default().push(entry);
        self
    }

    /// Finish the scope.
    pub fn build(self) -> Scope {
        Scope {
            data: Arc::new(self.data),
        }
    }
}

/// The flavor of an importing scope.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ImportingKind {
    /// `import a.b.C`
    ExplicitSimple,
    /// `import a.b.*`
    ExplicitStar,
    /// A single name imported by configuration.
    DefaultSimple,
    /// A package star-imported by configuration.
    DefaultStar,
}

/// Why a scope appears in the tower, and where.
///
/// Within each variant family, `index_in_tower`/`receiver_index` values are
/// unique; index 0 is the most tightly scoped instance of that family.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ScopeKind {
    /// Lexically nested block or parameter scope.
    Local { index_in_tower: u32 },
    /// Scope derived from an implicit receiver's type. `synthetic` marks the
    /// bridged synthetic-properties scope of the same receiver.
    Type { receiver_index: u32, synthetic: bool },
    /// Type parameters of an enclosing declaration.
    TypeParameter { index_in_tower: u32 },
    /// A names-aware scope not attributable to the other kinds (file scope,
    /// static member scopes).
    NamesAware { index_in_tower: u32 },
    /// Members of the containing package.
    PackageMember { index_in_tower: u32 },
    /// One of the four import scopes of the file.
    Importing {
        subkind: ImportingKind,
        index_in_tower: u32,
    },
}

impl ScopeKind {
    /// The index within this kind's family.
    pub fn index(&self) -> u32 {
        match *self {
            ScopeKind::Local { index_in_tower }
            | ScopeKind::TypeParameter { index_in_tower }
            | ScopeKind::NamesAware { index_in_tower }
            | ScopeKind::PackageMember { index_in_tower }
            | ScopeKind::Importing { index_in_tower, .. } => index_in_tower,
            ScopeKind::Type { receiver_index, .. } => receiver_index,
        }
    }

    /// The kind's rank in the shadow ordering; lower shadows higher.
    ///
    /// local > type > type-parameter > names-aware > package-member >
    /// explicit-simple > explicit-star > default-simple > default-star.
    pub fn shadowing_priority(&self) -> u8 {
        match self {
            ScopeKind::Local { .. } => 0,
            ScopeKind::Type { .. } => 1,
            ScopeKind::TypeParameter { .. } => 2,
            ScopeKind::NamesAware { .. } => 3,
            ScopeKind::PackageMember { .. } => 4,
            ScopeKind::Importing { subkind, .. } => match subkind {
                ImportingKind::ExplicitSimple => 5,
                ImportingKind::ExplicitStar => 6,
                ImportingKind::DefaultSimple => 7,
                ImportingKind::DefaultStar => 8,
            },
        }
    }

    /// Whether this is a default importing scope. These are axiomatically
    /// large and are never itemized by the presentation layer.
    pub fn is_default_importing(&self) -> bool {
        matches!(
            self,
            ScopeKind::Importing {
                subkind: ImportingKind::DefaultSimple | ImportingKind::DefaultStar,
                ..
            }
        )
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeKind::Local { index_in_tower } => write!(f, "LocalScope(index = {index_in_tower})"),
            ScopeKind::Type {
                receiver_index,
                synthetic: false,
            } => write!(f, "TypeScope(receiver = {receiver_index})"),
            ScopeKind::Type {
                receiver_index,
                synthetic: true,
            } => write!(f, "SyntheticPropertiesScope(receiver = {receiver_index})"),
            ScopeKind::TypeParameter { index_in_tower } => {
                write!(f, "TypeParameterScope(index = {index_in_tower})")
            }
            ScopeKind::NamesAware { index_in_tower } => {
                write!(f, "NamesAwareScope(index = {index_in_tower})")
            }
            ScopeKind::PackageMember { index_in_tower } => {
                write!(f, "PackageMemberScope(index = {index_in_tower})")
            }
            ScopeKind::Importing {
                subkind,
                index_in_tower,
            } => {
                let label = match subkind {
                    ImportingKind::ExplicitSimple => "ExplicitSimpleImportingScope",
                    ImportingKind::ExplicitStar => "ExplicitStarImportingScope",
                    ImportingKind::DefaultSimple => "DefaultSimpleImportingScope",
                    ImportingKind::DefaultStar => "DefaultStarImportingScope",
                };
                write!(f, "{label}(index = {index_in_tower})")
            }
        }
    }
}

/// An implicit `this`-like receiver in effect at a position.
///
/// Valid only for the lifetime of the [`ScopeContext`] that owns it.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ImplicitReceiver {
    pub ty: TyId,
    /// The declaration that introduced the receiver.
    pub owner: DeclId,
}

/// Everything nameable at a position: the ordered scope tower plus the
/// implicit receivers in effect, innermost first.
///
/// Immutable value object; not valid past invalidation of the underlying
/// analysis snapshot.
#[derive(Clone, Debug, Default)]
pub struct ScopeContext {
    scopes: Vec<(Scope, ScopeKind)>,
    implicit_receivers: Vec<ImplicitReceiver>,
}

impl ScopeContext {
    pub(crate) fn new(scopes: Vec<(Scope, ScopeKind)>, implicit_receivers: Vec<ImplicitReceiver>) -> Self {
        Self {
            scopes,
            implicit_receivers,
        }
    }

    /// The scope tower, in name-lookup priority order.
    pub fn scopes(&self) -> &[(Scope, ScopeKind)] {
        &self.scopes
    }

    /// Implicit receivers, index 0 innermost.
    pub fn implicit_receivers(&self) -> &[ImplicitReceiver] {
        &self.implicit_receivers
    }

    /// Merge the scopes whose kind passes `filter` into one scope,
    /// preserving tower order.
    pub fn composite_scope(&self, filter: impl Fn(&ScopeKind) -> bool) -> Scope {
        Scope::composite(
            self.scopes
                .iter()
                .filter(|(_, kind)| filter(kind))
                .map(|(scope, _)| scope.clone()),
        )
    }
}
