//! A minimal type model for conflict signatures and receiver scopes.
//!
//! This is not a type checker. The conflict detector only needs type
//! *identity* — enough structure to render a declaration's signature into a
//! presentation key — and the scope tower only needs to map a receiver type
//! to its classifier. Everything else about types is an external concern.

use smol_str::SmolStr;

use crate::base::Name;
use super::ids::ClassId;

/// Handle to a type in a [`TyStore`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Debug)]
pub struct TyId(u32);

impl TyId {
    /// Get the raw index.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

/// A use-site type-argument projection.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TyProjection {
    /// `*`
    Star,
    /// `in T`
    In(TyId),
    /// `out T`
    Out(TyId),
    /// plain `T`
    Invariant(TyId),
}

/// The shape of a type, as far as conflict signatures care.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TyKind {
    /// A classifier type, possibly with type arguments.
    Class {
        class_id: ClassId,
        args: Vec<TyProjection>,
    },
    /// A reference to a type parameter, by name.
    TypeParameter { name: Name },
    /// `T & Any` — a definitely-not-null wrapper.
    DefinitelyNotNull { inner: TyId },
    /// An unresolved or otherwise broken type. Renders as `ERROR(reason)` so
    /// two equally-broken signatures still collide.
    Error { reason: SmolStr },
    /// A platform-flexible type; renders as `ERROR`.
    Flexible,
    /// An intersection type; renders as `ERROR`.
    Intersection,
}

#[derive(Clone, Debug)]
struct TyData {
    kind: TyKind,
    nullable: bool,
}

/// Arena of types for one analysis snapshot.
#[derive(Clone, Debug, Default)]
pub struct TyStore {
    tys: Vec<TyData>,
}

impl TyStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a type.
    pub fn alloc(&mut self, kind: TyKind, nullable: bool) -> TyId {
        let id = TyId(self.tys.len() as u32);
        self.tys.push(TyData { kind, nullable });
        id
    }

    /// Allocate a plain non-null classifier type with no arguments.
    pub fn class(&mut self, class_id: ClassId) -> TyId {
        self.alloc(
            TyKind::Class {
                class_id,
                args: Vec::new(),
            },
            false,
        )
    }

    /// Allocate a non-null classifier type with arguments.
    pub fn class_with_args(&mut self, class_id: ClassId, args: Vec<TyProjection>) -> TyId {
        self.alloc(TyKind::Class { class_id, args }, false)
    }

    /// Allocate a type-parameter reference.
    pub fn type_parameter(&mut self, name: Name) -> TyId {
        self.alloc(TyKind::TypeParameter { name }, false)
    }

    /// Allocate an error type.
    pub fn error(&mut self, reason: impl Into<SmolStr>) -> TyId {
        self.alloc(
            TyKind::Error {
                reason: reason.into(),
            },
            false,
        )
    }

    /// The kind of a type.
    pub fn kind(&self, ty: TyId) -> &TyKind {
        &self.tys[ty.index() as usize].kind
    }

    /// Whether a type is marked nullable.
    pub fn is_nullable(&self, ty: TyId) -> bool {
        self.tys[ty.index() as usize].nullable
    }

    /// Whether a type is an error type (directly, not through wrappers).
    pub fn is_error(&self, ty: TyId) -> bool {
        matches!(self.kind(ty), TyKind::Error { .. })
    }

    /// The classifier a type resolves to, looking through
    /// definitely-not-null wrappers. `None` for everything non-classifier.
    pub fn classifier_of(&self, ty: TyId) -> Option<ClassId> {
        match self.kind(ty) {
            TyKind::Class { class_id, .. } => Some(*class_id),
            TyKind::DefinitelyNotNull { inner } => self.classifier_of(*inner),
            _ => None,
        }
    }

    /// Number of allocated types.
    pub fn len(&self) -> usize {
        self.tys.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.tys.is_empty()
    }
}
