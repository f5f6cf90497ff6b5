//! The declarations arena — the semantic model of named program entities.
//!
//! Declarations are stored in a single vector and referenced by [`DeclId`]
//! from every other structure. This keeps the conflict detector free of
//! borrowed declaration references: its indices, conflict sets, and the
//! package index all speak in handles.

use rustc_hash::FxHashMap;

use crate::base::{FileId, Interner, ModuleId, Name, TextRange};
use super::ids::{CallableId, ClassId, DeclId};
use super::types::TyId;

/// The flavor of a classifier declaration.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ClassKind {
    Class,
    Interface,
    Object,
    EnumClass,
    EnumEntry,
    AnnotationClass,
}

/// What produced a synthetic declaration.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SyntheticKind {
    /// Generated `values`/`valueOf`-shaped members of an enum class.
    EnumGenerated,
    /// The hidden field backing interface delegation; renamed downstream on
    /// a clash, so never a redeclaration here.
    DelegationField,
    Other,
}

/// Where a declaration came from.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DeclOrigin {
    /// Written in source.
    Source,
    /// Compiler-generated.
    Synthetic(SyntheticKind),
    /// Loaded from a compiled dependency.
    Precompiled,
}

/// A type parameter, embedded in its owner's declaration.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct TypeParameter {
    pub name: Name,
    pub bounds: Vec<TyId>,
    /// True for a member's view of an outer class's type parameter; such
    /// entries are exempt from flat redeclaration checks.
    pub from_outer_class: bool,
}

impl TypeParameter {
    pub fn new(name: Name) -> Self {
        Self {
            name,
            bounds: Vec::new(),
            from_outer_class: false,
        }
    }

    pub fn with_bounds(mut self, bounds: Vec<TyId>) -> Self {
        self.bounds = bounds;
        self
    }
}

/// A value parameter, embedded in its owner's declaration.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ValueParameter {
    pub name: Name,
    pub ty: TyId,
    pub is_vararg: bool,
}

impl ValueParameter {
    pub fn new(name: Name, ty: TyId) -> Self {
        Self {
            name,
            ty,
            is_vararg: false,
        }
    }

    pub fn vararg(name: Name, ty: TyId) -> Self {
        Self {
            name,
            ty,
            is_vararg: true,
        }
    }
}

/// Kind-specific shape of a declaration.
#[derive(Clone, Debug)]
pub enum DeclKind {
    Function {
        callable_id: CallableId,
        type_params: Vec<TypeParameter>,
        context_receivers: Vec<TyId>,
        receiver: Option<TyId>,
        params: Vec<ValueParameter>,
        is_operator: bool,
    },
    Constructor {
        /// The class the constructor belongs to.
        owner: DeclId,
        type_params: Vec<TypeParameter>,
        context_receivers: Vec<TyId>,
        params: Vec<ValueParameter>,
    },
    Property {
        callable_id: CallableId,
        receiver: Option<TyId>,
        ty: Option<TyId>,
    },
    Class {
        class_id: ClassId,
        class_kind: ClassKind,
        type_params: Vec<TypeParameter>,
        /// The class's own type, used for the `this` receiver in class
        /// bodies. Absent for classes never used as receivers.
        self_ty: Option<TyId>,
        members: Vec<DeclId>,
    },
    TypeAlias {
        class_id: ClassId,
        /// The classifier the alias expands to, when known. Lets the
        /// conflict detector check the expansion's constructors against
        /// same-named functions.
        expanded_class: Option<DeclId>,
    },
}

impl DeclKind {
    /// Whether this declaration keys into the function-shaped partition of
    /// the conflict indices.
    pub fn is_function_shaped(&self) -> bool {
        matches!(self, DeclKind::Function { .. })
    }

    /// Whether this declaration is a classifier.
    pub fn is_classifier(&self) -> bool {
        matches!(self, DeclKind::Class { .. } | DeclKind::TypeAlias { .. })
    }
}

/// One named declaration.
#[derive(Clone, Debug)]
pub struct Declaration {
    pub name: Name,
    pub kind: DeclKind,
    pub file: FileId,
    pub module: ModuleId,
    pub range: TextRange,
    pub origin: DeclOrigin,
    pub is_expect: bool,
    pub is_actual: bool,
    /// Simple names of annotation classes applied to the declaration.
    pub annotations: Vec<Name>,
    /// The containing class, `None` for top-level and local declarations.
    pub container: Option<DeclId>,
}

impl Declaration {
    /// Create a source-originated declaration with no flags.
    pub fn new(name: Name, kind: DeclKind, file: FileId, module: ModuleId, range: TextRange) -> Self {
        Self {
            name,
            kind,
            file,
            module,
            range,
            origin: DeclOrigin::Source,
            is_expect: false,
            is_actual: false,
            annotations: Vec::new(),
            container: None,
        }
    }

    pub fn with_origin(mut self, origin: DeclOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn as_expect(mut self) -> Self {
        self.is_expect = true;
        self
    }

    pub fn as_actual(mut self) -> Self {
        self.is_actual = true;
        self
    }

    pub fn with_annotations(mut self, annotations: Vec<Name>) -> Self {
        self.annotations = annotations;
        self
    }
}

/// The simple name of the annotation that deprioritizes a declaration in
/// overload and conflict resolution.
pub const LOW_PRIORITY_ANNOTATION: &str = "LowPriorityInOverloadResolution";

/// Arena of all declarations in one analysis snapshot.
#[derive(Clone, Debug, Default)]
pub struct Declarations {
    decls: Vec<Declaration>,
    by_file: FxHashMap<FileId, Vec<DeclId>>,
    by_class_id: FxHashMap<ClassId, DeclId>,
}

impl Declarations {
    /// Create a new empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a declaration, indexing it by file and classifier id.
    pub fn alloc(&mut self, decl: Declaration) -> DeclId {
        let id = DeclId::new(self.decls.len() as u32);
        self.by_file.entry(decl.file).or_default().push(id);
        match &decl.kind {
            DeclKind::Class { class_id, .. } | DeclKind::TypeAlias { class_id, .. } => {
                self.by_class_id.insert(*class_id, id);
            }
            _ => {}
        }
        self.decls.push(decl);
        id
    }

    /// Attach `member` to `class`, setting its container link.
    ///
    /// # Panics
    /// Panics if `class` is not a class declaration.
    pub fn add_member(&mut self, class: DeclId, member: DeclId) {
        self.decls[member.index() as usize].container = Some(class);
        match &mut self.decls[class.index() as usize].kind {
            DeclKind::Class { members, .. } => members.push(member),
            _ => panic!("add_member: {class:?} is not a class"),
        }
    }

    /// Mark `decl` as contained in `container` without member registration.
    /// Used for local declarations, whose container is a function.
    pub fn set_container(&mut self, decl: DeclId, container: DeclId) {
        self.decls[decl.index() as usize].container = Some(container);
    }

    /// Get a declaration.
    pub fn get(&self, id: DeclId) -> &Declaration {
        &self.decls[id.index() as usize]
    }

    /// All declarations of a file, in allocation order.
    pub fn decls_in_file(&self, file: FileId) -> &[DeclId] {
        self.by_file.get(&file).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Look up a classifier declaration by its fully qualified id.
    pub fn classifier(&self, class_id: ClassId) -> Option<DeclId> {
        self.by_class_id.get(&class_id).copied()
    }

    /// The package a declaration belongs to, from its qualified id.
    /// `None` for constructors and other id-less declarations.
    pub fn package_of(&self, id: DeclId) -> Option<Name> {
        match &self.get(id).kind {
            DeclKind::Function { callable_id, .. } | DeclKind::Property { callable_id, .. } => {
                Some(callable_id.package)
            }
            DeclKind::Class { class_id, .. } | DeclKind::TypeAlias { class_id, .. } => {
                Some(class_id.package)
            }
            DeclKind::Constructor { owner, .. } => self.package_of(*owner),
        }
    }

    /// Whether a declaration carries the low-priority marker annotation.
    pub fn has_low_priority_annotation(&self, id: DeclId, interner: &Interner) -> bool {
        self.get(id)
            .annotations
            .iter()
            .any(|&a| interner.get(a) == LOW_PRIORITY_ANNOTATION)
    }

    /// Whether a declaration is a `main`-shaped entry function: a top-level
    /// function named `main`. Per-file entry points are allowed to coexist.
    pub fn is_main_like(&self, id: DeclId, interner: &Interner) -> bool {
        let decl = self.get(id);
        matches!(decl.kind, DeclKind::Function { .. })
            && decl.container.is_none()
            && interner.get(decl.name) == "main"
    }

    /// Visit the constructors of a class, in member order.
    ///
    /// Mirrors a syntax traversal that descends the class's own subtree but
    /// skips nested class, property, and function bodies: only the class's
    /// own constructors are visited, never a nested member's. Object and
    /// enum-entry classes have no callable constructors and are skipped
    /// entirely.
    pub fn for_each_constructor(&self, class: DeclId, mut action: impl FnMut(DeclId)) {
        let DeclKind::Class {
            class_kind, members, ..
        } = &self.get(class).kind
        else {
            return;
        };
        if matches!(class_kind, ClassKind::Object | ClassKind::EnumEntry) {
            return;
        }
        for &member in members {
            match &self.get(member).kind {
                DeclKind::Constructor { .. } => action(member),
                // nested classifiers, properties, and functions are opaque
                _ => {}
            }
        }
    }

    /// Number of declarations.
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    /// Whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Iterate all declarations.
    pub fn iter(&self) -> impl Iterator<Item = (DeclId, &Declaration)> {
        self.decls
            .iter()
            .enumerate()
            .map(|(i, d)| (DeclId::new(i as u32), d))
    }
}
