//! The declaration conflict detector.
//!
//! [`DeclarationInspector`] collects the declarations of one container and
//! computes, for each, the set of others it illegally redeclares. Two
//! partitioned indices back it — one for function-shaped declarations, one
//! for everything else — because functions collide on full structural
//! signatures while classes, properties, and aliases collide on their
//! qualified id alone. The split also means a `val` and a `fun` with the
//! same name never collide locally; that asymmetry is deliberate, inherited
//! behavior (see DESIGN.md).
//!
//! The inspector's indices live for one collection pass. Conflicts are
//! data, not errors: only cancellation is exceptional here.

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::base::{FileId, Interner, Name, TextRange};
use super::diagnostics::DiagnosticCollector;
use super::error::AnalysisError;
use super::ids::DeclId;
use super::index::{PackageSymbolIndex, VisibilityFilter};
use super::present::DeclarationPresenter;
use super::symbols::{DeclKind, DeclOrigin, Declarations, SyntheticKind};
use super::types::TyStore;

/// Computes mutual redeclaration conflicts among collected declarations.
///
/// One inspector per collection pass; it is single-owner and must not be
/// shared across concurrent passes.
pub struct DeclarationInspector<'a> {
    decls: &'a Declarations,
    interner: &'a Interner,
    presenter: DeclarationPresenter<'a>,
    functions: FxHashMap<Name, Vec<DeclId>>,
    others: FxHashMap<Name, Vec<DeclId>>,
    conflicts: FxHashMap<DeclId, FxHashSet<DeclId>>,
    cancel: CancellationToken,
}

impl<'a> DeclarationInspector<'a> {
    pub fn new(decls: &'a Declarations, types: &'a TyStore, interner: &'a Interner) -> Self {
        Self {
            decls,
            interner,
            presenter: DeclarationPresenter::new(decls, types, interner),
            functions: FxHashMap::default(),
            others: FxHashMap::default(),
            conflicts: FxHashMap::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Use a cancellation token; collection checks it per declaration and
    /// per external candidate.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Register one declaration, recording local conflicts against
    /// everything already collected under the same presentation key.
    pub fn collect(&mut self, decl: DeclId) -> Result<(), AnalysisError> {
        self.check_cancelled()?;
        if !self.is_collectable(decl) {
            return Ok(());
        }
        let Some(key) = self.presenter.represent(decl) else {
            return Ok(());
        };
        let key = self.interner.intern(&key);
        let function_shaped = self.decls.get(decl).kind.is_function_shaped();
        self.collect_local(key, decl, function_shaped);
        Ok(())
    }

    /// Register a declaration and additionally look for conflicts with
    /// same-named top-level symbols of the package, across files.
    pub fn collect_with_external_conflicts(
        &mut self,
        decl: DeclId,
        containing_file: FileId,
        index: &dyn PackageSymbolIndex,
        visibility: &dyn VisibilityFilter,
    ) -> Result<(), AnalysisError> {
        self.collect(decl)?;

        let data = self.decls.get(decl);
        let name = data.name;
        if self.interner.is_special(name) {
            return Ok(());
        }
        let Some(key) = self.presenter.represent(decl) else {
            return Ok(());
        };

        match &data.kind {
            DeclKind::Function { .. } => {
                for candidate in collect_candidates(|f| index.process_functions_by_name(name, f)) {
                    self.check_cancelled()?;
                    self.collect_external_conflict(
                        decl,
                        &key,
                        containing_file,
                        candidate,
                        None,
                        None,
                        index,
                        visibility,
                    );
                }
                // A function `Foo` also collides with constructors of an
                // external classifier `Foo` of matching shape.
                for symbol in collect_candidates(|f| index.process_classifiers_by_name(name, f)) {
                    self.check_cancelled()?;
                    let resolved = match index.resolve_declaration(symbol) {
                        Ok(resolved) => resolved,
                        Err(err) => {
                            debug!(%err, "skipping unresolvable external classifier");
                            continue;
                        }
                    };
                    if let DeclKind::Class { class_id, .. } = &self.decls.get(resolved).kind {
                        let class_id = *class_id;
                        for ctor in constructors_of(self.decls, resolved) {
                            let ctor_key = self.presenter.represent_constructor(ctor, class_id);
                            self.collect_external_conflict(
                                decl,
                                &key,
                                containing_file,
                                ctor,
                                Some(ctor_key),
                                index.containing_file(resolved),
                                index,
                                visibility,
                            );
                        }
                    }
                }
            }
            DeclKind::Property { .. } => {
                for candidate in collect_candidates(|f| index.process_properties_by_name(name, f)) {
                    self.check_cancelled()?;
                    self.collect_external_conflict(
                        decl,
                        &key,
                        containing_file,
                        candidate,
                        None,
                        None,
                        index,
                        visibility,
                    );
                }
            }
            DeclKind::Class { class_id, .. } => {
                let class_id = *class_id;
                for candidate in collect_candidates(|f| index.process_classifiers_by_name(name, f)) {
                    self.check_cancelled()?;
                    self.collect_external_conflict(
                        decl,
                        &key,
                        containing_file,
                        candidate,
                        None,
                        None,
                        index,
                        visibility,
                    );
                }
                // The class's own constructors collide with same-named
                // external functions of matching shape.
                for ctor in constructors_of(self.decls, decl) {
                    let ctor_key = self.presenter.represent_constructor(ctor, class_id);
                    for candidate in collect_candidates(|f| index.process_functions_by_name(name, f)) {
                        self.check_cancelled()?;
                        self.collect_external_conflict(
                            ctor,
                            &ctor_key,
                            containing_file,
                            candidate,
                            None,
                            None,
                            index,
                            visibility,
                        );
                    }
                }
            }
            DeclKind::TypeAlias {
                class_id,
                expanded_class,
            } => {
                let class_id = *class_id;
                let expanded_class = *expanded_class;
                for candidate in collect_candidates(|f| index.process_classifiers_by_name(name, f)) {
                    self.check_cancelled()?;
                    self.collect_external_conflict(
                        decl,
                        &key,
                        containing_file,
                        candidate,
                        None,
                        None,
                        index,
                        visibility,
                    );
                }
                // An alias to a class stands in for its constructors: check
                // them, rendered against the alias id, against same-named
                // external functions.
                if let Some(class) = expanded_class {
                    for ctor in constructors_of(self.decls, class) {
                        let ctor_key = self.presenter.represent_constructor(ctor, class_id);
                        for candidate in collect_candidates(|f| index.process_functions_by_name(name, f)) {
                            self.check_cancelled()?;
                            self.collect_external_conflict(
                                decl,
                                &ctor_key,
                                containing_file,
                                candidate,
                                None,
                                None,
                                index,
                                visibility,
                            );
                        }
                    }
                }
            }
            DeclKind::Constructor { .. } => {}
        }
        Ok(())
    }

    /// The declarations a declaration conflicts with, sorted.
    pub fn conflicts_for(&self, decl: DeclId) -> Vec<DeclId> {
        let mut result: Vec<DeclId> = self
            .conflicts
            .get(&decl)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        result.sort();
        result
    }

    /// All declarations with a non-empty conflict set, sorted.
    pub fn declarations_with_conflicts(&self) -> Vec<DeclId> {
        let mut result: Vec<DeclId> = self
            .conflicts
            .iter()
            .filter(|(_, set)| !set.is_empty())
            .map(|(&decl, _)| decl)
            .collect();
        result.sort();
        result
    }

    fn check_cancelled(&self) -> Result<(), AnalysisError> {
        if self.cancel.is_cancelled() {
            return Err(AnalysisError::Cancelled);
        }
        Ok(())
    }

    // Enum-generated members shadow an explicit declaration of the same
    // signature, and nameless declarations cannot redeclare anything.
    fn is_collectable(&self, decl: DeclId) -> bool {
        let data = self.decls.get(decl);
        match &data.kind {
            DeclKind::Function { .. } => {
                data.origin != DeclOrigin::Synthetic(SyntheticKind::EnumGenerated)
                    && !self.interner.is_special(data.name)
            }
            DeclKind::Property { .. } => {
                data.origin != DeclOrigin::Synthetic(SyntheticKind::EnumGenerated)
            }
            DeclKind::Class { .. } | DeclKind::TypeAlias { .. } => !self.interner.is_special(data.name),
            DeclKind::Constructor { .. } => false,
        }
    }

    fn collect_local(&mut self, key: Name, decl: DeclId, function_shaped: bool) {
        let bucket = if function_shaped {
            self.functions.entry(key).or_default()
        } else {
            self.others.entry(key).or_default()
        };
        let prior: Vec<DeclId> = bucket.iter().copied().collect();
        bucket.push(decl);

        for other in prior {
            if other == decl {
                continue;
            }
            // The hidden delegation field is renamed downstream on a clash.
            if self.decls.get(other).origin == DeclOrigin::Synthetic(SyntheticKind::DelegationField) {
                continue;
            }
            if self.is_expect_actual_pair(decl, other) {
                continue;
            }
            self.record(decl, other);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn collect_external_conflict(
        &mut self,
        decl: DeclId,
        decl_key: &str,
        containing_file: FileId,
        candidate: DeclId,
        candidate_key: Option<SmolStr>,
        candidate_file: Option<FileId>,
        index: &dyn PackageSymbolIndex,
        visibility: &dyn VisibilityFilter,
    ) {
        // Forced resolution is a blocking collaborator call; a failure
        // contributes nothing rather than aborting the pass.
        let resolved = match index.resolve_declaration(candidate) {
            Ok(resolved) => resolved,
            Err(err) => {
                debug!(%err, "skipping unresolvable external symbol");
                return;
            }
        };
        if resolved == decl {
            return;
        }
        // Cross-module same-name is never a conflict.
        if self.decls.get(resolved).module != self.decls.get(decl).module {
            return;
        }
        let resolved_key = match candidate_key {
            Some(key) => key,
            None => match self.presenter.represent(resolved) {
                Some(key) => key,
                None => return,
            },
        };
        if resolved_key != decl_key {
            return;
        }
        let resolved_file = candidate_file.or_else(|| index.containing_file(resolved));
        if resolved_file == Some(containing_file)
            && self.decls.get(resolved).origin == DeclOrigin::Precompiled
        {
            return;
        }
        if self.are_compatible_mains(decl, containing_file, resolved, resolved_file) {
            return;
        }
        if self.is_expect_actual_pair(decl, resolved) {
            return;
        }
        if !visibility.is_visible(resolved, containing_file) {
            return;
        }
        let decl_low_priority = self.decls.has_low_priority_annotation(decl, self.interner);
        let resolved_low_priority = self.decls.has_low_priority_annotation(resolved, self.interner);
        if decl_low_priority != resolved_low_priority {
            return;
        }
        self.record(decl, resolved);
    }

    fn is_expect_actual_pair(&self, a: DeclId, b: DeclId) -> bool {
        let a = self.decls.get(a);
        let b = self.decls.get(b);
        (a.is_expect && b.is_actual) || (a.is_actual && b.is_expect)
    }

    /// Per-file `main` entry points are allowed to coexist.
    fn are_compatible_mains(
        &self,
        a: DeclId,
        a_file: FileId,
        b: DeclId,
        b_file: Option<FileId>,
    ) -> bool {
        self.decls.is_main_like(a, self.interner)
            && self.decls.is_main_like(b, self.interner)
            && b_file != Some(a_file)
    }

    fn record(&mut self, a: DeclId, b: DeclId) {
        self.conflicts.entry(a).or_default().insert(b);
        self.conflicts.entry(b).or_default().insert(a);
    }
}

// Buffers a push-style enumeration so the inspector can mutate itself while
// iterating; candidate order is the index's enumeration order.
fn collect_candidates(process: impl FnOnce(&mut dyn FnMut(DeclId))) -> Vec<DeclId> {
    let mut out = Vec::new();
    process(&mut |id| out.push(id));
    out
}

fn constructors_of(decls: &Declarations, class: DeclId) -> Vec<DeclId> {
    let mut out = Vec::new();
    decls.for_each_constructor(class, |ctor| out.push(ctor));
    out
}

/// One element of a flat parameter or type-parameter list.
#[derive(Clone, Debug)]
pub enum ParameterElement {
    Value {
        name: Name,
        file: FileId,
        range: TextRange,
    },
    TypeParameter {
        name: Name,
        file: FileId,
        range: TextRange,
        /// A member's view of an outer class's type parameter; exempt.
        from_outer_class: bool,
    },
}

impl ParameterElement {
    fn name(&self) -> Name {
        match self {
            ParameterElement::Value { name, .. } | ParameterElement::TypeParameter { name, .. } => *name,
        }
    }

    fn location(&self) -> (FileId, TextRange) {
        match self {
            ParameterElement::Value { file, range, .. }
            | ParameterElement::TypeParameter { file, range, .. } => (*file, *range),
        }
    }
}

/// Flat, name-only redeclaration check for same-container parameter and
/// type-parameter lists.
///
/// No presentation keys: identity is by name alone. Every occupant of a name
/// with more than one occupant gets a redeclaration diagnostic listing the
/// others.
pub fn check_conflicting_elements(
    elements: &[ParameterElement],
    interner: &Interner,
    collector: &mut DiagnosticCollector,
) {
    if elements.len() <= 1 {
        return;
    }

    let mut by_name: IndexMap<Name, Vec<usize>> = IndexMap::new();
    for (i, element) in elements.iter().enumerate() {
        if let ParameterElement::TypeParameter {
            from_outer_class: true,
            ..
        } = element
        {
            continue;
        }
        if interner.is_special(element.name()) {
            continue;
        }
        by_name.entry(element.name()).or_default().push(i);
    }

    for (name, group) in &by_name {
        if group.len() <= 1 {
            continue;
        }
        let rendered = interner.get(*name);
        for &i in group {
            let (file, range) = elements[i].location();
            let others: Vec<(FileId, TextRange)> = group
                .iter()
                .filter(|&&j| j != i)
                .map(|&j| elements[j].location())
                .collect();
            collector.redeclaration(file, range, &rendered, &others);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{ModuleId, TextSize};
    use crate::hir::ids::{CallableId, ClassId};
    use crate::hir::index::{AlwaysVisible, PackageIndex};
    use crate::hir::symbols::{ClassKind, Declaration, ValueParameter};
    use crate::hir::types::TyId;

    struct Fixture {
        interner: Interner,
        decls: Declarations,
        types: TyStore,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                interner: Interner::new(),
                decls: Declarations::new(),
                types: TyStore::new(),
            }
        }

        fn ty(&mut self, name: &str) -> TyId {
            let class_id = ClassId::new(self.interner.intern("kite"), self.interner.intern(name));
            self.types.class(class_id)
        }

        fn function_in_file(&mut self, name: &str, params: Vec<ValueParameter>, file: u32) -> DeclId {
            let n = self.interner.intern(name);
            self.decls.alloc(Declaration::new(
                n,
                DeclKind::Function {
                    callable_id: CallableId::top_level(self.interner.intern("app"), n),
                    type_params: Vec::new(),
                    context_receivers: Vec::new(),
                    receiver: None,
                    params,
                    is_operator: false,
                },
                FileId::new(file),
                ModuleId::new(0),
                TextRange::new(TextSize::from(0), TextSize::from(1)),
            ))
        }

        fn function(&mut self, name: &str, params: Vec<ValueParameter>) -> DeclId {
            self.function_in_file(name, params, 0)
        }

        fn property(&mut self, name: &str) -> DeclId {
            let n = self.interner.intern(name);
            self.decls.alloc(Declaration::new(
                n,
                DeclKind::Property {
                    callable_id: CallableId::top_level(self.interner.intern("app"), n),
                    receiver: None,
                    ty: None,
                },
                FileId::new(0),
                ModuleId::new(0),
                TextRange::new(TextSize::from(0), TextSize::from(1)),
            ))
        }

        fn class(&mut self, name: &str, file: u32) -> DeclId {
            let n = self.interner.intern(name);
            self.decls.alloc(Declaration::new(
                n,
                DeclKind::Class {
                    class_id: ClassId::new(self.interner.intern("app"), n),
                    class_kind: ClassKind::Class,
                    type_params: Vec::new(),
                    self_ty: None,
                    members: Vec::new(),
                },
                FileId::new(file),
                ModuleId::new(0),
                TextRange::new(TextSize::from(0), TextSize::from(1)),
            ))
        }

        fn constructor(&mut self, owner: DeclId, params: Vec<ValueParameter>) -> DeclId {
            let ctor = self.decls.alloc(Declaration::new(
                self.interner.intern("<init>"),
                DeclKind::Constructor {
                    owner,
                    type_params: Vec::new(),
                    context_receivers: Vec::new(),
                    params,
                },
                self.decls.get(owner).file,
                ModuleId::new(0),
                TextRange::new(TextSize::from(0), TextSize::from(1)),
            ));
            self.decls.add_member(owner, ctor);
            ctor
        }

        fn inspector(&self) -> DeclarationInspector<'_> {
            DeclarationInspector::new(&self.decls, &self.types, &self.interner)
        }
    }

    #[test]
    fn test_same_signature_conflicts_symmetrically() {
        let mut fx = Fixture::new();
        let int = fx.ty("Int");
        let x = fx.interner.intern("x");
        let a = fx.function("f", vec![ValueParameter::new(x, int)]);
        let b = fx.function("f", vec![ValueParameter::new(x, int)]);

        let mut inspector = fx.inspector();
        inspector.collect(a).unwrap();
        inspector.collect(b).unwrap();

        assert_eq!(inspector.conflicts_for(a), vec![b]);
        assert_eq!(inspector.conflicts_for(b), vec![a]);
    }

    #[test]
    fn test_different_signature_no_conflict() {
        let mut fx = Fixture::new();
        let int = fx.ty("Int");
        let string = fx.ty("String");
        let x = fx.interner.intern("x");
        let a = fx.function("f", vec![ValueParameter::new(x, int)]);
        let b = fx.function("f", vec![ValueParameter::new(x, string)]);

        let mut inspector = fx.inspector();
        inspector.collect(a).unwrap();
        inspector.collect(b).unwrap();

        assert!(inspector.conflicts_for(a).is_empty());
        assert!(inspector.conflicts_for(b).is_empty());
    }

    #[test]
    fn test_expect_actual_pair_exempt() {
        let mut fx = Fixture::new();
        let n = fx.interner.intern("f");
        let make = |fx: &mut Fixture| {
            Declaration::new(
                n,
                DeclKind::Function {
                    callable_id: CallableId::top_level(fx.interner.intern("app"), n),
                    type_params: Vec::new(),
                    context_receivers: Vec::new(),
                    receiver: None,
                    params: Vec::new(),
                    is_operator: false,
                },
                FileId::new(0),
                ModuleId::new(0),
                TextRange::new(TextSize::from(0), TextSize::from(1)),
            )
        };
        let a = {
            let decl = make(&mut fx).as_expect();
            fx.decls.alloc(decl)
        };
        let b = {
            let decl = make(&mut fx).as_actual();
            fx.decls.alloc(decl)
        };

        let mut inspector = fx.inspector();
        inspector.collect(a).unwrap();
        inspector.collect(b).unwrap();

        assert!(inspector.conflicts_for(a).is_empty());
        assert!(inspector.conflicts_for(b).is_empty());
    }

    #[test]
    fn test_val_and_fun_partitions_do_not_collide() {
        // Documented inherited behavior: a `val x` and a `fun x()` key into
        // different partitions and never conflict locally.
        let mut fx = Fixture::new();
        let f = fx.function("x", Vec::new());
        let p = fx.property("x");

        let mut inspector = fx.inspector();
        inspector.collect(f).unwrap();
        inspector.collect(p).unwrap();

        assert!(inspector.conflicts_for(f).is_empty());
        assert!(inspector.conflicts_for(p).is_empty());
    }

    #[test]
    fn test_properties_with_same_id_conflict() {
        let mut fx = Fixture::new();
        let a = fx.property("x");
        let b = fx.property("x");

        let mut inspector = fx.inspector();
        inspector.collect(a).unwrap();
        inspector.collect(b).unwrap();

        assert_eq!(inspector.conflicts_for(a), vec![b]);
    }

    #[test]
    fn test_delegation_field_silently_excluded() {
        let mut fx = Fixture::new();
        let field = {
            let n = fx.interner.intern("x");
            fx.decls.alloc(
                Declaration::new(
                    n,
                    DeclKind::Property {
                        callable_id: CallableId::top_level(fx.interner.intern("app"), n),
                        receiver: None,
                        ty: None,
                    },
                    FileId::new(0),
                    ModuleId::new(0),
                    TextRange::new(TextSize::from(0), TextSize::from(1)),
                )
                .with_origin(DeclOrigin::Synthetic(SyntheticKind::DelegationField)),
            )
        };
        let prop = fx.property("x");

        let mut inspector = fx.inspector();
        inspector.collect(field).unwrap();
        inspector.collect(prop).unwrap();

        assert!(inspector.conflicts_for(prop).is_empty());
    }

    #[test]
    fn test_enum_generated_not_collectable() {
        let mut fx = Fixture::new();
        let explicit = fx.function("values", Vec::new());
        let generated = {
            let n = fx.interner.intern("values");
            fx.decls.alloc(
                Declaration::new(
                    n,
                    DeclKind::Function {
                        callable_id: CallableId::top_level(fx.interner.intern("app"), n),
                        type_params: Vec::new(),
                        context_receivers: Vec::new(),
                        receiver: None,
                        params: Vec::new(),
                        is_operator: false,
                    },
                    FileId::new(0),
                    ModuleId::new(0),
                    TextRange::new(TextSize::from(0), TextSize::from(1)),
                )
                .with_origin(DeclOrigin::Synthetic(SyntheticKind::EnumGenerated)),
            )
        };

        let mut inspector = fx.inspector();
        inspector.collect(explicit).unwrap();
        inspector.collect(generated).unwrap();

        assert!(inspector.conflicts_for(explicit).is_empty());
    }

    #[test]
    fn test_external_conflict_across_files() {
        let mut fx = Fixture::new();
        let a = fx.function_in_file("f", Vec::new(), 0);
        let b = fx.function_in_file("f", Vec::new(), 1);

        let mut index = PackageIndex::new(Some(fx.interner.intern("app")));
        index.add_file(&fx.decls, FileId::new(0));
        index.add_file(&fx.decls, FileId::new(1));

        let mut inspector = fx.inspector();
        inspector
            .collect_with_external_conflicts(a, FileId::new(0), &index, &AlwaysVisible)
            .unwrap();

        assert_eq!(inspector.conflicts_for(a), vec![b]);
        assert_eq!(inspector.conflicts_for(b), vec![a]);
    }

    #[test]
    fn test_cross_module_never_conflicts() {
        let mut fx = Fixture::new();
        let a = fx.function_in_file("f", Vec::new(), 0);
        let b = {
            let n = fx.interner.intern("f");
            fx.decls.alloc(Declaration::new(
                n,
                DeclKind::Function {
                    callable_id: CallableId::top_level(fx.interner.intern("app"), n),
                    type_params: Vec::new(),
                    context_receivers: Vec::new(),
                    receiver: None,
                    params: Vec::new(),
                    is_operator: false,
                },
                FileId::new(1),
                ModuleId::new(1),
                TextRange::new(TextSize::from(0), TextSize::from(1)),
            ))
        };

        let mut index = PackageIndex::new(Some(fx.interner.intern("app")));
        index.add_file(&fx.decls, FileId::new(0));
        index.add_file(&fx.decls, FileId::new(1));

        let mut inspector = fx.inspector();
        inspector
            .collect_with_external_conflicts(a, FileId::new(0), &index, &AlwaysVisible)
            .unwrap();

        assert!(inspector.conflicts_for(a).is_empty());
        assert!(inspector.conflicts_for(b).is_empty());
    }

    #[test]
    fn test_multiple_mains_in_different_files() {
        let mut fx = Fixture::new();
        let a = fx.function_in_file("main", Vec::new(), 0);
        let b = fx.function_in_file("main", Vec::new(), 1);

        let mut index = PackageIndex::new(Some(fx.interner.intern("app")));
        index.add_file(&fx.decls, FileId::new(0));
        index.add_file(&fx.decls, FileId::new(1));

        // One collection pass per file, as a package-level check runs.
        let mut file0_pass = fx.inspector();
        file0_pass
            .collect_with_external_conflicts(a, FileId::new(0), &index, &AlwaysVisible)
            .unwrap();
        let mut file1_pass = fx.inspector();
        file1_pass
            .collect_with_external_conflicts(b, FileId::new(1), &index, &AlwaysVisible)
            .unwrap();

        assert!(file0_pass.conflicts_for(a).is_empty());
        assert!(file0_pass.conflicts_for(b).is_empty());
        assert!(file1_pass.conflicts_for(b).is_empty());
    }

    #[test]
    fn test_two_mains_in_same_file_conflict() {
        let mut fx = Fixture::new();
        let a = fx.function_in_file("main", Vec::new(), 0);
        let b = fx.function_in_file("main", Vec::new(), 0);

        let mut inspector = fx.inspector();
        inspector.collect(a).unwrap();
        inspector.collect(b).unwrap();

        assert_eq!(inspector.conflicts_for(a), vec![b]);
    }

    #[test]
    fn test_constructor_vs_function_external() {
        // class Foo(x: Int) in file 0, fun Foo(x: Int) in file 1.
        let mut fx = Fixture::new();
        let int = fx.ty("Int");
        let x = fx.interner.intern("x");
        let class = fx.class("Foo", 0);
        let ctor = fx.constructor(class, vec![ValueParameter::new(x, int)]);
        let function = fx.function_in_file("Foo", vec![ValueParameter::new(x, int)], 1);

        let mut index = PackageIndex::new(Some(fx.interner.intern("app")));
        index.add_file(&fx.decls, FileId::new(0));
        index.add_file(&fx.decls, FileId::new(1));

        let mut inspector = fx.inspector();
        inspector
            .collect_with_external_conflicts(class, FileId::new(0), &index, &AlwaysVisible)
            .unwrap();

        assert_eq!(inspector.conflicts_for(ctor), vec![function]);
        assert_eq!(inspector.conflicts_for(function), vec![ctor]);
        // The classifier itself only conflicts through its constructor.
        assert!(inspector.conflicts_for(class).is_empty());
    }

    #[test]
    fn test_function_vs_external_constructor() {
        // The function side of the same scenario.
        let mut fx = Fixture::new();
        let int = fx.ty("Int");
        let x = fx.interner.intern("x");
        let class = fx.class("Foo", 0);
        let ctor = fx.constructor(class, vec![ValueParameter::new(x, int)]);
        let function = fx.function_in_file("Foo", vec![ValueParameter::new(x, int)], 1);

        let mut index = PackageIndex::new(Some(fx.interner.intern("app")));
        index.add_file(&fx.decls, FileId::new(0));
        index.add_file(&fx.decls, FileId::new(1));

        let mut inspector = fx.inspector();
        inspector
            .collect_with_external_conflicts(function, FileId::new(1), &index, &AlwaysVisible)
            .unwrap();

        assert_eq!(inspector.conflicts_for(function), vec![ctor]);
    }

    #[test]
    fn test_low_priority_asymmetry_exempts() {
        let mut fx = Fixture::new();
        let low = fx.interner.intern(crate::hir::symbols::LOW_PRIORITY_ANNOTATION);
        let a = fx.function_in_file("f", Vec::new(), 0);
        let b = {
            let n = fx.interner.intern("f");
            fx.decls.alloc(
                Declaration::new(
                    n,
                    DeclKind::Function {
                        callable_id: CallableId::top_level(fx.interner.intern("app"), n),
                        type_params: Vec::new(),
                        context_receivers: Vec::new(),
                        receiver: None,
                        params: Vec::new(),
                        is_operator: false,
                    },
                    FileId::new(1),
                    ModuleId::new(0),
                    TextRange::new(TextSize::from(0), TextSize::from(1)),
                )
                .with_annotations(vec![low]),
            )
        };

        let mut index = PackageIndex::new(Some(fx.interner.intern("app")));
        index.add_file(&fx.decls, FileId::new(0));
        index.add_file(&fx.decls, FileId::new(1));

        let mut inspector = fx.inspector();
        inspector
            .collect_with_external_conflicts(a, FileId::new(0), &index, &AlwaysVisible)
            .unwrap();

        assert!(inspector.conflicts_for(a).is_empty());
        assert!(inspector.conflicts_for(b).is_empty());
    }

    #[test]
    fn test_invisible_symbol_exempt() {
        struct NothingVisible;
        impl VisibilityFilter for NothingVisible {
            fn is_visible(&self, _decl: DeclId, _from: FileId) -> bool {
                false
            }
        }

        let mut fx = Fixture::new();
        let a = fx.function_in_file("f", Vec::new(), 0);
        fx.function_in_file("f", Vec::new(), 1);

        let mut index = PackageIndex::new(Some(fx.interner.intern("app")));
        index.add_file(&fx.decls, FileId::new(0));
        index.add_file(&fx.decls, FileId::new(1));

        let mut inspector = fx.inspector();
        inspector
            .collect_with_external_conflicts(a, FileId::new(0), &index, &AlwaysVisible)
            .unwrap();
        assert_eq!(inspector.conflicts_for(a).len(), 1);

        let mut inspector = fx.inspector();
        inspector
            .collect_with_external_conflicts(a, FileId::new(0), &index, &NothingVisible)
            .unwrap();
        assert!(inspector.conflicts_for(a).is_empty());
    }

    #[test]
    fn test_unresolvable_symbol_degrades_to_no_conflict() {
        struct FailingIndex(PackageIndex);
        impl PackageSymbolIndex for FailingIndex {
            fn process_functions_by_name(&self, name: Name, f: &mut dyn FnMut(DeclId)) {
                self.0.process_functions_by_name(name, f)
            }
            fn process_properties_by_name(&self, name: Name, f: &mut dyn FnMut(DeclId)) {
                self.0.process_properties_by_name(name, f)
            }
            fn process_classifiers_by_name(&self, name: Name, f: &mut dyn FnMut(DeclId)) {
                self.0.process_classifiers_by_name(name, f)
            }
            fn resolve_declaration(
                &self,
                _symbol: DeclId,
            ) -> Result<DeclId, crate::hir::error::UnresolvedExternalSymbol> {
                Err(crate::hir::error::UnresolvedExternalSymbol::new("f"))
            }
            fn containing_file(&self, decl: DeclId) -> Option<FileId> {
                self.0.containing_file(decl)
            }
        }

        let mut fx = Fixture::new();
        let a = fx.function_in_file("f", Vec::new(), 0);
        fx.function_in_file("f", Vec::new(), 1);

        let mut inner = PackageIndex::new(Some(fx.interner.intern("app")));
        inner.add_file(&fx.decls, FileId::new(0));
        inner.add_file(&fx.decls, FileId::new(1));
        let index = FailingIndex(inner);

        let mut inspector = fx.inspector();
        inspector
            .collect_with_external_conflicts(a, FileId::new(0), &index, &AlwaysVisible)
            .unwrap();
        assert!(inspector.conflicts_for(a).is_empty());
    }

    #[test]
    fn test_cancellation_aborts_cleanly() {
        let mut fx = Fixture::new();
        let a = fx.function("f", Vec::new());

        let token = CancellationToken::new();
        token.cancel();
        let mut inspector = fx.inspector().with_cancellation(token);

        assert_eq!(inspector.collect(a), Err(AnalysisError::Cancelled));
    }

    #[test]
    fn test_check_conflicting_elements() {
        let fx = Fixture::new();
        let x = fx.interner.intern("x");
        let y = fx.interner.intern("y");
        let special = fx.interner.intern("<anonymous>");
        let range = TextRange::new(TextSize::from(0), TextSize::from(1));
        let file = FileId::new(0);

        let elements = vec![
            ParameterElement::Value { name: x, file, range },
            ParameterElement::Value { name: x, file, range },
            ParameterElement::Value { name: y, file, range },
            ParameterElement::Value { name: special, file, range },
            ParameterElement::Value { name: special, file, range },
            ParameterElement::TypeParameter {
                name: y,
                file,
                range,
                from_outer_class: true,
            },
        ];

        let mut collector = DiagnosticCollector::new();
        check_conflicting_elements(&elements, &fx.interner, &mut collector);

        // Both occupants of `x` get a diagnostic; `y` is a single occupant
        // (the outer-class type parameter is exempt); special names never
        // conflict.
        assert_eq!(collector.error_count(), 2);
        for diag in collector.diagnostics() {
            assert_eq!(diag.related.len(), 1);
        }
    }

    #[test]
    fn test_parameter_and_type_parameter_share_namespace() {
        let fx = Fixture::new();
        let t = fx.interner.intern("T");
        let range = TextRange::new(TextSize::from(0), TextSize::from(1));
        let file = FileId::new(0);

        let elements = vec![
            ParameterElement::TypeParameter {
                name: t,
                file,
                range,
                from_outer_class: false,
            },
            ParameterElement::Value { name: t, file, range },
        ];

        let mut collector = DiagnosticCollector::new();
        check_conflicting_elements(&elements, &fx.interner, &mut collector);
        assert_eq!(collector.error_count(), 2);
    }
}
