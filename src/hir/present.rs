//! Structural presentation keys for declarations.
//!
//! A presentation key is the conflict-equality signature of a declaration:
//! two declarations redeclare each other exactly when their keys match. The
//! key for a function captures, in order: context-receiver types,
//! type-parameter bounds, receiver type, operator-ness, the fully qualified
//! callable id, and the parameter types with their vararg tags. Classifiers
//! and properties key on their qualified id alone — those kinds cannot be
//! overloaded, so arity is irrelevant.
//!
//! Error and unresolved types render as a fixed `ERROR(...)` token, so two
//! declarations with equally-unresolved types still collide. Conservative on
//! purpose: a false redeclaration beats silently admitting an ambiguous one.

use smol_str::SmolStr;

use crate::base::Interner;
use super::ids::{CallableId, ClassId, DeclId};
use super::symbols::{DeclKind, Declarations, TypeParameter, ValueParameter};
use super::types::{TyId, TyKind, TyProjection, TyStore};

/// Renders declarations into presentation keys.
pub struct DeclarationPresenter<'a> {
    decls: &'a Declarations,
    types: &'a TyStore,
    interner: &'a Interner,
}

impl<'a> DeclarationPresenter<'a> {
    pub fn new(decls: &'a Declarations, types: &'a TyStore, interner: &'a Interner) -> Self {
        Self {
            decls,
            types,
            interner,
        }
    }

    /// The presentation key of a declaration, or `None` for kinds that have
    /// no standalone presentation (constructors are rendered against their
    /// owner via [`DeclarationPresenter::represent_constructor`]).
    pub fn represent(&self, decl: DeclId) -> Option<SmolStr> {
        match &self.decls.get(decl).kind {
            DeclKind::Function {
                callable_id,
                type_params,
                context_receivers,
                receiver,
                params,
                is_operator,
            } => Some(self.represent_function(
                callable_id,
                type_params,
                context_receivers,
                *receiver,
                params,
                *is_operator,
            )),
            DeclKind::Property {
                callable_id,
                receiver,
                ..
            } => {
                let mut out = String::new();
                out.push('[');
                if let Some(ty) = receiver {
                    self.append_ty(&mut out, *ty);
                }
                out.push(']');
                self.append_callable_id(&mut out, callable_id);
                Some(out.into())
            }
            DeclKind::Class { class_id, .. } | DeclKind::TypeAlias { class_id, .. } => {
                let mut out = String::from("[]");
                self.append_class_id(&mut out, class_id);
                Some(out.into())
            }
            DeclKind::Constructor { .. } => None,
        }
    }

    /// The presentation key of a constructor, rendered against the
    /// classifier id it constructs — the owner class, or a type alias
    /// standing in for it.
    pub fn represent_constructor(&self, ctor: DeclId, constructed: ClassId) -> SmolStr {
        let DeclKind::Constructor {
            type_params,
            context_receivers,
            params,
            ..
        } = &self.decls.get(ctor).kind
        else {
            return SmolStr::default();
        };
        let mut out = String::new();
        self.append_context_receivers(&mut out, context_receivers);
        self.append_type_params(&mut out, type_params);
        out.push_str("[]");
        self.append_class_id(&mut out, &constructed);
        self.append_params(&mut out, params);
        out.into()
    }

    fn represent_function(
        &self,
        callable_id: &CallableId,
        type_params: &[TypeParameter],
        context_receivers: &[TyId],
        receiver: Option<TyId>,
        params: &[ValueParameter],
        is_operator: bool,
    ) -> SmolStr {
        let mut out = String::new();
        self.append_context_receivers(&mut out, context_receivers);
        self.append_type_params(&mut out, type_params);
        out.push('[');
        if let Some(ty) = receiver {
            self.append_ty(&mut out, ty);
        }
        out.push(']');
        if is_operator {
            out.push_str("operator ");
        }
        self.append_callable_id(&mut out, callable_id);
        self.append_params(&mut out, params);
        out.into()
    }

    fn append_context_receivers(&self, out: &mut String, receivers: &[TyId]) {
        for &ty in receivers {
            self.append_ty(out, ty);
            out.push(',');
        }
    }

    fn append_type_params(&self, out: &mut String, type_params: &[TypeParameter]) {
        out.push('<');
        for tp in type_params {
            self.append_type_param(out, tp);
            out.push(',');
        }
        out.push('>');
    }

    fn append_type_param(&self, out: &mut String, tp: &TypeParameter) {
        out.push_str(&self.interner.get(tp.name));
        out.push(':');
        match tp.bounds.len() {
            0 => {}
            1 => self.append_ty(out, tp.bounds[0]),
            // Canonicalize: textual order of multiple bounds must not
            // affect key equality.
            _ => {
                let mut rendered: Vec<String> = tp
                    .bounds
                    .iter()
                    .map(|&b| {
                        let mut s = String::new();
                        self.append_ty(&mut s, b);
                        s
                    })
                    .collect();
                rendered.sort();
                rendered.dedup();
                for bound in rendered {
                    out.push_str(&bound);
                    out.push(',');
                }
            }
        }
    }

    fn append_params(&self, out: &mut String, params: &[ValueParameter]) {
        out.push('(');
        for param in params {
            if param.is_vararg {
                out.push_str("vararg ");
            }
            self.append_ty(out, param.ty);
            out.push(',');
        }
        out.push(')');
    }

    pub(crate) fn render_ty(&self, ty: TyId) -> String {
        let mut out = String::new();
        self.append_ty(&mut out, ty);
        out
    }

    fn append_ty(&self, out: &mut String, ty: TyId) {
        match self.types.kind(ty) {
            TyKind::Class { class_id, args } => {
                self.append_class_id(out, class_id);
                if !args.is_empty() {
                    out.push('<');
                    for &arg in args {
                        self.append_projection(out, arg);
                        out.push(',');
                    }
                    out.push('>');
                }
                if self.types.is_nullable(ty) {
                    out.push('?');
                }
            }
            TyKind::TypeParameter { name } => {
                out.push_str(&self.interner.get(*name));
                if self.types.is_nullable(ty) {
                    out.push('?');
                }
            }
            TyKind::DefinitelyNotNull { inner } => {
                self.append_ty(out, *inner);
            }
            TyKind::Error { reason } => {
                out.push_str("ERROR(");
                out.push_str(reason);
                out.push(')');
            }
            TyKind::Flexible | TyKind::Intersection => {
                out.push_str("ERROR");
            }
        }
    }

    fn append_projection(&self, out: &mut String, projection: TyProjection) {
        match projection {
            TyProjection::Star => out.push('*'),
            TyProjection::In(ty) => {
                out.push_str("in ");
                self.append_ty(out, ty);
            }
            TyProjection::Out(ty) => {
                out.push_str("out ");
                self.append_ty(out, ty);
            }
            TyProjection::Invariant(ty) => self.append_ty(out, ty),
        }
    }

    fn append_class_id(&self, out: &mut String, class_id: &ClassId) {
        out.push_str(&self.interner.get(class_id.package));
        out.push('/');
        out.push_str(&self.interner.get(class_id.relative));
    }

    fn append_callable_id(&self, out: &mut String, callable_id: &CallableId) {
        out.push_str(&self.interner.get(callable_id.package));
        out.push('/');
        if let Some(class_name) = callable_id.class_name {
            out.push_str(&self.interner.get(class_name));
            out.push('.');
        }
        out.push_str(&self.interner.get(callable_id.name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{FileId, ModuleId, TextRange, TextSize};
    use crate::hir::symbols::Declaration;

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

        fn function(
            &mut self,
            name: &str,
            receiver: Option<TyId>,
            params: Vec<ValueParameter>,
            type_params: Vec<TypeParameter>,
            is_operator: bool,
        ) -> DeclId {
            let n = self.interner.intern(name);
            self.decls.alloc(Declaration::new(
                n,
                DeclKind::Function {
                    callable_id: CallableId::top_level(self.interner.intern("app"), n),
                    type_params,
                    context_receivers: Vec::new(),
                    receiver,
                    params,
                    is_operator,
                },
                FileId::new(0),
                ModuleId::new(0),
                TextRange::new(TextSize::from(0), TextSize::from(1)),
            ))
        }
    }

    #[test]
    fn test_signature_discriminates_parameter_types() {
        let mut fx = Fixture::new();
        let int = fx.ty("Int");
        let string = fx.ty("String");
        let p = fx.interner.intern("x");

        let f_int = fx.function("f", None, vec![ValueParameter::new(p, int)], Vec::new(), false);
        let f_str = fx.function("f", None, vec![ValueParameter::new(p, string)], Vec::new(), false);
        let f_int_again = fx.function("f", None, vec![ValueParameter::new(p, int)], Vec::new(), false);

        let presenter = DeclarationPresenter::new(&fx.decls, &fx.types, &fx.interner);
        let k1 = presenter.represent(f_int).unwrap();
        let k2 = presenter.represent(f_str).unwrap();
        let k3 = presenter.represent(f_int_again).unwrap();

        assert_ne!(k1, k2);
        assert_eq!(k1, k3);
    }

    #[test]
    fn test_receiver_and_operator_in_key() {
        let mut fx = Fixture::new();
        let int = fx.ty("Int");

        let plain = fx.function("f", None, Vec::new(), Vec::new(), false);
        let ext = fx.function("f", Some(int), Vec::new(), Vec::new(), false);
        let op = fx.function("f", None, Vec::new(), Vec::new(), true);

        let presenter = DeclarationPresenter::new(&fx.decls, &fx.types, &fx.interner);
        let keys = [plain, ext, op].map(|d| presenter.represent(d).unwrap());

        assert_ne!(keys[0], keys[1]);
        assert_ne!(keys[0], keys[2]);
        assert!(keys[2].contains("operator "));
    }

    #[test]
    fn test_bound_order_does_not_matter() {
        let mut fx = Fixture::new();
        let a = fx.ty("A");
        let b = fx.ty("B");
        let t = fx.interner.intern("T");

        let tp_ab = TypeParameter::new(t).with_bounds(vec![a, b]);
        let tp_ba = TypeParameter::new(t).with_bounds(vec![b, a]);
        let f1 = fx.function("f", None, Vec::new(), vec![tp_ab], false);
        let f2 = fx.function("f", None, Vec::new(), vec![tp_ba], false);

        let presenter = DeclarationPresenter::new(&fx.decls, &fx.types, &fx.interner);
        assert_eq!(presenter.represent(f1), presenter.represent(f2));
    }

    #[test]
    fn test_vararg_tagged() {
        let mut fx = Fixture::new();
        let int = fx.ty("Int");
        let p = fx.interner.intern("xs");

        let plain = fx.function("f", None, vec![ValueParameter::new(p, int)], Vec::new(), false);
        let vararg = fx.function("f", None, vec![ValueParameter::vararg(p, int)], Vec::new(), false);

        let presenter = DeclarationPresenter::new(&fx.decls, &fx.types, &fx.interner);
        assert_ne!(presenter.represent(plain), presenter.represent(vararg));
    }

    #[test]
    fn test_error_types_collide() {
        let mut fx = Fixture::new();
        let e1 = fx.types.error("unresolved reference: Missing");
        let e2 = fx.types.error("unresolved reference: Missing");
        let p = fx.interner.intern("x");

        let f1 = fx.function("f", None, vec![ValueParameter::new(p, e1)], Vec::new(), false);
        let f2 = fx.function("f", None, vec![ValueParameter::new(p, e2)], Vec::new(), false);

        let presenter = DeclarationPresenter::new(&fx.decls, &fx.types, &fx.interner);
        let k1 = presenter.represent(f1).unwrap();
        assert!(k1.contains("ERROR("));
        assert_eq!(Some(k1), presenter.represent(f2));
    }

    #[test]
    fn test_projections_render() {
        let mut fx = Fixture::new();
        let int = fx.ty("Int");
        let list = ClassId::new(fx.interner.intern("kite"), fx.interner.intern("List"));
        let star_list = fx.types.class_with_args(list, vec![TyProjection::Star]);
        let out_list = fx.types.class_with_args(list, vec![TyProjection::Out(int)]);
        let p = fx.interner.intern("x");

        let f_star = fx.function("f", None, vec![ValueParameter::new(p, star_list)], Vec::new(), false);
        let f_out = fx.function("f", None, vec![ValueParameter::new(p, out_list)], Vec::new(), false);

        let presenter = DeclarationPresenter::new(&fx.decls, &fx.types, &fx.interner);
        let k_star = presenter.represent(f_star).unwrap();
        let k_out = presenter.represent(f_out).unwrap();

        assert!(k_star.contains("<*,>"));
        assert!(k_out.contains("out "));
        assert_ne!(k_star, k_out);
    }

    #[test]
    fn test_property_keys_on_id_not_type() {
        let mut fx = Fixture::new();
        let int = fx.ty("Int");
        let n = fx.interner.intern("x");
        let make_prop = |fx: &mut Fixture, ty| {
            fx.decls.alloc(Declaration::new(
                n,
                DeclKind::Property {
                    callable_id: CallableId::top_level(fx.interner.intern("app"), n),
                    receiver: None,
                    ty,
                },
                FileId::new(0),
                ModuleId::new(0),
                TextRange::new(TextSize::from(0), TextSize::from(1)),
            ))
        };
        let typed = make_prop(&mut fx, Some(int));
        let untyped = make_prop(&mut fx, None);

        let presenter = DeclarationPresenter::new(&fx.decls, &fx.types, &fx.interner);
        assert_eq!(presenter.represent(typed), presenter.represent(untyped));
    }
}
