//! "What's visible here" — rendering a scope context for consumers.

use std::fmt::Write as _;

use crate::base::Interner;
use crate::hir::present::DeclarationPresenter;
use crate::hir::scope::{Scope, ScopeContext};
use crate::hir::symbols::Declarations;
use crate::hir::types::TyStore;

/// Render a [`ScopeContext`] as indented text, scopes in tower order.
///
/// Default importing scopes are axiomatically large — the prelude — and are
/// rendered as a header only, never itemized. Other empty scopes are marked
/// `empty`.
pub fn render_scope_context(
    ctx: &ScopeContext,
    decls: &Declarations,
    types: &TyStore,
    interner: &Interner,
) -> String {
    let presenter = DeclarationPresenter::new(decls, types, interner);
    let mut out = String::new();

    out.push_str("implicit receivers:\n");
    for receiver in ctx.implicit_receivers() {
        let owner = interner.get(decls.get(receiver.owner).name);
        let _ = writeln!(
            out,
            "  type: {}, owner: {}",
            presenter.render_ty(receiver.ty),
            owner
        );
    }

    out.push_str("scopes:\n");
    for (scope, kind) in ctx.scopes() {
        if kind.is_default_importing() {
            let _ = writeln!(out, "  {kind}");
            continue;
        }
        if scope.is_empty() {
            let _ = writeln!(out, "  {kind}, empty");
            continue;
        }
        let _ = writeln!(out, "  {kind}");
        render_scope_members(&mut out, scope, interner);
    }
    out
}

fn render_scope_members(out: &mut String, scope: &Scope, interner: &Interner) {
    let classifiers: Vec<_> = scope.classifiers().collect();
    let _ = writeln!(out, "    classifiers: {}", classifiers.len());
    for (name, _) in classifiers {
        let _ = writeln!(out, "      {}", interner.get(name));
    }
    let callables: Vec<_> = scope.callables().collect();
    let _ = writeln!(out, "    callables: {}", callables.len());
    for (name, _) in callables {
        let _ = writeln!(out, "      {}", interner.get(name));
    }
}
