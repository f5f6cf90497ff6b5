//! The semantic model: declarations, types, scopes, and conflicts.
//!
//! Two loosely coupled engines live here:
//!
//! - the **scope tower** ([`tower`], [`scope`], [`provider`]) — from a
//!   lexical position to the ordered list of everything nameable there;
//! - the **conflict detector** ([`conflicts`], [`present`], [`index`]) —
//!   from a set of sibling declarations to their mutual redeclaration
//!   conflicts, including the cross-file pass over a package index.
//!
//! Both are call-and-return over a fixed snapshot: the [`symbols`] arena,
//! the [`types`] store, and the [`source`] maps are built by the host, read
//! here, and rebuilt on any structural edit.

pub mod conflicts;
pub mod diagnostics;
pub mod error;
pub mod ids;
pub mod index;
pub mod input;
pub mod present;
pub mod provider;
pub mod scope;
pub mod source;
pub mod symbols;
pub mod tower;
pub mod types;

pub use conflicts::{check_conflicting_elements, DeclarationInspector, ParameterElement};
pub use diagnostics::{
    codes, report_redeclarations, Diagnostic, DiagnosticCollector, RelatedInfo, Severity,
};
pub use error::{AnalysisError, UnresolvedExternalSymbol};
pub use ids::{CallableId, ClassId, DeclId};
pub use index::{AlwaysVisible, PackageIndex, PackageSymbolIndex, VisibilityFilter};
pub use input::{AnalysisConfig, SourceRoot};
pub use present::DeclarationPresenter;
pub use provider::{DeclarationScopeProvider, FileImports};
pub use scope::{
    ImplicitReceiver, ImportingKind, Scope, ScopeBuilder, ScopeContext, ScopeEntry, ScopeKind,
    UNKNOWN_INDEX,
};
pub use source::{LambdaReceiver, SourceMap};
pub use symbols::{
    ClassKind, DeclKind, DeclOrigin, Declaration, Declarations, SyntheticKind, TypeParameter,
    ValueParameter, LOW_PRIORITY_ANNOTATION,
};
pub use tower::{ScopeContextBuilder, ScopeProvider};
pub use types::{TyId, TyKind, TyProjection, TyStore};
