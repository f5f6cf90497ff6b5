//! The scope-tower builder — from a lexical position to a [`ScopeContext`].
//!
//! The builder walks the position's lexical ancestry innermost to outermost
//! and collects one scope per structural boundary: blocks, function bodies
//! with their value parameters, receivers of extension and member functions,
//! class bodies, the file, the package, and the import directives. It does
//! not *construct* scopes — a [`ScopeProvider`] does — it only orders and
//! tags them. The returned list's ordering is the name-lookup priority.

use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::base::{FileId, Name, TextSize};
use crate::syntax::{SyntaxKind, SyntaxNodeId, SyntaxTree};
use super::error::AnalysisError;
use super::ids::DeclId;
use super::scope::{ImplicitReceiver, ImportingKind, Scope, ScopeContext, ScopeKind};
use super::source::SourceMap;
use super::symbols::{DeclKind, Declarations};
use super::types::TyId;

/// Produces the primitive scopes the tower is assembled from.
///
/// Implementations are external to the core; the crate ships
/// [`DeclarationScopeProvider`](super::provider::DeclarationScopeProvider)
/// as a reference. Every method returns an immutable snapshot scope.
pub trait ScopeProvider {
    /// All members callable on a class, including inherited ones.
    fn member_scope(&self, class: DeclId) -> Scope;

    /// Only the members declared by the class itself.
    fn declared_member_scope(&self, class: DeclId) -> Scope {
        self.member_scope(class)
    }

    /// Members produced by interface delegation.
    fn delegated_member_scope(&self, class: DeclId) -> Scope {
        let _ = class;
        Scope::empty()
    }

    /// Statically accessible members (nested classifiers and the like).
    fn static_member_scope(&self, class: DeclId) -> Scope {
        let _ = class;
        Scope::empty()
    }

    /// Top-level declarations of a file.
    fn file_scope(&self, file: FileId) -> Scope;

    /// Members of a package; `None` is the root package.
    fn package_scope(&self, package: Option<Name>) -> Scope;

    /// Merge scopes, earlier ones first.
    fn composite_scope(&self, scopes: Vec<Scope>) -> Scope {
        Scope::composite(scopes)
    }

    /// The member scope of a type. `None` only for error types.
    fn type_scope(&self, ty: TyId) -> Option<Scope>;

    /// Bridged synthetic properties callable on a type, when the platform
    /// interop layer produces any. `None` when there are none or the type
    /// is an error type.
    fn synthetic_properties_scope(&self, ty: TyId) -> Option<Scope> {
        let _ = ty;
        None
    }

    /// Local declarations introduced by a block-like node.
    fn local_scope(&self, file: FileId, node: SyntaxNodeId) -> Scope;

    /// The value parameters of a function, as a scope.
    fn value_parameter_scope(&self, function: DeclId) -> Scope;

    /// The type parameters of a function or class, as a scope.
    fn type_parameter_scope(&self, owner: DeclId) -> Scope;

    /// The file's explicit imports: single-name (`star == false`) or
    /// star (`star == true`).
    fn explicit_import_scope(&self, file: FileId, star: bool) -> Scope;

    /// The configured default imports. Always present, possibly empty.
    fn default_import_scope(&self, star: bool) -> Scope;
}

#[derive(Default)]
struct Counters {
    local: u32,
    type_param: u32,
    names_aware: u32,
    package: u32,
    importing: [u32; 4],
}

fn bump(counter: &mut u32) -> u32 {
    let index = *counter;
    *counter += 1;
    index
}

impl Counters {
    fn importing(&mut self, subkind: ImportingKind) -> u32 {
        let slot = match subkind {
            ImportingKind::ExplicitSimple => 0,
            ImportingKind::ExplicitStar => 1,
            ImportingKind::DefaultSimple => 2,
            ImportingKind::DefaultStar => 3,
        };
        bump(&mut self.importing[slot])
    }
}

/// Maps a `(file, position)` pair to a [`ScopeContext`].
///
/// Holds only borrowed snapshot data; independent sessions can run builders
/// in parallel threads as long as the snapshot itself is not mutated.
pub struct ScopeContextBuilder<'a> {
    decls: &'a Declarations,
    source_map: &'a SourceMap,
    provider: &'a dyn ScopeProvider,
    cancel: CancellationToken,
}

impl<'a> ScopeContextBuilder<'a> {
    pub fn new(
        decls: &'a Declarations,
        source_map: &'a SourceMap,
        provider: &'a dyn ScopeProvider,
    ) -> Self {
        Self {
            decls,
            source_map,
            provider,
            cancel: CancellationToken::new(),
        }
    }

    /// Use a cancellation token; the walk checks it at every boundary.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Build the scope context for a byte offset in the committed tree.
    pub fn build(&self, tree: &SyntaxTree, position: TextSize) -> Result<ScopeContext, AnalysisError> {
        let node = tree.node_at(position).ok_or(AnalysisError::InvalidPosition {
            file: tree.file(),
            offset: position,
        })?;
        self.build_at(tree, node)
    }

    /// Build the scope context for a node — committed or speculative.
    ///
    /// Speculative nodes resolve relative to their logical parent, so a
    /// rewritten "as if typed here" fragment gets the same tower as the
    /// position it stands in for.
    pub fn build_at(&self, tree: &SyntaxTree, start: SyntaxNodeId) -> Result<ScopeContext, AnalysisError> {
        let file = tree.file();
        let mut scopes: Vec<(Scope, ScopeKind)> = Vec::new();
        let mut receivers: Vec<ImplicitReceiver> = Vec::new();
        let mut counters = Counters::default();
        let mut prev: Option<SyntaxKind> = None;

        for node in tree.ancestors(start) {
            if self.cancel.is_cancelled() {
                return Err(AnalysisError::Cancelled);
            }
            let kind = tree.kind(node);
            trace!(?kind, node = node.index(), "scope boundary");
            match kind {
                SyntaxKind::Block | SyntaxKind::FunctionBody => {
                    scopes.push((
                        self.provider.local_scope(file, node),
                        ScopeKind::Local {
                            index_in_tower: bump(&mut counters.local),
                        },
                    ));
                }
                SyntaxKind::Lambda => {
                    // Lambda parameters sit right outside the lambda's body
                    // blocks.
                    scopes.push((
                        self.provider.local_scope(file, node),
                        ScopeKind::Local {
                            index_in_tower: bump(&mut counters.local),
                        },
                    ));
                    if let Some(receiver) = self.source_map.lambda_receiver(node) {
                        self.push_receiver(receiver.ty, receiver.owner, &mut scopes, &mut receivers);
                    }
                }
                SyntaxKind::Function => {
                    if let Some(decl) = self.source_map.decl_of(node) {
                        // Value parameters are in scope only when the
                        // position was inside the body; default values and
                        // annotation arguments never pass through one.
                        if prev == Some(SyntaxKind::FunctionBody) {
                            scopes.push((
                                self.provider.value_parameter_scope(decl),
                                ScopeKind::Local {
                                    index_in_tower: bump(&mut counters.local),
                                },
                            ));
                        }
                        match &self.decls.get(decl).kind {
                            DeclKind::Function {
                                receiver,
                                type_params,
                                ..
                            } => {
                                if let Some(ty) = receiver {
                                    self.push_receiver(*ty, decl, &mut scopes, &mut receivers);
                                }
                                if !type_params.is_empty() {
                                    scopes.push((
                                        self.provider.type_parameter_scope(decl),
                                        ScopeKind::TypeParameter {
                                            index_in_tower: bump(&mut counters.type_param),
                                        },
                                    ));
                                }
                            }
                            DeclKind::Constructor { type_params, .. } => {
                                if !type_params.is_empty() {
                                    scopes.push((
                                        self.provider.type_parameter_scope(decl),
                                        ScopeKind::TypeParameter {
                                            index_in_tower: bump(&mut counters.type_param),
                                        },
                                    ));
                                }
                            }
                            _ => {}
                        }
                    }
                }
                SyntaxKind::Class => {
                    // Members and `this` are visible from the body, not from
                    // the supertype list or annotations.
                    if prev == Some(SyntaxKind::ClassBody) {
                        if let Some(decl) = self.source_map.decl_of(node) {
                            if let DeclKind::Class {
                                self_ty,
                                type_params,
                                ..
                            } = &self.decls.get(decl).kind
                            {
                                if let Some(ty) = self_ty {
                                    self.push_receiver(*ty, decl, &mut scopes, &mut receivers);
                                }
                                if !type_params.is_empty() {
                                    scopes.push((
                                        self.provider.type_parameter_scope(decl),
                                        ScopeKind::TypeParameter {
                                            index_in_tower: bump(&mut counters.type_param),
                                        },
                                    ));
                                }
                                let static_scope = self.provider.static_member_scope(decl);
                                if !static_scope.is_empty() {
                                    scopes.push((
                                        static_scope,
                                        ScopeKind::NamesAware {
                                            index_in_tower: bump(&mut counters.names_aware),
                                        },
                                    ));
                                }
                            }
                        }
                    }
                }
                SyntaxKind::File => {
                    scopes.push((
                        self.provider.file_scope(file),
                        ScopeKind::NamesAware {
                            index_in_tower: bump(&mut counters.names_aware),
                        },
                    ));
                    scopes.push((
                        self.provider.package_scope(tree.package()),
                        ScopeKind::PackageMember {
                            index_in_tower: bump(&mut counters.package),
                        },
                    ));
                    for (star, subkind) in [
                        (false, ImportingKind::ExplicitSimple),
                        (true, ImportingKind::ExplicitStar),
                    ] {
                        scopes.push((
                            self.provider.explicit_import_scope(file, star),
                            ScopeKind::Importing {
                                subkind,
                                index_in_tower: counters.importing(subkind),
                            },
                        ));
                    }
                    for (star, subkind) in [
                        (false, ImportingKind::DefaultSimple),
                        (true, ImportingKind::DefaultStar),
                    ] {
                        scopes.push((
                            self.provider.default_import_scope(star),
                            ScopeKind::Importing {
                                subkind,
                                index_in_tower: counters.importing(subkind),
                            },
                        ));
                    }
                }
                SyntaxKind::PackageDirective
                | SyntaxKind::Import { .. }
                | SyntaxKind::ClassBody
                | SyntaxKind::Property
                | SyntaxKind::PropertyInitializer
                | SyntaxKind::DefaultValue
                | SyntaxKind::AnnotationArgument
                | SyntaxKind::Expression => {}
            }
            prev = Some(kind);
        }

        debug!(
            file = %file,
            scopes = scopes.len(),
            receivers = receivers.len(),
            "built scope context"
        );
        Ok(ScopeContext::new(scopes, receivers))
    }

    fn push_receiver(
        &self,
        ty: TyId,
        owner: DeclId,
        scopes: &mut Vec<(Scope, ScopeKind)>,
        receivers: &mut Vec<ImplicitReceiver>,
    ) {
        // The walk runs innermost-out, so receiver index == list position.
        let receiver_index = receivers.len() as u32;
        receivers.push(ImplicitReceiver { ty, owner });
        if let Some(scope) = self.provider.type_scope(ty) {
            scopes.push((
                scope,
                ScopeKind::Type {
                    receiver_index,
                    synthetic: false,
                },
            ));
        }
        if let Some(scope) = self.provider.synthetic_properties_scope(ty) {
            scopes.push((
                scope,
                ScopeKind::Type {
                    receiver_index,
                    synthetic: true,
                },
            ));
        }
    }
}
