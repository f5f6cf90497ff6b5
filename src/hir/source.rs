//! Mapping between syntax nodes and declarations.
//!
//! One `SourceMap` per file. The scope-tower builder walks syntax and uses
//! the map to find the declaration behind a `Function`/`Class` boundary, and
//! the receiver type a lambda was given by inference (`with`/`apply`-style
//! calls). The map is filled by whatever lowered the file — the front-end,
//! or a test by hand.

use rustc_hash::FxHashMap;

use crate::syntax::SyntaxNodeId;
use super::ids::DeclId;
use super::types::TyId;

/// A lambda's implicit receiver: the receiver type plus the declaration
/// owning the receiver (the called scope function, typically).
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct LambdaReceiver {
    pub ty: TyId,
    pub owner: DeclId,
}

/// Syntax ↔ declaration links for one file.
#[derive(Clone, Debug, Default)]
pub struct SourceMap {
    decl_of_node: FxHashMap<SyntaxNodeId, DeclId>,
    node_of_decl: FxHashMap<DeclId, SyntaxNodeId>,
    lambda_receivers: FxHashMap<SyntaxNodeId, LambdaReceiver>,
}

impl SourceMap {
    /// Create a new empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Link a declaration to its defining syntax node.
    pub fn record_decl(&mut self, node: SyntaxNodeId, decl: DeclId) {
        self.decl_of_node.insert(node, decl);
        self.node_of_decl.insert(decl, node);
    }

    /// Record the inferred receiver of a lambda node.
    pub fn record_lambda_receiver(&mut self, node: SyntaxNodeId, ty: TyId, owner: DeclId) {
        self.lambda_receivers
            .insert(node, LambdaReceiver { ty, owner });
    }

    /// The declaration defined by a node, if any.
    pub fn decl_of(&self, node: SyntaxNodeId) -> Option<DeclId> {
        self.decl_of_node.get(&node).copied()
    }

    /// The defining node of a declaration, if any.
    pub fn node_of(&self, decl: DeclId) -> Option<SyntaxNodeId> {
        self.node_of_decl.get(&decl).copied()
    }

    /// The receiver a lambda node introduces, if inference gave it one.
    pub fn lambda_receiver(&self, node: SyntaxNodeId) -> Option<LambdaReceiver> {
        self.lambda_receivers.get(&node).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let mut map = SourceMap::new();
        let node = dummy_node(3);
        let decl = DeclId::new(7);

        map.record_decl(node, decl);

        assert_eq!(map.decl_of(node), Some(decl));
        assert_eq!(map.node_of(decl), Some(node));
        assert_eq!(map.decl_of(dummy_node(4)), None);
    }

    fn dummy_node(i: u32) -> SyntaxNodeId {
        use crate::base::{FileId, TextRange, TextSize};
        use crate::syntax::{SyntaxKind, SyntaxTree};

        // Node ids are tree-local; build a throwaway tree to mint one.
        let mut tree = SyntaxTree::new(FileId::new(0), TextSize::from(100));
        let mut last = tree.root();
        for _ in 0..i {
            last = tree.push(
                last,
                SyntaxKind::Expression,
                TextRange::new(TextSize::from(0), TextSize::from(1)),
            );
        }
        last
    }
}
