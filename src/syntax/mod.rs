//! Position-addressable syntax trees.
//!
//! Parsing is not this crate's job: trees arrive already built (by the
//! front-end parser, or programmatically in tests) and are only *walked*
//! here. A [`SyntaxTree`] is an arena of nodes with parent links, which is
//! all the scope-tower builder needs: find the deepest node covering a
//! position, then iterate its lexical ancestry outward.
//!
//! Speculative nodes support "as if typed here" analysis: they are attached
//! at a logical parent but never returned by [`SyntaxTree::node_at`], so a
//! rewritten fragment can be analyzed without disturbing the committed tree.

use crate::base::{FileId, Name, TextRange, TextSize};

/// Handle to a node within one [`SyntaxTree`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Debug)]
pub struct SyntaxNodeId(u32);

impl SyntaxNodeId {
    /// Get the raw index.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

/// The structural role of a syntax node.
///
/// Only roles that matter to scope construction are distinguished; everything
/// else is an [`SyntaxKind::Expression`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SyntaxKind {
    /// The file root.
    File,
    /// `package a.b.c` directive.
    PackageDirective,
    /// One import directive; `star` is true for `import a.b.*`.
    Import { star: bool },
    /// A class, object, or interface declaration.
    Class,
    /// The brace-delimited body of a class.
    ClassBody,
    /// A function or constructor declaration.
    Function,
    /// The body of a function; value parameters are in scope here.
    FunctionBody,
    /// A property or local variable declaration.
    Property,
    /// A property or variable initializer expression.
    PropertyInitializer,
    /// A plain statement block.
    Block,
    /// A function literal; a receiver, if any, is recorded in the source map.
    Lambda,
    /// A parameter default-value expression. No enclosing local scope.
    DefaultValue,
    /// An annotation argument expression. No enclosing local scope.
    AnnotationArgument,
    /// Any other expression or leaf.
    Expression,
}

#[derive(Clone, Debug)]
struct NodeData {
    kind: SyntaxKind,
    parent: Option<SyntaxNodeId>,
    children: Vec<SyntaxNodeId>,
    range: TextRange,
    speculative: bool,
}

/// An arena-backed syntax tree for one file.
#[derive(Clone, Debug)]
pub struct SyntaxTree {
    file: FileId,
    package: Option<Name>,
    nodes: Vec<NodeData>,
}

impl SyntaxTree {
    /// Create a tree whose root [`SyntaxKind::File`] node spans `len` bytes.
    pub fn new(file: FileId, len: TextSize) -> Self {
        let root = NodeData {
            kind: SyntaxKind::File,
            parent: None,
            children: Vec::new(),
            range: TextRange::up_to(len),
            speculative: false,
        };
        Self {
            file,
            package: None,
            nodes: vec![root],
        }
    }

    /// The file this tree was built from.
    pub fn file(&self) -> FileId {
        self.file
    }

    /// Record the file's `package` directive name.
    pub fn set_package(&mut self, package: Name) {
        self.package = Some(package);
    }

    /// The file's package, `None` when the file has no package directive.
    pub fn package(&self) -> Option<Name> {
        self.package
    }

    /// The root node.
    pub fn root(&self) -> SyntaxNodeId {
        SyntaxNodeId(0)
    }

    /// Append a committed child node.
    pub fn push(&mut self, parent: SyntaxNodeId, kind: SyntaxKind, range: TextRange) -> SyntaxNodeId {
        self.push_node(parent, kind, range, false)
    }

    /// Append a speculative node at a logical parent.
    ///
    /// The node is addressable by the returned id and walks its ancestry like
    /// any other node, but [`SyntaxTree::node_at`] never yields it: it is not
    /// part of the committed file text.
    pub fn push_speculative(
        &mut self,
        parent: SyntaxNodeId,
        kind: SyntaxKind,
        range: TextRange,
    ) -> SyntaxNodeId {
        self.push_node(parent, kind, range, true)
    }

    fn push_node(
        &mut self,
        parent: SyntaxNodeId,
        kind: SyntaxKind,
        range: TextRange,
        speculative: bool,
    ) -> SyntaxNodeId {
        let id = SyntaxNodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            kind,
            parent: Some(parent),
            children: Vec::new(),
            range,
            speculative,
        });
        self.nodes[parent.0 as usize].children.push(id);
        id
    }

    /// The kind of a node.
    pub fn kind(&self, node: SyntaxNodeId) -> SyntaxKind {
        self.nodes[node.0 as usize].kind
    }

    /// The source range of a node.
    pub fn range(&self, node: SyntaxNodeId) -> TextRange {
        self.nodes[node.0 as usize].range
    }

    /// The parent of a node, `None` for the root.
    pub fn parent(&self, node: SyntaxNodeId) -> Option<SyntaxNodeId> {
        self.nodes[node.0 as usize].parent
    }

    /// The committed and speculative children of a node, in insertion order.
    pub fn children(&self, node: SyntaxNodeId) -> &[SyntaxNodeId] {
        &self.nodes[node.0 as usize].children
    }

    /// Whether a node is speculative.
    pub fn is_speculative(&self, node: SyntaxNodeId) -> bool {
        self.nodes[node.0 as usize].speculative
    }

    /// Find the deepest committed node whose range contains `offset`.
    ///
    /// Returns `None` when the offset lies outside the file.
    pub fn node_at(&self, offset: TextSize) -> Option<SyntaxNodeId> {
        let root = self.root();
        if !self.nodes[0].range.contains_inclusive(offset) {
            return None;
        }
        let mut current = root;
        'descend: loop {
            for &child in &self.nodes[current.0 as usize].children {
                let data = &self.nodes[child.0 as usize];
                if !data.speculative && data.range.contains_inclusive(offset) {
                    current = child;
                    continue 'descend;
                }
            }
            return Some(current);
        }
    }

    /// Iterate a node's ancestry from the node itself up to the root.
    pub fn ancestors(&self, node: SyntaxNodeId) -> impl Iterator<Item = SyntaxNodeId> + '_ {
        std::iter::successors(Some(node), move |&n| self.parent(n))
    }
}
