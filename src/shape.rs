//! Sideways rendering of a tree's structure.

use std::fmt;

use crate::arena::NodeId;
use crate::AvlTree;

/// Spaces added per level of depth unless overridden.
const DEFAULT_INDENT: usize = 10;

/// Draws an [`AvlTree`] rotated a quarter turn counter-clockwise: the right
/// subtree comes first, then the node, then the left subtree. Every key sits
/// on its own line after an empty line, indented in proportion to its depth.
///
/// ```rust
/// use avl_index::AvlTree;
///
/// let mut tree = AvlTree::new();
/// for id in [2, 1, 3] {
///     tree.insert(id, "").unwrap();
/// }
/// assert_eq!(tree.shape().indent(2).to_string(), "\n  3\n\n2\n\n  1\n");
/// ```
#[derive(Clone, Copy)]
pub struct TreeShape<'a> {
    tree: &'a AvlTree,
    indent: usize,
}

impl<'a> TreeShape<'a> {
    pub(crate) fn new(tree: &'a AvlTree) -> Self {
        Self {
            tree,
            indent: DEFAULT_INDENT,
        }
    }

    /// Sets the number of spaces per level of depth.
    pub fn indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    fn write_subtree(&self, f: &mut fmt::Formatter<'_>, id: NodeId, depth: usize) -> fmt::Result {
        if id.is_null() {
            return Ok(());
        }
        let node = &self.tree.nodes[id];
        self.write_subtree(f, node.right, depth + 1)?;
        writeln!(f)?;
        writeln!(f, "{:width$}{}", "", node.key, width = self.indent * depth)?;
        self.write_subtree(f, node.left, depth + 1)
    }
}

impl fmt::Display for TreeShape<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_subtree(f, self.tree.root, 0)
    }
}
