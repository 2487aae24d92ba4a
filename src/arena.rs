//! Node storage for [`AvlTree`](crate::AvlTree).
//!
//! Nodes live in a single `Vec` and link to each other through 32-bit
//! [`NodeId`]s. Vacated slots go on a free list and are reused by later
//! insertions. There are no parent links: every node is reachable from
//! exactly one child slot (or the tree's root slot).

use std::ops::{Index, IndexMut};

use crate::error::AvlError;
use crate::Key;

// =============================================================================
// Node ids
// =============================================================================

/// Index of a node slot, or `NULL` for an absent subtree.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct NodeId(u32);

impl NodeId {
    pub(crate) const NULL: NodeId = NodeId(u32::MAX);

    #[inline]
    pub(crate) fn is_null(self) -> bool {
        self == Self::NULL
    }

    #[inline]
    fn idx(self) -> usize {
        debug_assert!(!self.is_null());
        self.0 as usize
    }
}

// =============================================================================
// Nodes
// =============================================================================

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) key: Key,
    pub(crate) name: String,
    pub(crate) left: NodeId,
    pub(crate) right: NodeId,
    /// Height of the subtree rooted here. Leaves are 1; vacated slots are 0.
    pub(crate) height: u8,
}

impl Node {
    fn leaf(key: Key, name: String) -> Self {
        Self {
            key,
            name,
            left: NodeId::NULL,
            right: NodeId::NULL,
            height: 1,
        }
    }
}

// =============================================================================
// Arena
// =============================================================================

#[derive(Clone, Default)]
pub(crate) struct NodeArena {
    nodes: Vec<Node>,
    /// Vacated slots, reused LIFO.
    free: Vec<NodeId>,
}

impl NodeArena {
    /// Reserves room for `capacity` nodes. The free list grows on demand in
    /// [`reserve_one`](Self::reserve_one).
    pub(crate) fn try_with_capacity(capacity: usize) -> Result<Self, AvlError> {
        if capacity > NodeId::NULL.0 as usize {
            return Err(AvlError::CapacityExceeded);
        }
        let mut nodes = Vec::new();
        nodes.try_reserve_exact(capacity)?;
        Ok(Self {
            nodes,
            free: Vec::new(),
        })
    }

    /// Arena about to be filled with exactly `len` nodes, as in compaction.
    /// Room for vacating every one of them is reserved too, so later removals
    /// do not allocate.
    pub(crate) fn dense(len: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(len),
            free: Vec::with_capacity(len),
        }
    }

    /// Number of occupied slots.
    #[inline]
    pub(crate) fn live(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    #[inline]
    pub(crate) fn vacant(&self) -> usize {
        self.free.len()
    }

    #[inline]
    pub(crate) fn slots(&self) -> usize {
        self.nodes.len()
    }

    #[cfg(test)]
    pub(crate) fn is_vacant(&self, id: NodeId) -> bool {
        self.free.contains(&id)
    }

    /// Approximate heap bytes held, including name buffers.
    pub(crate) fn memory_usage(&self) -> usize {
        self.nodes.capacity() * std::mem::size_of::<Node>()
            + self.free.capacity() * std::mem::size_of::<NodeId>()
            + self.nodes.iter().map(|n| n.name.capacity()).sum::<usize>()
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        self.nodes.shrink_to_fit();
        self.free.shrink_to_fit();
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
    }

    /// Makes sure the next [`alloc`](Self::alloc) and the matching
    /// [`free_node`](Self::free_node) will not need to allocate.
    pub(crate) fn reserve_one(&mut self) -> Result<(), AvlError> {
        if !self.free.is_empty() {
            return Ok(());
        }
        if self.nodes.len() >= NodeId::NULL.0 as usize {
            return Err(AvlError::CapacityExceeded);
        }
        self.nodes.try_reserve(1)?;
        // The free list can at most hold every slot.
        self.free.try_reserve(self.nodes.len() + 1 - self.free.len())?;
        Ok(())
    }

    /// Stores a new leaf. Callers must have called [`reserve_one`](Self::reserve_one).
    pub(crate) fn alloc(&mut self, key: Key, name: String) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id.idx()] = Node::leaf(key, name);
                id
            }
            None => {
                let id = NodeId(self.nodes.len() as u32);
                self.nodes.push(Node::leaf(key, name));
                id
            }
        }
    }

    /// Vacates a slot and hands back the name it held. The caller must already
    /// have unlinked `id` from its parent.
    pub(crate) fn free_node(&mut self, id: NodeId) -> String {
        let node = &mut self[id];
        let name = std::mem::take(&mut node.name);
        node.left = NodeId::NULL;
        node.right = NodeId::NULL;
        node.height = 0;
        self.free.push(id);
        name
    }

    // -------------------------------------------------------------------------
    // Height and balance
    // -------------------------------------------------------------------------

    #[inline]
    pub(crate) fn height(&self, id: NodeId) -> u8 {
        if id.is_null() {
            0
        } else {
            self[id].height
        }
    }

    /// Left height minus right height. Positive means left-heavy.
    #[inline]
    pub(crate) fn balance_factor(&self, id: NodeId) -> i32 {
        if id.is_null() {
            return 0;
        }
        let node = &self[id];
        i32::from(self.height(node.left)) - i32::from(self.height(node.right))
    }

    /// Recomputes the cached height from the children's cached heights.
    #[inline]
    pub(crate) fn update_height(&mut self, id: NodeId) {
        let node = &self[id];
        let h = self.height(node.left).max(self.height(node.right)) + 1;
        self[id].height = h;
    }

    // -------------------------------------------------------------------------
    // Rotations
    // -------------------------------------------------------------------------

    /// Promotes `y.left` over `y` and returns it. `y.left` must be present.
    pub(crate) fn rotate_right(&mut self, y: NodeId) -> NodeId {
        let x = self[y].left;
        debug_assert!(!x.is_null(), "rotate_right without a left child");
        log::trace!("rotate right at {} (promoting {})", self[y].key, self[x].key);

        let t2 = self[x].right;
        self[x].right = y;
        self[y].left = t2;

        // `y` is now below `x`.
        self.update_height(y);
        self.update_height(x);
        x
    }

    /// Promotes `x.right` over `x` and returns it. `x.right` must be present.
    pub(crate) fn rotate_left(&mut self, x: NodeId) -> NodeId {
        let y = self[x].right;
        debug_assert!(!y.is_null(), "rotate_left without a right child");
        log::trace!("rotate left at {} (promoting {})", self[x].key, self[y].key);

        let t2 = self[y].left;
        self[y].left = x;
        self[x].right = t2;

        self.update_height(x);
        self.update_height(y);
        y
    }

    // -------------------------------------------------------------------------
    // Descent
    // -------------------------------------------------------------------------

    /// Leftmost node of the non-empty subtree at `id`.
    pub(crate) fn min_node(&self, mut id: NodeId) -> NodeId {
        while !self[id].left.is_null() {
            id = self[id].left;
        }
        id
    }

    /// Rightmost node of the non-empty subtree at `id`.
    pub(crate) fn max_node(&self, mut id: NodeId) -> NodeId {
        while !self[id].right.is_null() {
            id = self[id].right;
        }
        id
    }

    /// Copies the subtree at `id` into `into` in pre-order, returning its new id.
    pub(crate) fn copy_subtree(&self, id: NodeId, into: &mut NodeArena) -> NodeId {
        if id.is_null() {
            return NodeId::NULL;
        }
        let node = &self[id];
        let new_id = NodeId(into.nodes.len() as u32);
        into.nodes.push(Node {
            key: node.key,
            name: node.name.clone(),
            left: NodeId::NULL,
            right: NodeId::NULL,
            height: node.height,
        });
        let left = self.copy_subtree(node.left, into);
        let right = self.copy_subtree(node.right, into);
        into[new_id].left = left;
        into[new_id].right = right;
        new_id
    }
}

impl Index<NodeId> for NodeArena {
    type Output = Node;

    #[inline]
    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.idx()]
    }
}

impl IndexMut<NodeId> for NodeArena {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.idx()]
    }
}
