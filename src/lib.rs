//! # avl-index
//!
//! An in-memory ordered index of records keyed by a unique integer id, each
//! carrying a short name. Records are kept in a height-balanced (AVL) binary
//! search tree, so insertion, removal and lookup are `O(log n)`.
//!
//! ## Example
//!
//! ```rust
//! use avl_index::AvlTree;
//!
//! let mut tree = AvlTree::new();
//! tree.insert(10, "Alice").unwrap();
//! tree.insert(20, "Bob").unwrap();
//!
//! assert_eq!(tree.get(10), Some("Alice"));
//! assert_eq!(tree.find_min().unwrap(), (10, "Alice"));
//!
//! // Duplicate ids are ignored.
//! assert_eq!(tree.insert(10, "Carol"), Ok(false));
//! assert_eq!(tree.get(10), Some("Alice"));
//! ```
//!
//! The tree is a plain value with no interior mutability. Sharing one across
//! threads needs an external lock around every mutation.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod arena;
mod config;
mod error;
mod shape;

pub use config::{Config, DEFAULT_MAX_NAME_LEN};
pub use error::AvlError;
pub use shape::TreeShape;

use std::cmp::Ordering;

use arena::{NodeArena, NodeId};

/// Record identifier used as the ordering key.
pub type Key = i64;

// =============================================================================
// AvlTree
// =============================================================================

/// A height-balanced binary search tree mapping [`Key`]s to names.
///
/// Invariants after every completed call:
/// - keys in a node's left subtree are smaller, keys in its right subtree larger;
/// - left and right subtree heights differ by at most one at every node;
/// - every node caches `1 + max(height(left), height(right))`.
///
/// Removing a node with two children moves its in-order successor's record
/// into that node's slot and frees the successor's slot instead.
#[derive(Clone)]
pub struct AvlTree {
    config: Config,
    nodes: NodeArena,
    root: NodeId,
    len: usize,
}

impl AvlTree {
    /// Creates an empty tree with the default [`Config`].
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            nodes: NodeArena::default(),
            root: NodeId::NULL,
            len: 0,
        }
    }

    /// Creates an empty tree with the given configuration.
    ///
    /// Fails if `config.initial_capacity` node slots cannot be reserved.
    pub fn with_config(config: Config) -> Result<Self, AvlError> {
        Ok(Self {
            nodes: NodeArena::try_with_capacity(config.initial_capacity)?,
            config,
            root: NodeId::NULL,
            len: 0,
        })
    }

    /// The configuration this tree was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of records stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no records.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Height of the tree: 0 when empty, 1 for a single record.
    pub fn height(&self) -> usize {
        usize::from(self.nodes.height(self.root))
    }

    /// Approximate number of heap bytes held by the tree.
    pub fn memory_usage(&self) -> usize {
        self.nodes.memory_usage()
    }

    /// Releases unused node storage capacity.
    pub fn shrink_to_fit(&mut self) {
        self.nodes.shrink_to_fit();
    }

    /// Removes every record.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = NodeId::NULL;
        self.len = 0;
    }

    /// Rebuilds node storage densely, dropping slots vacated by removals.
    ///
    /// Tree shape and contents are unchanged. Returns the number of nodes
    /// rewritten.
    pub fn compact(&mut self) -> usize {
        if self.nodes.vacant() == 0 {
            return 0;
        }

        let mut packed = NodeArena::dense(self.len);
        self.root = self.nodes.copy_subtree(self.root, &mut packed);
        log::trace!(
            "compacted node storage: {} slots -> {}",
            self.nodes.slots(),
            packed.slots()
        );
        self.nodes = packed;
        debug_assert_eq!(self.nodes.live(), self.len);
        self.len
    }

    /// A [`Display`](std::fmt::Display) adapter that draws the tree sideways.
    pub fn shape(&self) -> TreeShape<'_> {
        TreeShape::new(self)
    }
}

// =============================================================================
// Lookup and traversal
// =============================================================================

impl AvlTree {
    /// Returns the name stored under `key`.
    pub fn get(&self, key: Key) -> Option<&str> {
        let mut current = self.root;
        while !current.is_null() {
            let node = &self.nodes[current];
            current = match key.cmp(&node.key) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(node.name.as_str()),
            };
        }
        None
    }

    /// Whether a record with `key` is stored.
    pub fn contains_key(&self, key: Key) -> bool {
        self.get(key).is_some()
    }

    /// The record with the smallest key.
    pub fn find_min(&self) -> Result<(Key, &str), AvlError> {
        if self.root.is_null() {
            return Err(AvlError::EmptyTree);
        }
        let node = &self.nodes[self.nodes.min_node(self.root)];
        Ok((node.key, node.name.as_str()))
    }

    /// The record with the largest key.
    pub fn find_max(&self) -> Result<(Key, &str), AvlError> {
        if self.root.is_null() {
            return Err(AvlError::EmptyTree);
        }
        let node = &self.nodes[self.nodes.max_node(self.root)];
        Ok((node.key, node.name.as_str()))
    }

    /// Iterates over all records in ascending key order.
    pub fn iter(&self) -> Iter<'_> {
        let mut iter = Iter {
            nodes: &self.nodes,
            stack: Vec::with_capacity(self.height()),
            remaining: self.len,
        };
        iter.push_left_spine(self.root);
        iter
    }
}

// =============================================================================
// Insertion
// =============================================================================

impl AvlTree {
    /// Inserts a record.
    ///
    /// Returns `Ok(true)` if the key was new and `Ok(false)` if it was already
    /// present, in which case the stored name is left as it was. On error the
    /// tree is unchanged.
    pub fn insert(&mut self, key: Key, name: &str) -> Result<bool, AvlError> {
        if name.len() > self.config.max_name_len {
            return Err(AvlError::NameTooLong {
                len: name.len(),
                max: self.config.max_name_len,
            });
        }

        let mut inserted = false;
        self.root = self.insert_at(self.root, key, name, &mut inserted)?;
        if inserted {
            self.len += 1;
        } else {
            log::debug!("ignoring insert of duplicate key {key}");
        }
        Ok(inserted)
    }

    /// Inserts into the subtree at `node` and returns the subtree's new root.
    fn insert_at(
        &mut self,
        node: NodeId,
        key: Key,
        name: &str,
        inserted: &mut bool,
    ) -> Result<NodeId, AvlError> {
        if node.is_null() {
            // Reserve everything before the first link is rewritten.
            self.nodes.reserve_one()?;
            let mut owned = String::new();
            owned.try_reserve_exact(name.len())?;
            owned.push_str(name);

            *inserted = true;
            return Ok(self.nodes.alloc(key, owned));
        }

        match key.cmp(&self.nodes[node].key) {
            Ordering::Less => {
                let left = self.insert_at(self.nodes[node].left, key, name, inserted)?;
                self.nodes[node].left = left;
            }
            Ordering::Greater => {
                let right = self.insert_at(self.nodes[node].right, key, name, inserted)?;
                self.nodes[node].right = right;
            }
            Ordering::Equal => return Ok(node),
        }

        Ok(self.rebalance_after_insert(node, key))
    }

    /// The inserted key tells straight-line cases from zig-zag ones.
    fn rebalance_after_insert(&mut self, node: NodeId, key: Key) -> NodeId {
        self.nodes.update_height(node);
        let balance = self.nodes.balance_factor(node);

        if balance > 1 {
            let left = self.nodes[node].left;
            return match key.cmp(&self.nodes[left].key) {
                // Left-Left
                Ordering::Less => self.nodes.rotate_right(node),
                // Left-Right
                Ordering::Greater => {
                    self.nodes[node].left = self.nodes.rotate_left(left);
                    self.nodes.rotate_right(node)
                }
                Ordering::Equal => node,
            };
        }

        if balance < -1 {
            let right = self.nodes[node].right;
            return match key.cmp(&self.nodes[right].key) {
                // Right-Right
                Ordering::Greater => self.nodes.rotate_left(node),
                // Right-Left
                Ordering::Less => {
                    self.nodes[node].right = self.nodes.rotate_right(right);
                    self.nodes.rotate_left(node)
                }
                Ordering::Equal => node,
            };
        }

        node
    }
}

// =============================================================================
// Removal
// =============================================================================

impl AvlTree {
    /// Removes the record under `key`, returning its name.
    ///
    /// Returns `None` and leaves the tree untouched if `key` is absent.
    pub fn remove(&mut self, key: Key) -> Option<String> {
        let mut removed = None;
        self.root = self.remove_at(self.root, key, &mut removed);
        if removed.is_some() {
            self.len -= 1;
        } else {
            log::debug!("ignoring remove of absent key {key}");
        }
        removed
    }

    /// Removes from the subtree at `node` and returns the subtree's new root.
    fn remove_at(&mut self, node: NodeId, key: Key, removed: &mut Option<String>) -> NodeId {
        if node.is_null() {
            return node;
        }

        let node = match key.cmp(&self.nodes[node].key) {
            Ordering::Less => {
                let left = self.remove_at(self.nodes[node].left, key, removed);
                self.nodes[node].left = left;
                node
            }
            Ordering::Greater => {
                let right = self.remove_at(self.nodes[node].right, key, removed);
                self.nodes[node].right = right;
                node
            }
            Ordering::Equal => {
                let (left, right) = (self.nodes[node].left, self.nodes[node].right);
                if left.is_null() || right.is_null() {
                    let child = if left.is_null() { right } else { left };
                    *removed = Some(self.nodes.free_node(node));
                    child
                } else {
                    // Take over the successor's record, then drop the successor,
                    // which has no left child.
                    let successor = self.nodes.min_node(right);
                    let successor_key = self.nodes[successor].key;
                    let successor_name = std::mem::take(&mut self.nodes[successor].name);

                    let target = &mut self.nodes[node];
                    target.key = successor_key;
                    *removed = Some(std::mem::replace(&mut target.name, successor_name));

                    let mut emptied = None;
                    let right = self.remove_at(right, successor_key, &mut emptied);
                    debug_assert_eq!(emptied.as_deref(), Some(""));
                    self.nodes[node].right = right;
                    node
                }
            }
        };

        if node.is_null() {
            return node;
        }
        self.rebalance_after_remove(node)
    }

    /// The heavy child's own balance tells straight-line cases from zig-zag ones.
    /// Runs at every level on the way up since one removal can need several
    /// rotations.
    fn rebalance_after_remove(&mut self, node: NodeId) -> NodeId {
        self.nodes.update_height(node);
        let balance = self.nodes.balance_factor(node);

        if balance > 1 {
            let left = self.nodes[node].left;
            if self.nodes.balance_factor(left) < 0 {
                self.nodes[node].left = self.nodes.rotate_left(left);
            }
            return self.nodes.rotate_right(node);
        }

        if balance < -1 {
            let right = self.nodes[node].right;
            if self.nodes.balance_factor(right) > 0 {
                self.nodes[node].right = self.nodes.rotate_right(right);
            }
            return self.nodes.rotate_left(node);
        }

        node
    }
}

impl Default for AvlTree {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AvlTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

// =============================================================================
// Iterator
// =============================================================================

/// In-order iterator over `(key, name)` pairs, created by [`AvlTree::iter`].
#[derive(Clone)]
pub struct Iter<'a> {
    nodes: &'a NodeArena,
    /// Nodes whose left subtree has been entered but which are not yet yielded.
    stack: Vec<NodeId>,
    remaining: usize,
}

impl Iter<'_> {
    fn push_left_spine(&mut self, mut id: NodeId) {
        while !id.is_null() {
            self.stack.push(id);
            id = self.nodes[id].left;
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (Key, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let nodes = self.nodes;
        let node = &nodes[id];
        self.push_left_spine(node.right);
        self.remaining -= 1;
        Some((node.key, node.name.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl std::iter::FusedIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a AvlTree {
    type Item = (Key, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}


#[cfg(test)]
mod proptests;
