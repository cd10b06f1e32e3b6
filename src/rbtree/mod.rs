//! An ordered map backed by a red-black tree.
//!
//! Nodes live in an arena owned by the tree and refer to each other by slot index, with slot 0
//! reserved for the sentinel that stands in for every missing child and for the past-the-end
//! position. The root is tracked in its own field.
//!
//! A subtree whose root has black-height `bh` holds at least `2^bh - 1` nodes, and no red node
//! has a red child, so a path from the root is at most twice the root's black-height. With `n`
//! entries the height is therefore at most `2 * log2(n + 1)`.

use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicU64, Ordering};

use allocator_api2::alloc::{Allocator, Global};

use crate::compare::{Compare, Less};
use crate::error::{or_abort, InvalidOperation, TreeError};

mod fixup;
mod iter;
mod node;
mod render;
mod rotate;
mod validate;


pub use iter::{IntoIter, Iter, Keys, Values};
pub use node::Color;
pub use validate::InvariantViolation;

use node::{Arena, NodeId, Side};


/// Hands out tree identities. 0 is never used, it tags the shared end position.
static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

/// A handle to one node of an [`OrderedTree`], or to its past-the-end position.
///
/// Positions stay valid until the node they point at is removed. Handing a tree a position
/// whose node is gone, or one that belongs to a different tree, is reported as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    tree: u64,
    id: NodeId,
    generation: u64,
}

impl Position {
    /// The past-the-end position, shared by every tree.
    pub const END: Position = Position { tree: 0, id: NodeId::NIL, generation: 0 };

    pub fn is_end(self) -> bool {
        self.id.is_nil()
    }
}

/// An ordered map with unique keys, kept balanced as a red-black tree.
///
/// Keys are ordered by `C` (ascending [`Ord`] by default) and nodes are allocated through `A`.
/// Insertion, lookup and removal are all `O(log n)`.
pub struct OrderedTree<K, V, C = Less, A: Allocator = Global> {
    id: u64,
    nodes: Arena<K, V, A>,
    root: NodeId,
    len: usize,
    compare: C,
}

impl<K: Ord, V> OrderedTree<K, V> {
    pub fn new() -> Self {
        Self::with_compare(Less)
    }
}

impl<K, V, C: Compare<K>> OrderedTree<K, V, C> {
    pub fn with_compare(compare: C) -> Self {
        or_abort(Self::try_new_in(compare, Global))
    }
}

impl<K: Ord, V> Default for OrderedTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

// Methods that never have to compare keys
impl<K, V, C, A: Allocator> OrderedTree<K, V, C, A> {
    /// Creates an empty tree whose nodes are allocated through `alloc`.
    ///
    /// This only fails if the sentinel itself cannot be allocated.
    pub fn try_new_in(compare: C, alloc: A) -> Result<Self, TreeError> {
        Ok(Self {
            id: NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed),
            nodes: Arena::try_new_in(alloc)?,
            root: NodeId::NIL,
            len: 0,
            compare,
        })
    }

    /// The number of entries in the tree. `O(1)`.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn allocator(&self) -> &A {
        self.nodes.allocator()
    }

    pub fn compare(&self) -> &C {
        &self.compare
    }

    /// The key stored at the root, if any.
    pub fn root_key(&self) -> Option<&K> {
        self.nodes[self.root].entry.as_ref().map(|(k, _)| k)
    }

    /// The number of edges on the longest path from the root down to a node.
    pub fn height(&self) -> usize {
        self.depth(self.root).saturating_sub(1)
    }

    fn depth(&self, id: NodeId) -> usize {
        if id.is_nil() {
            return 0
        }
        let node = &self.nodes[id];
        1 + self.depth(node.left).max(self.depth(node.right))
    }

    /// Position of the smallest entry, or [`end`](Self::end) if the tree is empty.
    pub fn begin(&self) -> Position {
        self.position(self.minimum(self.root))
    }

    /// The past-the-end position.
    pub fn end(&self) -> Position {
        Position::END
    }

    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.entry_of(self.minimum(self.root))
    }

    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.entry_of(self.maximum(self.root))
    }

    /// The entry at `pos`.
    pub fn entry_at(&self, pos: Position) -> Result<(&K, &V), TreeError> {
        let id = self.resolve(pos, InvalidOperation::DereferenceEnd)?;
        self.entry_of(id).ok_or(InvalidOperation::StalePosition.into())
    }

    pub fn value_at_mut(&mut self, pos: Position) -> Result<&mut V, TreeError> {
        let id = self.resolve(pos, InvalidOperation::DereferenceEnd)?;
        match self.nodes[id].entry.as_mut() {
            Some((_, v)) => Ok(v),
            None => Err(InvalidOperation::StalePosition.into()),
        }
    }

    /// The color of the node at `pos`. The end position is the sentinel, which is always black.
    pub fn color(&self, pos: Position) -> Result<Color, TreeError> {
        if pos.is_end() {
            return Ok(Color::Black)
        }
        let id = self.resolve(pos, InvalidOperation::DereferenceEnd)?;
        Ok(self.nodes[id].color)
    }

    /// The parent of the node at `pos`. The root's parent is the end position.
    pub fn parent(&self, pos: Position) -> Result<Position, TreeError> {
        let id = self.resolve(pos, InvalidOperation::DereferenceEnd)?;
        Ok(self.position(self.nodes[id].parent))
    }

    pub fn left(&self, pos: Position) -> Result<Position, TreeError> {
        let id = self.resolve(pos, InvalidOperation::DereferenceEnd)?;
        Ok(self.position(self.nodes[id].left))
    }

    pub fn right(&self, pos: Position) -> Result<Position, TreeError> {
        let id = self.resolve(pos, InvalidOperation::DereferenceEnd)?;
        Ok(self.position(self.nodes[id].right))
    }

    /// The in-order successor of `pos`. The successor of the largest entry is the end position.
    pub fn successor(&self, pos: Position) -> Result<Position, TreeError> {
        let id = self.resolve(pos, InvalidOperation::DereferenceEnd)?;
        Ok(self.position(self.next_id(id)))
    }

    /// The in-order predecessor of `pos`.
    ///
    /// Stepping back from the end position lands on the largest entry, and stepping back from
    /// the smallest entry lands on the end position.
    pub fn predecessor(&self, pos: Position) -> Result<Position, TreeError> {
        if pos.is_end() {
            return Ok(self.position(self.maximum(self.root)))
        }
        let id = self.resolve(pos, InvalidOperation::DereferenceEnd)?;
        Ok(self.position(self.prev_id(id)))
    }

    /// Removes the entry at `pos` and hands it back.
    ///
    /// Erasing the end position is an error, and so is erasing a position whose node is gone.
    /// Every other position stays valid.
    pub fn remove_at(&mut self, pos: Position) -> Result<(K, V), TreeError> {
        let id = self.resolve(pos, InvalidOperation::RemoveEnd)?;
        self.delete(id).ok_or(InvalidOperation::StalePosition.into())
    }

    /// Removes every entry, one deletion at a time.
    pub fn clear(&mut self) {
        while !self.root.is_nil() {
            self.delete(self.root);
        }
    }

    pub(crate) fn position(&self, id: NodeId) -> Position {
        if id.is_nil() {
            return Position::END
        }
        Position { tree: self.id, id, generation: self.nodes[id].generation }
    }

    fn resolve(&self, pos: Position, on_end: InvalidOperation) -> Result<NodeId, TreeError> {
        if pos.is_end() {
            log::warn!("Rejected operation on the end position: {on_end}");
            return Err(on_end.into())
        }
        if pos.tree != self.id {
            log::warn!("Rejected a position from another tree: {pos:?}");
            return Err(InvalidOperation::ForeignPosition.into())
        }
        if !self.nodes.is_live(pos.id, pos.generation) {
            log::warn!("Rejected operation on a stale position: {pos:?}");
            return Err(InvalidOperation::StalePosition.into())
        }
        Ok(pos.id)
    }

    pub(crate) fn entry_of(&self, id: NodeId) -> Option<(&K, &V)> {
        self.nodes[id].entry.as_ref().map(|(k, v)| (k, v))
    }

    /// The key of a live node.
    fn key_of(&self, id: NodeId) -> &K {
        match &self.nodes[id].entry {
            Some((k, _)) => k,
            None => unreachable!("node {id:?} is linked into the tree but holds no entry"),
        }
    }

    /// Leftmost node of the subtree at `id`. The sentinel's own minimum is the sentinel.
    pub(crate) fn minimum(&self, mut id: NodeId) -> NodeId {
        while !self.nodes[id].left.is_nil() {
            id = self.nodes[id].left;
        }
        id
    }

    pub(crate) fn maximum(&self, mut id: NodeId) -> NodeId {
        while !self.nodes[id].right.is_nil() {
            id = self.nodes[id].right;
        }
        id
    }

    /// If there is a right subtree, its minimum; otherwise the first ancestor reached from a left child.
    pub(crate) fn next_id(&self, mut id: NodeId) -> NodeId {
        if !self.nodes[id].right.is_nil() {
            return self.minimum(self.nodes[id].right)
        }
        let mut parent = self.nodes[id].parent;
        while !parent.is_nil() && id == self.nodes[parent].right {
            id = parent;
            parent = self.nodes[parent].parent;
        }
        parent
    }

    pub(crate) fn prev_id(&self, mut id: NodeId) -> NodeId {
        if !self.nodes[id].left.is_nil() {
            return self.maximum(self.nodes[id].left)
        }
        let mut parent = self.nodes[id].parent;
        while !parent.is_nil() && id == self.nodes[parent].left {
            id = parent;
            parent = self.nodes[parent].parent;
        }
        parent
    }

    /// Unlinks `z`, rebalances, and releases its slot.
    pub(crate) fn delete(&mut self, z: NodeId) -> Option<(K, V)> {
        debug_assert!(!z.is_nil(), "the sentinel cannot be deleted");

        let mut removed_color = self.nodes[z].color;
        // `x` takes the place of the node that actually leaves its position
        let x;

        if self.nodes[z].left.is_nil() {
            x = self.nodes[z].right;
            self.transplant(z, x);
        } else if self.nodes[z].right.is_nil() {
            x = self.nodes[z].left;
            self.transplant(z, x);
        } else {
            // two children: the successor `y` is spliced into `z`'s place
            let y = self.minimum(self.nodes[z].right);
            removed_color = self.nodes[y].color;
            x = self.nodes[y].right;

            if self.nodes[y].parent == z {
                // `x` may be the sentinel, and the fixup needs to find its way back up
                self.nodes[x].parent = y;
            } else {
                self.transplant(y, x);
                let z_right = self.nodes[z].right;
                self.nodes[y].right = z_right;
                self.nodes[z_right].parent = y;
            }

            self.transplant(z, y);
            let z_left = self.nodes[z].left;
            self.nodes[y].left = z_left;
            self.nodes[z_left].parent = y;
            self.nodes[y].color = self.nodes[z].color;
        }

        if removed_color == Color::Black {
            self.delete_fixup(x);
        }

        self.len -= 1;
        if self.len == 0 {
            self.root = NodeId::NIL;
        }
        // the sentinel's parent is only scratch space for the fixup
        self.nodes[NodeId::NIL].parent = NodeId::NIL;

        self.nodes.release(z)
    }
}

// Methods that look keys up
impl<K, V, C: Compare<K>, A: Allocator> OrderedTree<K, V, C, A> {
    /// Finds the node holding `key`, or the sentinel.
    fn find(&self, key: &K) -> NodeId {
        let mut x = self.root;
        while !x.is_nil() {
            let current = self.key_of(x);
            x = if self.compare.less(key, current) {
                self.nodes[x].left
            } else if self.compare.less(current, key) {
                self.nodes[x].right
            } else {
                return x
            };
        }
        x
    }

    /// The position holding `key`, or the end position when there is no such key.
    pub fn search(&self, key: &K) -> Position {
        self.position(self.find(key))
    }

    pub fn contains_key(&self, key: &K) -> bool {
        !self.find(key).is_nil()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entry_of(self.find(key)).map(|(_, v)| v)
    }

    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        self.entry_of(self.find(key))
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let id = self.find(key);
        self.nodes[id].entry.as_mut().map(|(_, v)| v)
    }

    /// Inserts `key` unless an equivalent key is already present.
    ///
    /// Returns the position holding the key and whether a new node was created. An existing key
    /// keeps its old value and the tree is not touched. If the node cannot be allocated the tree
    /// is left unchanged.
    pub fn insert(&mut self, key: K, value: V) -> Result<(Position, bool), TreeError> {
        let mut parent = NodeId::NIL;
        let mut side = Side::Left;
        let mut x = self.root;

        while !x.is_nil() {
            let current = self.key_of(x);
            side = if self.compare.less(&key, current) {
                Side::Left
            } else if self.compare.less(current, &key) {
                Side::Right
            } else {
                return Ok((self.position(x), false))
            };
            parent = x;
            x = self.nodes[x].child(side);
        }

        // nothing has been touched yet, so failing here leaves the tree as it was
        let z = self.nodes.allocate((key, value))?;

        self.nodes[z].parent = parent;
        if parent.is_nil() {
            self.root = z;
        } else {
            *self.nodes[parent].child_mut(side) = z;
        }
        self.len += 1;

        self.insert_fixup(z);
        Ok((self.position(z), true))
    }

    /// Removes `key`, returning whether it was present.
    pub fn remove(&mut self, key: &K) -> bool {
        self.remove_entry(key).is_some()
    }

    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let z = self.find(key);
        if z.is_nil() {
            return None
        }
        self.delete(z)
    }
}

impl<K: Clone, V: Clone, C: Compare<K> + Clone, A: Allocator + Clone> OrderedTree<K, V, C, A> {
    /// Copies every entry into a fresh tree, inserting them in ascending order.
    ///
    /// The copy holds the same entries but is balanced on its own, so its shape and colors
    /// can differ from `self`.
    pub fn try_clone(&self) -> Result<Self, TreeError> {
        let mut copy = Self::try_new_in(self.compare.clone(), self.allocator().clone())?;
        for (k, v) in self {
            copy.insert(k.clone(), v.clone())?;
        }
        Ok(copy)
    }
}

impl<K: Clone, V: Clone, C: Compare<K> + Clone, A: Allocator + Clone> Clone for OrderedTree<K, V, C, A> {
    fn clone(&self) -> Self {
        or_abort(self.try_clone())
    }
}

impl<K, V, C, A: Allocator> Drop for OrderedTree<K, V, C, A> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K: PartialEq, V: PartialEq, C, A: Allocator> PartialEq for OrderedTree<K, V, C, A> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, C, A: Allocator> Eq for OrderedTree<K, V, C, A> {}

impl<K: Debug, V: Debug, C, A: Allocator> Debug for OrderedTree<K, V, C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, C: Compare<K>> Extend<(K, V)> for OrderedTree<K, V, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            or_abort(self.insert(k, v));
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for OrderedTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}
