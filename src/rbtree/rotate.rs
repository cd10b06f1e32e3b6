use allocator_api2::alloc::Allocator;

use super::node::{NodeId, Side};
use super::OrderedTree;


impl<K, V, C, A: Allocator> OrderedTree<K, V, C, A> {
    /// Rotates at `x` towards `side`: `x` moves down to become the `side` child of its
    /// opposite child, which takes its place. In-order sequence is preserved.
    ///
    /// `rotate(x, Side::Left)` is the usual left rotation.
    pub(super) fn rotate(&mut self, x: NodeId, side: Side) {
        let y = self.nodes[x].child(side.opposite());
        debug_assert!(!y.is_nil(), "rotating {x:?} {side:?} without a child to promote");

        // `y`'s inner subtree moves across to `x`
        let inner = self.nodes[y].child(side);
        *self.nodes[x].child_mut(side.opposite()) = inner;
        if !inner.is_nil() {
            self.nodes[inner].parent = x;
        }

        let parent = self.nodes[x].parent;
        self.nodes[y].parent = parent;
        if parent.is_nil() {
            self.root = y;
        } else if self.nodes[parent].left == x {
            self.nodes[parent].left = y;
        } else {
            self.nodes[parent].right = y;
        }

        *self.nodes[y].child_mut(side) = x;
        self.nodes[x].parent = y;

        log::trace!("Rotated {side:?} at {x:?}, {y:?} took its place");
    }

    /// Puts the subtree rooted at `v` where the subtree rooted at `u` was.
    ///
    /// `v` may be the sentinel, in which case the sentinel's parent is set. `u`'s own links are
    /// left alone.
    pub(super) fn transplant(&mut self, u: NodeId, v: NodeId) {
        let parent = self.nodes[u].parent;
        if parent.is_nil() {
            self.root = v;
        } else if self.nodes[parent].left == u {
            self.nodes[parent].left = v;
        } else {
            self.nodes[parent].right = v;
        }
        self.nodes[v].parent = parent;
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::rbtree::Color;

    fn keys_in_order(tree: &OrderedTree<i32, ()>) -> Vec<i32> {
        tree.keys().copied().collect()
    }

    #[test]
    fn test_rotate_root_both_ways() {
        let mut tree = OrderedTree::new();
        for k in [20, 10, 30] {
            tree.insert(k, ()).unwrap();
        }
        let root = tree.root;
        assert_eq!(tree.root_key(), Some(&20));

        tree.rotate(root, Side::Left);
        assert_eq!(tree.root_key(), Some(&30));
        assert!(tree.nodes[tree.root].parent.is_nil());
        assert_eq!(tree.nodes[tree.root].left, root);
        assert_eq!(keys_in_order(&tree), [10, 20, 30]);

        tree.rotate(tree.root, Side::Right);
        assert_eq!(tree.root_key(), Some(&20));
        assert_eq!(keys_in_order(&tree), [10, 20, 30]);
        // rotations never touch colors, so the tree is valid again
        assert_eq!(tree.nodes[tree.root].color, Color::Black);
        tree.validate().unwrap();
    }

    #[test]
    fn test_rotate_below_root() {
        let mut tree = OrderedTree::new();
        for k in [50, 25, 75, 10, 30] {
            tree.insert(k, ()).unwrap();
        }
        let left = tree.nodes[tree.root].left;
        tree.rotate(left, Side::Right);

        let new_left = tree.nodes[tree.root].left;
        assert_eq!(tree.key_of(new_left), &10);
        assert_eq!(tree.nodes[new_left].parent, tree.root);
        assert_eq!(tree.nodes[left].parent, new_left);
        assert_eq!(keys_in_order(&tree), [10, 25, 30, 50, 75]);
    }

    #[test]
    fn test_transplant_root() {
        let mut tree = OrderedTree::new();
        tree.insert(1, ()).unwrap();
        tree.insert(2, ()).unwrap();
        let old_root = tree.root;
        let child = tree.nodes[old_root].right;

        tree.transplant(old_root, child);
        assert_eq!(tree.root, child);
        assert!(tree.nodes[child].parent.is_nil());

        // put things back so dropping the tree releases both nodes
        tree.transplant(child, old_root);
        tree.nodes[child].parent = old_root;
        assert_eq!(tree.len(), 2);
    }
}
