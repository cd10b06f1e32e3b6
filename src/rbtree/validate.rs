use allocator_api2::alloc::Allocator;
use thiserror::Error;

use super::node::{Color, NodeId};
use super::OrderedTree;
use crate::compare::Compare;


/// A broken red-black or search-tree invariant, as found by [`OrderedTree::validate`].
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("the root is red")]
    RedRoot,
    #[error("the sentinel is red")]
    RedSentinel,
    #[error("the root has a parent")]
    RootHasParent,
    #[error("red node at depth {depth} has a red child")]
    RedRedEdge { depth: usize },
    #[error("black-heights {left} and {right} differ below a node at depth {depth}")]
    BlackHeightMismatch { depth: usize, left: usize, right: usize },
    #[error("a key at depth {depth} is out of order with one of its ancestors")]
    OrderViolation { depth: usize },
    #[error("a child at depth {depth} does not point back at its parent")]
    BrokenParentLink { depth: usize },
    #[error("the tree claims {claimed} entries but {found} are reachable")]
    SizeMismatch { claimed: usize, found: usize },
}

impl<K, V, C: Compare<K>, A: Allocator> OrderedTree<K, V, C, A> {
    /// Walks the whole tree checking every invariant, and returns the black-height of the root.
    ///
    /// This is `O(n)`, so it's meant for tests and debugging rather than routine use.
    pub fn validate(&self) -> Result<usize, InvariantViolation> {
        if self.nodes[NodeId::NIL].color != Color::Black {
            return Err(InvariantViolation::RedSentinel)
        }
        if self.nodes[self.root].color != Color::Black {
            return Err(InvariantViolation::RedRoot)
        }
        if !self.root.is_nil() && !self.nodes[self.root].parent.is_nil() {
            return Err(InvariantViolation::RootHasParent)
        }

        let mut found = 0;
        let black_height = self.validate_subtree(self.root, 0, None, None, &mut found)?;
        if found != self.len {
            return Err(InvariantViolation::SizeMismatch { claimed: self.len, found })
        }
        Ok(black_height)
    }

    /// Checks the subtree at `id`, whose keys must lie strictly between `lower` and `upper`.
    fn validate_subtree(
        &self,
        id: NodeId,
        depth: usize,
        lower: Option<&K>,
        upper: Option<&K>,
        found: &mut usize,
    ) -> Result<usize, InvariantViolation> {
        if id.is_nil() {
            return Ok(0)
        }
        *found += 1;

        let node = &self.nodes[id];
        let key = self.key_of(id);
        let out_of_order = lower.is_some_and(|lo| !self.compare.less(lo, key))
            || upper.is_some_and(|hi| !self.compare.less(key, hi));
        if out_of_order {
            return Err(InvariantViolation::OrderViolation { depth })
        }

        for child in [node.left, node.right] {
            if child.is_nil() {
                continue
            }
            if self.nodes[child].parent != id {
                return Err(InvariantViolation::BrokenParentLink { depth: depth + 1 })
            }
            if node.color == Color::Red && self.nodes[child].color == Color::Red {
                return Err(InvariantViolation::RedRedEdge { depth })
            }
        }

        let left = self.validate_subtree(node.left, depth + 1, lower, Some(key), found)?;
        let right = self.validate_subtree(node.right, depth + 1, Some(key), upper, found)?;
        if left != right {
            return Err(InvariantViolation::BlackHeightMismatch { depth, left, right })
        }

        Ok(left + usize::from(node.color == Color::Black))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tree_is_valid() {
        let tree = OrderedTree::<i32, i32>::new();
        assert_eq!(tree.validate(), Ok(0));
    }

    #[test]
    fn test_detects_red_root() {
        let mut tree = OrderedTree::new();
        tree.insert(1, 'a').unwrap();
        tree.nodes[tree.root].color = Color::Red;
        assert_eq!(tree.validate(), Err(InvariantViolation::RedRoot));
    }

    #[test]
    fn test_detects_red_sentinel() {
        let mut tree = OrderedTree::new();
        tree.insert(1, ()).unwrap();
        tree.nodes[NodeId::NIL].color = Color::Red;
        assert_eq!(tree.validate(), Err(InvariantViolation::RedSentinel));
        tree.nodes[NodeId::NIL].color = Color::Black;
        assert_eq!(tree.validate(), Ok(1));
    }

    #[test]
    fn test_detects_root_with_parent() {
        let mut tree = OrderedTree::new();
        for k in [1, 2] {
            tree.insert(k, ()).unwrap();
        }
        let root = tree.root;
        let child = tree.nodes[root].right;
        tree.nodes[root].parent = child;
        assert_eq!(tree.validate(), Err(InvariantViolation::RootHasParent));
        tree.nodes[root].parent = NodeId::NIL;
        tree.validate().unwrap();
    }

    #[test]
    fn test_detects_red_red_edge() {
        let mut tree = OrderedTree::new();
        // 0 hangs red under a black 1 after the red-uncle recolor
        for k in [2, 1, 3, 0] {
            tree.insert(k, ()).unwrap();
        }
        let one = tree.nodes[tree.root].left;
        assert_eq!(tree.nodes[one].color, Color::Black);
        assert_eq!(tree.nodes[tree.nodes[one].left].color, Color::Red);

        tree.nodes[one].color = Color::Red;
        assert_eq!(tree.validate(), Err(InvariantViolation::RedRedEdge { depth: 1 }));
        tree.nodes[one].color = Color::Black;
        tree.validate().unwrap();
    }

    #[test]
    fn test_detects_broken_parent_link() {
        let mut tree = OrderedTree::new();
        for k in [2, 1, 3] {
            tree.insert(k, ()).unwrap();
        }
        let left = tree.nodes[tree.root].left;
        let right = tree.nodes[tree.root].right;
        tree.nodes[left].parent = right;
        assert_eq!(tree.validate(), Err(InvariantViolation::BrokenParentLink { depth: 1 }));
        tree.nodes[left].parent = tree.root;
        tree.validate().unwrap();
    }

    #[test]
    fn test_detects_black_height_mismatch() {
        let mut tree = OrderedTree::new();
        for k in [2, 1, 3] {
            tree.insert(k, ()).unwrap();
        }
        assert_eq!(tree.validate(), Ok(1));
        let right = tree.nodes[tree.root].right;
        tree.nodes[right].color = Color::Black;
        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::BlackHeightMismatch { depth: 0, left: 0, right: 1 })
        );
    }

    #[test]
    fn test_detects_out_of_order_keys() {
        let mut tree = OrderedTree::new();
        for k in [2, 1, 3] {
            tree.insert(k, ()).unwrap();
        }
        let left = tree.nodes[tree.root].left;
        tree.nodes[left].entry = Some((5, ()));
        assert_eq!(tree.validate(), Err(InvariantViolation::OrderViolation { depth: 1 }));
    }

    #[test]
    fn test_detects_size_mismatch() {
        let mut tree = OrderedTree::new();
        tree.insert("k", 0).unwrap();
        tree.len = 2;
        assert_eq!(tree.validate(), Err(InvariantViolation::SizeMismatch { claimed: 2, found: 1 }));
        tree.len = 1;
    }
}
