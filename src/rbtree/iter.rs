//! In-order traversal, walking parent/child links from one node to the next.

use std::iter::FusedIterator;

use allocator_api2::alloc::{Allocator, Global};

use super::node::NodeId;
use super::OrderedTree;
use crate::compare::Less;


/// Ascending iterator over the entries of an [`OrderedTree`].
pub struct Iter<'a, K, V, C = Less, A: Allocator = Global> {
    tree: &'a OrderedTree<K, V, C, A>,
    front: NodeId,
    back: NodeId,
    remaining: usize,
}

impl<K, V, C, A: Allocator> Clone for Iter<'_, K, V, C, A> {
    fn clone(&self) -> Self {
        Self { tree: self.tree, front: self.front, back: self.back, remaining: self.remaining }
    }
}

impl<'a, K, V, C, A: Allocator> Iterator for Iter<'a, K, V, C, A> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None
        }
        let id = self.front;
        self.front = self.tree.next_id(id);
        self.remaining -= 1;
        self.tree.entry_of(id)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, C, A: Allocator> DoubleEndedIterator for Iter<'_, K, V, C, A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None
        }
        let id = self.back;
        self.back = self.tree.prev_id(id);
        self.remaining -= 1;
        self.tree.entry_of(id)
    }
}

impl<K, V, C, A: Allocator> ExactSizeIterator for Iter<'_, K, V, C, A> {}
impl<K, V, C, A: Allocator> FusedIterator for Iter<'_, K, V, C, A> {}

pub struct Keys<'a, K, V, C = Less, A: Allocator = Global>(Iter<'a, K, V, C, A>);

impl<K, V, C, A: Allocator> Clone for Keys<'_, K, V, C, A> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<'a, K, V, C, A: Allocator> Iterator for Keys<'a, K, V, C, A> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<K, V, C, A: Allocator> DoubleEndedIterator for Keys<'_, K, V, C, A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|(k, _)| k)
    }
}

impl<K, V, C, A: Allocator> ExactSizeIterator for Keys<'_, K, V, C, A> {}
impl<K, V, C, A: Allocator> FusedIterator for Keys<'_, K, V, C, A> {}

pub struct Values<'a, K, V, C = Less, A: Allocator = Global>(Iter<'a, K, V, C, A>);

impl<K, V, C, A: Allocator> Clone for Values<'_, K, V, C, A> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<'a, K, V, C, A: Allocator> Iterator for Values<'a, K, V, C, A> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<K, V, C, A: Allocator> DoubleEndedIterator for Values<'_, K, V, C, A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|(_, v)| v)
    }
}

impl<K, V, C, A: Allocator> ExactSizeIterator for Values<'_, K, V, C, A> {}
impl<K, V, C, A: Allocator> FusedIterator for Values<'_, K, V, C, A> {}

/// Owning iterator. Every step deletes the smallest (or, from the back, largest) entry.
pub struct IntoIter<K, V, C = Less, A: Allocator = Global> {
    tree: OrderedTree<K, V, C, A>,
}

impl<K, V, C, A: Allocator> Iterator for IntoIter<K, V, C, A> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.tree.root.is_nil() {
            return None
        }
        let first = self.tree.minimum(self.tree.root);
        self.tree.delete(first)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.tree.len(), Some(self.tree.len()))
    }
}

impl<K, V, C, A: Allocator> DoubleEndedIterator for IntoIter<K, V, C, A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.tree.root.is_nil() {
            return None
        }
        let last = self.tree.maximum(self.tree.root);
        self.tree.delete(last)
    }
}

impl<K, V, C, A: Allocator> ExactSizeIterator for IntoIter<K, V, C, A> {}
impl<K, V, C, A: Allocator> FusedIterator for IntoIter<K, V, C, A> {}

impl<K, V, C, A: Allocator> OrderedTree<K, V, C, A> {
    pub fn iter(&self) -> Iter<'_, K, V, C, A> {
        Iter {
            tree: self,
            front: self.minimum(self.root),
            back: self.maximum(self.root),
            remaining: self.len,
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V, C, A> {
        Keys(self.iter())
    }

    pub fn values(&self) -> Values<'_, K, V, C, A> {
        Values(self.iter())
    }
}

impl<'a, K, V, C, A: Allocator> IntoIterator for &'a OrderedTree<K, V, C, A> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, C, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, C, A: Allocator> IntoIterator for OrderedTree<K, V, C, A> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V, C, A>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { tree: self }
    }
}
