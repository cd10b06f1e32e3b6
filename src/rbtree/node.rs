use std::ops::{Index, IndexMut};

use allocator_api2::alloc::Allocator;
use allocator_api2::vec::Vec;

use crate::error::TreeError;


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Black,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    pub(crate) fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Index of a slot in the node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

impl NodeId {
    /// The sentinel. It lives in slot 0 for the whole life of the tree.
    pub(crate) const NIL: NodeId = NodeId(0);

    pub(crate) fn is_nil(self) -> bool {
        self == Self::NIL
    }

    pub(crate) fn index(self) -> usize {
        self.0
    }
}

pub(crate) struct Node<K, V> {
    pub(crate) color: Color,
    pub(crate) parent: NodeId,
    pub(crate) left: NodeId,
    pub(crate) right: NodeId,
    /// Bumped every time the slot is released, so that old `Position`s can be told apart.
    pub(crate) generation: u64,
    /// `None` for the sentinel and for vacant slots.
    pub(crate) entry: Option<(K, V)>,
}

impl<K, V> Node<K, V> {
    fn sentinel() -> Self {
        Self {
            color: Color::Black,
            parent: NodeId::NIL,
            left: NodeId::NIL,
            right: NodeId::NIL,
            generation: 0,
            entry: None,
        }
    }

    pub(crate) fn child(&self, side: Side) -> NodeId {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub(crate) fn child_mut(&mut self, side: Side) -> &mut NodeId {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

/// Slot storage for the nodes of one tree.
///
/// Vacant slots form a free list threaded through their `right` link, ending at the sentinel.
/// All storage comes from `A` and is only given back when the arena itself is dropped.
pub(crate) struct Arena<K, V, A: Allocator> {
    slots: Vec<Node<K, V>, A>,
    free_head: NodeId,
}

impl<K, V, A: Allocator> Arena<K, V, A> {
    /// Creates the arena along with its sentinel.
    pub(crate) fn try_new_in(alloc: A) -> Result<Self, TreeError> {
        let mut slots = Vec::new_in(alloc);
        slots.try_reserve(1).map_err(|_| TreeError::allocation_failure::<Node<K, V>>())?;
        slots.push(Node::sentinel());

        Ok(Self { slots, free_head: NodeId::NIL })
    }

    pub(crate) fn allocator(&self) -> &A {
        self.slots.allocator()
    }

    /// Gets a slot for a new red, unlinked node holding `entry`.
    ///
    /// On failure nothing about the arena has changed.
    pub(crate) fn allocate(&mut self, entry: (K, V)) -> Result<NodeId, TreeError> {
        if !self.free_head.is_nil() {
            let id = self.free_head;
            let slot = &mut self[id];
            let next_free = slot.right;
            slot.color = Color::Red;
            slot.parent = NodeId::NIL;
            slot.left = NodeId::NIL;
            slot.right = NodeId::NIL;
            slot.entry = Some(entry);
            self.free_head = next_free;
            return Ok(id)
        }

        let old_capacity = self.slots.capacity();
        self.slots.try_reserve(1).map_err(|_| {
            log::debug!("Failed to grow the node arena past {old_capacity} slots");
            TreeError::allocation_failure::<Node<K, V>>()
        })?;
        if self.slots.capacity() != old_capacity {
            log::debug!("Grew the node arena from {old_capacity} to {} slots", self.slots.capacity());
        }

        let id = NodeId(self.slots.len());
        self.slots.push(Node {
            color: Color::Red,
            parent: NodeId::NIL,
            left: NodeId::NIL,
            right: NodeId::NIL,
            generation: 0,
            entry: Some(entry),
        });
        Ok(id)
    }

    /// Takes the entry out of `id` and puts the slot on the free list.
    ///
    /// The caller must already have unlinked the node from the tree.
    pub(crate) fn release(&mut self, id: NodeId) -> Option<(K, V)> {
        debug_assert!(!id.is_nil(), "the sentinel is never released");

        let free_head = self.free_head;
        let slot = &mut self[id];
        let entry = slot.entry.take();
        slot.generation += 1;
        slot.color = Color::Black;
        slot.parent = NodeId::NIL;
        slot.left = NodeId::NIL;
        slot.right = free_head;
        self.free_head = id;
        entry
    }

    /// Whether `id` names a slot that currently holds a node with the given generation.
    pub(crate) fn is_live(&self, id: NodeId, generation: u64) -> bool {
        match self.slots.get(id.index()) {
            Some(slot) => slot.entry.is_some() && slot.generation == generation,
            None => false,
        }
    }
}

impl<K, V, A: Allocator> Index<NodeId> for Arena<K, V, A> {
    type Output = Node<K, V>;

    fn index(&self, id: NodeId) -> &Self::Output {
        &self.slots[id.index()]
    }
}

impl<K, V, A: Allocator> IndexMut<NodeId> for Arena<K, V, A> {
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        &mut self.slots[id.index()]
    }
}


#[cfg(test)]
mod tests {
    use allocator_api2::alloc::Global;

    use super::*;

    #[test]
    fn test_slots_are_recycled() {
        let mut arena = Arena::<i32, &str, _>::try_new_in(Global).unwrap();
        let a = arena.allocate((1, "one")).unwrap();
        let b = arena.allocate((2, "two")).unwrap();
        assert_ne!(a, b);
        assert!(!a.is_nil() && !b.is_nil());

        assert_eq!(arena.release(a), Some((1, "one")));
        assert!(!arena.is_live(a, 0));
        assert!(arena.is_live(b, 0));

        // the freed slot comes back, one generation later
        let c = arena.allocate((3, "three")).unwrap();
        assert_eq!(c, a);
        assert!(arena.is_live(c, 1));
        assert_eq!(arena[c].color, Color::Red);
        assert_eq!(arena[c].right, NodeId::NIL);
    }

    #[test]
    fn test_generation_does_not_wrap_at_u32() {
        let mut arena = Arena::<u8, (), _>::try_new_in(Global).unwrap();
        let a = arena.allocate((0, ())).unwrap();
        arena[a].generation = u64::from(u32::MAX);
        arena.release(a);

        let b = arena.allocate((1, ())).unwrap();
        assert_eq!(b, a);
        assert!(arena.is_live(b, u64::from(u32::MAX) + 1));
        assert!(!arena.is_live(b, 0));
        assert!(!arena.is_live(b, u64::from(u32::MAX)));
    }

    #[test]
    fn test_sentinel_is_black_and_self_linked() {
        let arena = Arena::<u8, (), _>::try_new_in(Global).unwrap();
        let nil = &arena[NodeId::NIL];
        assert_eq!(nil.color, Color::Black);
        assert!(nil.parent.is_nil() && nil.left.is_nil() && nil.right.is_nil());
        assert!(nil.entry.is_none());
    }
}
