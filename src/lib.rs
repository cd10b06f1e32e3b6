#![deny(unsafe_op_in_unsafe_fn)]

//! Ordered associative containers.
//!
//! [`OrderedTree`] is a red-black tree map: unique keys under a strict weak ordering, with
//! insertion, lookup, removal and in-order traversal in logarithmic time. It's single-threaded;
//! mutation needs `&mut`, so sharing one across threads means wrapping it in a lock.

pub mod compare;
pub mod error;
pub mod rbtree;

pub use compare::{Compare, FnCompare, Greater, Less};
pub use error::{InvalidOperation, TreeError};
pub use rbtree::{Color, IntoIter, InvariantViolation, Iter, Keys, OrderedTree, Position, Values};
