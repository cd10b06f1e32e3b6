use std::alloc::{handle_alloc_error, Layout};

use thiserror::Error;


#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The node arena could not grow. The tree is left exactly as it was before the call.
    #[error("failed to allocate storage for a tree node ({} bytes, align {})", .layout.size(), .layout.align())]
    AllocationFailure { layout: Layout },
    /// A contract violation by the caller, e.g. erasing the end position.
    #[error(transparent)]
    InvalidOperation(#[from] InvalidOperation),
}

#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidOperation {
    #[error("the end position cannot be dereferenced")]
    DereferenceEnd,
    #[error("the end position cannot be erased")]
    RemoveEnd,
    #[error("the position's node has been removed")]
    StalePosition,
    #[error("the position belongs to a different tree")]
    ForeignPosition,
}

impl TreeError {
    pub(crate) fn allocation_failure<T>() -> Self {
        TreeError::AllocationFailure { layout: Layout::new::<T>() }
    }
}

/// Unwraps the result of an operation that can only fail by running out of memory, aborting the
/// same way `std` collections do when that happens.
pub(crate) fn or_abort<T>(result: Result<T, TreeError>) -> T {
    match result {
        Ok(value) => value,
        Err(TreeError::AllocationFailure { layout }) => handle_alloc_error(layout),
        Err(err) => panic!("{err}"),
    }
}
