//! Error types for dependency graph operations.

use thiserror::Error;

/// Result type for dependency graph operations, generic over the job identifier.
pub type Result<R, T> = std::result::Result<R, Error<T>>;

/// Structural errors raised while building or querying a [`DependencyGraph`].
///
/// A dependency cycle is deliberately absent here; it is a normal outcome of
/// [`DependencyGraph::topological_order`].
///
/// [`DependencyGraph`]: crate::DependencyGraph
/// [`DependencyGraph::topological_order`]: crate::DependencyGraph::topological_order
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error<T> {
    /// A job with this identifier is already registered.
    #[error("Job {vertex:?} is already registered")]
    DuplicateVertex {
        /// The identifier that was registered twice.
        vertex: T,
    },

    /// An operation referenced a job that was never registered.
    #[error("Job {vertex:?} is not registered")]
    UnknownVertex {
        /// The identifier that could not be found.
        vertex: T,
    },
}

impl<T> Error<T> {
    /// The job identifier the error refers to.
    pub fn vertex(&self) -> &T {
        match self {
            Self::DuplicateVertex { vertex } | Self::UnknownVertex { vertex } => vertex,
        }
    }
}
