//! Dependency graph and deterministic job ordering for jobdeps.
//!
//! This crate models a set of named jobs as a directed graph and computes an
//! execution order for them with Kahn's algorithm. Ties between jobs that
//! become ready at the same time are broken by the order in which the jobs
//! were registered, so the same graph always yields the same order.
//!
//! A dependency cycle is not an error: it is reported through
//! [`JobOrder::Cycle`]. Structural misuse (registering a job twice, linking an
//! unknown job) is reported through [`Error`].
//!
//! # Key Types
//!
//! - [`DependencyGraph`]: the graph, keyed by job identifier
//! - [`JobOrder`]: the outcome of [`DependencyGraph::topological_order`]
//! - [`ParallelLevels`]: jobs grouped by dependency depth
//!
//! # Example
//!
//! ```
//! use jobdeps_graph::{DependencyGraph, JobOrder};
//!
//! let mut graph = DependencyGraph::new();
//! graph.add_vertices(["a", "b", "c"])?;
//! graph.add_edge("b", Some("c"))?;
//! graph.add_edge("a", None)?;
//!
//! assert_eq!(graph.topological_order(), JobOrder::Ordered(vec!["a", "b", "c"]));
//! # Ok::<(), jobdeps_graph::Error<&str>>(())
//! ```

mod error;
mod graph;
mod traversal;

pub use error::{Error, Result};
pub use graph::DependencyGraph;
pub use traversal::{CYCLE_MESSAGE, JobOrder, ParallelLevels};
