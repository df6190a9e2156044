//! Traversal outcomes for dependency graphs.
//!
//! This module provides the types returned by the ordering queries on
//! [`DependencyGraph`](crate::DependencyGraph).

use std::fmt;

/// Message rendered for [`JobOrder::Cycle`].
pub const CYCLE_MESSAGE: &str = "Having circular dependency";

/// Jobs grouped by dependency level.
///
/// Level 0 holds every job without predecessors. A job sits one level below
/// its deepest predecessor, so jobs sharing a level never depend on each
/// other. Within a level, jobs keep their topological order.
pub type ParallelLevels<T> = Vec<Vec<T>>;

/// Outcome of a topological sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOrder<T> {
    /// Every job exactly once, each edge's source ahead of its target.
    Ordered(Vec<T>),
    /// The graph contains at least one directed cycle.
    Cycle,
}

impl<T> JobOrder<T> {
    /// Whether the sort detected a cycle.
    #[must_use]
    pub const fn is_cycle(&self) -> bool {
        matches!(self, Self::Cycle)
    }

    /// Borrow the ordered jobs, if any.
    #[must_use]
    pub fn as_slice(&self) -> Option<&[T]> {
        match self {
            Self::Ordered(order) => Some(order),
            Self::Cycle => None,
        }
    }

    /// Consume the outcome, yielding the ordered jobs if there was no cycle.
    #[must_use]
    pub fn into_order(self) -> Option<Vec<T>> {
        match self {
            Self::Ordered(order) => Some(order),
            Self::Cycle => None,
        }
    }
}

impl<T: fmt::Display> fmt::Display for JobOrder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ordered(order) => {
                for (i, job) in order.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{job}")?;
                }
                Ok(())
            }
            Self::Cycle => f.write_str(CYCLE_MESSAGE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_renders_space_joined() {
        let order = JobOrder::Ordered(vec!["d", "e", "a"]);
        assert_eq!(order.to_string(), "d e a");
    }

    #[test]
    fn empty_order_renders_empty_string() {
        let order: JobOrder<&str> = JobOrder::Ordered(vec![]);
        assert_eq!(order.to_string(), "");
        assert_eq!(order.as_slice(), Some(&[][..]));
    }

    #[test]
    fn cycle_renders_fixed_message() {
        let order: JobOrder<&str> = JobOrder::Cycle;
        assert!(order.is_cycle());
        assert_eq!(order.to_string(), "Having circular dependency");
        assert!(order.into_order().is_none());
    }
}
