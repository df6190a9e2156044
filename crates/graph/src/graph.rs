//! Dependency graph built on petgraph.
//!
//! Jobs are petgraph nodes carrying their identifier and a running indegree.
//! Node indices are handed out densely in registration order, which is what
//! the sort uses to break ties.

use crate::{Error, JobOrder, ParallelLevels, Result};
use petgraph::Direction;
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use std::borrow::Borrow;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::hash::Hash;
use tracing::debug;

/// Node weight: the job identifier plus the number of edges targeting it.
#[derive(Debug, Clone)]
struct Vertex<T> {
    id: T,
    indegree: usize,
}

/// Directed graph of jobs keyed by identifier.
///
/// An edge `a → b` means `a` must come before `b` in the computed order.
/// Edges form a set: linking the same pair twice records a single edge.
#[derive(Debug, Clone)]
pub struct DependencyGraph<T> {
    /// The directed graph of jobs.
    graph: DiGraph<Vertex<T>, ()>,
    /// Map from job identifiers to node indices.
    id_to_node: HashMap<T, NodeIndex>,
}

impl<T> DependencyGraph<T> {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            id_to_node: HashMap::new(),
        }
    }

    /// Number of registered jobs.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of distinct dependency edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether no job has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Remove every job and edge, returning the graph to its initial state.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.id_to_node.clear();
        debug!("Cleared dependency graph");
    }
}

impl<T> DependencyGraph<T>
where
    T: Clone + Eq + Hash + fmt::Debug,
{
    /// Register a job with no edges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateVertex`] if `id` is already registered.
    pub fn add_vertex(&mut self, id: T) -> Result<(), T> {
        if self.id_to_node.contains_key(&id) {
            return Err(Error::DuplicateVertex { vertex: id });
        }

        let node = self.graph.add_node(Vertex {
            id: id.clone(),
            indegree: 0,
        });
        debug!(job = ?id, "Added job vertex");
        self.id_to_node.insert(id, node);

        Ok(())
    }

    /// Register several jobs in order.
    ///
    /// Jobs registered before a duplicate is met stay registered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateVertex`] for the first identifier that is
    /// already registered.
    pub fn add_vertices<I>(&mut self, ids: I) -> Result<(), T>
    where
        I: IntoIterator<Item = T>,
    {
        ids.into_iter().try_for_each(|id| self.add_vertex(id))
    }

    /// Record the edge `from → to`.
    ///
    /// A `to` of `None` declares that `from` has no dependency and records
    /// nothing. Returns `true` when a new edge was added, `false` when there
    /// was nothing to add or the edge already existed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownVertex`] if `from`, or `to` when present, is not
    /// registered. The graph is left untouched in that case.
    pub fn add_edge(&mut self, from: T, to: Option<T>) -> Result<bool, T> {
        let Some(&from_node) = self.id_to_node.get(&from) else {
            return Err(Error::UnknownVertex { vertex: from });
        };
        let Some(to) = to else {
            return Ok(false);
        };
        let Some(&to_node) = self.id_to_node.get(&to) else {
            return Err(Error::UnknownVertex { vertex: to });
        };

        if self.graph.contains_edge(from_node, to_node) {
            debug!(from = ?from, to = ?to, "Edge already present");
            return Ok(false);
        }

        self.graph.add_edge(from_node, to_node, ());
        self.graph[to_node].indegree += 1;
        debug!(from = ?from, to = ?to, "Added dependency edge");

        Ok(true)
    }

    /// Whether the edge `from → to` exists.
    ///
    /// An unregistered `to` is reported as not linked.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownVertex`] if `from` is not registered.
    pub fn is_linked<Q>(&self, from: &Q, to: &Q) -> Result<bool, T>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = T> + ?Sized,
    {
        let from_node = self.node_index(from)?;
        Ok(self
            .id_to_node
            .get(to)
            .is_some_and(|&to_node| self.graph.contains_edge(from_node, to_node)))
    }

    /// Check if a job is registered.
    #[must_use]
    pub fn contains<Q>(&self, id: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.id_to_node.contains_key(id)
    }

    /// Number of edges targeting a job, or `None` if it is not registered.
    #[must_use]
    pub fn indegree<Q>(&self, id: &Q) -> Option<usize>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.id_to_node
            .get(id)
            .map(|&node| self.graph[node].indegree)
    }

    /// Direct successors of a job in the order their edges were added.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownVertex`] if `id` is not registered.
    pub fn successors<Q>(&self, id: &Q) -> Result<Vec<&T>, T>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = T> + ?Sized,
    {
        let node = self.node_index(id)?;
        Ok(self
            .successor_nodes(node)
            .into_iter()
            .map(|succ| &self.graph[succ].id)
            .collect())
    }

    /// Iterate over registered jobs in registration order.
    pub fn vertices(&self) -> impl Iterator<Item = &T> {
        self.graph.node_indices().map(|node| &self.graph[node].id)
    }

    /// Check if the graph has cycles.
    #[must_use]
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Compute a dependency-respecting order of every job.
    ///
    /// Runs Kahn's algorithm over a private copy of the indegrees, so the
    /// graph itself is never modified and repeated calls agree. Jobs that
    /// become ready together keep the order they were registered in; jobs
    /// released by the same predecessor follow its edge order.
    #[must_use]
    pub fn topological_order(&self) -> JobOrder<T> {
        match self.kahn() {
            Some(order) => JobOrder::Ordered(
                order
                    .into_iter()
                    .map(|node| self.graph[node].id.clone())
                    .collect(),
            ),
            None => JobOrder::Cycle,
        }
    }

    /// Group the topological order into dependency levels.
    ///
    /// Returns `None` when the graph contains a cycle.
    #[must_use]
    pub fn parallel_levels(&self) -> Option<ParallelLevels<T>> {
        let order = self.kahn()?;

        let mut depth_of = vec![0_usize; self.graph.node_count()];
        let mut levels: ParallelLevels<T> = Vec::new();

        for node in order {
            // Predecessors precede `node` in the order, so their depth is final.
            let depth = self
                .graph
                .neighbors_directed(node, Direction::Incoming)
                .map(|pred| depth_of[pred.index()] + 1)
                .max()
                .unwrap_or(0);
            depth_of[node.index()] = depth;

            if depth >= levels.len() {
                levels.resize_with(depth + 1, Vec::new);
            }
            levels[depth].push(self.graph[node].id.clone());
        }

        Some(levels)
    }

    fn node_index<Q>(&self, id: &Q) -> Result<NodeIndex, T>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = T> + ?Sized,
    {
        self.id_to_node
            .get(id)
            .copied()
            .ok_or_else(|| Error::UnknownVertex {
                vertex: id.to_owned(),
            })
    }

    /// Outgoing neighbours in edge insertion order.
    fn successor_nodes(&self, node: NodeIndex) -> Vec<NodeIndex> {
        // petgraph lists the most recently added edge first.
        let mut succs: Vec<NodeIndex> = self.graph.neighbors(node).collect();
        succs.reverse();
        succs
    }

    fn kahn(&self) -> Option<Vec<NodeIndex>> {
        let mut remaining: Vec<usize> = self
            .graph
            .node_indices()
            .map(|node| self.graph[node].indegree)
            .collect();
        let mut pending = remaining.iter().filter(|&&deg| deg > 0).count();

        let mut ready: VecDeque<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|node| remaining[node.index()] == 0)
            .collect();
        let mut order = Vec::with_capacity(self.graph.node_count());

        while let Some(node) = ready.pop_front() {
            order.push(node);

            for succ in self.successor_nodes(node) {
                let left = &mut remaining[succ.index()];
                if *left == 0 {
                    continue;
                }
                *left -= 1;
                if *left == 0 {
                    pending -= 1;
                    ready.push_back(succ);
                }
            }
        }

        if pending > 0 {
            debug!(
                pending,
                sorted = order.len(),
                "Topological sort stalled on a cycle"
            );
            return None;
        }

        debug!(jobs = order.len(), "Topological sort complete");
        Some(order)
    }
}

impl<T> Default for DependencyGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with(vertices: &[&'static str]) -> DependencyGraph<&'static str> {
        let mut graph = DependencyGraph::new();
        graph.add_vertices(vertices.iter().copied()).unwrap();
        graph
    }

    fn ordered(jobs: &[&'static str]) -> JobOrder<&'static str> {
        JobOrder::Ordered(jobs.to_vec())
    }

    #[test]
    fn test_empty_graph() {
        let graph: DependencyGraph<&str> = DependencyGraph::new();

        assert!(graph.is_empty());
        assert!(!graph.has_cycles());
        assert_eq!(graph.topological_order(), JobOrder::Ordered(vec![]));
        assert_eq!(graph.topological_order().to_string(), "");
        assert_eq!(graph.parallel_levels(), Some(vec![]));
    }

    #[test]
    fn test_single_job() {
        let graph = graph_with(&["a"]);
        assert_eq!(graph.topological_order(), ordered(&["a"]));
    }

    #[test]
    fn test_no_dependencies_keeps_registration_order() {
        let mut graph = graph_with(&["a", "b", "c"]);
        for job in ["a", "b", "c"] {
            assert!(!graph.add_edge(job, None).unwrap());
        }

        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.topological_order(), ordered(&["a", "b", "c"]));
    }

    #[test]
    fn test_ties_follow_registration_not_identifier_value() {
        let graph = graph_with(&["c", "a", "b"]);
        assert_eq!(graph.topological_order(), ordered(&["c", "a", "b"]));
    }

    #[test]
    fn test_job_chain() {
        let mut graph = graph_with(&["a", "b", "c", "d", "e", "f"]);
        graph.add_edge("a", None).unwrap();
        graph.add_edge("b", Some("c")).unwrap();
        graph.add_edge("c", Some("f")).unwrap();
        graph.add_edge("d", Some("a")).unwrap();
        graph.add_edge("e", Some("b")).unwrap();
        graph.add_edge("f", None).unwrap();

        let order = graph.topological_order();
        assert_eq!(order, ordered(&["d", "e", "a", "b", "c", "f"]));
        assert_eq!(order.to_string(), "d e a b c f");
    }

    #[test]
    fn test_partial_links() {
        let mut graph = graph_with(&["a", "b", "c"]);
        graph.add_edge("a", None).unwrap();
        graph.add_edge("b", Some("c")).unwrap();
        graph.add_edge("c", None).unwrap();

        assert_eq!(graph.topological_order(), ordered(&["a", "b", "c"]));
    }

    #[test]
    fn test_self_dependency_is_cycle() {
        let mut graph = graph_with(&["a", "b", "c"]);
        graph.add_edge("a", None).unwrap();
        graph.add_edge("b", None).unwrap();
        graph.add_edge("c", Some("c")).unwrap();

        assert!(graph.has_cycles());
        let order = graph.topological_order();
        assert!(order.is_cycle());
        assert_eq!(order.to_string(), "Having circular dependency");
        assert!(graph.parallel_levels().is_none());
    }

    #[test]
    fn test_circular_dependency() {
        let mut graph = graph_with(&["a", "b", "c", "d", "e", "f"]);
        graph.add_edge("a", None).unwrap();
        graph.add_edge("b", Some("c")).unwrap();
        graph.add_edge("c", Some("f")).unwrap();
        graph.add_edge("d", Some("a")).unwrap();
        graph.add_edge("e", None).unwrap();
        graph.add_edge("f", Some("b")).unwrap();

        assert!(graph.has_cycles());
        assert_eq!(graph.topological_order(), JobOrder::Cycle);
    }

    #[test]
    fn test_duplicate_vertex_rejected() {
        let mut graph = graph_with(&["a"]);

        let err = graph.add_vertex("a").unwrap_err();
        assert_eq!(err, Error::DuplicateVertex { vertex: "a" });
        assert_eq!(graph.vertex_count(), 1);
    }

    #[test]
    fn test_add_vertices_stops_at_duplicate() {
        let mut graph = DependencyGraph::new();

        let err = graph.add_vertices(["a", "b", "a", "c"]).unwrap_err();
        assert_eq!(err, Error::DuplicateVertex { vertex: "a" });
        assert_eq!(graph.vertices().copied().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_unknown_vertex_leaves_graph_unchanged() {
        let mut graph = graph_with(&["a", "b"]);
        graph.add_edge("a", Some("b")).unwrap();

        let err = graph.add_edge("a", Some("z")).unwrap_err();
        assert_eq!(err, Error::UnknownVertex { vertex: "z" });
        let err = graph.add_edge("z", Some("a")).unwrap_err();
        assert_eq!(err, Error::UnknownVertex { vertex: "z" });
        let err = graph.add_edge("z", None).unwrap_err();
        assert_eq!(err, Error::UnknownVertex { vertex: "z" });

        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.indegree("a"), Some(0));
        assert_eq!(graph.indegree("b"), Some(1));
        assert_eq!(graph.topological_order(), ordered(&["a", "b"]));
    }

    #[test]
    fn test_duplicate_edge_counted_once() {
        let mut graph = graph_with(&["a", "b"]);

        assert!(graph.add_edge("a", Some("b")).unwrap());
        assert!(!graph.add_edge("a", Some("b")).unwrap());

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.indegree("b"), Some(1));
        assert_eq!(graph.topological_order(), ordered(&["a", "b"]));
    }

    #[test]
    fn test_is_linked() {
        let mut graph = graph_with(&["a", "b", "c"]);
        graph.add_edge("b", Some("c")).unwrap();

        assert!(graph.is_linked(&"b", &"c").unwrap());
        assert!(!graph.is_linked(&"c", &"b").unwrap());
        assert!(!graph.is_linked(&"a", &"missing").unwrap());
        assert_eq!(
            graph.is_linked(&"missing", &"a").unwrap_err(),
            Error::UnknownVertex { vertex: "missing" }
        );
    }

    #[test]
    fn test_lookups_by_borrowed_key() {
        let mut graph: DependencyGraph<String> = DependencyGraph::new();
        graph
            .add_vertices(["build".to_string(), "test".to_string()])
            .unwrap();
        graph
            .add_edge("build".to_string(), Some("test".to_string()))
            .unwrap();

        assert!(graph.contains("build"));
        assert!(!graph.contains("deploy"));
        assert!(graph.is_linked("build", "test").unwrap());
        assert_eq!(graph.indegree("test"), Some(1));
        assert_eq!(graph.indegree("deploy"), None);
        assert_eq!(
            graph.successors("deploy").unwrap_err(),
            Error::UnknownVertex {
                vertex: "deploy".to_string()
            }
        );
    }

    #[test]
    fn test_successors_in_edge_order() {
        let mut graph = graph_with(&["root", "x", "y", "z"]);
        graph.add_edge("root", Some("z")).unwrap();
        graph.add_edge("root", Some("x")).unwrap();
        graph.add_edge("root", Some("y")).unwrap();

        assert_eq!(graph.successors(&"root").unwrap(), vec![&"z", &"x", &"y"]);
        // Released jobs are queued in edge order, not registration order.
        assert_eq!(graph.topological_order(), ordered(&["root", "z", "x", "y"]));
    }

    #[test]
    fn test_breadth_first_release() {
        // a releases c, b releases d; a and b are both seeds, so c and d queue
        // behind b rather than running depth-first after a.
        let mut graph = graph_with(&["a", "b", "c", "d", "e"]);
        graph.add_edge("a", Some("c")).unwrap();
        graph.add_edge("b", Some("d")).unwrap();
        graph.add_edge("c", Some("e")).unwrap();

        assert_eq!(graph.topological_order(), ordered(&["a", "b", "c", "d", "e"]));
    }

    #[test]
    fn test_query_is_repeatable() {
        let mut graph = graph_with(&["a", "b", "c"]);
        graph.add_edge("c", Some("a")).unwrap();

        let first = graph.topological_order();
        let second = graph.topological_order();
        assert_eq!(first, second);
        assert_eq!(first, ordered(&["b", "c", "a"]));
        assert_eq!(graph.indegree(&"a"), Some(1));
    }

    #[test]
    fn test_clear_and_reuse() {
        let mut graph = graph_with(&["a", "b", "c"]);
        graph.add_edge("c", Some("c")).unwrap();
        assert!(graph.topological_order().is_cycle());

        graph.clear();
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
        assert!(!graph.contains(&"a"));

        graph.add_vertices(["a", "b", "c"]).unwrap();
        graph.add_edge("b", Some("c")).unwrap();
        assert_eq!(graph.topological_order(), ordered(&["a", "b", "c"]));
    }

    #[test]
    fn test_parallel_levels() {
        let mut graph = graph_with(&["a", "b", "c", "d", "e", "f"]);
        graph.add_edge("b", Some("c")).unwrap();
        graph.add_edge("c", Some("f")).unwrap();
        graph.add_edge("d", Some("a")).unwrap();
        graph.add_edge("e", Some("b")).unwrap();

        assert_eq!(
            graph.parallel_levels(),
            Some(vec![vec!["d", "e"], vec!["a", "b"], vec!["c"], vec!["f"]])
        );
    }

    #[test]
    fn test_diamond_levels() {
        //     a
        //    / \
        //   b   c
        //    \ /
        //     d
        let mut graph = graph_with(&["a", "b", "c", "d"]);
        graph.add_edge("a", Some("b")).unwrap();
        graph.add_edge("a", Some("c")).unwrap();
        graph.add_edge("b", Some("d")).unwrap();
        graph.add_edge("c", Some("d")).unwrap();

        assert_eq!(graph.indegree(&"d"), Some(2));
        assert_eq!(graph.topological_order(), ordered(&["a", "b", "c", "d"]));
        assert_eq!(
            graph.parallel_levels(),
            Some(vec![vec!["a"], vec!["b", "c"], vec!["d"]])
        );
    }

    #[test]
    fn test_integer_identifiers() {
        let mut graph = DependencyGraph::new();
        graph.add_vertices([30_u32, 20, 10]).unwrap();
        graph.add_edge(10, Some(30)).unwrap();

        assert_eq!(graph.topological_order(), JobOrder::Ordered(vec![20, 10, 30]));
    }
}
