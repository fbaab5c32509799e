//! Decomposition of a lookup graph into traversable walks.
//!
//! Each walk becomes one multi-waypoint directions request, so fewer and
//! longer walks mean fewer calls to the routing provider.

use crate::error::{Error, Result};
use crate::matrix::graph::Graph;

pub struct GraphWalker {
    graph: Graph,
    snapshot: Graph,
}

impl GraphWalker {
    pub fn new(graph: Graph) -> Self {
        Self {
            snapshot: graph.clone(),
            graph,
        }
    }

    /// Consumes the whole graph and returns the vertex sequences of the walks.
    ///
    /// Every edge of the input graph is covered by exactly one consecutive
    /// pair of exactly one walk.
    pub fn walk_vertices(mut self) -> Result<Vec<Vec<usize>>> {
        let mut paths = Vec::new();
        while let Some(start) = self.start_vertex() {
            let before = self.graph.edge_count();
            let extracted = self.extract_paths(start);
            let after = self.graph.edge_count();
            if after >= before {
                return Err(Error::MalformedGraph(format!(
                    "walk from vertex {} consumed no edge ({} remaining)",
                    start, after
                )));
            }
            for path in extracted {
                self.check_traversable(&path)?;
                paths.push(path);
            }
        }
        Ok(paths)
    }

    /// Prefer vertices with an excess of outgoing edges: an Euler trail
    /// can only start there.
    fn start_vertex(&self) -> Option<usize> {
        let size = self.graph.size();
        let unbalanced = if self.graph.is_directed() {
            (0..size).find(|&v| self.graph.out_degree(v) > self.graph.in_degree(v))
        } else {
            (0..size).find(|&v| self.graph.out_degree(v) % 2 == 1)
        };
        unbalanced.or_else(|| (0..size).find(|&v| self.graph.out_degree(v) > 0))
    }

    /// Hierholzer with an explicit stack. Every stack entry remembers the
    /// vertex it was reached from, so when the popped sequence jumps (the
    /// graph has no Euler trail) the walk is restarted from that vertex
    /// instead of emitting a leg that does not exist.
    fn extract_paths(&mut self, start: usize) -> Vec<Vec<usize>> {
        let mut stack: Vec<(usize, Option<usize>)> = vec![(start, None)];
        let mut consumed: Vec<(usize, usize)> = Vec::new();

        while let Some(&(vertex, _)) = stack.last() {
            if let Some(next) = self.graph.first_neighbour(vertex) {
                self.graph.remove_edge(vertex, next);
                stack.push((next, Some(vertex)));
                continue;
            }
            if let Some((vertex, Some(from))) = stack.pop() {
                consumed.push((from, vertex));
            }
        }
        consumed.reverse();

        let mut paths = Vec::new();
        let mut current: Vec<usize> = Vec::new();
        for (from, to) in consumed {
            if current.last() != Some(&from) {
                if current.len() > 1 {
                    paths.push(std::mem::take(&mut current));
                }
                current = vec![from];
            }
            current.push(to);
        }
        if current.len() > 1 {
            paths.push(current);
        }
        paths
    }

    fn check_traversable(&self, path: &[usize]) -> Result<()> {
        for pair in path.windows(2) {
            if !self.snapshot.has_edge(pair[0], pair[1]) {
                return Err(Error::MalformedGraph(format!(
                    "walk steps from {} to {} which is not an edge",
                    pair[0], pair[1]
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn covered_edges(paths: &[Vec<usize>], directed: bool) -> Vec<(usize, usize)> {
        let mut edges: Vec<(usize, usize)> = paths
            .iter()
            .flat_map(|path| path.windows(2).map(|pair| (pair[0], pair[1])))
            .map(|(a, b)| if directed || a < b { (a, b) } else { (b, a) })
            .collect();
        edges.sort();
        edges
    }

    #[test]
    fn test_complete_directed_graph_is_one_walk() {
        let graph = Graph::completed_directed_graph(5);
        let expected = graph.edges();
        let paths = GraphWalker::new(graph).walk_vertices().unwrap();

        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].len(), 21);
        assert_eq!(covered_edges(&paths, true), expected);
    }

    #[test]
    fn test_branching_graph_restarts_from_branch_vertex() {
        // a->b, b->c, b->d, d->e, e->f has no Euler trail.
        let graph = Graph::pair_filled_directed_graph(6, vec![(0, 1), (1, 2), (1, 3), (3, 4), (4, 5)]);
        let expected = graph.edges();
        let paths = GraphWalker::new(graph).walk_vertices().unwrap();

        assert_eq!(covered_edges(&paths, true), expected);
        assert!(paths.len() >= 2);
        assert!(paths.iter().any(|path| path.starts_with(&[1, 2]) || path.ends_with(&[1, 2])));
    }

    #[test]
    fn test_undirected_odd_vertices_cover_every_edge_once() {
        let graph = Graph::completed_undirected_graph(6);
        let expected = graph.edges();
        let paths = GraphWalker::new(graph).walk_vertices().unwrap();

        let covered = covered_edges(&paths, false);
        assert_eq!(covered, expected);
        let unique: BTreeSet<_> = covered.iter().collect();
        assert_eq!(unique.len(), covered.len());
    }

    #[test]
    fn test_empty_graph_yields_nothing() {
        let paths = GraphWalker::new(Graph::new(4, true)).walk_vertices().unwrap();
        assert!(paths.is_empty());
    }

    #[test]
    fn test_disconnected_components_get_separate_walks() {
        let graph = Graph::pair_filled_directed_graph(4, vec![(0, 1), (1, 0), (2, 3)]);
        let paths = GraphWalker::new(graph).walk_vertices().unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(covered_edges(&paths, true), vec![(0, 1), (1, 0), (2, 3)]);
    }
}
