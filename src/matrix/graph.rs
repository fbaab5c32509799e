//! Graph of distance lookups that are still needed.
//!
//! Vertices are location indices, an edge `a -> b` means "the leg from `a` to
//! `b` has to be requested". Edges are removed as walks consume them.

use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    directed: bool,
    outgoing: Vec<BTreeSet<usize>>,
    in_degree: Vec<usize>,
    aliases: BTreeMap<usize, usize>,
}

impl Graph {
    pub fn new(size: usize, directed: bool) -> Self {
        Self {
            directed,
            outgoing: vec![BTreeSet::new(); size],
            in_degree: vec![0; size],
            aliases: BTreeMap::new(),
        }
    }

    /// Every ordered pair of distinct vertices.
    pub fn completed_directed_graph(size: usize) -> Self {
        let mut graph = Self::new(size, true);
        for from in 0..size {
            for to in 0..size {
                if from != to {
                    graph.add_edge(from, to);
                }
            }
        }
        graph
    }

    /// Only the given ordered pairs.
    pub fn pair_filled_directed_graph(
        size: usize,
        pairs: impl IntoIterator<Item = (usize, usize)>,
    ) -> Self {
        let mut graph = Self::new(size, true);
        for (from, to) in pairs {
            if from != to {
                graph.add_edge(from, to);
            }
        }
        graph
    }

    /// Every unordered pair of distinct vertices.
    pub fn completed_undirected_graph(size: usize) -> Self {
        let mut graph = Self::new(size, false);
        for from in 0..size {
            for to in from + 1..size {
                graph.add_edge(from, to);
            }
        }
        graph
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn size(&self) -> usize {
        self.outgoing.len()
    }

    pub fn add_edge(&mut self, from: usize, to: usize) -> bool {
        if from == to || !self.outgoing[from].insert(to) {
            return false;
        }
        self.in_degree[to] += 1;
        if !self.directed {
            self.outgoing[to].insert(from);
            self.in_degree[from] += 1;
        }
        true
    }

    pub fn remove_edge(&mut self, from: usize, to: usize) -> bool {
        if !self.outgoing[from].remove(&to) {
            return false;
        }
        self.in_degree[to] -= 1;
        if !self.directed {
            self.outgoing[to].remove(&from);
            self.in_degree[from] -= 1;
        }
        true
    }

    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        self.outgoing
            .get(from)
            .is_some_and(|neighbours| neighbours.contains(&to))
    }

    pub fn first_neighbour(&self, vertex: usize) -> Option<usize> {
        self.outgoing[vertex].iter().next().copied()
    }

    pub fn out_degree(&self, vertex: usize) -> usize {
        self.outgoing[vertex].len()
    }

    pub fn in_degree(&self, vertex: usize) -> usize {
        self.in_degree[vertex]
    }

    pub fn edge_count(&self) -> usize {
        let total: usize = self.outgoing.iter().map(BTreeSet::len).sum();
        if self.directed { total } else { total / 2 }
    }

    pub fn is_empty(&self) -> bool {
        self.outgoing.iter().all(BTreeSet::is_empty)
    }

    /// All edges; undirected edges are listed once as `(low, high)`.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        self.outgoing
            .iter()
            .enumerate()
            .flat_map(|(from, neighbours)| neighbours.iter().map(move |&to| (from, to)))
            .filter(|&(from, to)| self.directed || from < to)
            .collect()
    }

    /// Merges `absorbed` into `kept`: edges are redirected, self loops
    /// dropped, and `absorbed` resolves to `kept` from now on.
    pub fn join_vertices_in_one_vertex(&mut self, kept: usize, absorbed: usize) {
        let kept = self.representative(kept);
        let absorbed = self.representative(absorbed);
        if kept == absorbed {
            return;
        }

        let targets: Vec<usize> = self.outgoing[absorbed].iter().copied().collect();
        for to in targets {
            self.remove_edge(absorbed, to);
            if to != kept {
                self.add_edge(kept, to);
            }
        }
        if self.directed {
            let sources: Vec<usize> = (0..self.size())
                .filter(|&from| self.outgoing[from].contains(&absorbed))
                .collect();
            for from in sources {
                self.remove_edge(from, absorbed);
                if from != kept {
                    self.add_edge(from, kept);
                }
            }
        }

        for target in self.aliases.values_mut() {
            if *target == absorbed {
                *target = kept;
            }
        }
        self.aliases.insert(absorbed, kept);
    }

    /// The vertex that stands in for `vertex` after joins.
    pub fn representative(&self, vertex: usize) -> usize {
        self.aliases.get(&vertex).copied().unwrap_or(vertex)
    }
}
