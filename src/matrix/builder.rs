//! Distance/duration matrix acquisition through batched directions requests.

use std::collections::{BTreeSet, HashMap};

use rayon::prelude::*;

use crate::error::Result;
use crate::matrix::graph::Graph;
use crate::matrix::walker::GraphWalker;
use crate::traits::{DirectionsProvider, Leg};

/// Cost of a leg the provider could not route.
pub const UNREACHABLE_COST: i64 = 10_000_000;

/// Square matrix of distances (meters) and durations (seconds).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    size: usize,
    distances: Vec<i64>,
    durations: Vec<i64>,
}

impl Matrix {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            distances: vec![0; size * size],
            durations: vec![0; size * size],
        }
    }

    /// Builds a matrix from a precomputed duration table; distances mirror
    /// durations.
    pub fn from_durations(durations: &[Vec<i64>]) -> Self {
        let mut matrix = Self::new(durations.len());
        for (from, row) in durations.iter().enumerate() {
            for (to, &duration) in row.iter().enumerate() {
                matrix.set(from, to, Leg { distance: duration, duration });
            }
        }
        matrix
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn distance(&self, from: usize, to: usize) -> i64 {
        self.distances[from * self.size + to]
    }

    pub fn duration(&self, from: usize, to: usize) -> i64 {
        self.durations[from * self.size + to]
    }

    pub fn set(&mut self, from: usize, to: usize, leg: Leg) {
        self.distances[from * self.size + to] = leg.distance;
        self.durations[from * self.size + to] = leg.duration;
    }
}

#[derive(Debug, Clone)]
pub struct MatrixOutcome {
    pub matrix: Matrix,
    /// Locations no requested leg could reach or leave.
    pub inaccessible: BTreeSet<usize>,
    /// Number of directions requests issued.
    pub requests: usize,
}

/// Collects the legs between `locations` with as few provider calls as the
/// Euler decomposition allows.
pub struct DistanceMatrixBuilder<'a, P: DirectionsProvider> {
    provider: &'a P,
    locations: Vec<(f64, f64)>,
    known: HashMap<(usize, usize), Leg>,
}

impl<'a, P: DirectionsProvider> DistanceMatrixBuilder<'a, P> {
    pub fn new(provider: &'a P, locations: Vec<(f64, f64)>) -> Self {
        Self {
            provider,
            locations,
            known: HashMap::new(),
        }
    }

    /// Registers a leg the host already knows; it will not be requested.
    pub fn with_known_leg(mut self, from: usize, to: usize, leg: Leg) -> Self {
        self.known.insert((from, to), leg);
        self
    }

    /// The lookup graph after same-location vertices have been joined.
    pub fn lookup_graph(&self) -> Graph {
        let size = self.locations.len();
        let mut graph = if !self.known.is_empty() {
            let missing = (0..size)
                .flat_map(|from| (0..size).map(move |to| (from, to)))
                .filter(|pair| !self.known.contains_key(pair));
            Graph::pair_filled_directed_graph(size, missing)
        } else if self.provider.is_symmetric() {
            Graph::completed_undirected_graph(size)
        } else {
            Graph::completed_directed_graph(size)
        };

        let mut first_seen: HashMap<String, usize> = HashMap::new();
        for (vertex, location) in self.locations.iter().enumerate() {
            let key = location_key(*location);
            match first_seen.get(&key) {
                Some(&kept) => graph.join_vertices_in_one_vertex(kept, vertex),
                None => {
                    first_seen.insert(key, vertex);
                }
            }
        }
        graph
    }

    pub fn build(self) -> Result<MatrixOutcome> {
        let size = self.locations.len();
        let graph = self.lookup_graph();
        let aliases: Vec<usize> = (0..size).map(|v| graph.representative(v)).collect();
        let symmetric = !graph.is_directed();

        let paths = GraphWalker::new(graph).walk_vertices()?;
        let chunks = split_paths(paths, self.provider.max_waypoints().max(2));

        let responses = chunks
            .par_iter()
            .map(|chunk| {
                let waypoints: Vec<(f64, f64)> =
                    chunk.iter().map(|&vertex| self.locations[vertex]).collect();
                self.provider.directions(&waypoints)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut computed = Matrix::new(size);
        let mut requested = vec![0usize; size];
        let mut failed = vec![0usize; size];
        for (chunk, legs) in chunks.iter().zip(responses) {
            for (step, pair) in chunk.windows(2).enumerate() {
                let (from, to) = (pair[0], pair[1]);
                requested[from] += 1;
                requested[to] += 1;
                let leg = legs.get(step).copied().flatten().unwrap_or_else(|| {
                    failed[from] += 1;
                    failed[to] += 1;
                    Leg {
                        distance: UNREACHABLE_COST,
                        duration: UNREACHABLE_COST,
                    }
                });
                computed.set(from, to, leg);
                if symmetric {
                    computed.set(to, from, leg);
                }
            }
        }

        let mut matrix = Matrix::new(size);
        for from in 0..size {
            for to in 0..size {
                if let Some(leg) = self.known.get(&(from, to)) {
                    matrix.set(from, to, *leg);
                } else if aliases[from] != aliases[to] {
                    let (a, b) = (aliases[from], aliases[to]);
                    matrix.set(
                        from,
                        to,
                        Leg {
                            distance: computed.distance(a, b),
                            duration: computed.duration(a, b),
                        },
                    );
                }
            }
        }

        let inaccessible = (0..size)
            .filter(|&vertex| {
                let kept = aliases[vertex];
                failed[kept] > 0 && failed[kept] == requested[kept]
            })
            .collect::<BTreeSet<_>>();

        if !inaccessible.is_empty() {
            tracing::warn!(count = inaccessible.len(), "locations unreachable by the provider");
        }
        tracing::debug!(requests = chunks.len(), locations = size, "matrix acquired");

        Ok(MatrixOutcome {
            matrix,
            inaccessible,
            requests: chunks.len(),
        })
    }
}

/// Cuts walks to the provider's waypoint limit. Consecutive chunks share
/// their boundary vertex so no leg is lost.
fn split_paths(paths: Vec<Vec<usize>>, max_waypoints: usize) -> Vec<Vec<usize>> {
    let mut chunks = Vec::new();
    for path in paths {
        let mut start = 0;
        while start + 1 < path.len() {
            let end = start.saturating_add(max_waypoints).min(path.len());
            chunks.push(path[start..end].to_vec());
            start = end - 1;
        }
    }
    chunks
}

pub fn location_key(location: (f64, f64)) -> String {
    format!("{:.6},{:.6}", location.0, location.1)
}
