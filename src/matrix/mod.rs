//! Distance-matrix acquisition.
//!
//! The pairs whose legs are needed form a graph; the graph is decomposed into
//! walks and each walk is sent to the directions provider as one
//! multi-waypoint request.

pub mod builder;
pub mod graph;
pub mod walker;

pub use builder::{DistanceMatrixBuilder, Matrix, MatrixOutcome, UNREACHABLE_COST};
pub use graph::Graph;
pub use walker::GraphWalker;
