//! Interfaces of the external collaborators.
//!
//! The planner never talks to a routing service or a constraint solver
//! directly. Hosts plug their own implementations in through these traits;
//! `osrm`, `haversine` and `solver::GreedyInsertionSolver` are the bundled
//! ones.

use std::collections::HashMap;

use crate::context::AssignmentContext;
use crate::error::Result;
use crate::model::RoutePointIndex;

/// Distance and duration of a single leg between two consecutive waypoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Leg {
    /// Meters.
    pub distance: i64,
    /// Seconds.
    pub duration: i64,
}

/// Batch "distance + duration between N waypoints" provider.
pub trait DirectionsProvider: Sync {
    /// Returns one entry per consecutive waypoint pair; `None` marks a leg
    /// the provider could not route.
    fn directions(&self, waypoints: &[(f64, f64)]) -> Result<Vec<Option<Leg>>>;

    /// Largest number of waypoints accepted by a single request.
    fn max_waypoints(&self) -> usize {
        25
    }

    /// Whether `a -> b` always costs the same as `b -> a`.
    fn is_symmetric(&self) -> bool {
        false
    }
}

/// Raw solver output: vehicle index to its ordered point indices.
///
/// Start and end nodes may or may not be included; they are stripped when
/// the assignment is wrapped into routes.
pub type InitialAssignment = HashMap<usize, Vec<RoutePointIndex>>;

/// The constraint solver producing the seed assignment.
pub trait ConstraintSolver {
    /// `attempt` is the run number; solvers should use it to perturb their
    /// search so repeated runs explore different seeds.
    fn initial_assignment(
        &self,
        context: &AssignmentContext,
        attempt: usize,
    ) -> Result<InitialAssignment>;
}
