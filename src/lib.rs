//! dispatch-planner core
//!
//! Post-optimization of vehicle routes: a constraint solver proposes a seed
//! assignment, then a pipeline of heuristics repairs, reassigns and balances
//! it against time windows, capacities, skills, breaks and pickup pairing.

pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod haversine;
pub mod heuristics;
pub mod matrix;
pub mod model;
pub mod osrm;
pub mod reassign;
pub mod routing;
pub mod solver;
pub mod tracker;
pub mod traits;

#[cfg(test)]
mod test_support;

pub use config::SolveOptions;
pub use context::AssignmentContext;
pub use error::{Error, Result};
pub use events::{Event, EventKind, EventLevel, EventSink, RecordedEvents, TracingEvents};
pub use model::{BreakRecord, DepotRecord, DriverRecord, EngineParameters, JobRecord, PickupRecord, RoutePointIndex};
pub use solver::{
    GreedyInsertionSolver, PlannerResult, RouteResult, StopKind, StopResult, UnassignedJob, UnassignedReason, solve,
};
pub use traits::{ConstraintSolver, DirectionsProvider, InitialAssignment, Leg};
