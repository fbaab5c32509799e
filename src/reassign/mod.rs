//! Bookkeeping for points that left their route: the pool they wait in and
//! the cleaner that turns invalid routes valid by feeding that pool.

pub mod cleaner;
pub mod point;
pub mod pool;

pub use cleaner::SoftAssignmentRoutesCleaner;
pub use point::PointToReassign;
pub use pool::ReassignmentPool;
