//! Routes, their timelines and the manager that owns them.

pub mod cache;
pub mod manager;
pub mod route;
pub mod schedule;

pub use cache::{INSERTION_CACHE_CAPACITY, InsertionCache};
pub use manager::RoutesManager;
pub use route::Route;
pub use schedule::{Schedule, TWO_DAYS, Visit};
