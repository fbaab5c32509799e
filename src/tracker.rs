//! Keeps the best outcome across optimization runs.

use std::cmp::{Ordering, Reverse};

use crate::reassign::ReassignmentPool;
use crate::routing::{Route, RoutesManager};

#[derive(Debug, Clone)]
pub struct BestResult {
    pub routes: Vec<Route>,
    pub pool: ReassignmentPool,
    pub attempt: usize,
    pub skipped: usize,
    pub used_vehicles: usize,
    pub total_duration: i64,
}

impl BestResult {
    /// Fewer skipped jobs first, then more vehicles in use, then a shorter
    /// total duration.
    fn key(&self) -> (usize, Reverse<usize>, i64) {
        (self.skipped, Reverse(self.used_vehicles), self.total_duration)
    }

    pub fn is_better_than(&self, other: &BestResult) -> bool {
        self.key().cmp(&other.key()) == Ordering::Less
    }
}

#[derive(Debug, Clone, Default)]
pub struct BestResultTracker {
    best: Option<BestResult>,
}

impl BestResultTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a copy of the run's state if it beats the current best.
    pub fn record(&mut self, manager: &RoutesManager<'_>, pool: &ReassignmentPool, attempt: usize) -> bool {
        let candidate = BestResult {
            routes: manager.routes().to_vec(),
            pool: pool.clone(),
            attempt,
            skipped: pool.skipped_count(),
            used_vehicles: manager.used_vehicles(),
            total_duration: manager.total_duration(),
        };
        let better = self
            .best
            .as_ref()
            .is_none_or(|best| candidate.is_better_than(best));
        if better {
            tracing::info!(
                attempt,
                skipped = candidate.skipped,
                vehicles = candidate.used_vehicles,
                duration = candidate.total_duration,
                "new best result"
            );
            self.best = Some(candidate);
        }
        better
    }

    pub fn best(&self) -> Option<&BestResult> {
        self.best.as_ref()
    }

    pub fn into_best(self) -> Option<BestResult> {
        self.best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reassign::PointToReassign;
    use crate::test_support::{context, driver_at, job};

    #[test]
    fn test_fewer_skipped_wins_over_duration() {
        let context = context(
            vec![driver_at("a", (0.0, 0.0))],
            vec![job("1", (1.0, 0.0)), job("2", (9.0, 0.0))],
        );
        let (near, far) = (context.deliveries()[0], context.deliveries()[1]);
        let mut tracker = BestResultTracker::new();

        let partial = RoutesManager::new(&context, vec![Route::new(0, [near])]).unwrap();
        let mut pool = ReassignmentPool::new();
        pool.push(PointToReassign::of(&context, far));
        assert!(tracker.record(&partial, &pool, 0));

        let full = RoutesManager::new(&context, vec![Route::new(0, [near, far])]).unwrap();
        assert!(tracker.record(&full, &ReassignmentPool::new(), 1));
        assert!(!tracker.record(&partial, &pool, 2));

        let best = tracker.best().unwrap();
        assert_eq!(best.attempt, 1);
        assert_eq!(best.skipped, 0);
    }

    #[test]
    fn test_more_vehicles_then_shorter_duration() {
        let context = context(
            vec![driver_at("a", (0.0, 0.0)), driver_at("b", (0.0, 0.0))],
            vec![job("1", (1.0, 0.0)), job("2", (2.0, 0.0))],
        );
        let (one, two) = (context.deliveries()[0], context.deliveries()[1]);
        let mut tracker = BestResultTracker::new();
        let pool = ReassignmentPool::new();

        let single = RoutesManager::new(&context, vec![Route::new(0, [one, two])]).unwrap();
        let split = RoutesManager::new(&context, vec![Route::new(0, [one]), Route::new(1, [two])]).unwrap();
        let detour = RoutesManager::new(&context, vec![Route::new(0, [two]), Route::new(1, [one])]).unwrap();
        assert!(tracker.record(&single, &pool, 0));
        assert!(tracker.record(&split, &pool, 1));
        // Same durations, not strictly better.
        assert!(!tracker.record(&detour, &pool, 2));
        assert_eq!(tracker.into_best().map(|best| best.attempt), Some(1));
    }
}
