use crate::error::{Error, Result};
use crate::reassign::ReassignmentPool;
use crate::routing::RoutesManager;

/// Turns invalid routes valid by moving stops into the pool.
///
/// Each step removes the stop whose removal leaves the shortest route that
/// honours every order window, or simply the shortest route when no removal
/// does. A route that stays invalid with nothing removable is fatal.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftAssignmentRoutesCleaner;

impl SoftAssignmentRoutesCleaner {
    pub fn clean(&self, manager: &mut RoutesManager<'_>, pool: &mut ReassignmentPool) -> Result<usize> {
        let context = manager.context();
        let mut removed = 0;

        for vehicle in manager.invalid_routes() {
            let mut route = manager.route(vehicle).clone();
            while !route.is_valid(context) {
                let candidates: Vec<_> = route
                    .deliveries(context)
                    .into_iter()
                    .filter_map(|delivery| route.take_point_for_reassign(context, delivery, false))
                    .collect();
                if candidates.is_empty() {
                    return Err(Error::UnrepairableRoute(vehicle));
                }

                let removal = candidates
                    .iter()
                    .filter(|(without, _)| without.is_time_windows_valid(context, true))
                    .min_by_key(|(without, _)| without.get_route_duration(context))
                    .or_else(|| {
                        candidates
                            .iter()
                            .min_by_key(|(without, _)| without.get_route_duration(context))
                    })
                    .cloned();
                let Some((without, point)) = removal else {
                    return Err(Error::UnrepairableRoute(vehicle));
                };

                tracing::debug!(vehicle, delivery = %point.delivery, "removing stop from invalid route");
                route = without;
                pool.push(point);
                removed += 1;
            }
            manager.rewrite_routes([route])?;
        }
        Ok(removed)
    }
}
