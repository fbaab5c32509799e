use crate::error::Result;
use crate::heuristics::Heuristic;
use crate::reassign::ReassignmentPool;
use crate::routing::RoutesManager;

/// Hands whole routes between vehicles when both stay valid and the total
/// duration drops, e.g. when another vehicle's depot is closer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwapFullRouteHelper;

impl Heuristic for SwapFullRouteHelper {
    fn name(&self) -> &'static str {
        "swap_full_route"
    }

    fn process(&mut self, manager: &mut RoutesManager<'_>, _pool: &mut ReassignmentPool) -> Result<usize> {
        let context = manager.context();
        let vehicles = context.vehicles().len();
        let mut swaps = 0;

        for _ in 0..vehicles {
            let mut improved = false;
            for first in 0..vehicles {
                for second in first + 1..vehicles {
                    let (a, b) = (manager.route(first), manager.route(second));
                    if a.is_empty() && b.is_empty() {
                        continue;
                    }
                    // Routes opening with a required sequence stay with their vehicle.
                    let pinned = |vehicle: usize| context.vehicle(vehicle).fixed_prefix_len() > 0;
                    if pinned(first) || pinned(second) {
                        continue;
                    }

                    let (new_a, new_b) = (b.for_vehicle(first), a.for_vehicle(second));
                    if !new_a.is_valid(context) || !new_b.is_valid(context) {
                        continue;
                    }
                    let before = a.get_route_duration(context) + b.get_route_duration(context);
                    let after = new_a.get_route_duration(context) + new_b.get_route_duration(context);
                    if after < before {
                        manager.rewrite_routes([new_a, new_b])?;
                        swaps += 1;
                        improved = true;
                    }
                }
            }
            if !improved {
                break;
            }
        }
        Ok(swaps)
    }
}
