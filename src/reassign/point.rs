use crate::context::AssignmentContext;
use crate::model::RoutePointIndex;

/// A delivery travelling between routes together with its pickups.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PointToReassign {
    pub delivery: RoutePointIndex,
    pub pickups: Vec<RoutePointIndex>,
}

impl PointToReassign {
    pub fn of(context: &AssignmentContext, delivery: RoutePointIndex) -> Self {
        Self {
            delivery,
            pickups: context.pickups_of(delivery).to_vec(),
        }
    }

    /// Pickups first, then the delivery: the block inserted into a route.
    pub fn block(&self) -> Vec<RoutePointIndex> {
        let mut block = self.pickups.clone();
        block.push(self.delivery);
        block
    }

    pub fn contains(&self, index: RoutePointIndex) -> bool {
        self.delivery == index || self.pickups.contains(&index)
    }

    pub fn allow_skip(&self, context: &AssignmentContext) -> bool {
        context.job(self.delivery).is_none_or(|job| job.allow_skip)
    }

    pub fn is_available_for(&self, context: &AssignmentContext, vehicle: usize) -> bool {
        self.block()
            .into_iter()
            .all(|index| context.is_node_available(vehicle, index))
    }
}
