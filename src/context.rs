//! Assignment context: the node space shared with the solver, the cost
//! callbacks and the feasibility predicates every heuristic relies on.

use std::collections::{BTreeSet, HashMap};

use crate::error::{Error, Result};
use crate::events::{Event, EventKind, EventLevel, EventSink};
use crate::matrix::builder::location_key;
use crate::matrix::{DistanceMatrixBuilder, Matrix};
use crate::model::site::{delivery_unique_id, depot_unique_id, pickup_unique_id};
use crate::model::{
    DriverRecord, EngineParameters, JobRecord, JobSite, NodeId, RoutePointIndex, SECONDS_PER_DAY,
    Site, Vehicle, VehicleBreak, to_fixed_point,
};
use crate::traits::DirectionsProvider;

/// Cost of leaving or reaching another vehicle's fake depot.
pub const FAKE_DEPOT_PENALTY: i64 = 1_000_000;

/// Cost of visiting a node the vehicle may not serve.
pub const NOT_AVAILABLE_PENALTY: i64 = 10_000_000;

#[derive(Debug, Clone)]
pub struct AssignmentContext {
    sites: Vec<Site>,
    vehicles: Vec<Vehicle>,
    index_to_node: Vec<NodeId>,
    node_to_index: HashMap<NodeId, RoutePointIndex>,
    unique_ids: HashMap<String, RoutePointIndex>,
    /// Matrix row per node; fake depots have none.
    matrix_rows: Vec<Option<usize>>,
    matrix: Matrix,
    day_start: i64,
    inactive_orders: BTreeSet<String>,
    deliveries: Vec<RoutePointIndex>,
    pickups_of: HashMap<RoutePointIndex, Vec<RoutePointIndex>>,
    delivery_of: HashMap<RoutePointIndex, RoutePointIndex>,
}

impl AssignmentContext {
    /// Builds the node space, fetches the matrix through `provider` and
    /// drops orders the provider cannot reach.
    pub fn build<P: DirectionsProvider>(
        params: &EngineParameters,
        provider: &P,
        events: &dyn EventSink,
    ) -> Result<Self> {
        let day_start = params.day_start();
        let mut sites = Vec::new();
        let mut job_orders = BTreeSet::new();

        for job in &params.jobs {
            if !job_orders.insert(job.id.clone()) {
                return Err(Error::InvalidParameters(format!("duplicate job id {}", job.id)));
            }
            sites.extend(job_sites(params, day_start, job));
        }

        let depots: HashMap<&str, (f64, f64)> = params
            .depots
            .iter()
            .map(|depot| (depot.id.as_str(), depot.location))
            .collect();

        let job_count = sites.len();
        for (vehicle, driver) in params.drivers.iter().enumerate() {
            sites.push(endpoint_site(driver, vehicle, &depots, true)?);
            sites.push(endpoint_site(driver, vehicle, &depots, false)?);
        }

        // Solver indices: start/end pairs of every vehicle first, then jobs.
        let vehicle_count = params.drivers.len();
        let mut index_to_node = Vec::with_capacity(sites.len());
        for vehicle in 0..vehicle_count {
            index_to_node.push(NodeId(job_count + 2 * vehicle));
            index_to_node.push(NodeId(job_count + 2 * vehicle + 1));
        }
        index_to_node.extend((0..job_count).map(NodeId));
        let node_to_index: HashMap<NodeId, RoutePointIndex> = index_to_node
            .iter()
            .enumerate()
            .map(|(index, node)| (*node, RoutePointIndex(index)))
            .collect();

        let mut unique_ids = HashMap::with_capacity(job_count);
        for (node, site) in sites.iter().enumerate().take(job_count) {
            let unique_id = site.unique_id();
            if unique_ids.insert(unique_id.to_string(), node_to_index[&NodeId(node)]).is_some() {
                return Err(Error::InvalidParameters(format!("duplicate site id {}", unique_id)));
            }
        }

        let mut matrix_rows = Vec::with_capacity(sites.len());
        let mut locations = Vec::new();
        for site in &sites {
            match site.location() {
                Some(location) => {
                    matrix_rows.push(Some(locations.len()));
                    locations.push(location);
                }
                None => matrix_rows.push(None),
            }
        }

        let outcome = DistanceMatrixBuilder::new(provider, locations).build()?;
        events.emit(
            EventLevel::Dev,
            Event::new(
                EventKind::MatrixRequested,
                format!("{} directions requests for {} locations", outcome.requests, outcome.matrix.size()),
            ),
        );

        let mut vehicles = Vec::with_capacity(vehicle_count);
        for (index, driver) in params.drivers.iter().enumerate() {
            let start = RoutePointIndex(2 * index);
            let end = RoutePointIndex(2 * index + 1);
            let required_start_sequence = driver
                .required_start_sequence
                .as_ref()
                .map(|sequence| resolve_start_sequence(driver, sequence, &sites, &index_to_node, start, &unique_ids))
                .transpose()?;

            let mut breaks: Vec<VehicleBreak> = driver
                .breaks
                .iter()
                .map(|brk| VehicleBreak::new(brk.start, brk.end, brk.drift_minutes))
                .collect();
            breaks.sort_by_key(|brk| brk.start);

            vehicles.push(Vehicle {
                index,
                driver_id: driver.id.clone(),
                start_time: driver.start_time,
                end_time: driver.end_time,
                start,
                end,
                capacity: driver.capacity.map(to_fixed_point),
                skills: driver.skills.clone(),
                breaks,
                required_start_sequence,
            });
        }

        let inaccessible_orders: Vec<String> = sites
            .iter()
            .zip(&matrix_rows)
            .filter(|(_, row)| row.is_some_and(|row| outcome.inaccessible.contains(&row)))
            .filter_map(|(site, _)| site.job().map(|job| job.order_id.clone()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut context = Self {
            sites,
            vehicles,
            index_to_node,
            node_to_index,
            unique_ids,
            matrix_rows,
            matrix: outcome.matrix,
            day_start,
            inactive_orders: BTreeSet::new(),
            deliveries: Vec::new(),
            pickups_of: HashMap::new(),
            delivery_of: HashMap::new(),
        };
        context.derive_order_tables();
        if !inaccessible_orders.is_empty() {
            context.handle_not_accessible_orders(&inaccessible_orders, events);
        }

        events.emit(
            EventLevel::Info,
            Event::new(
                EventKind::ContextBuilt,
                format!(
                    "{} vehicles, {} deliveries, {} points",
                    context.vehicles.len(),
                    context.deliveries.len(),
                    context.point_count()
                ),
            ),
        );
        tracing::info!(
            vehicles = context.vehicles.len(),
            deliveries = context.deliveries.len(),
            "assignment context built"
        );
        Ok(context)
    }

    fn derive_order_tables(&mut self) {
        let mut deliveries = Vec::new();
        let mut pickups_of: HashMap<RoutePointIndex, Vec<RoutePointIndex>> = HashMap::new();
        let mut delivery_of = HashMap::new();

        let mut deliveries_by_order: HashMap<&str, RoutePointIndex> = HashMap::new();
        for index in self.job_indices() {
            let site = self.site(index);
            if let Site::Delivery { job } = site
                && self.is_order_active(index)
            {
                deliveries_by_order.insert(job.order_id.as_str(), index);
                deliveries.push(index);
            }
        }
        for index in self.job_indices() {
            let Site::Pickup { delivery_order_id, .. } = self.site(index) else {
                continue;
            };
            if !self.is_order_active(index) {
                continue;
            }
            if let Some(&delivery) = deliveries_by_order.get(delivery_order_id.as_str()) {
                pickups_of.entry(delivery).or_default().push(index);
                delivery_of.insert(index, delivery);
            }
        }

        self.deliveries = deliveries;
        self.pickups_of = pickups_of;
        self.delivery_of = delivery_of;
    }

    fn job_indices(&self) -> impl Iterator<Item = RoutePointIndex> + '_ {
        (2 * self.vehicles.len()..self.index_to_node.len()).map(RoutePointIndex)
    }

    fn is_order_active(&self, index: RoutePointIndex) -> bool {
        self.site(index)
            .job()
            .is_some_and(|job| !self.inactive_orders.contains(&job.order_id))
    }

    /// Removes orders from the working set (for instance because the
    /// routing provider cannot reach them). The run goes on without them.
    pub fn handle_not_accessible_orders(&mut self, orders: &[String], events: &dyn EventSink) {
        let added: Vec<&String> = orders
            .iter()
            .filter(|order| self.inactive_orders.insert((*order).clone()))
            .collect();
        if added.is_empty() {
            return;
        }
        let message = format!(
            "{} orders are not accessible: {}",
            added.len(),
            added.iter().map(|order| order.as_str()).collect::<Vec<_>>().join(", ")
        );
        tracing::warn!("{}", message);
        events.emit(
            EventLevel::Info,
            Event::new(EventKind::NotAccessibleOrders, message),
        );
        self.drop_inactive_from_start_sequences();
        self.derive_order_tables();
    }

    fn drop_inactive_from_start_sequences(&mut self) {
        let (sites, index_to_node, inactive) = (&self.sites, &self.index_to_node, &self.inactive_orders);
        for vehicle in &mut self.vehicles {
            let Some(sequence) = vehicle.required_start_sequence.as_mut() else {
                continue;
            };
            let before = sequence.len();
            sequence.retain(|index| {
                sites[index_to_node[index.0].0]
                    .job()
                    .is_none_or(|job| !inactive.contains(&job.order_id))
            });
            if sequence.len() != before {
                tracing::warn!(
                    driver = %vehicle.driver_id,
                    dropped = before - sequence.len(),
                    "inaccessible points removed from the required start sequence"
                );
            }
        }
    }

    /// Converts an order's absolute delivery window into solver seconds.
    pub fn get_order_period(&self, order: &JobRecord) -> (i64, i64) {
        order_period(self.day_start, order.deliver_after, order.deliver_before)
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn vehicle(&self, vehicle: usize) -> &Vehicle {
        &self.vehicles[vehicle]
    }

    pub fn point_count(&self) -> usize {
        self.index_to_node.len()
    }

    pub fn node(&self, index: RoutePointIndex) -> NodeId {
        self.index_to_node[index.0]
    }

    pub fn index(&self, node: NodeId) -> Option<RoutePointIndex> {
        self.node_to_index.get(&node).copied()
    }

    pub fn site(&self, index: RoutePointIndex) -> &Site {
        &self.sites[self.node(index).0]
    }

    pub fn job(&self, index: RoutePointIndex) -> Option<&JobSite> {
        self.site(index).job()
    }

    /// Job point index of a pickup or delivery by its unique id.
    pub fn index_of(&self, unique_id: &str) -> Option<RoutePointIndex> {
        self.unique_ids.get(unique_id).copied()
    }

    pub fn contains_point(&self, index: RoutePointIndex) -> bool {
        index.0 < self.index_to_node.len()
    }

    pub fn is_job_point(&self, index: RoutePointIndex) -> bool {
        index.0 >= 2 * self.vehicles.len() && self.contains_point(index)
    }

    /// Job point of an order that is still part of the working set.
    pub fn is_active_job_point(&self, index: RoutePointIndex) -> bool {
        self.is_job_point(index) && self.is_order_active(index)
    }

    pub fn is_delivery(&self, index: RoutePointIndex) -> bool {
        self.site(index).is_delivery()
    }

    /// Active deliveries.
    pub fn deliveries(&self) -> &[RoutePointIndex] {
        &self.deliveries
    }

    pub fn pickups_of(&self, delivery: RoutePointIndex) -> &[RoutePointIndex] {
        self.pickups_of
            .get(&delivery)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn delivery_of(&self, pickup: RoutePointIndex) -> Option<RoutePointIndex> {
        self.delivery_of.get(&pickup).copied()
    }

    pub fn inactive_orders(&self) -> &BTreeSet<String> {
        &self.inactive_orders
    }

    pub fn same_location(&self, a: RoutePointIndex, b: RoutePointIndex) -> bool {
        match (self.site(a).location(), self.site(b).location()) {
            (Some(a), Some(b)) => location_key(a) == location_key(b),
            _ => false,
        }
    }

    fn leg(&self, vehicle: usize, from: RoutePointIndex, to: RoutePointIndex, pick: fn(&Matrix, usize, usize) -> i64) -> i64 {
        let (from_site, to_site) = (self.site(from), self.site(to));
        let foreign_fake_depot = [from_site.fake_depot_vehicle(), to_site.fake_depot_vehicle()]
            .into_iter()
            .flatten()
            .any(|owner| owner != vehicle);
        if foreign_fake_depot {
            return FAKE_DEPOT_PENALTY;
        }
        match (self.matrix_rows[self.node(from).0], self.matrix_rows[self.node(to).0]) {
            (Some(a), Some(b)) => pick(&self.matrix, a, b),
            _ => 0,
        }
    }

    /// Driving distance in meters.
    pub fn distance(&self, vehicle: usize, from: RoutePointIndex, to: RoutePointIndex) -> i64 {
        self.leg(vehicle, from, to, Matrix::distance)
    }

    /// Driving time in seconds.
    pub fn total_time(&self, vehicle: usize, from: RoutePointIndex, to: RoutePointIndex) -> i64 {
        self.leg(vehicle, from, to, Matrix::duration)
    }

    /// Service time at `from` plus the drive to `to`.
    pub fn total_time_with_service(&self, vehicle: usize, from: RoutePointIndex, to: RoutePointIndex) -> i64 {
        self.site(from).service_secs() + self.total_time(vehicle, from, to)
    }

    /// Load change when leaving `from`.
    pub fn capacity(&self, from: RoutePointIndex, _to: RoutePointIndex) -> i64 {
        self.site(from).capacity_delta()
    }

    /// Whether `vehicle` may serve `index` at all: pinned driver, skills and
    /// the order still being part of the working set.
    pub fn is_node_available(&self, vehicle: usize, index: RoutePointIndex) -> bool {
        let vehicle = &self.vehicles[vehicle];
        match self.site(index) {
            Site::Pickup { job, .. } | Site::Delivery { job } => {
                !self.inactive_orders.contains(&job.order_id)
                    && job.driver.as_ref().is_none_or(|driver| *driver == vehicle.driver_id)
                    && vehicle.has_skills(&job.skills)
            }
            Site::FakeDepot { vehicle: owner, .. } => *owner == vehicle.index,
            _ => true,
        }
    }

    /// Travel cost for solvers that cannot express forbidden nodes: serving
    /// an unavailable node is made prohibitively expensive.
    pub fn cost_with_availability(&self, vehicle: usize, from: RoutePointIndex, to: RoutePointIndex) -> i64 {
        if !self.is_node_available(vehicle, to) {
            return NOT_AVAILABLE_PENALTY;
        }
        self.total_time_with_service(vehicle, from, to)
    }

    /// Service window of a job point; depots are open all day.
    pub fn window(&self, index: RoutePointIndex) -> (i64, i64) {
        self.job(index)
            .map(|job| job.window)
            .unwrap_or((0, SECONDS_PER_DAY * 2))
    }
}

fn order_period(day_start: i64, after: Option<i64>, before: Option<i64>) -> (i64, i64) {
    let start = after
        .map(|after| (after - day_start).clamp(0, SECONDS_PER_DAY))
        .unwrap_or(0);
    let end = before
        .map(|before| (before - day_start).clamp(0, SECONDS_PER_DAY))
        .unwrap_or(SECONDS_PER_DAY);
    (start, end)
}

fn job_sites(params: &EngineParameters, day_start: i64, job: &JobRecord) -> Vec<Site> {
    let mut sites = Vec::with_capacity(job.pickups.len() + 1);
    let mut picked_up = 0;
    for pickup in &job.pickups {
        let capacity_delta = to_fixed_point(pickup.capacity);
        picked_up += capacity_delta;
        sites.push(Site::Pickup {
            job: JobSite {
                unique_id: pickup_unique_id(&pickup.id, &job.id),
                order_id: job.id.clone(),
                location: pickup.location,
                window: order_period(day_start, pickup.pickup_after, pickup.pickup_before),
                capacity_delta,
                skills: job.skills.clone(),
                driver: job.driver_id.clone(),
                service_secs: pickup.service_secs.unwrap_or(params.default_pickup_service_secs),
                allow_skip: job.allow_skip,
            },
            delivery_order_id: job.id.clone(),
        });
    }

    // Without pickups the goods are loaded at the depot.
    let capacity_delta = if job.pickups.is_empty() {
        -to_fixed_point(job.capacity)
    } else {
        -picked_up
    };
    sites.push(Site::Delivery {
        job: JobSite {
            unique_id: delivery_unique_id(&job.id),
            order_id: job.id.clone(),
            location: job.location,
            window: order_period(day_start, job.deliver_after, job.deliver_before),
            capacity_delta,
            skills: job.skills.clone(),
            driver: job.driver_id.clone(),
            service_secs: job.service_secs.unwrap_or(params.default_delivery_service_secs),
            allow_skip: job.allow_skip,
        },
    });
    sites
}

fn endpoint_site(
    driver: &DriverRecord,
    vehicle: usize,
    depots: &HashMap<&str, (f64, f64)>,
    is_start: bool,
) -> Result<Site> {
    let (depot, location, label) = if is_start {
        (&driver.start_depot, driver.start_location, "start")
    } else {
        (&driver.end_depot, driver.end_location, "end")
    };

    if let Some(depot) = depot {
        let location = depots.get(depot.as_str()).copied().ok_or_else(|| {
            Error::InvalidParameters(format!("driver {} references unknown depot {}", driver.id, depot))
        })?;
        return Ok(Site::Depot {
            unique_id: depot_unique_id(depot),
            location,
        });
    }
    Ok(match location {
        Some(location) => Site::Location {
            unique_id: format!("{}#{}", label, driver.id),
            location,
        },
        None => Site::FakeDepot {
            unique_id: format!("fake#{}#{}", driver.id, label),
            vehicle,
        },
    })
}

fn resolve_start_sequence(
    driver: &DriverRecord,
    sequence: &[String],
    sites: &[Site],
    index_to_node: &[NodeId],
    start: RoutePointIndex,
    unique_ids: &HashMap<String, RoutePointIndex>,
) -> Result<Vec<RoutePointIndex>> {
    let start_id = sites[index_to_node[start.0].0].unique_id();
    sequence
        .iter()
        .enumerate()
        .map(|(position, site)| {
            if position == 0 && site == start_id {
                return Ok(start);
            }
            unique_ids
                .get(site)
                .copied()
                .ok_or_else(|| Error::UnresolvedStartSequence {
                    driver: driver.id.clone(),
                    site: site.clone(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordedEvents;
    use crate::model::PickupRecord;
    use crate::test_support::{ManhattanDirections, driver, job, params};

    #[test]
    fn test_indices_put_vehicle_endpoints_first() {
        let params = params(vec![driver("a"), driver("b")], vec![job("1", (1.0, 0.0))]);
        let context = AssignmentContext::build(&params, &ManhattanDirections, &RecordedEvents::new()).unwrap();

        assert_eq!(context.point_count(), 5);
        assert_eq!(context.vehicle(1).start, RoutePointIndex(2));
        assert_eq!(context.deliveries(), &[RoutePointIndex(4)]);
        assert_eq!(context.node(RoutePointIndex(4)), NodeId(0));
        assert_eq!(context.index(NodeId(0)), Some(RoutePointIndex(4)));
    }

    #[test]
    fn test_fake_depot_is_free_only_for_its_vehicle() {
        let params = params(vec![driver("a"), driver("b")], vec![job("1", (3.0, 0.0))]);
        let context = AssignmentContext::build(&params, &ManhattanDirections, &RecordedEvents::new()).unwrap();
        let delivery = context.deliveries()[0];
        let a_start = context.vehicle(0).start;

        assert_eq!(context.total_time(0, a_start, delivery), 0);
        assert_eq!(context.total_time(1, a_start, delivery), FAKE_DEPOT_PENALTY);
        assert_eq!(context.distance(1, delivery, a_start), FAKE_DEPOT_PENALTY);
    }

    #[test]
    fn test_costs_follow_matrix_and_service() {
        let mut job_record = job("1", (2.0, 0.0));
        job_record.service_secs = Some(300);
        let mut first = driver("a");
        first.start_location = Some((0.0, 0.0));
        let params = params(vec![first], vec![job_record]);
        let context = AssignmentContext::build(&params, &ManhattanDirections, &RecordedEvents::new()).unwrap();
        let delivery = context.deliveries()[0];
        let start = context.vehicle(0).start;

        assert_eq!(context.total_time(0, start, delivery), 120);
        assert_eq!(context.total_time_with_service(0, delivery, start), 420);
        assert_eq!(context.distance(0, start, delivery), 2000);
    }

    #[test]
    fn test_node_availability_respects_pin_and_skills() {
        let mut pinned = job("1", (1.0, 0.0));
        pinned.driver_id = Some("b".to_string());
        let mut skilled = job("2", (1.0, 1.0));
        skilled.skills = vec!["fridge".to_string()];
        let mut b = driver("b");
        b.skills = vec!["fridge".to_string()];
        let params = params(vec![driver("a"), b], vec![pinned, skilled]);
        let context = AssignmentContext::build(&params, &ManhattanDirections, &RecordedEvents::new()).unwrap();
        let (pinned, skilled) = (context.deliveries()[0], context.deliveries()[1]);

        assert!(!context.is_node_available(0, pinned));
        assert!(context.is_node_available(1, pinned));
        assert!(!context.is_node_available(0, skilled));
        assert!(context.is_node_available(1, skilled));
        assert_eq!(context.cost_with_availability(0, context.vehicle(0).start, skilled), NOT_AVAILABLE_PENALTY);
    }

    #[test]
    fn test_pickups_pair_with_their_delivery() {
        let mut order = job("9", (5.0, 0.0));
        order.pickups = vec![
            PickupRecord {
                id: "p1".to_string(),
                location: (1.0, 0.0),
                pickup_after: None,
                pickup_before: None,
                capacity: 1.5,
                service_secs: None,
            },
            PickupRecord {
                id: "p2".to_string(),
                location: (2.0, 0.0),
                pickup_after: None,
                pickup_before: None,
                capacity: 0.5,
                service_secs: None,
            },
        ];
        let params = params(vec![driver("a")], vec![order]);
        let context = AssignmentContext::build(&params, &ManhattanDirections, &RecordedEvents::new()).unwrap();
        let delivery = context.deliveries()[0];
        let pickups = context.pickups_of(delivery);

        assert_eq!(pickups.len(), 2);
        assert!(pickups.iter().all(|&pickup| context.delivery_of(pickup) == Some(delivery)));
        assert_eq!(context.capacity(pickups[0], delivery), 1500);
        assert_eq!(context.site(delivery).capacity_delta(), -2000);
    }

    #[test]
    fn test_order_period_defaults_open_end_to_full_day() {
        let mut params = params(vec![driver("a")], vec![job("1", (1.0, 0.0))]);
        params.day = 2;
        params.utc_offset_secs = 3600;
        let context = AssignmentContext::build(&params, &ManhattanDirections, &RecordedEvents::new()).unwrap();

        let mut order = job("x", (0.0, 0.0));
        let midnight = 2 * SECONDS_PER_DAY - 3600;
        order.deliver_after = Some(midnight + 9 * 3600);
        assert_eq!(context.get_order_period(&order), (9 * 3600, SECONDS_PER_DAY));

        order.deliver_before = Some(midnight + 11 * 3600);
        assert_eq!(context.get_order_period(&order), (9 * 3600, 11 * 3600));
    }

    #[test]
    fn test_unknown_start_sequence_site_fails() {
        let mut a = driver("a");
        a.required_start_sequence = Some(vec!["fake#a#start".to_string(), "delivery#missing".to_string()]);
        let params = params(vec![a], vec![job("1", (1.0, 0.0))]);
        let result = AssignmentContext::build(&params, &ManhattanDirections, &RecordedEvents::new());

        assert!(matches!(result, Err(Error::UnresolvedStartSequence { .. })));
    }

    #[test]
    fn test_start_sequence_resolves_to_indices() {
        let mut a = driver("a");
        a.required_start_sequence = Some(vec!["fake#a#start".to_string(), "delivery#2".to_string()]);
        let params = params(vec![a], vec![job("1", (1.0, 0.0)), job("2", (2.0, 0.0))]);
        let context = AssignmentContext::build(&params, &ManhattanDirections, &RecordedEvents::new()).unwrap();

        let expected = vec![context.vehicle(0).start, context.index_of("delivery#2").unwrap()];
        assert_eq!(context.vehicle(0).required_start_sequence, Some(expected));
    }

    #[test]
    fn test_orders_with_separator_in_id_keep_their_own_pickups() {
        let pickup = |id: &str, location: (f64, f64)| PickupRecord {
            id: id.to_string(),
            location,
            pickup_after: None,
            pickup_before: None,
            capacity: 1.0,
            service_secs: None,
        };
        let mut north = job("north#1", (0.0, 5.0));
        north.pickups = vec![pickup("p", (0.0, 1.0))];
        let mut south = job("south#1", (0.0, -5.0));
        south.pickups = vec![pickup("p", (0.0, -1.0))];
        let params = params(vec![driver("a")], vec![north, south]);
        let context = AssignmentContext::build(&params, &ManhattanDirections, &RecordedEvents::new()).unwrap();

        let north = context.index_of("delivery#north#1").unwrap();
        let south = context.index_of("delivery#south#1").unwrap();
        assert_eq!(context.pickups_of(north), &[context.index_of("pickup#p#north#1").unwrap()]);
        assert_eq!(context.pickups_of(south), &[context.index_of("pickup#p#south#1").unwrap()]);
    }

    #[test]
    fn test_colliding_site_ids_are_rejected() {
        // "pickup#a#b" + order "c" and "pickup#a" + order "b#c" both read "pickup#a#b#c".
        let pickup = |id: &str| PickupRecord {
            id: id.to_string(),
            location: (1.0, 0.0),
            pickup_after: None,
            pickup_before: None,
            capacity: 1.0,
            service_secs: None,
        };
        let mut first = job("c", (2.0, 0.0));
        first.pickups = vec![pickup("a#b")];
        let mut second = job("b#c", (3.0, 0.0));
        second.pickups = vec![pickup("a")];
        let params = params(vec![driver("a")], vec![first, second]);

        let result = AssignmentContext::build(&params, &ManhattanDirections, &RecordedEvents::new());
        assert!(matches!(result, Err(Error::InvalidParameters(_))));
    }

    #[test]
    fn test_not_accessible_order_leaves_start_sequence() {
        let mut a = driver("a");
        a.required_start_sequence = Some(vec![
            "fake#a#start".to_string(),
            "delivery#cut".to_string(),
            "delivery#kept".to_string(),
        ]);
        let params = params(vec![a], vec![job("cut", (1.0, 0.0)), job("kept", (2.0, 0.0))]);
        let events = RecordedEvents::new();
        let mut context = AssignmentContext::build(&params, &ManhattanDirections, &events).unwrap();
        let kept = context.index_of("delivery#kept").unwrap();

        context.handle_not_accessible_orders(&["cut".to_string()], &events);

        let start = context.vehicle(0).start;
        assert_eq!(context.vehicle(0).required_start_sequence, Some(vec![start, kept]));
        assert_eq!(context.vehicle(0).required_job_points(), &[kept]);
    }

    #[test]
    fn test_not_accessible_orders_leave_working_set() {
        let params = params(vec![driver("a")], vec![job("1", (1.0, 0.0)), job("2", (2.0, 0.0))]);
        let events = RecordedEvents::new();
        let mut context = AssignmentContext::build(&params, &ManhattanDirections, &events).unwrap();
        let removed = context.deliveries()[0];

        context.handle_not_accessible_orders(&["1".to_string()], &events);

        assert_eq!(context.deliveries().len(), 1);
        assert!(!context.is_node_available(0, removed));
        assert_eq!(events.of_kind(EventKind::NotAccessibleOrders).len(), 1);

        // Repeating the call is a no-op.
        context.handle_not_accessible_orders(&["1".to_string()], &events);
        assert_eq!(events.of_kind(EventKind::NotAccessibleOrders).len(), 1);
    }
}
