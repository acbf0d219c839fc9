use std::sync::Arc;

use hashbrown::{HashMap, hash_map::Entry};
use log::{debug, trace};
use rayon::prelude::*;

use super::{PathResult, SearchBudget, reconstruct_path, shortest_paths_with_budget};
use crate::{
    Error, Facility, GeoGraph, NearestNodeIndex, NodeId, SnappedPoint,
    spatial::validate_coordinate,
};

/// Query-independent knobs of facility selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorOptions {
    pub budget: SearchBudget,
    /// Only consider facilities flagged as running an emergency department
    pub emergency_only: bool,
    /// Ignore facilities whose capacity is exhausted
    pub skip_full_facilities: bool,
}

impl Default for SelectorOptions {
    fn default() -> Self {
        Self {
            budget: SearchBudget::unlimited(),
            emergency_only: false,
            skip_full_facilities: true,
        }
    }
}

/// Answers nearest-facility queries against one shared road graph.
///
/// Cloning is cheap; the graph and its index are reference counted and never
/// mutated, so one selector can serve concurrent queries.
#[derive(Debug, Clone)]
pub struct RouteSelector {
    graph: Arc<GeoGraph>,
    index: Arc<NearestNodeIndex>,
    options: SelectorOptions,
}

impl RouteSelector {
    pub fn new(graph: Arc<GeoGraph>) -> Self {
        let index = Arc::new(NearestNodeIndex::from_graph(&graph));
        Self::with_index(graph, index)
    }

    /// Reuses an index built earlier. `index` must have been built from
    /// `graph`; otherwise snapping can return nodes the graph does not know.
    pub fn with_index(graph: Arc<GeoGraph>, index: Arc<NearestNodeIndex>) -> Self {
        debug_assert_eq!(
            index.len(),
            graph.node_count(),
            "index was built from a different graph"
        );
        Self {
            graph,
            index,
            options: SelectorOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: SelectorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn graph(&self) -> &GeoGraph {
        &self.graph
    }

    pub fn index(&self) -> &NearestNodeIndex {
        &self.index
    }

    pub fn options(&self) -> &SelectorOptions {
        &self.options
    }

    /// Finds the facility with the cheapest road route from `(lat, lon)`.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyFacilityList`] before any other work if `facilities` is empty
    /// - [`Error::InvalidCoordinate`] for an out-of-range origin or facility
    /// - [`Error::NoFacilityAvailable`] if filtering leaves no candidate
    /// - [`Error::NoFacilityReachable`] if no candidate is connected to the origin
    /// - [`Error::ComputationTimeout`] if the search budget runs out
    pub fn find_nearest_facility(
        &self,
        lat: f64,
        lon: f64,
        facilities: &[Facility],
    ) -> Result<PathResult, Error> {
        select(&self.graph, &self.index, &self.options, lat, lon, facilities)
    }

    /// Answers several origins against the same facilities in parallel.
    ///
    /// The output has one entry per origin, in order. Origins from which no
    /// facility can be reached yield `None`.
    ///
    /// # Errors
    ///
    /// Any other error of [`RouteSelector::find_nearest_facility`] fails the
    /// whole batch, including [`Error::InvalidCoordinate`] for a single bad
    /// origin and the retryable [`Error::ComputationTimeout`].
    pub fn find_nearest_facilities(
        &self,
        origins: &[(f64, f64)],
        facilities: &[Facility],
    ) -> Result<Vec<Option<PathResult>>, Error> {
        if facilities.is_empty() {
            return Err(Error::EmptyFacilityList);
        }
        origins
            .par_iter()
            .map(|&(lat, lon)| match self.find_nearest_facility(lat, lon, facilities) {
                Ok(result) => Ok(Some(result)),
                Err(e) if e.is_no_route() => {
                    debug!("No facility reachable from ({lat}, {lon}): {e}");
                    Ok(None)
                }
                Err(e) => Err(e),
            })
            .collect()
    }
}

/// One-off query that builds a temporary [`NearestNodeIndex`].
///
/// Prefer [`RouteSelector`] when the same graph serves several queries.
pub fn find_nearest_facility(
    graph: &GeoGraph,
    lat: f64,
    lon: f64,
    facilities: &[Facility],
) -> Result<PathResult, Error> {
    if facilities.is_empty() {
        return Err(Error::EmptyFacilityList);
    }
    let index = NearestNodeIndex::from_graph(graph);
    select(
        graph,
        &index,
        &SelectorOptions::default(),
        lat,
        lon,
        facilities,
    )
}

fn select(
    graph: &GeoGraph,
    index: &NearestNodeIndex,
    options: &SelectorOptions,
    lat: f64,
    lon: f64,
    facilities: &[Facility],
) -> Result<PathResult, Error> {
    if facilities.is_empty() {
        return Err(Error::EmptyFacilityList);
    }
    validate_coordinate(lat, lon)?;

    let candidates: Vec<&Facility> = facilities
        .iter()
        .filter(|facility| is_candidate(facility, options))
        .collect();
    if candidates.is_empty() {
        return Err(Error::NoFacilityAvailable);
    }

    let origin = index.snap(lat, lon)?;
    debug!(
        "Origin ({lat}, {lon}) snapped to node {} at {:.1} m",
        origin.node, origin.distance
    );

    let snapped = candidates
        .par_iter()
        .map(|&facility| Ok((facility, index.snap(facility.lat(), facility.lon())?)))
        .collect::<Result<Vec<(&Facility, SnappedPoint)>, Error>>()?;
    let by_node = dedup_by_node(snapped);

    let distances = shortest_paths_with_budget(graph, origin.node, &options.budget)?;

    let (total_distance, facility, destination) = by_node
        .into_values()
        .filter_map(|(facility, snap)| {
            distances
                .distance(snap.node)
                .map(|distance| (distance, facility, snap))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.id.cmp(&b.1.id)))
        .ok_or(Error::NoFacilityReachable {
            origin: origin.node,
        })?;

    let nodes = reconstruct_path(&distances, destination.node)?;
    debug!(
        "Selected facility {} at node {} ({total_distance:.1} m, {} nodes)",
        facility.id,
        destination.node,
        nodes.len()
    );

    Ok(PathResult {
        facility_id: facility.id.clone(),
        total_distance,
        nodes,
        origin,
        destination,
    })
}

fn is_candidate(facility: &Facility, options: &SelectorOptions) -> bool {
    if options.skip_full_facilities && !facility.has_room() {
        trace!("Skipping facility {}: no free capacity", facility.id);
        return false;
    }
    if options.emergency_only && facility.emergency != Some(true) {
        trace!("Skipping facility {}: no emergency department", facility.id);
        return false;
    }
    true
}

/// Keeps one facility per snapped node: the closest to the node, then the
/// lowest id.
fn dedup_by_node(
    snapped: Vec<(&Facility, SnappedPoint)>,
) -> HashMap<NodeId, (&Facility, SnappedPoint)> {
    let mut by_node: HashMap<NodeId, (&Facility, SnappedPoint)> =
        HashMap::with_capacity(snapped.len());
    for (facility, snap) in snapped {
        match by_node.entry(snap.node) {
            Entry::Vacant(entry) => {
                entry.insert((facility, snap));
            }
            Entry::Occupied(mut entry) => {
                let (kept, kept_snap) = entry.get();
                let closer = snap
                    .distance
                    .total_cmp(&kept_snap.distance)
                    .then_with(|| facility.id.cmp(&kept.id))
                    .is_lt();
                if closer {
                    entry.insert((facility, snap));
                }
            }
        }
    }
    by_node
}
