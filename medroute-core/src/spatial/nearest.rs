//! Exact nearest-node lookup.
//!
//! Nodes are stored as unit vectors on the sphere. The chord between two unit
//! vectors grows strictly with the great-circle angle between them, so the
//! chord narrows the search down to a handful of candidates. Rounding makes
//! the chord disagree with the haversine distance near ties, so candidates
//! within [`CHORD_SLACK`] of the best chord are ranked again by haversine
//! distance and then by node id.

use geo::Point;
use rstar::{RTree, primitives::GeomWithData};

use super::{haversine_m, validate_coordinate};
use crate::{Error, GeoGraph, NodeId};

/// Below this many nodes a linear scan beats building an R-tree
pub const DEFAULT_LINEAR_SCAN_THRESHOLD: usize = 2000;

/// Chord length on the unit sphere (about 6 µm on Earth) within which two
/// nodes are treated as candidates for the same query. Covers the rounding
/// of both the unit vectors and the haversine formula.
const CHORD_SLACK: f64 = 1e-12;

type Entry = GeomWithData<[f64; 3], (NodeId, Point<f64>)>;

#[derive(Debug, Clone)]
enum Backend {
    Linear(Vec<Entry>),
    Tree(RTree<Entry>),
}

/// A query coordinate bound to its nearest graph node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnappedPoint {
    /// The queried coordinate (x = lon, y = lat)
    pub location: Point<f64>,
    pub node: NodeId,
    /// Great-circle distance from `location` to the node, in metres
    pub distance: f64,
}

/// Spatial index over the nodes of a [`GeoGraph`]
#[derive(Debug, Clone)]
pub struct NearestNodeIndex {
    backend: Backend,
}

impl NearestNodeIndex {
    pub fn from_graph(graph: &GeoGraph) -> Self {
        Self::with_threshold(graph, DEFAULT_LINEAR_SCAN_THRESHOLD)
    }

    /// Uses a linear scan for graphs with fewer than `linear_scan_threshold`
    /// nodes and an R*-tree otherwise.
    pub fn with_threshold(graph: &GeoGraph, linear_scan_threshold: usize) -> Self {
        let entries: Vec<Entry> = graph
            .nodes()
            .map(|node| GeomWithData::new(unit_vector(node.geometry), (node.id, node.geometry)))
            .collect();

        let backend = if entries.len() < linear_scan_threshold {
            Backend::Linear(entries)
        } else {
            log::debug!("Bulk loading R-tree over {} nodes", entries.len());
            Backend::Tree(RTree::bulk_load(entries))
        };
        Self { backend }
    }

    pub fn len(&self) -> usize {
        match &self.backend {
            Backend::Linear(entries) => entries.len(),
            Backend::Tree(tree) => tree.size(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn uses_tree(&self) -> bool {
        matches!(self.backend, Backend::Tree(_))
    }

    /// Nearest node to `(lat, lon)` and its distance in metres.
    ///
    /// Equidistant nodes resolve to the lowest node id.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidCoordinate`] for out-of-range input,
    /// [`Error::EmptyGraph`] if the index holds no nodes.
    pub fn nearest(&self, lat: f64, lon: f64) -> Result<(NodeId, f64), Error> {
        let query = validate_coordinate(lat, lon)?;
        let target = unit_vector(query);

        let candidates: Vec<&Entry> = match &self.backend {
            Backend::Linear(entries) => within_slack(entries.iter(), &target),
            Backend::Tree(tree) => {
                let mut candidates = Vec::new();
                let mut limit = f64::INFINITY;
                // Ascending by chord; stop once past the slack of the first hit
                for entry in tree.nearest_neighbor_iter(&target) {
                    let chord = chord_distance_2(entry.geom(), &target).sqrt();
                    if chord > limit {
                        break;
                    }
                    if candidates.is_empty() {
                        limit = chord + CHORD_SLACK;
                    }
                    candidates.push(entry);
                }
                candidates
            }
        };

        closest(candidates.into_iter(), query).ok_or(Error::EmptyGraph)
    }

    /// Haversine distance to every node, independent of the backend
    pub fn nearest_exhaustive(&self, lat: f64, lon: f64) -> Result<(NodeId, f64), Error> {
        let query = validate_coordinate(lat, lon)?;
        let best = match &self.backend {
            Backend::Linear(entries) => closest(entries.iter(), query),
            Backend::Tree(tree) => closest(tree.iter(), query),
        };
        best.ok_or(Error::EmptyGraph)
    }

    pub fn snap(&self, lat: f64, lon: f64) -> Result<SnappedPoint, Error> {
        let (node, distance) = self.nearest(lat, lon)?;
        Ok(SnappedPoint {
            location: Point::new(lon, lat),
            node,
            distance,
        })
    }
}

/// Entries whose chord to `target` is within [`CHORD_SLACK`] of the best one
fn within_slack<'a>(entries: impl Iterator<Item = &'a Entry>, target: &[f64; 3]) -> Vec<&'a Entry> {
    let chords: Vec<(f64, &Entry)> = entries
        .map(|entry| (chord_distance_2(entry.geom(), target).sqrt(), entry))
        .collect();
    let best = chords.iter().map(|(chord, _)| *chord).fold(f64::INFINITY, f64::min);
    chords
        .into_iter()
        .filter(|(chord, _)| *chord <= best + CHORD_SLACK)
        .map(|(_, entry)| entry)
        .collect()
}

/// Smallest haversine distance to `query`, lowest node id on ties
fn closest<'a>(entries: impl Iterator<Item = &'a Entry>, query: Point<f64>) -> Option<(NodeId, f64)> {
    entries
        .map(|entry| (entry.data.0, haversine_m(query, entry.data.1)))
        .min_by(|(ia, da), (ib, db)| da.total_cmp(db).then(ia.cmp(ib)))
}

fn unit_vector(point: Point<f64>) -> [f64; 3] {
    let lat = point.y().to_radians();
    let lon = point.x().to_radians();
    [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
}

fn chord_distance_2(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a.iter().zip(b).fold(0.0, |acc, (x, y)| {
        let d = x - y;
        acc + d * d
    })
}
