use std::path::Path;
use std::sync::Arc;

use medroute_core::loading::records::load_facilities;
use medroute_core::prelude::*;
use pyo3::prelude::*;
use pyo3_stub_gen::derive::{gen_stub_pyclass, gen_stub_pyfunction, gen_stub_pymethods};

use crate::model::PyGeoGraph;
use crate::to_py_err;

/// A hospital or other care facility that routes can end at
#[gen_stub_pyclass]
#[pyclass(name = "Facility")]
#[derive(Clone)]
pub struct PyFacility {
    pub inner: Facility,
}

#[pymethods]
#[gen_stub_pymethods]
impl PyFacility {
    #[new]
    #[pyo3(signature = (id, lat, lon, name=None, emergency=None, occupied=None, max_capacity=None))]
    pub fn new(
        id: String,
        lat: f64,
        lon: f64,
        name: Option<String>,
        emergency: Option<bool>,
        occupied: Option<u32>,
        max_capacity: Option<u32>,
    ) -> PyResult<Self> {
        let mut facility = Facility::new(id, lat, lon);
        if let Some(name) = name {
            facility = facility.with_name(name);
        }
        if let Some(emergency) = emergency {
            facility = facility.with_emergency(emergency);
        }
        match (occupied, max_capacity) {
            (None, None) => {}
            (Some(_), None) => {
                return Err(PyErr::new::<pyo3::exceptions::PyValueError, _>(
                    "occupied requires max_capacity",
                ));
            }
            (occupied, Some(max)) => {
                let occupied = occupied.unwrap_or(0);
                if occupied > max {
                    return Err(PyErr::new::<pyo3::exceptions::PyValueError, _>(format!(
                        "occupied ({occupied}) exceeds max_capacity ({max})"
                    )));
                }
                facility = facility.with_capacity(Capacity::new(occupied, max));
            }
        }
        Ok(PyFacility { inner: facility })
    }

    #[getter]
    fn id(&self) -> &str {
        &self.inner.id
    }

    #[getter]
    fn name(&self) -> &str {
        self.inner.display_name()
    }

    /// Get the coordinates of this facility as (lat, lon)
    #[getter]
    fn coordinates(&self) -> (f64, f64) {
        (self.inner.lat(), self.inner.lon())
    }

    #[getter]
    fn emergency(&self) -> Option<bool> {
        self.inner.emergency
    }

    /// Whether the facility can admit another patient; facilities without
    /// capacity data always can
    fn has_room(&self) -> bool {
        self.inner.has_room()
    }

    fn __repr__(&self) -> String {
        format!(
            "Facility(id={:?}, lat={}, lon={})",
            self.inner.id,
            self.inner.lat(),
            self.inner.lon()
        )
    }
}

/// Route from an origin to the chosen facility
#[gen_stub_pyclass]
#[pyclass(name = "PathResult")]
pub struct PyPathResult {
    inner: PathResult,
    graph: Arc<GeoGraph>,
}

#[pymethods]
#[gen_stub_pymethods]
impl PyPathResult {
    #[getter]
    fn facility_id(&self) -> &str {
        &self.inner.facility_id
    }

    /// Network distance in metres from the snapped origin to the snapped
    /// facility node
    #[getter]
    fn total_distance(&self) -> f64 {
        self.inner.total_distance
    }

    #[getter]
    fn nodes(&self) -> Vec<NodeId> {
        self.inner.nodes.clone()
    }

    /// Node the origin was snapped to and the snapping distance in metres
    #[getter]
    fn origin_snap(&self) -> (NodeId, f64) {
        (self.inner.origin.node, self.inner.origin.distance)
    }

    #[getter]
    fn destination_snap(&self) -> (NodeId, f64) {
        (self.inner.destination.node, self.inner.destination.distance)
    }

    /// Path vertices as (lat, lon) pairs
    fn coordinates(&self) -> PyResult<Vec<(f64, f64)>> {
        let points = self.inner.coordinates(&self.graph).map_err(to_py_err)?;
        Ok(points.iter().map(|p| (p.y(), p.x())).collect())
    }

    /// Per-hop breakdown as (from, to, length_m) tuples
    fn segments(&self) -> PyResult<Vec<(NodeId, NodeId, Weight)>> {
        let segments = self.inner.segments(&self.graph).map_err(to_py_err)?;
        Ok(segments.iter().map(|s| (s.from, s.to, s.weight)).collect())
    }

    /// GeoJSON ``Feature`` string with a ``LineString`` geometry
    fn to_geojson(&self) -> PyResult<String> {
        self.inner.to_geojson_string(&self.graph).map_err(to_py_err)
    }

    fn __repr__(&self) -> String {
        format!(
            "PathResult(facility_id={:?}, total_distance={:.1}, nodes={})",
            self.inner.facility_id,
            self.inner.total_distance,
            self.inner.nodes.len()
        )
    }
}

fn options(emergency_only: bool, skip_full_facilities: bool) -> SelectorOptions {
    SelectorOptions {
        emergency_only,
        skip_full_facilities,
        ..SelectorOptions::default()
    }
}

/// Find the facility with the shortest road distance from a coordinate
///
/// The origin and every facility are snapped to their nearest graph node,
/// then one shortest-path search from the origin decides the winner.
/// Equal distances resolve to the lexicographically smallest facility id.
///
/// Parameters
/// ----------
/// graph : GeoGraph
/// lat, lon : float
///     Origin in WGS84 degrees
/// facilities : list[Facility]
/// emergency_only : bool, default=False
///     Ignore facilities not flagged as emergency capable
/// skip_full_facilities : bool, default=True
///     Ignore facilities whose capacity is exhausted
///
/// Returns
/// -------
/// PathResult
///
/// Raises
/// ------
/// ValueError
///     If the facility list is empty or a coordinate is invalid
/// RuntimeError
///     If no facility is reachable or the graph is empty
#[pyfunction]
#[gen_stub_pyfunction]
#[pyo3(signature = (graph, lat, lon, facilities, emergency_only=false, skip_full_facilities=true))]
pub fn find_nearest_facility(
    py: Python<'_>,
    graph: &PyGeoGraph,
    lat: f64,
    lon: f64,
    facilities: Vec<PyFacility>,
    emergency_only: bool,
    skip_full_facilities: bool,
) -> PyResult<PyPathResult> {
    let facilities: Vec<Facility> = facilities.into_iter().map(|f| f.inner).collect();
    let selector = graph.selector(options(emergency_only, skip_full_facilities));

    let result = py
        .detach(|| selector.find_nearest_facility(lat, lon, &facilities))
        .map_err(to_py_err)?;

    Ok(PyPathResult {
        inner: result,
        graph: Arc::clone(&graph.graph),
    })
}

/// Answer many origins against the same facilities in parallel
///
/// Returns one entry per origin. Origins from which no facility can be
/// reached yield ``None``.
///
/// Raises
/// ------
/// ValueError
///     If the facility list is empty or any origin is invalid
/// RuntimeError
///     If the graph is empty, every facility is filtered out or the search
///     budget runs out
#[pyfunction]
#[gen_stub_pyfunction]
#[pyo3(signature = (graph, origins, facilities, emergency_only=false, skip_full_facilities=true))]
pub fn find_nearest_facilities(
    py: Python<'_>,
    graph: &PyGeoGraph,
    origins: Vec<(f64, f64)>,
    facilities: Vec<PyFacility>,
    emergency_only: bool,
    skip_full_facilities: bool,
) -> PyResult<Vec<Option<PyPathResult>>> {
    let facilities: Vec<Facility> = facilities.into_iter().map(|f| f.inner).collect();
    let selector = graph.selector(options(emergency_only, skip_full_facilities));

    let results = py
        .detach(|| selector.find_nearest_facilities(&origins, &facilities))
        .map_err(to_py_err)?;

    Ok(results
        .into_iter()
        .map(|result| {
            result.map(|inner| PyPathResult {
                inner,
                graph: Arc::clone(&graph.graph),
            })
        })
        .collect())
}

/// Load facilities from a CSV file with ``id,lat,lon`` columns and optional
/// ``name``, ``emergency``, ``occupied`` and ``max_capacity`` columns
#[pyfunction]
#[gen_stub_pyfunction]
pub fn load_facilities_csv(path: &str) -> PyResult<Vec<PyFacility>> {
    let facilities = load_facilities(Path::new(path)).map_err(to_py_err)?;
    Ok(facilities
        .into_iter()
        .map(|inner| PyFacility { inner })
        .collect())
}
