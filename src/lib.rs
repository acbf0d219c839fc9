use medroute_core::Error;
use pyo3::prelude::*;
use pyo3_stub_gen::define_stub_info_gatherer;

use model::{PyGeoGraph, create_geo_graph, load_geo_graph_csv};
use routing::{
    PyFacility, PyPathResult, find_nearest_facilities, find_nearest_facility, load_facilities_csv,
};

pub mod model;
pub mod routing;

/// Bad input becomes `ValueError`, everything else `RuntimeError`
pub(crate) fn to_py_err(error: Error) -> PyErr {
    match error {
        Error::MalformedGraph(_)
        | Error::UnknownNode(_)
        | Error::EmptyFacilityList
        | Error::InvalidCoordinate { .. }
        | Error::InvalidData(_)
        | Error::CsvError(_)
        | Error::ConfigError(_) => {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(error.to_string())
        }
        _ => PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(error.to_string()),
    }
}

/// A Python module implemented in Rust.
#[pymodule]
fn medroute(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pyo3_log::init();

    m.add_class::<PyGeoGraph>()?;
    m.add_function(wrap_pyfunction!(create_geo_graph, m)?)?;
    m.add_function(wrap_pyfunction!(load_geo_graph_csv, m)?)?;

    m.add_class::<PyFacility>()?;
    m.add_class::<PyPathResult>()?;
    m.add_function(wrap_pyfunction!(load_facilities_csv, m)?)?;
    m.add_function(wrap_pyfunction!(find_nearest_facility, m)?)?;
    m.add_function(wrap_pyfunction!(find_nearest_facilities, m)?)?;
    Ok(())
}

define_stub_info_gatherer!(stub_info);
