use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    BoundingBox, Error, Facility,
    routing::{SearchBudget, SelectorOptions},
    spatial::{DEFAULT_LINEAR_SCAN_THRESHOLD, validate_coordinate},
};

/// Router settings, usually read from a TOML file.
///
/// ```toml
/// linear_scan_threshold = 2000
/// bbox_margin = 0.1
/// max_visited_nodes = 500000
/// time_limit_ms = 2000
/// emergency_only = true
/// skip_full_facilities = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterConfig {
    /// Graphs with fewer nodes are snapped with a linear scan instead of an R-tree
    pub linear_scan_threshold: usize,
    /// Degrees added around the query points when requesting a network extract
    pub bbox_margin: f64,
    pub max_visited_nodes: Option<usize>,
    pub time_limit_ms: Option<u64>,
    pub emergency_only: bool,
    pub skip_full_facilities: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            linear_scan_threshold: DEFAULT_LINEAR_SCAN_THRESHOLD,
            bbox_margin: 0.1,
            max_visited_nodes: None,
            time_limit_ms: None,
            emergency_only: false,
            skip_full_facilities: true,
        }
    }
}

impl RouterConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("Failed to read config '{}': {}", path.display(), e),
            )
        })?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<(), Error> {
        if !self.bbox_margin.is_finite() || self.bbox_margin < 0.0 {
            return Err(Error::InvalidData(format!(
                "bbox_margin must be a non-negative number, got {}",
                self.bbox_margin
            )));
        }
        Ok(())
    }

    pub fn search_budget(&self) -> SearchBudget {
        SearchBudget {
            max_visited_nodes: self.max_visited_nodes,
            time_limit: self.time_limit_ms.map(Duration::from_millis),
        }
    }

    /// Area of the network extract needed to answer a query from
    /// `(lat, lon)`: the origin and every facility, grown by `bbox_margin`.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyFacilityList`] without facilities,
    /// [`Error::InvalidCoordinate`] for an out-of-range origin or facility.
    pub fn query_bbox(&self, lat: f64, lon: f64, facilities: &[Facility]) -> Result<BoundingBox, Error> {
        if facilities.is_empty() {
            return Err(Error::EmptyFacilityList);
        }
        let mut points = Vec::with_capacity(facilities.len() + 1);
        points.push(validate_coordinate(lat, lon)?);
        for facility in facilities {
            points.push(validate_coordinate(facility.lat(), facility.lon())?);
        }
        BoundingBox::around(points, self.bbox_margin).ok_or(Error::EmptyFacilityList)
    }

    pub fn selector_options(&self) -> SelectorOptions {
        SelectorOptions {
            budget: self.search_budget(),
            emergency_only: self.emergency_only,
            skip_full_facilities: self.skip_full_facilities,
        }
    }
}
