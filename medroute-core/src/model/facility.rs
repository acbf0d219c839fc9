//! Candidate destinations (hospitals) and their capacity

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Patient capacity of a facility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacity {
    /// Beds currently in use
    pub occupied: u32,
    /// Total beds
    pub max: u32,
}

impl Capacity {
    pub fn new(occupied: u32, max: u32) -> Self {
        Self { occupied, max }
    }

    pub fn has_room(&self) -> bool {
        self.occupied < self.max
    }

    pub fn free(&self) -> u32 {
        self.max.saturating_sub(self.occupied)
    }

    /// Admits (`delta > 0`) or discharges (`delta < 0`) patients.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityExceeded`] and leaves the value untouched if
    /// the result would fall outside `0..=max`.
    pub fn adjust(&mut self, delta: i64) -> Result<(), Error> {
        let updated = i64::from(self.occupied) + delta;
        if updated < 0 || updated > i64::from(self.max) {
            return Err(Error::CapacityExceeded(format!(
                "cannot move occupancy {} by {delta} (max {})",
                self.occupied, self.max
            )));
        }
        self.occupied = u32::try_from(updated)
            .map_err(|_| Error::CapacityExceeded(format!("occupancy {updated} out of range")))?;
        Ok(())
    }
}

/// A candidate destination, not bound to the graph until snapped
#[derive(Debug, Clone, PartialEq)]
pub struct Facility {
    pub id: String,
    pub name: Option<String>,
    /// x = longitude, y = latitude
    pub location: Point<f64>,
    /// `Some(true)` when the facility runs an emergency department
    pub emergency: Option<bool>,
    pub capacity: Option<Capacity>,
}

impl Facility {
    pub fn new(id: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            id: id.into(),
            name: None,
            location: Point::new(lon, lat),
            emergency: None,
            capacity: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_emergency(mut self, emergency: bool) -> Self {
        self.emergency = Some(emergency);
        self
    }

    #[must_use]
    pub fn with_capacity(mut self, capacity: Capacity) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn lat(&self) -> f64 {
        self.location.y()
    }

    pub fn lon(&self) -> f64 {
        self.location.x()
    }

    /// Facilities without capacity information are assumed to accept patients
    pub fn has_room(&self) -> bool {
        self.capacity.is_none_or(|capacity| capacity.has_room())
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unnamed Hospital")
    }
}
