//! CSV readers for network extracts and facility lists.
//!
//! Expected headers:
//! - nodes: `id,lat,lon`
//! - edges: `from,to,weight,oneway` (`weight` and `oneway` may be empty or omitted)
//! - facilities: `id,name,lat,lon,emergency,occupied,max_capacity`
//!   (everything but `id`, `lat`, `lon` optional)
//!
//! A malformed row fails the whole read.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::model::raw::deserialize_flag;
use crate::{Capacity, Error, Facility, RawEdge, RawNode};

pub fn deserialize_csv<T, R>(reader: R) -> Result<Vec<T>, Error>
where
    T: DeserializeOwned,
    R: Read,
{
    let rows = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()?;
    Ok(rows)
}

pub fn read_nodes<R: Read>(reader: R) -> Result<Vec<RawNode>, Error> {
    deserialize_csv(reader)
}

pub fn read_edges<R: Read>(reader: R) -> Result<Vec<RawEdge>, Error> {
    deserialize_csv(reader)
}

pub fn read_facilities<R: Read>(reader: R) -> Result<Vec<Facility>, Error> {
    deserialize_csv::<FacilityRecord, _>(reader)?
        .into_iter()
        .map(Facility::try_from)
        .collect()
}

pub fn load_nodes(path: &Path) -> Result<Vec<RawNode>, Error> {
    read_nodes(open(path)?)
}

pub fn load_edges(path: &Path) -> Result<Vec<RawEdge>, Error> {
    read_edges(open(path)?)
}

pub fn load_facilities(path: &Path) -> Result<Vec<Facility>, Error> {
    read_facilities(open(path)?)
}

fn open(path: &Path) -> Result<File, Error> {
    File::open(path).map_err(|e| {
        Error::IoError(std::io::Error::new(
            e.kind(),
            format!("Failed to open file '{}': {}", path.display(), e),
        ))
    })
}

#[derive(Debug, Deserialize)]
struct FacilityRecord {
    id: String,
    #[serde(default)]
    name: Option<String>,
    lat: f64,
    lon: f64,
    #[serde(default, deserialize_with = "deserialize_flag")]
    emergency: Option<bool>,
    #[serde(default)]
    occupied: Option<u32>,
    #[serde(default)]
    max_capacity: Option<u32>,
}

impl TryFrom<FacilityRecord> for Facility {
    type Error = Error;

    fn try_from(record: FacilityRecord) -> Result<Self, Error> {
        let capacity = match (record.occupied, record.max_capacity) {
            (_, None) => None,
            (occupied, Some(max)) => {
                let occupied = occupied.unwrap_or(0);
                if occupied > max {
                    return Err(Error::InvalidData(format!(
                        "facility {} has {occupied} occupied of {max}",
                        record.id
                    )));
                }
                Some(Capacity::new(occupied, max))
            }
        };

        Ok(Facility {
            name: record.name.filter(|name| !name.is_empty()),
            location: geo::Point::new(record.lon, record.lat),
            emergency: record.emergency,
            capacity,
            id: record.id,
        })
    }
}
