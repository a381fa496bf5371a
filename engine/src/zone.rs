//! Zones are the circular regions we monitor.
//!
//! The registry is built once, checked once and never changes afterwards.  Zones can be loaded
//! from an HCL file:
//!
//! ```hcl
//! version = 1
//!
//! zones = [
//!   {
//!     id     = "2"
//!     label  = "Tech Hub"
//!     center = { lat = 40.7589, lon = -73.9851 }
//!     radius = 300.0
//!   },
//! ]
//! ```
//!
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use eyre::Result;
use serde::{Deserialize, Serialize};
use tabled::builder::Builder;
use tabled::settings::Style;
use tracing::{debug, trace};

use crate::{ConfigError, Coordinate};

/// Current zone file version
const ZONES_FILE_VER: usize = 1;

/// One monitored zone.
///
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Zone {
    /// Unique id
    pub id: String,
    /// Display name
    pub label: String,
    /// Longer text, only for display
    #[serde(default)]
    pub description: Option<String>,
    /// Center of the circle
    pub center: Coordinate,
    /// Radius in meters
    pub radius: f64,
}

impl Zone {
    pub fn new(id: &str, label: &str, center: Coordinate, radius: f64) -> Self {
        Zone {
            id: id.to_owned(),
            label: label.to_owned(),
            description: None,
            center,
            radius,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }
}

/// Ordered, read-only list of zones.
///
#[derive(Clone, Debug)]
pub struct ZoneRegistry {
    zones: Vec<Zone>,
    index: BTreeMap<String, usize>,
}

impl ZoneRegistry {
    /// Check and freeze the list.
    ///
    /// Duplicate ids and non-positive radii are rejected here, never at evaluation time.
    ///
    #[tracing::instrument(skip(zones))]
    pub fn new(zones: Vec<Zone>) -> Result<Self, ConfigError> {
        let mut index = BTreeMap::new();

        for (i, zone) in zones.iter().enumerate() {
            if !(zone.radius.is_finite() && zone.radius > 0.0) {
                return Err(ConfigError::BadRadius(zone.id.clone(), zone.radius));
            }
            if index.insert(zone.id.clone(), i).is_some() {
                return Err(ConfigError::DuplicateZone(zone.id.clone()));
            }
        }
        debug!("{} zones registered", zones.len());
        Ok(ZoneRegistry { zones, index })
    }

    /// All zones, in registry order
    ///
    #[inline]
    pub fn list(&self) -> &[Zone] {
        &self.zones
    }

    #[inline]
    pub fn get(&self, id: &str) -> Option<&Zone> {
        self.index.get(id).map(|&i| &self.zones[i])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

/// On-disk structure for the zones file
///
#[derive(Debug, Deserialize)]
struct ZonesFile {
    /// Version number for safety
    version: usize,
    /// List of zones
    zones: Vec<Zone>,
}

/// Parse a zone file.
///
#[tracing::instrument(skip(data))]
pub fn parse_zones(data: &str) -> Result<ZoneRegistry> {
    trace!("enter");

    let file: ZonesFile = hcl::from_str(data)?;
    if file.version != ZONES_FILE_VER {
        return Err(ConfigError::BadFileVersion(file.version, ZONES_FILE_VER).into());
    }
    Ok(ZoneRegistry::new(file.zones)?)
}

/// Load all zones, from the given file or the embedded defaults.
///
#[tracing::instrument]
pub fn load_zones(fname: Option<&Path>) -> Result<ZoneRegistry> {
    trace!("enter");

    let data = match fname {
        Some(fname) => fs::read_to_string(fname)?,
        None => include_str!("zones.hcl").to_owned(),
    };
    parse_zones(&data)
}

/// List loaded zones
///
#[tracing::instrument(skip(registry))]
pub fn list_zones(registry: &ZoneRegistry) -> String {
    let header = vec!["Id", "Zone", "Description", "Lat/Lon", "Radius"];

    let mut builder = Builder::default();
    builder.push_record(header);

    registry.list().iter().for_each(|zone| {
        builder.push_record(vec![
            zone.id.clone(),
            zone.label.clone(),
            zone.description.clone().unwrap_or_default(),
            zone.center.to_string(),
            format!("{} m", zone.radius),
        ]);
    });

    let allf = builder.build().with(Style::modern()).to_string();
    format!("List all zones ({}):\n{allf}", registry.len())
}
