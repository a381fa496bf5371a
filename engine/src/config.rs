//! Monitor configuration, read from `geowatch.hcl`.
//!
//! ```hcl
//! version = 1
//!
//! fallback {
//!   lat      = 40.7589
//!   lon      = -73.9851
//!   accuracy = 100
//! }
//!
//! fix_timeout = "10s"
//!
//! watch {
//!   interval = "5s"
//!   distance = 10
//! }
//!
//! zones_file = "/path/to/zones.hcl"
//! ```
//!
//! Zones can also be listed inline with `zones = [...]`, see `zone.rs`.  With neither, the
//! embedded default zones are used.
//!

use std::path::PathBuf;
use std::time::Duration;

use eyre::Result;
use geofence_common::Versioned;
use serde::Deserialize;
use tracing::trace;

use crate::{load_zones, ConfigError, Fallback, MonitorOptions, WatchOptions, Zone, ZoneRegistry};

/// Current config file version
const CVERSION: usize = 1;

/// Update throttling, durations are humantime strings
///
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct WatchConfig {
    pub interval: String,
    pub distance: f64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        WatchConfig {
            interval: "5s".to_string(),
            distance: 10.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct MonitorConfig {
    /// Version number for safety
    pub version: usize,
    /// Where we are when we do not know
    #[serde(default)]
    pub fallback: Fallback,
    /// Max wait for the first fix
    #[serde(default = "default_fix_timeout")]
    pub fix_timeout: String,
    #[serde(default)]
    pub watch: WatchConfig,
    /// External zone file
    #[serde(default)]
    pub zones_file: Option<PathBuf>,
    /// Inline zones
    #[serde(default)]
    pub zones: Vec<Zone>,
}

fn default_fix_timeout() -> String {
    "10s".to_string()
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            version: CVERSION,
            fallback: Fallback::default(),
            fix_timeout: default_fix_timeout(),
            watch: WatchConfig::default(),
            zones_file: None,
            zones: vec![],
        }
    }
}

impl Versioned for MonitorConfig {
    const VERSION: usize = CVERSION;

    fn version(&self) -> usize {
        self.version
    }
}

fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(s).map_err(|_| ConfigError::BadDuration(s.to_string()))
}

impl MonitorConfig {
    /// Session parameters
    ///
    #[tracing::instrument(skip(self))]
    pub fn options(&self) -> Result<MonitorOptions, ConfigError> {
        trace!("enter");

        Ok(MonitorOptions {
            watch: WatchOptions {
                min_interval: parse_duration(&self.watch.interval)?,
                min_distance: self.watch.distance,
            },
            fix_timeout: parse_duration(&self.fix_timeout)?,
        })
    }

    /// Build the registry: zone file first, then inline zones, then defaults.
    ///
    #[tracing::instrument(skip(self))]
    pub fn registry(&self) -> Result<ZoneRegistry> {
        trace!("enter");

        if let Some(fname) = &self.zones_file {
            load_zones(Some(fname.as_path()))
        } else if !self.zones.is_empty() {
            Ok(ZoneRegistry::new(self.zones.clone())?)
        } else {
            load_zones(None)
        }
    }
}
