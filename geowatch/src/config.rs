//! Configuration loading for `geowatch`.
//!

use std::path::Path;

use eyre::Result;
use tracing::{debug, info};

use geofence_common::ConfigFile;
use geofence_engine::MonitorConfig;

/// Load the given file or the default one.  A missing default file is not an error, we run
/// with the built-in configuration; a file given explicitly must exist.
///
#[tracing::instrument]
pub fn load_config(fname: Option<&Path>) -> Result<MonitorConfig> {
    if fname.is_none() {
        let def = ConfigFile::<MonitorConfig>::default_file()?;
        if !def.exists() {
            info!("No configuration file, using defaults.");
            return Ok(MonitorConfig::default());
        }
    }
    let cfg = ConfigFile::<MonitorConfig>::load(fname)?;
    debug!("config in {:?}", cfg.config_path());
    Ok(cfg.into_inner())
}
