//! This is the module handling the `distance` sub-command.
//!

use eyre::{eyre, Result};
use tracing::trace;

use geofence_engine::{distance_meters, Coordinate};

use crate::DistanceOpts;

/// Distance in meters between the two points given on the command-line.
///
#[tracing::instrument]
pub fn distance_between(dopts: &DistanceOpts) -> Result<f64> {
    trace!("enter");

    let from = Coordinate::new(dopts.lat1, dopts.lon1);
    let to = Coordinate::new(dopts.lat2, dopts.lon2);

    for c in [&from, &to] {
        if !c.is_valid() {
            return Err(eyre!("invalid position {c}"));
        }
    }
    Ok(distance_meters(&from, &to))
}
