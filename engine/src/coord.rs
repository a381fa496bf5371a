//! Geographic coordinates, plain WGS84 degrees.
//!

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// One point on Earth.
///
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Coordinate {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lon: f64,
}

impl Coordinate {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Coordinate { lat, lon }
    }

    /// Both components finite and within [-90,90] x [-180,180].
    ///
    /// Nothing in the engine calls this, checking input is up to the caller.
    ///
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl From<(f64, f64)> for Coordinate {
    /// From a `(lat, lon)` tuple.
    fn from((lat, lon): (f64, f64)) -> Self {
        Coordinate { lat, lon }
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lon)
    }
}
