//! Great-circle distance between two coordinates.
//!
//! Zones are a few hundred metres wide so a spherical Earth is good enough, no ellipsoidal
//! correction.
//!

use crate::Coordinate;

/// Earth mean radius in meters
pub const EARTH_RADIUS: f64 = 6_371_000.0;

/// Haversine distance in meters between `a` and `b`.
///
/// Total for any finite input, out-of-range values are computed as-is.
///
#[inline]
pub fn distance_meters(a: &Coordinate, b: &Coordinate) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_phi = (b.lat - a.lat).to_radians();
    let d_lambda = (b.lon - a.lon).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);

    // Rounding can push h a hair outside [0,1] for antipodal points.
    //
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS * h.sqrt().atan2((1.0 - h).sqrt())
}
