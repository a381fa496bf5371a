//! Proximity monitor.
//!
//! Takes a stream of device positions, checks each one against a fixed set of circular zones
//! and fires an event whenever the device enters or leaves one of them.
//!
//! - `PositionSource` gets positions out of a `LocationProvider`, degrading to a fallback
//!   position when location is off, denied or too slow,
//! - `distance_meters()` is the haversine distance,
//! - `ZoneRegistry` is the checked, read-only list of zones,
//! - `GeofenceEngine` is the per-zone inside/outside state machine,
//! - `Monitor` wires everything together for one session and feeds a `NotificationSink`.
//!

mod config;
mod coord;
mod distance;
mod error;
mod event;
mod geofence;
mod monitor;
mod sink;
mod source;
mod status;
mod zone;

pub use config::*;
pub use coord::*;
pub use distance::*;
pub use error::*;
pub use event::*;
pub use geofence::*;
pub use monitor::*;
pub use sink::*;
pub use source::*;
pub use status::*;
pub use zone::*;

const NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn version() -> String {
    format!("{}/{}", NAME, VERSION)
}
