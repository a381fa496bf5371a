//! Transition events, fired once per boundary crossing.
//!

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Which way the boundary was crossed
///
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, strum::Display)]
pub enum TransitionKind {
    Entered,
    Exited,
}

/// Membership of a zone changed.
///
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TransitionEvent {
    pub zone_id: String,
    pub zone_label: String,
    pub kind: TransitionKind,
    /// Capture time of the sample that caused it
    pub at: DateTime<Utc>,
}

impl TransitionEvent {
    /// Alert title
    ///
    pub fn title(&self) -> String {
        format!("Geofence {}", self.kind)
    }

    /// Alert body
    ///
    pub fn message(&self) -> String {
        match self.kind {
            TransitionKind::Entered => format!("You entered {}!", self.zone_label),
            TransitionKind::Exited => format!("You left {}!", self.zone_label),
        }
    }
}
