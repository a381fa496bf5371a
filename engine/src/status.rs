//! Point-in-time view of the monitor for display.
//!

use std::fmt::{Display, Formatter};

use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::SourceStatus;

/// One zone line
///
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ZoneRow {
    pub id: String,
    pub label: String,
    pub radius: f64,
    pub inside: bool,
}

impl ZoneRow {
    pub fn state(&self) -> &'static str {
        if self.inside {
            "Inside"
        } else {
            "Outside"
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatusSnapshot {
    /// Quality of the position behind it
    pub source: SourceStatus,
    /// Registry order
    pub zones: Vec<ZoneRow>,
}

impl Display for StatusSnapshot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut builder = Builder::default();
        builder.push_record(vec!["Id", "Zone", "Status"]);

        self.zones.iter().for_each(|z| {
            builder.push_record(vec![
                z.id.clone(),
                z.label.clone(),
                format!("{} (Radius: {}m)", z.state(), z.radius),
            ]);
        });

        let allf = builder.build().with(Style::modern()).to_string();
        write!(f, "Source: {}\n{allf}", self.source)
    }
}
