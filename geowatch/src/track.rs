//! Recorded tracks.
//!
//! A track is a CSV file with a header line, one position per line:
//!
//! ```text
//! time,lat,lon,accuracy
//! 2024-06-01T12:00:00Z,40.7769,-73.9851,5.0
//! 2024-06-01T12:00:06Z,40.7611,-73.9851,
//! ```
//!
//! `accuracy` may be left empty.
//!

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use eyre::{eyre, Result};
use serde::Deserialize;
use tracing::{debug, trace};

use geofence_engine::{Coordinate, PositionSample};

/// One line of the file
///
#[derive(Debug, Deserialize)]
struct TrackRecord {
    time: DateTime<Utc>,
    lat: f64,
    lon: f64,
    accuracy: Option<f64>,
}

impl From<TrackRecord> for PositionSample {
    fn from(r: TrackRecord) -> Self {
        let sample = PositionSample::new(Coordinate::new(r.lat, r.lon), r.time);
        match r.accuracy {
            Some(acc) => sample.with_accuracy(acc),
            None => sample,
        }
    }
}

/// Read a track from anything readable.  Every coordinate must be valid.
///
#[tracing::instrument(skip(rdr))]
pub fn read_track<R: Read>(rdr: R) -> Result<Vec<PositionSample>> {
    trace!("enter");

    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);

    let track = rdr
        .deserialize::<TrackRecord>()
        .enumerate()
        .map(|(n, rec)| {
            let sample = PositionSample::from(rec?);
            if !sample.coordinate.is_valid() {
                return Err(eyre!("line {}: bad position {}", n + 2, sample.coordinate));
            }
            Ok(sample)
        })
        .collect::<Result<Vec<_>>>()?;

    debug!("{} samples", track.len());
    Ok(track)
}

/// Load a track file.
///
#[tracing::instrument]
pub fn load_track(fname: &Path) -> Result<Vec<PositionSample>> {
    let fh = File::open(fname).map_err(|e| eyre!("{fname:?}: {e}"))?;
    read_track(fh)
}
