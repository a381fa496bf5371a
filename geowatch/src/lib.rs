//! Library part of the `geowatch` utility.
//!
//! Command-line parsing, configuration loading, track files and the code behind every
//! sub-command.  The monitoring itself is in `geofence-engine`.
//!

pub use cli::*;
pub use cmds::*;
pub use config::*;
pub use track::*;

mod cli;
mod cmds;
mod config;
mod track;
