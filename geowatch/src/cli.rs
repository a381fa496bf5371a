//! Module describing all possible commands and sub-commands to the `geowatch` main driver
//!
//! We have three main commands:
//!
//! - `list`
//! - `distance`
//! - `replay`
//!
//! `list zones` shows the monitored zones and `list config` the acquisition parameters in use.
//!
//! `distance` is the haversine distance between two points, in meters.
//!
//! `replay` feeds a recorded track (CSV, `time,lat,lon,accuracy`) through a full monitoring
//! session and prints every zone transition.  Location failures can be simulated to see how
//! the monitor degrades to its fallback position.
//!
//! `completion` is here just to configure the various shells completion system.
//!

use std::path::PathBuf;

use clap::{crate_authors, crate_description, crate_name, crate_version, Parser, ValueEnum};
use clap_complete::shells::Shell;

/// CLI options
#[derive(Parser)]
#[command(disable_version_flag = true)]
#[clap(name = crate_name!(), about = crate_description!())]
#[clap(version = crate_version!(), author = crate_authors!())]
pub struct Opts {
    /// configuration file.
    #[clap(short = 'c', long)]
    pub config: Option<PathBuf>,
    /// debug mode (hierarchical traces).
    #[clap(short = 'D', long = "debug")]
    pub debug: bool,
    /// Also log into hourly files in this directory.
    #[clap(short = 'L', long)]
    pub log_dir: Option<PathBuf>,
    /// Export traces through OpenTelemetry.
    #[clap(short = 'T', long)]
    pub telemetry: bool,
    /// Sub-commands (see below).
    #[clap(subcommand)]
    pub subcmd: SubCommand,
}

// ------

/// All sub-commands:
///
/// `completion SHELL`
/// `distance LAT1 LON1 LAT2 LON2`
/// `list (zones|config)`
/// `replay [--disabled] [--denied] [--no-fix] [-J] [-i interval] [-d distance] TRACK`
/// `version`
///
#[derive(Debug, Parser)]
pub enum SubCommand {
    /// Generate Completion stuff
    Completion(ComplOpts),
    /// Distance between two points
    Distance(DistanceOpts),
    /// List zones or configuration
    List(ListOpts),
    /// Replay a recorded track through the monitor
    Replay(ReplayOpts),
    /// List all package versions.
    Version,
}

// ------

/// Two points, in degrees.
///
#[derive(Debug, Parser)]
pub struct DistanceOpts {
    #[clap(allow_negative_numbers = true)]
    pub lat1: f64,
    #[clap(allow_negative_numbers = true)]
    pub lon1: f64,
    #[clap(allow_negative_numbers = true)]
    pub lat2: f64,
    #[clap(allow_negative_numbers = true)]
    pub lon2: f64,
}

// ------

/// Options for replaying a track.
///
#[derive(Debug, Parser)]
pub struct ReplayOpts {
    /// Pretend location services are off.
    #[clap(long)]
    pub disabled: bool,
    /// Pretend access is denied.
    #[clap(long)]
    pub denied: bool,
    /// The first fix never comes.
    #[clap(long)]
    pub no_fix: bool,
    /// Minimum interval between samples (e.g. "5s"), overrides the configuration.
    #[clap(short = 'i', long)]
    pub interval: Option<String>,
    /// Minimum distance between samples in meters, overrides the configuration.
    #[clap(short = 'd', long)]
    pub distance: Option<f64>,
    /// Wait between track points (e.g. "200ms").
    #[clap(short = 'p', long)]
    pub pace: Option<String>,
    /// Zone file, overrides the configuration.
    #[clap(short = 'z', long)]
    pub zones: Option<PathBuf>,
    /// Output events and final status as JSON lines.
    #[clap(short = 'J', long)]
    pub json: bool,
    /// CSV track file
    pub track: PathBuf,
}

// ------

/// Options to generate completion files at runtime
///
#[derive(Debug, Parser)]
pub struct ComplOpts {
    #[clap(value_parser)]
    pub shell: Shell,
}

// ------

/// All `list` sub-commands:
///
/// `list zones`
/// `list config`
///
#[derive(Debug, Parser)]
pub struct ListOpts {
    #[clap(value_parser)]
    pub cmd: ListSubCommand,
}

/// These are the sub-commands for `list`
///
#[derive(Clone, Copy, Debug, Ord, PartialOrd, Eq, PartialEq, ValueEnum)]
pub enum ListSubCommand {
    /// Monitored zones
    Zones,
    /// Acquisition parameters
    Config,
}
