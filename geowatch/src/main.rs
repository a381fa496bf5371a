use std::io;

use clap::{crate_authors, crate_description, crate_version, CommandFactory, Parser};
use clap_complete::generate;
use eyre::Result;
use tracing::{info, trace};

use geofence_common::{close_logging, init_logging};
use geowatch::{
    distance_between, list_from_config, load_config, replay_track, ListSubCommand, Opts,
    SubCommand,
};

/// Binary name, using a different binary name
pub const NAME: &str = env!("CARGO_BIN_NAME");
/// Binary version
pub const VERSION: &str = crate_version!();
/// Authors
pub const AUTHORS: &str = crate_authors!();

#[tokio::main]
async fn main() -> Result<()> {
    let opts = Opts::parse();

    // Initialise logging early
    //
    init_logging(NAME, opts.telemetry, opts.debug, opts.log_dir.clone())?;

    // Banner
    //
    banner()?;

    let res = handle_subcmd(&opts).await;
    close_logging();
    res
}

pub async fn handle_subcmd(opts: &Opts) -> Result<()> {
    match &opts.subcmd {
        // Handle `replay track`
        //
        SubCommand::Replay(ropts) => {
            trace!("replay");

            let cfg = load_config(opts.config.as_deref())?;
            replay_track(&cfg, ropts).await?;
        }

        // Handle `distance lat1 lon1 lat2 lon2`
        //
        SubCommand::Distance(dopts) => {
            trace!("distance");

            let d = distance_between(dopts)?;
            println!("{d:.1} m");
        }

        // Standalone completion generation
        //
        // NOTE: you can generate UNIX shells completion on Windows and vice-versa.  Not worth
        //       trying to limit depending on the OS.
        //
        SubCommand::Completion(copts) => {
            let generator = copts.shell;
            generate(generator, &mut Opts::command(), NAME, &mut io::stdout());
        }

        // Standalone `list` command
        //
        SubCommand::List(lopts) => {
            let cfg = load_config(opts.config.as_deref())?;
            match lopts.cmd {
                ListSubCommand::Zones => info!("Listing all zones:"),
                ListSubCommand::Config => info!("Listing configuration:"),
            }

            let str = list_from_config(&cfg, lopts.cmd)?;
            eprintln!("{}", str);
        }

        // Standalone `version` command
        //
        SubCommand::Version => {
            eprintln!("Modules: ");
            eprintln!("\t{}", geofence_common::version());
            eprintln!("\t{}", geofence_engine::version());
        }
    }
    Ok(())
}

/// Display banner
///
fn banner() -> Result<()> {
    Ok(eprintln!(
        r##"
{}/{} by {}
{}
"##,
        NAME,
        VERSION,
        AUTHORS,
        crate_description!()
    ))
}
