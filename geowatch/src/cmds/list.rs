//! This is the module handling the `list` sub-command.
//!

use eyre::Result;
use tabled::builder::Builder;
use tabled::settings::Style;
use tracing::trace;

use geofence_engine::{list_zones, MonitorConfig};

use crate::ListSubCommand;

/// Run `list zones` or `list config` and return what to display.
///
#[tracing::instrument(skip(cfg))]
pub fn list_from_config(cfg: &MonitorConfig, cmd: ListSubCommand) -> Result<String> {
    trace!("enter");

    match cmd {
        ListSubCommand::Zones => {
            let registry = cfg.registry()?;
            Ok(list_zones(&registry))
        }
        ListSubCommand::Config => list_config(cfg),
    }
}

/// Effective acquisition parameters, durations are checked here too.
///
fn list_config(cfg: &MonitorConfig) -> Result<String> {
    let opts = cfg.options()?;

    let zones = match &cfg.zones_file {
        Some(fname) => fname.display().to_string(),
        None if !cfg.zones.is_empty() => format!("{} inline", cfg.zones.len()),
        None => String::from("built-in"),
    };
    let accuracy = match cfg.fallback.accuracy {
        Some(acc) => format!("{acc} m"),
        None => String::from("unknown"),
    };

    let mut builder = Builder::default();
    builder.push_record(vec!["Parameter", "Value"]);
    builder.push_record(vec![
        "Fallback".to_string(),
        format!("{} ({accuracy})", cfg.fallback.coordinate()),
    ]);
    builder.push_record(vec![
        "Fix timeout".to_string(),
        humantime::format_duration(opts.fix_timeout).to_string(),
    ]);
    builder.push_record(vec![
        "Min. interval".to_string(),
        humantime::format_duration(opts.watch.min_interval).to_string(),
    ]);
    builder.push_record(vec![
        "Min. distance".to_string(),
        format!("{} m", opts.watch.min_distance),
    ]);
    builder.push_record(vec!["Zones".to_string(), zones]);

    let allf = builder.build().with(Style::modern()).to_string();
    Ok(format!("Configuration:\n{allf}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_zones_default() -> Result<()> {
        let str = list_from_config(&MonitorConfig::default(), ListSubCommand::Zones)?;
        assert!(str.starts_with("List all zones (3):"));
        assert!(str.contains("Shopping District"));
        Ok(())
    }

    #[test]
    fn test_list_config_default() -> Result<()> {
        let str = list_from_config(&MonitorConfig::default(), ListSubCommand::Config)?;
        assert!(str.contains("40.75890, -73.98510 (100 m)"));
        assert!(str.contains("10s"));
        assert!(str.contains("built-in"));
        Ok(())
    }

    #[test]
    fn test_list_config_bad_duration() {
        let cfg = MonitorConfig {
            fix_timeout: "soon".to_string(),
            ..MonitorConfig::default()
        };
        assert!(list_from_config(&cfg, ListSubCommand::Config).is_err());
    }
}
