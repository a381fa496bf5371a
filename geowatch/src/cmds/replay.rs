//! This is the module handling the `replay` sub-command.
//!
//! The track is played through a complete session: first fix, subscription and updates until
//! the end of the track or `^C`.  Every transition is printed as it happens, the final status
//! and statistics at the end.
//!

use std::sync::Arc;
use std::time::Duration;

use eyre::{eyre, Result};
use tracing::{info, trace, warn};

use geofence_engine::{
    load_zones, ConfigError, FixBehaviour, Monitor, MonitorConfig, MonitorOptions,
    PositionSample, PositionSource, ScriptedProvider, Stats, StatusSnapshot, TransitionEvent,
};

use crate::{load_track, ReplayOpts};

fn parse_duration(s: &str) -> Result<Duration> {
    Ok(humantime::parse_duration(s).map_err(|_| ConfigError::BadDuration(s.to_string()))?)
}

/// Configuration first, then what was given on the command-line.
///
fn options_from(cfg: &MonitorConfig, ropts: &ReplayOpts) -> Result<MonitorOptions> {
    let mut opts = cfg.options()?;

    if let Some(interval) = &ropts.interval {
        opts.watch.min_interval = parse_duration(interval)?;
    }
    if let Some(distance) = ropts.distance {
        if !distance.is_finite() || distance < 0. {
            return Err(eyre!("bad distance {distance}"));
        }
        opts.watch.min_distance = distance;
    }
    Ok(opts)
}

/// Build the scripted provider with the simulated failures.
///
fn provider_from(track: Vec<PositionSample>, ropts: &ReplayOpts) -> Result<ScriptedProvider> {
    let mut provider = ScriptedProvider::new(track);

    if ropts.disabled {
        provider = provider.disabled();
    }
    if ropts.denied {
        provider = provider.denied();
    }
    if ropts.no_fix {
        provider = provider.with_fix(FixBehaviour::Hang);
    }
    if let Some(pace) = &ropts.pace {
        provider = provider.with_pace(parse_duration(pace)?);
    }
    Ok(provider)
}

fn print_event(event: &TransitionEvent, json: bool) {
    if json {
        match serde_json::to_string(event) {
            Ok(line) => println!("{line}"),
            Err(e) => warn!("can not serialize event: {e}"),
        }
    } else {
        println!("{} {}: {}", event.at, event.title(), event.message());
    }
}

fn print_snapshot(snapshot: &StatusSnapshot, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(snapshot)?);
    } else {
        println!("{snapshot}");
    }
    Ok(())
}

/// Replay a track file through a monitoring session.
///
#[tracing::instrument(skip(cfg))]
pub async fn replay_track(cfg: &MonitorConfig, ropts: &ReplayOpts) -> Result<Stats> {
    trace!("enter");

    let track = load_track(&ropts.track)?;
    info!("Replaying {} samples from {:?}", track.len(), ropts.track);

    let opts = options_from(cfg, ropts)?;
    let registry = match &ropts.zones {
        Some(fname) => load_zones(Some(fname.as_path()))?,
        None => cfg.registry()?,
    };

    let source = PositionSource::new(provider_from(track, ropts)?, cfg.fallback);
    let json = ropts.json;
    let sink = move |event: &TransitionEvent| print_event(event, json);
    let mut monitor = Monitor::new(source, Arc::new(registry), sink, opts);

    let fix = monitor.bootstrap().await;
    if !fix.status.is_authoritative() {
        eprintln!("Using default location {} ({})", fix.sample.coordinate, fix.status);
    }

    // `^C` stops the subscription, `run()` returns once the stream notices
    //
    let stats = match monitor.start().await {
        Ok(handle) => {
            let ctrlc = tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Interrupted.");
                    handle.stop();
                }
            });
            let stats = monitor.run().await;
            ctrlc.abort();
            stats
        }
        Err(e) => {
            warn!("No position updates: {e}");
            monitor.stats().clone()
        }
    };

    print_snapshot(&monitor.snapshot(), json)?;
    eprintln!("{stats}");
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use tempfile::NamedTempFile;

    use super::*;

    // Tech Hub center, then 2 km north, then 250 m north, 6 s apart
    const WALK: &str = r##"time,lat,lon,accuracy
2024-06-01T12:00:00Z,40.7589,-73.9851,5.0
2024-06-01T12:00:06Z,40.7769,-73.9851,5.0
2024-06-01T12:00:12Z,40.76115,-73.9851,
"##;

    fn track() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{WALK}").unwrap();
        file
    }

    fn ropts(track: PathBuf) -> ReplayOpts {
        ReplayOpts {
            disabled: false,
            denied: false,
            no_fix: false,
            interval: None,
            distance: None,
            pace: None,
            zones: None,
            json: false,
            track,
        }
    }

    #[tokio::test]
    async fn test_replay_track() -> Result<()> {
        let file = track();
        let stats = replay_track(&MonitorConfig::default(), &ropts(file.path().into())).await?;

        // bootstrap + 3 updates, in/out/in the Tech Hub
        assert_eq!(4, stats.samples);
        assert_eq!(0, stats.fallback);
        assert_eq!(2, stats.entered);
        assert_eq!(1, stats.exited);
        Ok(())
    }

    #[tokio::test]
    async fn test_replay_disabled() -> Result<()> {
        let file = track();
        let opts = ReplayOpts {
            disabled: true,
            json: true,
            ..ropts(file.path().into())
        };
        let stats = replay_track(&MonitorConfig::default(), &opts).await?;

        // Only the fallback, which is the Tech Hub center
        assert_eq!(1, stats.samples);
        assert_eq!(1, stats.fallback);
        assert_eq!(1, stats.entered);
        Ok(())
    }

    #[tokio::test]
    async fn test_replay_bad_interval() {
        let file = track();
        let opts = ReplayOpts {
            interval: Some("often".to_string()),
            ..ropts(file.path().into())
        };
        assert!(replay_track(&MonitorConfig::default(), &opts).await.is_err());
    }

    #[tokio::test]
    async fn test_replay_bad_distance() {
        let file = track();
        let opts = ReplayOpts {
            distance: Some(-1.),
            ..ropts(file.path().into())
        };
        assert!(replay_track(&MonitorConfig::default(), &opts).await.is_err());
    }

    #[tokio::test]
    async fn test_replay_missing_track() {
        let opts = ropts(PathBuf::from("/nonexistent/walk.csv"));
        assert!(replay_track(&MonitorConfig::default(), &opts).await.is_err());
    }
}
