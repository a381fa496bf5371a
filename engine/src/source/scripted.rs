//! A provider replaying a recorded track.
//!
//! Used for `geowatch replay` and for tests: service and permission state are switchable, the
//! one-shot fix can succeed, fail or never answer, and extra samples can be pushed by hand
//! through `feed()`.
//!

use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::time::sleep;
use tracing::trace;

use crate::{Permission, PositionSample, ProviderError, LocationProvider, CHANNEL_SIZE};

/// What `current_position()` does
///
#[derive(Clone, Debug, PartialEq)]
pub enum FixBehaviour {
    /// Answer with this sample
    Live(PositionSample),
    /// Device error
    Fail,
    /// Never answer
    Hang,
}

#[derive(Debug)]
pub struct ScriptedProvider {
    services: bool,
    permission: Permission,
    fix: FixBehaviour,
    track: Vec<PositionSample>,
    pace: Option<Duration>,
    feed: Mutex<Option<mpsc::Receiver<PositionSample>>>,
}

impl ScriptedProvider {
    /// Services on, access granted, the fix is the first point of the track (or an error for
    /// an empty track).
    ///
    pub fn new(track: Vec<PositionSample>) -> Self {
        let fix = match track.first() {
            Some(first) => FixBehaviour::Live(first.clone()),
            None => FixBehaviour::Fail,
        };
        ScriptedProvider {
            services: true,
            permission: Permission::Granted,
            fix,
            track,
            pace: None,
            feed: Mutex::new(None),
        }
    }

    /// Location services switched off
    ///
    pub fn disabled(mut self) -> Self {
        self.services = false;
        self
    }

    /// Access will be denied
    ///
    pub fn denied(mut self) -> Self {
        self.permission = Permission::Denied;
        self
    }

    pub fn with_fix(mut self, fix: FixBehaviour) -> Self {
        self.fix = fix;
        self
    }

    /// Wait this long before each track sample
    ///
    pub fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = Some(pace);
        self
    }

    /// Live channel, forwarded after the track.  The subscription stays open as long as the
    /// returned sender is alive.
    ///
    pub fn feed(&mut self) -> mpsc::Sender<PositionSample> {
        let (tx, rx) = mpsc::channel(CHANNEL_SIZE);
        *self.feed.get_mut() = Some(rx);
        tx
    }

    pub fn track(&self) -> &[PositionSample] {
        &self.track
    }
}

impl LocationProvider for ScriptedProvider {
    fn name(&self) -> String {
        String::from("Scripted")
    }

    async fn services_enabled(&self) -> Result<bool, ProviderError> {
        Ok(self.services)
    }

    async fn request_permission(&self) -> Result<Permission, ProviderError> {
        Ok(self.permission)
    }

    async fn current_position(&self) -> Result<PositionSample, ProviderError> {
        if !self.services {
            return Err(ProviderError::Unavailable);
        }
        match &self.fix {
            FixBehaviour::Live(sample) => Ok(sample.clone()),
            FixBehaviour::Fail => Err(ProviderError::Device("no satellite".to_string())),
            FixBehaviour::Hang => std::future::pending().await,
        }
    }

    async fn watch(&self) -> Result<mpsc::Receiver<PositionSample>, ProviderError> {
        if !self.services {
            return Err(ProviderError::Unavailable);
        }

        let (tx, rx) = mpsc::channel(CHANNEL_SIZE);
        let track = self.track.clone();
        let pace = self.pace;
        let feed = self.feed.lock().await.take();

        tokio::spawn(async move {
            trace!("scripted::watch, {} samples", track.len());

            for sample in track {
                if let Some(pace) = pace {
                    sleep(pace).await;
                }
                if tx.send(sample).await.is_err() {
                    trace!("subscription gone");
                    return;
                }
            }

            if let Some(mut feed) = feed {
                while let Some(sample) = feed.recv().await {
                    if tx.send(sample).await.is_err() {
                        trace!("subscription gone");
                        return;
                    }
                }
            }
            trace!("end of track");
        });
        Ok(rx)
    }
}
