//! A monitoring session.
//!
//! The `Monitor` owns the engine and is the only one calling `evaluate()`: samples are taken
//! one at a time from the stream and their events handed to the sink before the next one is
//! read.  Everything it needs is passed in, nothing global.
//!
//! Typical use:
//!
//! - `bootstrap()` gets a first position (live or fallback) and evaluates it,
//! - `start()` subscribes to updates and returns the handle used to stop from elsewhere,
//! - `run()` processes updates until the stream ends or the handle is stopped.
//!

use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{info, trace, warn};

use crate::{
    Fix, GeofenceEngine, LocationProvider, NotificationSink, Permission, PositionSample,
    PositionSource, ProviderError, SampleStream, SourceStatus, StatusSnapshot, TransitionKind,
    WatchHandle, WatchOptions, ZoneRegistry,
};

/// Acquisition parameters for a session
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonitorOptions {
    /// Throttling of the updates
    pub watch: WatchOptions,
    /// How long to wait for the first fix
    pub fix_timeout: Duration,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        MonitorOptions {
            watch: WatchOptions::default(),
            fix_timeout: Duration::from_secs(10),
        }
    }
}

/// Session statistics
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stats {
    /// Samples evaluated
    pub samples: usize,
    /// Of which fallback quality
    pub fallback: usize,
    pub entered: usize,
    pub exited: usize,
    /// Time in ms
    pub tm: u128,
}

impl Stats {
    pub fn events(&self) -> usize {
        self.entered + self.exited
    }
}

impl Display for Stats {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} samples ({} fallback), {} entered, {} exited in {} ms",
            self.samples, self.fallback, self.entered, self.exited, self.tm
        )
    }
}

#[derive(Debug)]
pub struct Monitor<P: LocationProvider, S: NotificationSink> {
    source: PositionSource<P>,
    engine: GeofenceEngine,
    sink: S,
    opts: MonitorOptions,
    handle: Option<WatchHandle>,
    stream: Option<SampleStream>,
    last: Option<Fix>,
    stats: Stats,
}

impl<P, S> Monitor<P, S>
where
    P: LocationProvider,
    S: NotificationSink,
{
    pub fn new(
        source: PositionSource<P>,
        registry: Arc<ZoneRegistry>,
        sink: S,
        opts: MonitorOptions,
    ) -> Self {
        Monitor {
            source,
            engine: GeofenceEngine::new(registry),
            sink,
            opts,
            handle: None,
            stream: None,
            last: None,
            stats: Stats::default(),
        }
    }

    pub fn source(&self) -> &PositionSource<P> {
        &self.source
    }

    pub fn engine(&self) -> &GeofenceEngine {
        &self.engine
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Last position we evaluated and its quality
    ///
    pub fn last_fix(&self) -> Option<&Fix> {
        self.last.as_ref()
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Evaluate one sample and pass the events on.
    ///
    fn process(&mut self, sample: PositionSample, status: SourceStatus) {
        if !status.is_authoritative() {
            warn!("evaluating {status} position {}", sample.coordinate);
            self.stats.fallback += 1;
        }

        let events = self.engine.evaluate(&sample);
        self.stats.samples += 1;
        for event in &events {
            match event.kind {
                TransitionKind::Entered => self.stats.entered += 1,
                TransitionKind::Exited => self.stats.exited += 1,
            }
            self.sink.notify(event);
        }
        self.last = Some(Fix { sample, status });
    }

    /// Get the first position: live if we can, the fallback otherwise.  It is evaluated like
    /// any other sample.
    ///
    #[tracing::instrument(skip(self))]
    pub async fn bootstrap(&mut self) -> Fix {
        trace!("enter");

        let fix = if !self.source.check_availability().await {
            warn!("Location services are disabled, using default location.");
            self.source.fallback_fix()
        } else if self.source.request_access().await == Permission::Denied {
            warn!("Location permission denied, using default location.");
            self.source.fallback_fix()
        } else {
            self.source.get_current_fix(self.opts.fix_timeout).await
        };

        info!("first position {} ({})", fix.sample.coordinate, fix.status);
        self.process(fix.sample.clone(), fix.status);
        fix
    }

    /// Subscribe to updates.  Without services or permission there is nothing to subscribe
    /// to and the session stays on its current position.
    ///
    #[tracing::instrument(skip(self))]
    pub async fn start(&mut self) -> Result<WatchHandle, ProviderError> {
        trace!("enter");

        match self.source.status() {
            SourceStatus::ServicesDisabled | SourceStatus::PermissionDenied => {
                return Err(ProviderError::Unavailable);
            }
            _ => (),
        }

        // Only one subscription per session
        //
        if let Some(handle) = &self.handle {
            if !handle.is_stopped() {
                return Err(ProviderError::AlreadyWatching(self.source.provider().name()));
            }
        }

        let (handle, stream) = self.source.start_watching(self.opts.watch).await?;
        self.handle = Some(handle.clone());
        self.stream = Some(stream);
        Ok(handle)
    }

    /// Process updates until the stream ends or is stopped.  Either way the handle is stopped
    /// on return so the session can `start()` again.
    ///
    #[tracing::instrument(skip(self))]
    pub async fn run(&mut self) -> Stats {
        trace!("enter");

        let start = Instant::now();
        if let Some(mut stream) = self.stream.take() {
            while let Some(sample) = stream.next().await {
                let status = self.source.status();
                self.process(sample, status);
            }

            // The subscription is over, whoever ended it
            //
            self.stop();
        }
        self.stats.tm += start.elapsed().as_millis();

        info!("Session: {}", self.stats);
        self.stats.clone()
    }

    /// Stop updates, idempotent.
    ///
    #[tracing::instrument(skip(self))]
    pub fn stop(&self) {
        if let Some(handle) = &self.handle {
            self.source.stop(handle);
        }
    }

    /// Stop and start over with a fresh engine, nothing is remembered.
    ///
    #[tracing::instrument(skip(self))]
    pub fn restart(&mut self) {
        self.stop();
        self.engine = GeofenceEngine::new(self.engine.registry());
        self.handle = None;
        self.stream = None;
        self.last = None;
        self.stats = Stats::default();
    }

    /// What the status view shows
    ///
    pub fn snapshot(&self) -> StatusSnapshot {
        self.engine.snapshot(self.source.status())
    }
}
