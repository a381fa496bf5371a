//! Position acquisition.
//!
//! A `LocationProvider` is the device backend (GPS, OS location service, recorded track...).
//! `PositionSource` wraps one and never lets an acquisition failure through: permission
//! denial, disabled services, device errors and timeouts all end up as a `SourceStatus` plus a
//! fallback sample so that the engine always has something well-formed to evaluate.
//!
//! Ongoing updates go through `start_watching()` which returns a `WatchHandle` to cancel the
//! subscription and a `SampleStream` to read from.
//!

use std::fmt::Debug;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, trace, warn};

pub use scripted::*;
pub use subscription::*;

use crate::{Coordinate, ProviderError};

mod scripted;
mod subscription;

/// Size of the sample channels
pub const CHANNEL_SIZE: usize = 32;

/// Where the position comes from, and how much we can trust it.
///
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize, strum::Display)]
pub enum SourceStatus {
    #[default]
    Uninitialized,
    AwaitingPermission,
    PermissionDenied,
    ServicesDisabled,
    ActiveFix,
    FallbackFix,
    Error,
}

impl SourceStatus {
    /// Only a live fix is authoritative, everything else is fallback quality.
    ///
    #[inline]
    pub fn is_authoritative(&self) -> bool {
        *self == SourceStatus::ActiveFix
    }
}

/// One position reading.
///
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PositionSample {
    pub coordinate: Coordinate,
    pub captured_at: DateTime<Utc>,
    /// Accuracy in meters, if known
    pub accuracy: Option<f64>,
}

impl PositionSample {
    pub fn new(coordinate: Coordinate, captured_at: DateTime<Utc>) -> Self {
        PositionSample {
            coordinate,
            captured_at,
            accuracy: None,
        }
    }

    /// Sample captured right now.
    ///
    pub fn now(coordinate: Coordinate) -> Self {
        Self::new(coordinate, Utc::now())
    }

    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = Some(accuracy);
        self
    }
}

/// Outcome of a permission request, denial is a normal answer.
///
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display)]
pub enum Permission {
    Granted,
    Denied,
}

/// Result of a one-shot acquisition
///
#[derive(Clone, Debug, PartialEq)]
pub struct Fix {
    pub sample: PositionSample,
    pub status: SourceStatus,
}

/// Static position used whenever the live one can not be had.
///
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Fallback {
    pub lat: f64,
    pub lon: f64,
    /// Reported accuracy in meters
    #[serde(default)]
    pub accuracy: Option<f64>,
}

impl Fallback {
    #[inline]
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

impl Default for Fallback {
    /// Midtown Manhattan.
    fn default() -> Self {
        Fallback {
            lat: 40.7589,
            lon: -73.9851,
            accuracy: Some(100.0),
        }
    }
}

/// Device location backend.
///
/// Implementations report failures as `ProviderError`, `PositionSource` decides what to do
/// with them.
///
pub trait LocationProvider: Debug + Send + Sync {
    /// Backend name
    fn name(&self) -> String;
    /// Whether location services are switched on
    fn services_enabled(&self) -> impl Future<Output = Result<bool, ProviderError>> + Send;
    /// Ask for foreground location access
    fn request_permission(&self) -> impl Future<Output = Result<Permission, ProviderError>> + Send;
    /// One fresh reading
    fn current_position(
        &self,
    ) -> impl Future<Output = Result<PositionSample, ProviderError>> + Send;
    /// Start pushing readings, the subscription ends when the receiver is dropped
    fn watch(
        &self,
    ) -> impl Future<Output = Result<mpsc::Receiver<PositionSample>, ProviderError>> + Send;
}

/// Best-effort position, degrading to a fallback instead of failing.
///
#[derive(Debug)]
pub struct PositionSource<P: LocationProvider> {
    provider: P,
    fallback: Fallback,
    status: Arc<watch::Sender<SourceStatus>>,
    next_id: AtomicUsize,
}

impl<P: LocationProvider> PositionSource<P> {
    pub fn new(provider: P, fallback: Fallback) -> Self {
        let (status, _) = watch::channel(SourceStatus::Uninitialized);
        PositionSource {
            provider,
            fallback,
            status: Arc::new(status),
            next_id: AtomicUsize::new(1),
        }
    }

    /// Current status
    ///
    pub fn status(&self) -> SourceStatus {
        *self.status.borrow()
    }

    /// Follow status changes
    ///
    pub fn status_updates(&self) -> watch::Receiver<SourceStatus> {
        self.status.subscribe()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn set_status(&self, status: SourceStatus) {
        let old = self.status.send_replace(status);
        if old != status {
            debug!("source status {old} -> {status}");
        }
    }

    /// Are location services on?  Not knowing counts as no.
    ///
    #[tracing::instrument(skip(self))]
    pub async fn check_availability(&self) -> bool {
        trace!("enter");

        let enabled = match self.provider.services_enabled().await {
            Ok(enabled) => enabled,
            Err(e) => {
                warn!("{}: can not check services: {e}", self.provider.name());
                false
            }
        };
        if !enabled {
            self.set_status(SourceStatus::ServicesDisabled);
        } else if self.status() == SourceStatus::ServicesDisabled {
            self.set_status(SourceStatus::Uninitialized);
        }
        enabled
    }

    /// Ask for access.  Never fails, an error is a denial.
    ///
    #[tracing::instrument(skip(self))]
    pub async fn request_access(&self) -> Permission {
        trace!("enter");

        self.set_status(SourceStatus::AwaitingPermission);
        let perm = self
            .provider
            .request_permission()
            .await
            .unwrap_or_else(|e| {
                warn!("{}: permission request failed: {e}", self.provider.name());
                Permission::Denied
            });
        match perm {
            Permission::Denied => self.set_status(SourceStatus::PermissionDenied),
            Permission::Granted => self.set_status(SourceStatus::Uninitialized),
        }
        perm
    }

    /// The static fallback, captured now.
    ///
    /// Does not touch the status: if services are disabled, they still are.
    ///
    pub fn fallback_fix(&self) -> Fix {
        let mut sample = PositionSample::now(self.fallback.coordinate());
        sample.accuracy = self.fallback.accuracy;
        Fix {
            sample,
            status: SourceStatus::FallbackFix,
        }
    }

    /// Try to get one fresh sample within `timeout`, falling back to the static position.
    ///
    #[tracing::instrument(skip(self))]
    pub async fn get_current_fix(&self, timeout: Duration) -> Fix {
        trace!("enter");

        match tokio::time::timeout(timeout, self.provider.current_position()).await {
            Ok(Ok(sample)) => {
                self.set_status(SourceStatus::ActiveFix);
                Fix {
                    sample,
                    status: SourceStatus::ActiveFix,
                }
            }
            Ok(Err(e)) => {
                warn!("{}: no fix: {e}, using fallback", self.provider.name());
                self.set_status(SourceStatus::FallbackFix);
                self.fallback_fix()
            }
            Err(_) => {
                warn!(
                    "{}: no fix after {}, using fallback",
                    self.provider.name(),
                    humantime::format_duration(timeout)
                );
                self.set_status(SourceStatus::FallbackFix);
                self.fallback_fix()
            }
        }
    }

    /// Subscribe to ongoing updates, coalesced according to `opts`.
    ///
    #[tracing::instrument(skip(self))]
    pub async fn start_watching(
        &self,
        opts: WatchOptions,
    ) -> Result<(WatchHandle, SampleStream), ProviderError> {
        trace!("enter");

        let raw = match self.provider.watch().await {
            Ok(raw) => raw,
            Err(e) => {
                self.set_status(SourceStatus::Error);
                return Err(e);
            }
        };

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let handle = WatchHandle::new(id);
        let (tx, rx) = mpsc::channel(CHANNEL_SIZE);

        info!("watch #{id} started on {}", self.provider.name());
        tokio::spawn(forward(
            raw,
            tx,
            handle.subscribe(),
            Coalescer::new(opts),
            self.status.clone(),
        ));

        Ok((handle.clone(), SampleStream::new(rx, handle)))
    }

    /// Release a subscription.  Idempotent, fine to call after the session is gone.
    ///
    #[tracing::instrument(skip(self))]
    pub fn stop(&self, handle: &WatchHandle) {
        handle.stop();
    }
}

/// Pump samples from the provider to the stream until cancelled.
///
/// The cancel flag is checked right before each delivery, nothing goes out once `stop()` has
/// been called.
///
async fn forward(
    mut raw: mpsc::Receiver<PositionSample>,
    out: mpsc::Sender<PositionSample>,
    mut cancel: watch::Receiver<bool>,
    mut coalescer: Coalescer,
    status: Arc<watch::Sender<SourceStatus>>,
) {
    loop {
        let sample = tokio::select! {
            biased;

            // Stopped, the stream keeps a handle so the sender can not go away first
            _ = cancel.changed() => break,
            sample = raw.recv() => match sample {
                Some(sample) => sample,
                None => break,
            },
        };

        if *cancel.borrow() {
            trace!("late sample dropped");
            break;
        }
        if !coalescer.accept(&sample) {
            trace!("sample coalesced");
            continue;
        }

        status.send_if_modified(|s| {
            let changed = *s != SourceStatus::ActiveFix;
            *s = SourceStatus::ActiveFix;
            changed
        });
        if out.send(sample).await.is_err() {
            break;
        }
    }
    trace!("forward task finished");
}
