//! Watch subscriptions: cancellation handle, sample stream and coalescing.
//!

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, trace};

use crate::{distance_meters, PositionSample};

/// Throttling of a watch subscription.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WatchOptions {
    /// No more than one sample per interval (by capture time)
    pub min_interval: Duration,
    /// No two delivered samples closer than this, in meters
    pub min_distance: f64,
}

impl Default for WatchOptions {
    fn default() -> Self {
        WatchOptions {
            min_interval: Duration::from_secs(5),
            min_distance: 10.0,
        }
    }
}

/// Cancellation handle for one subscription, cheap to clone.
///
#[derive(Clone, Debug)]
pub struct WatchHandle {
    id: usize,
    cancel: Arc<watch::Sender<bool>>,
}

impl WatchHandle {
    pub(crate) fn new(id: usize) -> Self {
        let (cancel, _) = watch::channel(false);
        WatchHandle {
            id,
            cancel: Arc::new(cancel),
        }
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<bool> {
        self.cancel.subscribe()
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Cancel the subscription.  Calling it again is a no-op.
    ///
    pub fn stop(&self) {
        if !self.cancel.send_replace(true) {
            debug!("watch #{} stopped", self.id);
        } else {
            trace!("watch #{} already stopped", self.id);
        }
    }

    pub fn is_stopped(&self) -> bool {
        *self.cancel.borrow()
    }
}

/// Receiving end of a subscription.
///
/// Once the handle is stopped, `next()` returns `None` even if samples are still buffered.
///
#[derive(Debug)]
pub struct SampleStream {
    rx: mpsc::Receiver<PositionSample>,
    handle: WatchHandle,
}

impl SampleStream {
    pub(crate) fn new(rx: mpsc::Receiver<PositionSample>, handle: WatchHandle) -> Self {
        SampleStream { rx, handle }
    }

    pub fn handle(&self) -> WatchHandle {
        self.handle.clone()
    }

    /// Next sample, `None` when the provider is done or the subscription was stopped.
    ///
    pub async fn next(&mut self) -> Option<PositionSample> {
        if self.handle.is_stopped() {
            self.rx.close();
            return None;
        }

        let sample = self.rx.recv().await?;

        // Stopped while we were waiting
        //
        if self.handle.is_stopped() {
            trace!("late sample dropped");
            self.rx.close();
            return None;
        }
        Some(sample)
    }
}

/// Decides which samples go through.
///
/// The first sample always does, then a sample needs both `min_interval` elapsed and
/// `min_distance` covered since the last one delivered.
///
#[derive(Debug)]
pub struct Coalescer {
    opts: WatchOptions,
    last: Option<PositionSample>,
}

impl Coalescer {
    pub fn new(opts: WatchOptions) -> Self {
        Coalescer { opts, last: None }
    }

    pub fn accept(&mut self, sample: &PositionSample) -> bool {
        if let Some(last) = &self.last {
            // Out of order samples count as no time elapsed
            //
            let elapsed = sample
                .captured_at
                .signed_duration_since(last.captured_at)
                .to_std()
                .unwrap_or(Duration::ZERO);
            if elapsed < self.opts.min_interval {
                return false;
            }
            if distance_meters(&last.coordinate, &sample.coordinate) < self.opts.min_distance {
                return false;
            }
        }
        self.last = Some(sample.clone());
        true
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    use super::*;
    use crate::Coordinate;

    /// ~11 m per 1e-4 degree of latitude
    fn at(secs: i64, lat: f64) -> PositionSample {
        let t = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap() + chrono::Duration::seconds(secs);
        PositionSample::new(Coordinate::new(lat, -73.9851), t)
    }

    #[test]
    fn test_coalescer_first_always_passes() {
        let mut c = Coalescer::new(WatchOptions::default());
        assert!(c.accept(&at(0, 40.7589)));
    }

    #[rstest]
    #[case(6, 40.7599, true)] // 6s, ~111m
    #[case(2, 40.7599, false)] // too soon
    #[case(6, 40.75891, false)] // too close
    #[case(-10, 40.7599, false)] // out of order
    fn test_coalescer_second(#[case] secs: i64, #[case] lat: f64, #[case] pass: bool) {
        let mut c = Coalescer::new(WatchOptions::default());
        assert!(c.accept(&at(0, 40.7589)));
        assert_eq!(pass, c.accept(&at(secs, lat)));
    }

    #[test]
    fn test_coalescer_measures_from_last_delivered() {
        let mut c = Coalescer::new(WatchOptions::default());
        assert!(c.accept(&at(0, 40.7589)));
        assert!(!c.accept(&at(3, 40.7599)));
        // 6s after the first delivered one, not the rejected one
        assert!(c.accept(&at(6, 40.7599)));
    }

    #[test]
    fn test_coalescer_no_throttle() {
        let mut c = Coalescer::new(WatchOptions {
            min_interval: Duration::ZERO,
            min_distance: 0.0,
        });
        assert!(c.accept(&at(0, 40.7589)));
        assert!(c.accept(&at(0, 40.7589)));
    }

    #[test]
    fn test_handle_stop_idempotent() {
        let h = WatchHandle::new(1);
        assert!(!h.is_stopped());
        h.stop();
        h.stop();
        assert!(h.is_stopped());
        assert!(h.clone().is_stopped());
    }

    #[tokio::test]
    async fn test_stream_drops_buffered_after_stop() {
        let (tx, rx) = mpsc::channel(4);
        let h = WatchHandle::new(1);
        let mut stream = SampleStream::new(rx, h.clone());

        tx.send(at(0, 40.7589)).await.unwrap();
        assert!(stream.next().await.is_some());

        tx.send(at(6, 40.7599)).await.unwrap();
        h.stop();
        assert!(stream.next().await.is_none());
        assert!(tx.send(at(12, 40.7609)).await.is_err());
    }
}
