//! Where transition events go.
//!
//! The monitor hands every batch over synchronously, from its own task, in order.
//!

use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use crate::TransitionEvent;

/// Receives transition events.  Sinks only read, they never touch the engine state.
///
pub trait NotificationSink {
    fn notify(&mut self, event: &TransitionEvent);
}

/// Report through `tracing`.
///
#[derive(Debug, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&mut self, event: &TransitionEvent) {
        info!(zone = %event.zone_id, at = %event.at, "{}: {}", event.title(), event.message());
    }
}

/// Forward into a channel, for consumers living in another task.
///
#[derive(Debug)]
pub struct ChannelSink(pub UnboundedSender<TransitionEvent>);

impl NotificationSink for ChannelSink {
    fn notify(&mut self, event: &TransitionEvent) {
        if self.0.send(event.clone()).is_err() {
            warn!("notification receiver gone, {} dropped", event.title());
        }
    }
}

/// Keep everything.
///
impl NotificationSink for Vec<TransitionEvent> {
    fn notify(&mut self, event: &TransitionEvent) {
        self.push(event.clone());
    }
}

impl<F> NotificationSink for F
where
    F: FnMut(&TransitionEvent),
{
    fn notify(&mut self, event: &TransitionEvent) {
        self(event)
    }
}
