//! Progress sink trait and the sinks shipped with the crate
//!
//! The probe and retrieval loops never print. They hand every observation to a
//! [`ProgressSink`] supplied by the caller, which decides where it goes.

use crate::output::events::ProgressEvent;
use tokio::sync::mpsc::UnboundedSender;

/// Receiver of progress and status events
pub trait ProgressSink: Send {
    /// Records one event
    ///
    /// # Arguments
    ///
    /// * `event` - The observation emitted by a loop
    fn observe(&mut self, event: ProgressEvent);
}

/// Collects events in memory, in emission order
impl ProgressSink for Vec<ProgressEvent> {
    fn observe(&mut self, event: ProgressEvent) {
        self.push(event);
    }
}

/// Forwards events to a channel; a closed channel drops them
impl ProgressSink for UnboundedSender<ProgressEvent> {
    fn observe(&mut self, event: ProgressEvent) {
        if self.send(event).is_err() {
            tracing::trace!("Progress receiver dropped; event discarded");
        }
    }
}

/// Prints each event's status line to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn observe(&mut self, event: ProgressEvent) {
        println!("{}", event);
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn observe(&mut self, _event: ProgressEvent) {}
}
