//! Progress reporting for long-running operations.
//!
//! Conversion and export report `{message, percent}` milestones through a
//! [`ProgressSink`]. A [`ProgressTracker`] sits in front of the sink for one
//! operation and keeps the reported percentages non-decreasing.

use parking_lot::Mutex;

use crate::event_bus::{AppEvent, EventBus, ProgressEvent};
use crate::types::ProgressCallback;

/// Anything that can receive progress milestones
pub trait ProgressSink: Send + Sync {
    /// Deliver one milestone
    fn report(&self, event: ProgressEvent);
}

impl ProgressSink for EventBus {
    fn report(&self, event: ProgressEvent) {
        self.publish(AppEvent::Progress(event)).ok();
    }
}

impl ProgressSink for ProgressCallback {
    fn report(&self, event: ProgressEvent) {
        self(event)
    }
}

/// Collects milestones in memory; handy for hosts that poll and for tests
impl ProgressSink for Mutex<Vec<ProgressEvent>> {
    fn report(&self, event: ProgressEvent) {
        self.lock().push(event);
    }
}

/// Discards every milestone
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Per-operation progress reporter
///
/// Percentages are clamped to `0..=100` and never go backwards within the
/// operation, so a host can drive a bar directly from the events.
pub struct ProgressTracker<'a> {
    sink: &'a dyn ProgressSink,
    last: u8,
}

impl<'a> ProgressTracker<'a> {
    /// Start tracking a new operation
    pub fn new(sink: &'a dyn ProgressSink) -> Self {
        Self { sink, last: 0 }
    }

    /// Report a milestone
    pub fn report(&mut self, message: impl Into<String>, percent: u8) {
        let percent = percent.min(100).max(self.last);
        self.last = percent;
        self.sink.report(ProgressEvent::new(message, percent));
    }

    /// Report the `index`-th of `total` steps spread over `[base, base + span]`
    pub fn step(&mut self, message: impl Into<String>, index: usize, total: usize, base: u8, span: u8) {
        let fraction = if total == 0 {
            0.0
        } else {
            index as f64 / total as f64
        };
        let percent = base as f64 + fraction * span as f64;
        self.report(message, percent.floor().clamp(0.0, 100.0) as u8);
    }

    /// Emit the terminal milestone that hides the indicator
    pub fn finish(&mut self) {
        self.report("", 100);
    }

    /// The last percentage reported
    pub fn percent(&self) -> u8 {
        self.last
    }
}
