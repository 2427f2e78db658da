//! Type aliases for callback and sharing types that cross crate lines.

use std::sync::Arc;

use crate::event_bus::{EventBus, ProgressEvent};

/// A progress callback receiving one milestone at a time.
///
/// Used by the converter and the exporters to report
/// `{message, percent}` pairs without knowing who is listening.
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// An event bus shared between the application context and its host.
pub type SharedBus = Arc<EventBus>;

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_progress_callback_type() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: ProgressCallback = Box::new(move |event| sink.lock().push(event.percent));
        callback(ProgressEvent::new("Reading SVG file...", 10));
        callback(ProgressEvent::hide());
        assert_eq!(*seen.lock(), vec![10, 100]);
    }

    #[test]
    fn test_shared_bus_is_one_bus() {
        let bus: SharedBus = Arc::new(EventBus::new());
        let host = Arc::clone(&bus);
        bus.subscribe(crate::event_bus::EventFilter::All, |_| {});
        assert_eq!(host.subscriber_count(), 1);
    }
}
