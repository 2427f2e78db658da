//! # Event Bus Module
//!
//! Decoupled communication between the viewer core and its host.
//!
//! ## Overview
//!
//! The core publishes four kinds of events:
//! - Progress milestones during conversion and export
//! - Model lifecycle changes (loaded, cleared, parameters applied)
//! - Export completions carrying the finished artifact
//! - Error messages meant for the UI
//!
//! Each application context owns its own bus; hosts either register
//! synchronous handlers or poll a broadcast receiver from a tokio task.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use extrudekit_core::event_bus::{AppEvent, EventBus, EventCategory, EventFilter};
//!
//! let bus = EventBus::new();
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Progress]),
//!     |event| {
//!         if let AppEvent::Progress(p) = event {
//!             tracing::info!("{}% {}", p.percent, p.message);
//!         }
//!     },
//! );
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
