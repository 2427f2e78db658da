//! Shared value types and aliases.
//!
//! ## Modules
//!
//! - [`aliases`]: Progress callback and shared-bus aliases.
//! - [`kinds`]: Closed tags carried through load, framing, and export.

pub mod aliases;
pub mod kinds;

pub use aliases::*;
pub use kinds::*;
