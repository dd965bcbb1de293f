//! # Huddle Client Library
//!
//! Consumer-side mirror of the coordination engine: optimistic interest
//! toggles with compensation on failure, an authoritative-refresh path,
//! and a cancellable polling task for live updates.

pub mod poll;
pub mod session;
pub mod transport;
pub mod view;

pub use poll::Poller;
pub use session::{Session, ToggleOutcome};
pub use transport::{EngineTransport, HttpTransport};
pub use view::ClientInterestView;
