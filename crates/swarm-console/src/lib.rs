//! Swarm console - real-time sync core for the fleet operator dashboard.
//!
//! Ingests full-fleet telemetry snapshots over one WebSocket link,
//! reconciles them into the fleet store, and issues fire-and-forget
//! commands back to the fleet API. Presentation (map, panels) sits on top
//! of this crate and is not part of it.

pub mod config;
pub mod dispatch;
pub mod link;
pub mod store;

pub use config::Config;
pub use dispatch::CommandDispatcher;
pub use link::{LinkHandle, TelemetryLink};
pub use store::{FleetStore, SessionState, StoreEvent};
