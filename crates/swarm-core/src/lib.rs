//! Swarm console core - fleet entity model and wire types.

pub mod models;
pub mod wire;

pub use models::{Drone, DroneStatus, Waypoint};
pub use wire::{decode_frame, CommandAction, CommandRequest, TelemetryFrame};
