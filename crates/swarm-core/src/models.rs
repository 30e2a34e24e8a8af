//! Core data models for the fleet.

use serde::{Deserialize, Serialize};

/// Point-in-time description of one fleet member.
///
/// Identity is the `id` field; it is stable across snapshots and unique
/// within one snapshot. Every other field is overwritten wholesale when a
/// new snapshot arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drone {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub altitude: f64,
    /// Degrees, 0-360, wraps. No normalization is guaranteed.
    pub heading: f64,
    pub speed: f64,
    /// Percentage. Display clamping is a presentation concern.
    pub battery: f64,
    pub status: DroneStatus,
    /// Fixed origin, immutable per entity for the session.
    pub home_lat: f64,
    pub home_lng: f64,
    /// Target currently assigned; absent when none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waypoint: Option<Waypoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DroneStatus {
    /// Holding at current position, no task
    Idle,
    /// Task accepted, not yet moving
    Tasked,
    /// Moving toward the assigned waypoint
    Enroute,
    /// Arrived, circling the target
    Loitering,
    /// Heading back to home
    Returning,
    /// Not responding (dead battery, lost link)
    Offline,
}

/// A lat/lng target coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub lat: f64,
    pub lng: f64,
}
