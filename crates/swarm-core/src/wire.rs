//! Wire shapes for the telemetry stream and command endpoints.

use crate::models::{Drone, Waypoint};
use serde::{Deserialize, Serialize};

/// The only frame kind the console consumes.
pub const TELEMETRY_KIND: &str = "telemetry";

/// One complete fleet snapshot as broadcast by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryFrame {
    #[serde(rename = "type")]
    pub kind: String,
    /// Unix milliseconds.
    pub timestamp: i64,
    pub drones: Vec<Drone>,
}

/// Decode one inbound stream message.
///
/// Anything that is not a parseable frame with `"type": "telemetry"`
/// yields `None` and the stream carries on; degraded input is tolerated
/// over strict validation.
pub fn decode_frame(payload: &[u8]) -> Option<TelemetryFrame> {
    let frame: TelemetryFrame = serde_json::from_slice(payload).ok()?;
    (frame.kind == TELEMETRY_KIND).then_some(frame)
}

/// Outbound operator command body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRequest {
    pub action: CommandAction,
    /// Required for `goto`; omitted for `recall`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waypoint: Option<Waypoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandAction {
    Goto,
    Recall,
}

impl CommandRequest {
    /// Send the target to the given waypoint.
    pub fn go_to(waypoint: Waypoint) -> Self {
        Self {
            action: CommandAction::Goto,
            waypoint: Some(waypoint),
        }
    }

    /// Order the target back to its home coordinate.
    pub fn recall() -> Self {
        Self {
            action: CommandAction::Recall,
            waypoint: None,
        }
    }
}
