//! Command dispatcher - fire-and-forget operator commands.
//!
//! Commands are submitted without awaiting their result. There is no
//! acknowledgment protocol and no retry: the backend's telemetry stream is
//! the single authoritative source of truth, so a command's effect is only
//! ever observed through the next snapshot. Delivery failures are logged
//! and otherwise dropped; nothing here mutates the fleet store.

use rand::Rng;
use reqwest::StatusCode;
use swarm_core::{CommandRequest, Waypoint};
use thiserror::Error;

/// Reference origin for scatter targets, degrees.
const SCATTER_ORIGIN: (f64, f64) = (38.9, -77.0);
/// Total lat/lng spread of scatter targets around the origin, degrees.
const SCATTER_SPREAD_DEG: f64 = 0.06;

#[derive(Debug, Error)]
enum DispatchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("command endpoint returned {0}")]
    Status(StatusCode),
}

/// Issues commands against the fleet API. Cheap to clone; must be used
/// from within the tokio runtime (requests run on spawned tasks).
#[derive(Clone)]
pub struct CommandDispatcher {
    http: reqwest::Client,
    api_base: String,
}

impl CommandDispatcher {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into(),
        }
    }

    /// Issue a command to one entity. Returns immediately.
    pub fn send_to_entity(&self, id: &str, command: CommandRequest) {
        let url = format!("{}/api/drones/{}/command", self.api_base, id);
        self.post(url, command);
    }

    pub fn goto_entity(&self, id: &str, waypoint: Waypoint) {
        self.send_to_entity(id, CommandRequest::go_to(waypoint));
    }

    pub fn recall_entity(&self, id: &str) {
        self.send_to_entity(id, CommandRequest::recall());
    }

    /// Recall every entity with a single fleet-wide request, regardless
    /// of the current entity count.
    pub fn recall_fleet(&self) {
        let url = format!("{}/api/swarm/command", self.api_base);
        self.post(url, CommandRequest::recall());
    }

    /// Send each entity to an independently drawn random target near the
    /// scatter origin. Targets are uncoordinated; two entities may well
    /// end up on top of each other.
    pub fn scatter<I>(&self, ids: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut rng = rand::rng();
        for id in ids {
            let target = scatter_target(&mut rng);
            self.goto_entity(&id, target);
        }
    }

    fn post(&self, url: String, command: CommandRequest) {
        let http = self.http.clone();
        tokio::spawn(async move {
            if let Err(err) = deliver(&http, &url, &command).await {
                tracing::warn!("command delivery failed ({url}): {err}");
            }
        });
    }
}

async fn deliver(
    http: &reqwest::Client,
    url: &str,
    command: &CommandRequest,
) -> Result<(), DispatchError> {
    let response = http.post(url).json(command).send().await?;
    if !response.status().is_success() {
        return Err(DispatchError::Status(response.status()));
    }
    Ok(())
}

fn scatter_target(rng: &mut impl Rng) -> Waypoint {
    let (lat, lng) = SCATTER_ORIGIN;
    Waypoint {
        lat: lat + (rng.random::<f64>() - 0.5) * SCATTER_SPREAD_DEG,
        lng: lng + (rng.random::<f64>() - 0.5) * SCATTER_SPREAD_DEG,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scatter_targets_stay_within_the_spread() {
        let mut rng = rand::rng();
        for _ in 0..1000 {
            let target = scatter_target(&mut rng);
            assert!((target.lat - SCATTER_ORIGIN.0).abs() <= SCATTER_SPREAD_DEG / 2.0);
            assert!((target.lng - SCATTER_ORIGIN.1).abs() <= SCATTER_SPREAD_DEG / 2.0);
        }
    }
}
