//! Fleet store - single source of truth for session state.
//!
//! Holds the current fleet snapshot, the selection cursor and the link
//! flag. Every telemetry frame is a total snapshot: the entities mapping
//! is replaced in full, never merged. All writes funnel through the
//! mutators here; readers always see either the old or the new mapping,
//! never an interleaving.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use swarm_core::{Drone, DroneStatus};
use tokio::sync::broadcast;

/// Notification published after each committed mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// The entities mapping was replaced by a new snapshot.
    Fleet,
    /// The selection cursor moved.
    Selection,
    /// The connectivity flag changed.
    Link,
}

/// Session state at one instant. Created empty, destroyed with the
/// process; nothing is persisted.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub entities: HashMap<String, Drone>,
    /// May reference an id absent from `entities`; detail lookups must
    /// treat that as "no detail available", not an error.
    pub selected_id: Option<String>,
    pub connected: bool,
}

/// Cheaply clonable handle to the process-wide session state.
#[derive(Clone)]
pub struct FleetStore {
    inner: Arc<RwLock<SessionState>>,
    tx: broadcast::Sender<StoreEvent>,
}

impl FleetStore {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(RwLock::new(SessionState::default())),
            tx,
        }
    }

    /// Replace the entire entities mapping with a fresh snapshot.
    ///
    /// Last occurrence of a duplicate id wins. Entities missing from
    /// `drones` are gone immediately, even mid-flight; there is no
    /// tombstoning or grace period.
    pub fn replace_entities(&self, drones: Vec<Drone>) {
        let mut entities = HashMap::with_capacity(drones.len());
        for drone in drones {
            entities.insert(drone.id.clone(), drone);
        }
        self.write().entities = entities;
        let _ = self.tx.send(StoreEvent::Fleet);
    }

    /// Move the selection cursor. The id is not validated against the
    /// current entities; selecting an absent id is legal.
    pub fn select(&self, id: Option<String>) {
        self.write().selected_id = id;
        let _ = self.tx.send(StoreEvent::Selection);
    }

    /// Mirror of the telemetry link status, informational only.
    pub fn set_connected(&self, connected: bool) {
        self.write().connected = connected;
        let _ = self.tx.send(StoreEvent::Link);
    }

    /// Copy of the full session state as of the latest commit.
    pub fn snapshot(&self) -> SessionState {
        self.read().clone()
    }

    pub fn entities(&self) -> HashMap<String, Drone> {
        self.read().entities.clone()
    }

    pub fn entity_ids(&self) -> Vec<String> {
        self.read().entities.keys().cloned().collect()
    }

    pub fn selected_id(&self) -> Option<String> {
        self.read().selected_id.clone()
    }

    /// The selected entity, or `None` when nothing is selected or the
    /// cursor refers to an id the current snapshot no longer contains.
    pub fn selected_entity(&self) -> Option<Drone> {
        let state = self.read();
        let id = state.selected_id.as_deref()?;
        state.entities.get(id).cloned()
    }

    pub fn connected(&self) -> bool {
        self.read().connected
    }

    /// Per-status entity counts for the current snapshot.
    pub fn status_counts(&self) -> HashMap<DroneStatus, usize> {
        let state = self.read();
        let mut counts = HashMap::new();
        for drone in state.entities.values() {
            *counts.entry(drone.status).or_insert(0) += 1;
        }
        counts
    }

    /// Subscribe to change notifications. Slow or absent receivers never
    /// block a mutation; a lagged receiver just misses events and reads
    /// the current state instead.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for FleetStore {
    fn default() -> Self {
        Self::new()
    }
}
