//! Telemetry link - owns the one live stream from the telemetry source.
//!
//! The link is an explicit state machine driven by stream events. Loss of
//! connectivity is always treated as transient: the link retries forever
//! at a fixed delay and only an explicit [`LinkHandle::stop`] terminates
//! it. Frames that fail to decode are dropped without touching the store.

use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use swarm_core::wire::decode_frame;

use crate::store::FleetStore;

/// Fixed reconnect delay. No exponential backoff, no jitter, no attempt
/// cap: under a sustained outage the link keeps retrying at this rate.
pub const RECONNECT_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
}

/// Events reported by the underlying stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    Opened,
    Message,
    Closed,
    Errored,
}

/// Transition function for the link state machine.
///
/// Closed and errored take the same path: there is no differentiated
/// error taxonomy at this layer, only "the stream is gone".
pub fn advance(state: LinkState, event: LinkEvent) -> LinkState {
    match (state, event) {
        (LinkState::Connecting, LinkEvent::Opened) => LinkState::Connected,
        (_, LinkEvent::Closed | LinkEvent::Errored) => LinkState::Disconnected,
        (state, _) => state,
    }
}

/// Connection manager for the telemetry stream.
pub struct TelemetryLink {
    ws_url: String,
    reconnect_delay: Duration,
}

impl TelemetryLink {
    pub fn new(ws_url: impl Into<String>) -> Self {
        Self {
            ws_url: ws_url.into(),
            reconnect_delay: RECONNECT_DELAY,
        }
    }

    /// Override the fixed reconnect delay. Intended for tests.
    pub fn reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Spawn the link task. Frames accepted from the stream replace the
    /// store's entities; the store's connected flag mirrors the link.
    pub fn spawn(self, store: FleetStore) -> LinkHandle {
        let (shutdown, rx) = broadcast::channel(1);
        let task = tokio::spawn(run_link(self, store, rx));
        LinkHandle { shutdown, task }
    }
}

/// Handle for stopping a spawned link.
pub struct LinkHandle {
    shutdown: broadcast::Sender<()>,
    task: JoinHandle<()>,
}

impl LinkHandle {
    /// Cancel a pending reconnect, close an open connection and join the
    /// task. Safe to call while disconnected; leaves no dangling timer.
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        let _ = self.task.await;
    }
}

async fn run_link(link: TelemetryLink, store: FleetStore, mut shutdown: broadcast::Receiver<()>) {
    loop {
        let mut state = LinkState::Connecting;
        tracing::debug!("connecting to {}", link.ws_url);

        let connect = tokio::select! {
            _ = shutdown.recv() => return,
            result = connect_async(link.ws_url.as_str()) => result,
        };

        match connect {
            Ok((mut socket, _)) => {
                state = advance(state, LinkEvent::Opened);
                store.set_connected(true);
                tracing::info!("telemetry link up");

                while state == LinkState::Connected {
                    let incoming = tokio::select! {
                        _ = shutdown.recv() => {
                            let _ = socket.close(None).await;
                            store.set_connected(false);
                            return;
                        }
                        incoming = socket.next() => incoming,
                    };

                    let event = match incoming {
                        Some(Ok(Message::Text(text))) => {
                            if let Some(frame) = decode_frame(text.as_bytes()) {
                                store.replace_entities(frame.drones);
                            }
                            LinkEvent::Message
                        }
                        Some(Ok(Message::Binary(data))) => {
                            if let Some(frame) = decode_frame(&data) {
                                store.replace_entities(frame.drones);
                            }
                            LinkEvent::Message
                        }
                        Some(Ok(Message::Close(_))) | None => LinkEvent::Closed,
                        // ping/pong traffic keeps the link up
                        Some(Ok(_)) => LinkEvent::Message,
                        Some(Err(_)) => LinkEvent::Errored,
                    };
                    state = advance(state, event);
                }

                store.set_connected(false);
                tracing::info!(
                    "telemetry link down, retrying in {:?}",
                    link.reconnect_delay
                );
            }
            Err(err) => {
                tracing::debug!("telemetry connect failed: {err}");
            }
        }

        // Exactly one scheduled attempt per disconnect.
        tokio::select! {
            _ = shutdown.recv() => return,
            _ = tokio::time::sleep(link.reconnect_delay) => {}
        }
    }
}
