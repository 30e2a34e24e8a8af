//! Telemetry link integration tests against an in-process WS endpoint.

use std::time::{Duration, Instant};

use futures_util::SinkExt;
use swarm_console::{FleetStore, TelemetryLink};
use swarm_core::DroneStatus;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    (listener, url)
}

fn drone_json(id: &str, status: &str, battery: f64) -> String {
    format!(
        r#"{{"id":"{id}","lat":38.9,"lng":-77.0,"altitude":120.0,"heading":0.0,"speed":0.0,"battery":{battery},"status":"{status}","homeLat":38.9,"homeLng":-77.0}}"#
    )
}

fn frame_json(drones: &str) -> String {
    format!(r#"{{"type":"telemetry","timestamp":1724700000000,"drones":[{drones}]}}"#)
}

async fn wait_for(mut cond: impl FnMut() -> bool) {
    for _ in 0..500 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}

#[tokio::test]
async fn telemetry_frames_replace_store_entities() {
    let (listener, url) = bind().await;
    let store = FleetStore::new();
    let handle = TelemetryLink::new(url)
        .reconnect_delay(Duration::from_millis(50))
        .spawn(store.clone());

    let (socket, _) = listener.accept().await.unwrap();
    let mut ws = tokio_tungstenite::accept_async(socket).await.unwrap();
    wait_for(|| store.connected()).await;

    ws.send(Message::Text(frame_json(&drone_json("D1", "idle", 80.0))))
        .await
        .unwrap();
    wait_for(|| store.entities().len() == 1).await;

    let two = format!(
        "{},{}",
        drone_json("D1", "enroute", 79.0),
        drone_json("D2", "idle", 95.0)
    );
    ws.send(Message::Text(frame_json(&two))).await.unwrap();
    wait_for(|| store.entities().len() == 2).await;

    let entities = store.entities();
    assert_eq!(entities["D1"].status, DroneStatus::Enroute);
    assert_eq!(entities["D1"].battery, 79.0);
    assert!(entities.contains_key("D2"));

    handle.stop().await;
}

#[tokio::test]
async fn malformed_messages_leave_state_unchanged() {
    let (listener, url) = bind().await;
    let store = FleetStore::new();
    let handle = TelemetryLink::new(url)
        .reconnect_delay(Duration::from_millis(50))
        .spawn(store.clone());

    let (socket, _) = listener.accept().await.unwrap();
    let mut ws = tokio_tungstenite::accept_async(socket).await.unwrap();

    ws.send(Message::Text(frame_json(&drone_json("D1", "idle", 80.0))))
        .await
        .unwrap();
    wait_for(|| store.entities().len() == 1).await;

    // Truncated payload, then a frame with an unexpected kind.
    ws.send(Message::Text(
        r#"{"type":"telemetry","timestamp":17247"#.to_string(),
    ))
    .await
    .unwrap();
    ws.send(Message::Text(
        r#"{"type":"heartbeat","timestamp":0,"drones":[]}"#.to_string(),
    ))
    .await
    .unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;

    // Prior snapshot and connectivity survive the garbage.
    assert_eq!(store.entity_ids(), vec!["D1".to_string()]);
    assert!(store.connected());

    handle.stop().await;
}

#[tokio::test]
async fn disconnect_flips_flag_and_schedules_one_reconnect() {
    let (listener, url) = bind().await;
    let store = FleetStore::new();
    let delay = Duration::from_millis(200);
    let handle = TelemetryLink::new(url)
        .reconnect_delay(delay)
        .spawn(store.clone());

    let (socket, _) = listener.accept().await.unwrap();
    let mut ws = tokio_tungstenite::accept_async(socket).await.unwrap();
    wait_for(|| store.connected()).await;

    ws.close(None).await.unwrap();
    drop(ws);
    wait_for(|| !store.connected()).await;
    let dropped_at = Instant::now();

    // Exactly one attempt, and only after the fixed delay has elapsed.
    let (socket, _) = listener.accept().await.unwrap();
    assert!(dropped_at.elapsed() >= delay);
    let _ws = tokio_tungstenite::accept_async(socket).await.unwrap();
    wait_for(|| store.connected()).await;

    // No burst: while this connection lives there is no second attempt.
    let extra = tokio::time::timeout(Duration::from_millis(300), listener.accept()).await;
    assert!(extra.is_err());

    handle.stop().await;
}

#[tokio::test]
async fn stop_cancels_a_pending_reconnect() {
    let (listener, url) = bind().await;
    drop(listener); // nothing is listening; the link will sit in its retry sleep
    let store = FleetStore::new();
    let handle = TelemetryLink::new(url)
        .reconnect_delay(Duration::from_secs(60))
        .spawn(store.clone());

    tokio::time::sleep(Duration::from_millis(100)).await;
    tokio::time::timeout(Duration::from_secs(1), handle.stop())
        .await
        .expect("stop must not wait out the reconnect delay");
    assert!(!store.connected());
}

#[tokio::test]
async fn stop_closes_an_active_connection() {
    let (listener, url) = bind().await;
    let store = FleetStore::new();
    let handle = TelemetryLink::new(url).spawn(store.clone());

    let (socket, _) = listener.accept().await.unwrap();
    let _ws = tokio_tungstenite::accept_async(socket).await.unwrap();
    wait_for(|| store.connected()).await;

    tokio::time::timeout(Duration::from_secs(1), handle.stop())
        .await
        .unwrap();
    assert!(!store.connected());
}
