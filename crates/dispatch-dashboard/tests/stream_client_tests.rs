//! Stream client tests against a live relay bound to a loopback port.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use dispatch_dashboard::{DashboardConfig, EventStreamClient, StreamError};
use dispatch_relay::server::serve;
use dispatch_relay::{AppState, Broadcaster};
use dispatch_types::{Envelope, ResponderKind};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

async fn start_relay() -> (String, Arc<Broadcaster>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let broadcaster = Arc::new(Broadcaster::new());
    let state = Arc::new(AppState::new(Arc::clone(&broadcaster), 16));
    tokio::spawn(serve(listener, state));
    (format!("http://{addr}"), broadcaster)
}

fn client_for(base: &str, path: &str) -> EventStreamClient {
    let config = DashboardConfig {
        events_url: format!("{base}{path}"),
        reconnect_delay: Duration::from_millis(50),
        ..DashboardConfig::default()
    };
    EventStreamClient::new(&config).unwrap()
}

async fn wait_for_subscribers(broadcaster: &Broadcaster, n: usize) {
    timeout(WAIT, async {
        while broadcaster.subscriber_count() < n {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn webhook_event_reaches_the_client() {
    let (base, broadcaster) = start_relay().await;
    let client = client_for(&base, "/events");
    let (tx, mut rx) = mpsc::channel(8);
    let reader = tokio::spawn(async move { client.run(tx).await });
    wait_for_subscribers(&broadcaster, 1).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/webhook"))
        .json(&json!({
            "type": "police",
            "name": "Unit 4",
            "address": "HQ",
            "distance": "0.80 miles",
            "contact": "555-0101",
            "lat": 40.05,
            "lon": -74.1
        }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let payload = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    let Envelope::Responder { kind, info } = Envelope::parse(&payload).unwrap() else {
        panic!("expected a responder envelope, got {payload}");
    };
    assert_eq!(kind, ResponderKind::Police);
    assert_eq!(info.name.as_deref(), Some("Unit 4"));
    assert_eq!(info.distance.as_deref(), Some("0.80 miles"));

    reader.abort();
}

#[tokio::test]
async fn two_clients_each_receive_the_event() {
    let (base, broadcaster) = start_relay().await;
    let (tx_a, mut rx_a) = mpsc::channel(8);
    let (tx_b, mut rx_b) = mpsc::channel(8);
    let client_a = client_for(&base, "/events");
    let client_b = client_for(&base, "/events");
    let a = tokio::spawn(async move { client_a.run(tx_a).await });
    let b = tokio::spawn(async move { client_b.run(tx_b).await });
    wait_for_subscribers(&broadcaster, 2).await;

    let envelope = Envelope::parse(r#"{"type":"user","name":"Ann","lat":40.0,"lon":-74.0}"#).unwrap();
    assert_eq!(broadcaster.publish(&envelope), 2);

    let first = timeout(WAIT, rx_a.recv()).await.unwrap().unwrap();
    let second = timeout(WAIT, rx_b.recv()).await.unwrap().unwrap();
    assert_eq!(first, second);
    assert_eq!(Envelope::parse(&first).unwrap(), envelope);

    a.abort();
    b.abort();
}

#[tokio::test]
async fn non_stream_endpoint_is_rejected() {
    let (base, _broadcaster) = start_relay().await;
    let client = client_for(&base, "/api/status");
    let (tx, _rx) = mpsc::channel(1);

    let err = client.stream_once(&tx).await.unwrap_err();
    assert!(matches!(err, StreamError::NotAnEventStream(ref ct) if ct.starts_with("application/json")));
}

#[tokio::test]
async fn run_returns_once_receiver_is_dropped() {
    let (base, broadcaster) = start_relay().await;
    let client = client_for(&base, "/events");
    let (tx, rx) = mpsc::channel(1);
    let reader = tokio::spawn(async move { client.run(tx).await });
    wait_for_subscribers(&broadcaster, 1).await;

    drop(rx);
    let fire = Envelope::parse(r#"{"type":"fire","lat":1,"lon":1}"#).unwrap();
    assert_eq!(broadcaster.publish(&fire), 1);

    timeout(WAIT, reader).await.unwrap().unwrap();
}

#[tokio::test]
async fn client_reconnects_after_the_relay_ends_its_stream() {
    let (base, broadcaster) = start_relay().await;
    let client = client_for(&base, "/events");
    let (tx, mut rx) = mpsc::channel(8);
    let reader = tokio::spawn(async move { client.run(tx).await });
    wait_for_subscribers(&broadcaster, 1).await;

    assert_eq!(broadcaster.close_all(), 1);
    assert_eq!(broadcaster.subscriber_count(), 0);
    wait_for_subscribers(&broadcaster, 1).await;
    assert!(!reader.is_finished());

    let caller = Envelope::parse(r#"{"type":"user","name":"Ann","lat":40.0,"lon":-74.0}"#).unwrap();
    assert_eq!(broadcaster.publish(&caller), 1);
    let payload = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(Envelope::parse(&payload).unwrap(), caller);

    reader.abort();
}
