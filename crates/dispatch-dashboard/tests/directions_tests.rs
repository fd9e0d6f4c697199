//! Directions backend tests against a stub directions API on a loopback
//! port.

#![allow(clippy::unwrap_used, clippy::panic, clippy::float_cmp)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use dispatch_dashboard::route::DirectionsBackend;
use dispatch_dashboard::{DirectionsConfig, RouteBackend, RouteError, RouteProvider};
use dispatch_types::Coordinate;
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// One request seen by the stub: the coordinate segment and the query.
type Seen = Arc<Mutex<Vec<(String, HashMap<String, String>)>>>;

const FROM: Coordinate = Coordinate::new(40.5, -74.25);
const TO: Coordinate = Coordinate::new(40.0, -74.0);

async fn driving(
    State(seen): State<Seen>,
    Path(route): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    seen.lock().unwrap().push((route, query));
    Json(json!({
        "code": "Ok",
        "routes": [{
            "geometry": {
                "type": "LineString",
                "coordinates": [[-74.25, 40.5], [-74.125, 40.25], [-74.0, 40.0]]
            }
        }]
    }))
}

async fn unavailable() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream unavailable")
}

async fn no_routes() -> Json<Value> {
    Json(json!({"code": "NoRoute", "routes": []}))
}

async fn start_stub() -> (String, Seen) {
    let seen = Seen::default();
    let app = Router::new()
        .route("/driving/{route}", get(driving))
        .route("/broken/{route}", get(unavailable))
        .route("/empty/{route}", get(no_routes))
        .with_state(Arc::clone(&seen));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await });
    (format!("http://{addr}"), seen)
}

fn backend(api_url: String) -> RouteBackend {
    let config = DirectionsConfig {
        api_url,
        access_token: "pk.test-token".to_owned(),
    };
    RouteBackend::Directions(DirectionsBackend::new(&config).unwrap())
}

#[tokio::test]
async fn requests_full_geojson_route_with_token() {
    let (base, seen) = start_stub().await;
    let routes = backend(format!("{base}/driving/"));

    let path = routes.fetch_route(FROM, TO).await.unwrap();

    assert_eq!(path.len(), 3);
    assert_eq!(path.points().first().copied(), Some(FROM));
    assert_eq!(path.destination(), Some(TO));

    let seen = seen.lock().unwrap();
    let (route, query) = seen.first().unwrap();
    assert_eq!(route, "-74.25,40.5;-74,40");
    assert_eq!(query.get("geometries").map(String::as_str), Some("geojson"));
    assert_eq!(query.get("overview").map(String::as_str), Some("full"));
    assert_eq!(query.get("access_token").map(String::as_str), Some("pk.test-token"));
}

#[tokio::test]
async fn error_status_is_reported_with_body() {
    let (base, _seen) = start_stub().await;
    let routes = backend(format!("{base}/broken"));

    let err = routes.fetch_route(FROM, TO).await.unwrap_err();
    let RouteError::Status { status, body } = err else {
        panic!("expected a status error, got {err:?}");
    };
    assert_eq!(status, 500);
    assert_eq!(body, "upstream unavailable");
}

#[tokio::test]
async fn empty_route_list_is_no_route() {
    let (base, _seen) = start_stub().await;
    let routes = backend(format!("{base}/empty"));

    let err = routes.fetch_route(FROM, TO).await.unwrap_err();
    assert!(matches!(err, RouteError::NoRoute { from, to } if from == FROM && to == TO));
}
