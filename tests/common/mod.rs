//! In-process stub of the prediction service.
//!
//! `/predict` answers with two circular orbits through the requested start
//! point: physics at the start radius, ML at 95% of it, `steps + 1` points
//! each. Other routes reproduce failure modes.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::{http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};

/// ML radius relative to the physics radius.
pub const ML_RADIUS_RATIO: f64 = 0.95;

fn circle(radius: f64, start: f64, steps: u64) -> Vec<[f64; 2]> {
    (0..=steps)
        .map(|i| {
            let a = start + std::f64::consts::TAU * i as f64 / steps.max(1) as f64;
            [radius * a.cos(), radius * a.sin()]
        })
        .collect()
}

async fn predict(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let x = body["x"].as_f64();
    let y = body["y"].as_f64();
    let steps = body["steps"].as_u64();
    let (Some(x), Some(y), Some(steps)) = (x, y, steps) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "x, y and steps are required"})),
        );
    };

    let radius = x.hypot(y);
    let start = y.atan2(x);
    (
        StatusCode::OK,
        Json(json!({
            "physics_path": circle(radius, start, steps),
            "ml_path": circle(radius * ML_RADIUS_RATIO, start, steps),
        })),
    )
}

pub fn router() -> Router {
    Router::new()
        .route("/predict", post(predict))
        .route(
            "/error",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "Model not loaded"})),
                )
            }),
        )
        .route("/malformed", post(|| async { "<html>bad gateway</html>" }))
        .route(
            "/unequal",
            post(|| async { Json(json!({"physics_path": [[0, 0], [1, 1]], "ml_path": [[0, 0]]})) }),
        )
        .route(
            "/slow",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({"physics_path": [[1, 0]], "ml_path": [[1, 0]]}))
            }),
        )
}

/// Serve the stub on an ephemeral port of the current runtime.
pub async fn spawn_stub() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router()).await.unwrap();
    });
    addr
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub fn url(addr: SocketAddr, route: &str) -> String {
    format!("http://{addr}{route}")
}
