#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use fetal_plane_explorer::notify::Notifier;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const HEATMAP: &str = "aGVhdG1hcA==";

/// Files whose name starts with this are answered after [`SLOW_DELAY`].
pub const SLOW_PREFIX: &str = "slow-";
pub const SLOW_DELAY: Duration = Duration::from_millis(300);

/// A multipart part as the mock service saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedPart {
    pub field: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub len: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Received {
    parts: Arc<Mutex<Vec<ReceivedPart>>>,
}

impl Received {
    pub fn parts(&self) -> Vec<ReceivedPart> {
        self.parts.lock().unwrap().clone()
    }
}

pub fn prediction_body(label: &str) -> Value {
    json!({
        "prediction": {"label": label, "class_id": 3, "confidence": 0.873},
        "uncertainty": {"predictive_entropy": 0.452, "calibrated_confidence": 0.81},
        "explanation": {"heatmap_base64": HEATMAP, "overlay_base64": null}
    })
}

/// Answers every prediction with the uploaded file name as the label.
/// Files named with [`SLOW_PREFIX`] are answered late.
async fn predict(State(received): State<Received>, mut multipart: Multipart) -> Result<Json<Value>, StatusCode> {
    let mut label = String::from("unknown");
    let mut slow = false;
    while let Some(field) = multipart.next_field().await.map_err(|_| StatusCode::BAD_REQUEST)? {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;

        if let Some(file_name) = &file_name {
            label = format!("label for {file_name}");
            slow |= file_name.starts_with(SLOW_PREFIX);
        }
        received.parts.lock().unwrap().push(ReceivedPart {
            field: name,
            file_name,
            content_type,
            len: bytes.len(),
        });
    }

    if slow {
        tokio::time::sleep(SLOW_DELAY).await;
    }
    Ok(Json(prediction_body(&label)))
}

pub fn service() -> (Router, Received) {
    let received = Received::default();
    let router = Router::new()
        .route("/v1/predict", post(predict))
        .route("/v1/healthz", get(|| async { Json(json!({"status": "ok"})) }))
        .route(
            "/v1/metadata",
            get(|| async {
                Json(json!({
                    "service": "fetal-plane-api",
                    "version": "1.2.0",
                    "model_mode": "mock"
                }))
            }),
        )
        .with_state(received.clone());
    (router, received)
}

pub fn failing_service(status: StatusCode) -> Router {
    Router::new().route("/v1/predict", post(move || async move { status }))
}

/// Serves `router` on an ephemeral port and returns its base URL.
pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Base URL of a port nothing listens on.
pub async fn closed_port() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Writes `bytes` to a file named `name` in a fresh directory. The directory is removed
/// when the guard is dropped.
pub fn temp_image(name: &str, bytes: &[u8]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    (dir, path)
}

/// A path inside a fresh directory that does not exist.
pub fn missing_image(name: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    (dir, path)
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    alerts: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }
}
