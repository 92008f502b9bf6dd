//! HTTP client for the inference service.

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::file::ImageFile;
use crate::model::{HealthStatus, PredictionResponse, ServiceMetadata};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

const PREDICT_PATH: &str = "/v1/predict";
const HEALTH_PATH: &str = "/v1/healthz";
const METADATA_PATH: &str = "/v1/metadata";

/// Multipart field the service reads the image from.
pub const FILE_FIELD: &str = "file";

#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    /// The request never reached the service or no response came back
    #[error("request to the inference service failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The service answered with a non-success status
    #[error("prediction failed: {status_text}")]
    Request { status: StatusCode, status_text: String },

    /// The selected file could not be read into the request body
    #[error("could not read {name}: {source}")]
    Body {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// A success status with a body that is not a valid response
    #[error("malformed response from the inference service: {0}")]
    Decode(#[source] reqwest::Error),
}

impl PredictError {
    fn from_status(status: StatusCode) -> Self {
        Self::Request {
            status,
            status_text: status.canonical_reason().unwrap_or("Unknown Status").to_string(),
        }
    }
}

/// Stateless wrapper around the service endpoints.
///
/// No timeout is configured, a request that hangs stays pending.
#[derive(Debug, Clone)]
pub struct PredictionClient {
    http: Client,
    base_url: String,
}

impl PredictionClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Uploads `file` as multipart form data and parses the prediction.
    #[instrument(skip_all, fields(file = file.name()))]
    pub async fn predict(&self, file: &ImageFile) -> Result<PredictionResponse, PredictError> {
        let bytes = file.read().await.map_err(|source| PredictError::Body {
            name: file.name().to_string(),
            source,
        })?;
        debug!(size = bytes.len(), mime = file.mime(), "uploading");

        let part = Part::bytes(bytes)
            .file_name(file.name().to_string())
            .mime_str(file.mime())
            .map_err(PredictError::Transport)?;
        let form = Form::new().part(FILE_FIELD, part);

        let response = self
            .http
            .post(self.url(PREDICT_PATH))
            .multipart(form)
            .send()
            .await
            .map_err(PredictError::Transport)?;

        let status = response.status();
        debug!(%status, "received response");
        if !status.is_success() {
            return Err(PredictError::from_status(status));
        }

        response.json::<PredictionResponse>().await.map_err(PredictError::Decode)
    }

    pub async fn health(&self) -> Result<HealthStatus, PredictError> {
        self.get_json(HEALTH_PATH).await
    }

    pub async fn metadata(&self) -> Result<ServiceMetadata, PredictError> {
        self.get_json(METADATA_PATH).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, PredictError> {
        let response = self.http.get(self.url(path)).send().await.map_err(PredictError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(PredictError::from_status(status));
        }

        response.json::<T>().await.map_err(PredictError::Decode)
    }
}
