//! Wire and view-model types shared by the client, the intake and the views.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// Top-1 classification returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: String,
    pub class_id: i64,
    /// Expected in `0.0..=1.0`, not checked client-side
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UncertaintyMetrics {
    /// Entropy of the predictive distribution
    pub predictive_entropy: f64,
    /// Top-1 confidence after post-hoc calibration
    pub calibrated_confidence: f64,
}

/// Explanation images, each a base64 encoded PNG.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExplanationArtifacts {
    #[serde(default)]
    pub heatmap_base64: Option<String>,
    /// Part of the contract, not displayed by any view
    #[serde(default)]
    pub overlay_base64: Option<String>,
}

/// Body of a successful `POST /v1/predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: PredictionResult,
    pub uncertainty: UncertaintyMetrics,
    pub explanation: ExplanationArtifacts,
}

/// A prediction together with a displayable reference to the file that was submitted.
///
/// This is the payload of the `file-uploaded` notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientAugmentedResult {
    #[serde(flatten)]
    pub response: PredictionResponse,
    /// `data:` URL of the submitted file
    #[serde(rename = "originalImage")]
    pub original_image: String,
}

impl ClientAugmentedResult {
    pub fn new(response: PredictionResponse, original_image: String) -> Self {
        Self { response, original_image }
    }

    pub fn prediction(&self) -> &PredictionResult {
        &self.response.prediction
    }

    pub fn uncertainty(&self) -> &UncertaintyMetrics {
        &self.response.uncertainty
    }

    pub fn explanation(&self) -> &ExplanationArtifacts {
        &self.response.explanation
    }

    /// Projection handed to the overlay view.
    pub fn overlay_input(&self) -> OverlayInput {
        OverlayInput {
            original_image: self.original_image.clone(),
            heatmap: self.response.explanation.heatmap_base64.clone(),
        }
    }
}

/// The only two fields the overlay view needs.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayInput {
    pub original_image: String,
    pub heatmap: Option<String>,
}

/// `GET /v1/healthz`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// `GET /v1/metadata`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceMetadata {
    pub service: String,
    pub version: String,
    pub model_mode: String,
    #[serde(default)]
    pub description: String,
}
