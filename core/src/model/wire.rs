//! Bodies exchanged between the viewer and the gateway.

use crate::model::request::{GenerationRequest, GenerationResult};
use crate::model::selection::{ArrowSelection, MapStateSnapshot};
use serde::{Deserialize, Serialize};

/// `POST /api/generate` request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrow: Option<ArrowSelection>,
    pub map: MapStateSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_snapshot_preview: Option<String>,
}

impl GenerateBody {
    pub fn new(request: GenerationRequest, preview: Option<String>) -> Self {
        Self {
            prompt: request.prompt,
            arrow: request.arrow,
            map: request.map,
            map_snapshot_preview: preview,
        }
    }

    /// Splits the body into the request and the optional preview data URL.
    pub fn into_parts(self) -> (GenerationRequest, Option<String>) {
        (
            GenerationRequest {
                prompt: self.prompt,
                arrow: self.arrow,
                map: self.map,
            },
            self.map_snapshot_preview,
        )
    }
}

/// `POST /api/generate` success body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateReply {
    pub id: String,
    pub generated_image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_labels: Option<Vec<String>>,
}

impl From<&GenerationResult> for GenerateReply {
    fn from(result: &GenerationResult) -> Self {
        Self {
            id: result.id.clone(),
            generated_image: result.generated_image.clone(),
            model_identifier: result.model_identifier.clone(),
            safety_labels: result.safety_labels.clone(),
        }
    }
}

/// Failure body; a single human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReply {
    pub error: String,
}
