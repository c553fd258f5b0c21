use crate::generation::context::build_context;
use crate::generation::gemini::{GeminiClient, GeminiRestTransport, GeminiSettings};
use crate::generation::placeholder::{placeholder_image, MOCK_MODEL};
use crate::generation::service::{FallbackService, ImageService, ServiceCall};
use crate::model::{GenerationRequest, GenerationResult, InlineImage};
use crate::prelude::{ViewError, ViewResult};
use crate::telemetry::{GenerationMetrics, LogManager};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Production service stack: typed client first, raw REST once on failure.
pub type GeminiService = FallbackService<GeminiClient, GeminiRestTransport>;

/// Turns generation requests into history entries.
///
/// Without a service the client runs in mock mode and answers every request
/// with a locally drawn placeholder.
pub struct GenerationClient<S = GeminiService> {
    service: Option<S>,
    model: String,
    metrics: Arc<GenerationMetrics>,
    logger: LogManager,
}

impl GenerationClient {
    /// Builds the Gemini stack when a credential is configured, mock mode otherwise.
    pub fn from_settings(settings: &GeminiSettings) -> Self {
        let metrics = Arc::new(GenerationMetrics::new());
        let service = settings.credential().map(|_| {
            FallbackService::new(
                GeminiClient::new(settings.clone()),
                GeminiRestTransport::new(settings.clone()),
                metrics.clone(),
            )
        });
        Self {
            service,
            model: settings.model.clone(),
            metrics,
            logger: LogManager::new("generation"),
        }
    }

    pub fn mock() -> Self {
        Self::from_settings(&GeminiSettings::default())
    }
}

impl<S: ImageService> GenerationClient<S> {
    pub fn with_service(service: S, model: impl Into<String>, metrics: Arc<GenerationMetrics>) -> Self {
        Self {
            service: Some(service),
            model: model.into(),
            metrics,
            logger: LogManager::new("generation"),
        }
    }

    pub fn is_mock(&self) -> bool {
        self.service.is_none()
    }

    /// Model identifier reported for results of this client.
    pub fn model(&self) -> &str {
        if self.is_mock() {
            MOCK_MODEL
        } else {
            &self.model
        }
    }

    pub fn metrics(&self) -> Arc<GenerationMetrics> {
        self.metrics.clone()
    }

    /// Generates an image for `request`; `preview` is the map snapshot data URL.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        preview: Option<&str>,
    ) -> ViewResult<GenerationResult> {
        let Some(service) = &self.service else {
            return Ok(self.mock_result(request, preview));
        };

        let call = ServiceCall {
            context: build_context(request),
            preview: preview.and_then(InlineImage::from_data_url),
        };
        if preview.is_some() && call.preview.is_none() {
            self.logger
                .warn("map preview is not a base64 data URL; sending text only");
        }

        let outcome = service.generate_image(&call).await.and_then(|response| {
            response
                .image
                .map(|image| (image, response.safety_labels))
                .ok_or(ViewError::MissingImage)
        });

        match outcome {
            Ok((image, safety_labels)) => {
                self.metrics.record_remote();
                self.logger.record(&format!(
                    "{} returned {} ({} safety labels)",
                    self.model,
                    image.mime_type,
                    safety_labels.len()
                ));
                Ok(GenerationResult {
                    id: Uuid::new_v4().to_string(),
                    created_at: Utc::now().timestamp_millis(),
                    request: request.clone(),
                    map_snapshot_image: preview.map(str::to_string),
                    generated_image: image.data_url(),
                    model_identifier: Some(self.model.clone()),
                    safety_labels: (!safety_labels.is_empty()).then_some(safety_labels),
                })
            }
            Err(err) => {
                self.metrics.record_failure();
                self.logger.warn(&format!("generation failed: {err}"));
                Err(err)
            }
        }
    }

    fn mock_result(&self, request: &GenerationRequest, preview: Option<&str>) -> GenerationResult {
        self.metrics.record_mock();
        let prompt = request.prompt.as_deref().unwrap_or_default();
        self.logger.record("no credential configured; returning placeholder");
        GenerationResult {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now().timestamp_millis(),
            request: request.clone(),
            map_snapshot_image: preview.map(str::to_string),
            generated_image: placeholder_image(prompt).data_url(),
            model_identifier: Some(MOCK_MODEL.to_string()),
            safety_labels: None,
        }
    }
}
