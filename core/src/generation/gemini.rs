//! Gemini `generateContent` transports.
//!
//! [`GeminiClient`] is the typed client. [`GeminiRestTransport`] issues the same
//! call as untyped JSON with the key in the query string and serves as the
//! alternate path behind [`FallbackService`](super::FallbackService).

use crate::generation::service::{ImageService, ServiceCall, ServiceResponse};
use crate::model::InlineImage;
use crate::prelude::{ViewError, ViewResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image-preview";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Credential and endpoint selection for the image service. Values can be
/// overridden through environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct GeminiSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.into(),
            api_base: DEFAULT_API_BASE.into(),
        }
    }
}

impl GeminiSettings {
    /// Applies `GEMINI_API_KEY`, `GEMINI_IMAGE_MODEL` and `GEMINI_API_BASE`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            self.api_key = Some(key);
        }
        if let Ok(model) = std::env::var("GEMINI_IMAGE_MODEL") {
            if !model.trim().is_empty() {
                self.model = model;
            }
        }
        if let Ok(base) = std::env::var("GEMINI_API_BASE") {
            if !base.trim().is_empty() {
                self.api_base = base;
            }
        }
        self
    }

    /// The credential, if one is configured and non-blank.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineImage,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<&'static str>,
}

#[derive(Deserialize, Debug, Default)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    safety_ratings: Vec<SafetyRating>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default, alias = "inline_data")]
    inline_data: Option<InlineImage>,
}

#[derive(Deserialize, Debug)]
struct SafetyRating {
    category: String,
    probability: String,
}

fn build_parts(call: &ServiceCall) -> Vec<Part> {
    let mut parts = vec![Part::Text {
        text: call.context.clone(),
    }];
    if let Some(preview) = &call.preview {
        parts.push(Part::Inline {
            inline_data: preview.clone(),
        });
    }
    parts
}

fn from_typed(response: GenerateContentResponse) -> ServiceResponse {
    let mut result = ServiceResponse::default();
    for candidate in response.candidates {
        result.safety_labels.extend(
            candidate
                .safety_ratings
                .iter()
                .map(|rating| format!("{}:{}", rating.category, rating.probability)),
        );
        if result.image.is_none() {
            result.image = candidate
                .content
                .into_iter()
                .flat_map(|content| content.parts)
                .find_map(|part| part.inline_data);
        }
    }
    result
}

/// Walks an untyped response for the first inline image and safety ratings.
fn from_value(body: &Value) -> ServiceResponse {
    let mut result = ServiceResponse::default();
    let candidates = body
        .get("candidates")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    for candidate in &candidates {
        if let Some(ratings) = candidate
            .get("safetyRatings")
            .or_else(|| candidate.get("safety_ratings"))
            .and_then(Value::as_array)
        {
            for rating in ratings {
                let category = rating.get("category").and_then(Value::as_str);
                let probability = rating.get("probability").and_then(Value::as_str);
                if let (Some(category), Some(probability)) = (category, probability) {
                    result.safety_labels.push(format!("{category}:{probability}"));
                }
            }
        }

        if result.image.is_some() {
            continue;
        }
        let parts = candidate
            .pointer("/content/parts")
            .and_then(Value::as_array);
        for part in parts.into_iter().flatten() {
            let inline = part.get("inlineData").or_else(|| part.get("inline_data"));
            let Some(inline) = inline else { continue };
            let mime = inline
                .get("mimeType")
                .or_else(|| inline.get("mime_type"))
                .and_then(Value::as_str);
            let data = inline.get("data").and_then(Value::as_str);
            if let (Some(mime), Some(data)) = (mime, data) {
                result.image = Some(InlineImage {
                    mime_type: mime.to_string(),
                    data: data.to_string(),
                });
                break;
            }
        }
    }
    result
}

async fn ensure_success(response: reqwest::Response) -> ViewResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(ViewError::Service {
            status: status.as_u16(),
            body,
        })
    }
}

/// Typed `generateContent` client authenticating with the API key header.
pub struct GeminiClient {
    http: Client,
    settings: GeminiSettings,
}

impl GeminiClient {
    pub fn new(settings: GeminiSettings) -> Self {
        Self {
            http: Client::new(),
            settings,
        }
    }
}

impl ImageService for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini-client"
    }

    async fn generate_image(&self, call: &ServiceCall) -> ViewResult<ServiceResponse> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: build_parts(call),
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["TEXT", "IMAGE"],
            },
        };

        let response = self
            .http
            .post(self.settings.endpoint())
            .header("x-goog-api-key", self.settings.credential().unwrap_or_default())
            .json(&request)
            .send()
            .await?;
        let parsed = ensure_success(response)
            .await?
            .json::<GenerateContentResponse>()
            .await?;
        Ok(from_typed(parsed))
    }
}

/// Raw REST path: hand-built JSON, key passed as a query parameter.
pub struct GeminiRestTransport {
    http: Client,
    settings: GeminiSettings,
}

impl GeminiRestTransport {
    pub fn new(settings: GeminiSettings) -> Self {
        Self {
            http: Client::new(),
            settings,
        }
    }
}

impl ImageService for GeminiRestTransport {
    fn name(&self) -> &'static str {
        "gemini-rest"
    }

    async fn generate_image(&self, call: &ServiceCall) -> ViewResult<ServiceResponse> {
        let mut parts = vec![json!({ "text": call.context })];
        if let Some(preview) = &call.preview {
            parts.push(json!({
                "inline_data": { "mime_type": preview.mime_type, "data": preview.data }
            }));
        }
        let body = json!({
            "contents": [{ "parts": parts }],
            "generationConfig": { "responseModalities": ["TEXT", "IMAGE"] }
        });

        let response = self
            .http
            .post(self.settings.endpoint())
            .query(&[("key", self.settings.credential().unwrap_or_default())])
            .json(&body)
            .send()
            .await?;
        let value = ensure_success(response).await?.json::<Value>().await?;
        Ok(from_value(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"{
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [
                    {"text": "Here is the view."},
                    {"inlineData": {"mimeType": "image/png", "data": "iVBORw0KGgo="}}
                ]
            },
            "finishReason": "STOP",
            "safetyRatings": [
                {"category": "HARM_CATEGORY_HARASSMENT", "probability": "NEGLIGIBLE"}
            ]
        }]
    }"#;

    #[test]
    fn typed_parser_finds_inline_image() {
        let parsed: GenerateContentResponse = serde_json::from_str(RESPONSE).unwrap();
        let response = from_typed(parsed);
        let image = response.image.unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data_url(), "data:image/png;base64,iVBORw0KGgo=");
        assert_eq!(
            response.safety_labels,
            vec!["HARM_CATEGORY_HARASSMENT:NEGLIGIBLE".to_string()]
        );
    }

    #[test]
    fn untyped_parser_accepts_snake_case_parts() {
        let value = json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "no image here"},
                    {"inline_data": {"mime_type": "image/jpeg", "data": "/9j/4AAQ"}}
                ]}
            }]
        });
        let response = from_value(&value);
        assert_eq!(response.image.unwrap().mime_type, "image/jpeg");
        assert!(response.safety_labels.is_empty());
    }

    #[test]
    fn text_only_responses_carry_no_image() {
        let value = json!({
            "candidates": [{"content": {"parts": [{"text": "I cannot draw that."}]}}]
        });
        assert!(from_value(&value).image.is_none());
        let typed: GenerateContentResponse = serde_json::from_value(value).unwrap();
        assert!(from_typed(typed).image.is_none());
        assert!(from_value(&json!({})).image.is_none());
    }

    #[test]
    fn request_serializes_inline_preview_in_camel_case() {
        let call = ServiceCall {
            context: "look north".into(),
            preview: Some(InlineImage::from_bytes("image/png", b"abc")),
        };
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: build_parts(&call),
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["TEXT", "IMAGE"],
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "look north");
        assert_eq!(
            value["contents"][0]["parts"][1]["inlineData"]["mimeType"],
            "image/png"
        );
        assert_eq!(value["generationConfig"]["responseModalities"][1], "IMAGE");
    }

    #[test]
    fn endpoint_and_credential_handling() {
        let settings = GeminiSettings {
            api_key: Some("  ".into()),
            model: "custom-model".into(),
            api_base: "http://localhost:8080/".into(),
        };
        assert_eq!(settings.credential(), None);
        assert_eq!(
            settings.endpoint(),
            "http://localhost:8080/v1beta/models/custom-model:generateContent"
        );
    }
}
