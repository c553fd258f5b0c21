use crate::api::model::HealthReport;
use log::{info, warn};
use std::convert::Infallible;
use std::sync::Arc;
use viewpointcore::generation::{GenerationClient, ImageService};
use viewpointcore::model::{ErrorReply, GenerateBody, GenerateReply};
use warp::{http::StatusCode, Filter};

/// Largest accepted request body; map previews travel inline.
const MAX_BODY_BYTES: u64 = 16 * 1024 * 1024;

/// HTTP surface in front of the generation client.
pub struct ApiBridge<S> {
    client: Arc<GenerationClient<S>>,
}

impl<S: ImageService + 'static> ApiBridge<S> {
    pub fn new(client: Arc<GenerationClient<S>>) -> Self {
        Self { client }
    }

    pub fn routes(
        &self,
    ) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
        let client = self.client.clone();
        let client_filter = warp::any().map(move || client.clone());

        let generate_route = warp::path!("api" / "generate")
            .and(warp::post())
            .and(warp::body::content_length_limit(MAX_BODY_BYTES))
            .and(warp::body::json())
            .and(client_filter.clone())
            .and_then(handle_generate::<S>);

        let health_route = warp::path!("api" / "health")
            .and(warp::get())
            .and(client_filter)
            .map(|client: Arc<GenerationClient<S>>| {
                warp::reply::json(&HealthReport {
                    status: "ok",
                    mode: if client.is_mock() { "mock" } else { "remote" },
                    model: client.model().to_string(),
                    metrics: client.metrics().snapshot(),
                })
            });

        generate_route.or(health_route)
    }

    pub fn publish_status(&self, message: &str) {
        println!("[gateway] {}", message);
    }
}

async fn handle_generate<S: ImageService>(
    body: GenerateBody,
    client: Arc<GenerationClient<S>>,
) -> Result<warp::reply::WithStatus<warp::reply::Json>, Infallible> {
    let (request, preview) = body.into_parts();
    match client.generate(&request, preview.as_deref()).await {
        Ok(result) => {
            info!(
                "generated {} via {}",
                result.id,
                result.model_identifier.as_deref().unwrap_or("unknown model")
            );
            Ok(warp::reply::with_status(
                warp::reply::json(&GenerateReply::from(&result)),
                StatusCode::OK,
            ))
        }
        Err(err) => {
            warn!("generate error: {}", err);
            Ok(warp::reply::with_status(
                warp::reply::json(&ErrorReply {
                    error: err.to_string(),
                }),
                StatusCode::BAD_GATEWAY,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use viewpointcore::generation::{ServiceCall, ServiceResponse};
    use viewpointcore::model::InlineImage;
    use viewpointcore::telemetry::GenerationMetrics;
    use viewpointcore::ViewResult;

    struct ScriptedService {
        image: Option<InlineImage>,
    }

    impl ImageService for ScriptedService {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn generate_image(&self, _call: &ServiceCall) -> ViewResult<ServiceResponse> {
            Ok(ServiceResponse {
                image: self.image.clone(),
                safety_labels: Vec::new(),
            })
        }
    }

    fn body() -> Value {
        json!({
            "prompt": "",
            "arrow": {
                "latitude": 37.8199,
                "longitude": -122.4783,
                "bearingDegrees": 0.0,
                "lengthMeters": 150.0
            },
            "map": {
                "zoom": 15.0,
                "center": {"lat": 37.8199, "lng": -122.4783},
                "bounds": {"north": 37.83, "south": 37.81, "east": -122.46, "west": -122.49},
                "style": "osm-standard"
            }
        })
    }

    #[tokio::test]
    async fn mock_generate_returns_placeholder() {
        let bridge = ApiBridge::new(Arc::new(GenerationClient::mock()));
        let response = warp::test::request()
            .method("POST")
            .path("/api/generate")
            .json(&body())
            .reply(&bridge.routes())
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let reply: GenerateReply = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(reply.model_identifier.as_deref(), Some("mock"));
        assert!(reply
            .generated_image
            .starts_with("data:image/svg+xml;base64,"));
    }

    #[tokio::test]
    async fn missing_image_maps_to_bad_gateway() {
        let client = GenerationClient::with_service(
            ScriptedService { image: None },
            "image-model",
            Arc::new(GenerationMetrics::new()),
        );
        let bridge = ApiBridge::new(Arc::new(client));
        let response = warp::test::request()
            .method("POST")
            .path("/api/generate")
            .json(&body())
            .reply(&bridge.routes())
            .await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let reply: ErrorReply = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(reply.error, "model did not return an image");
    }

    #[tokio::test]
    async fn remote_success_returns_inline_image() {
        let client = GenerationClient::with_service(
            ScriptedService {
                image: Some(InlineImage::from_bytes("image/png", b"png")),
            },
            "image-model",
            Arc::new(GenerationMetrics::new()),
        );
        let bridge = ApiBridge::new(Arc::new(client));
        let response = warp::test::request()
            .method("POST")
            .path("/api/generate")
            .json(&body())
            .reply(&bridge.routes())
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let reply: GenerateReply = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(reply.generated_image, "data:image/png;base64,cG5n");
        assert_eq!(reply.model_identifier.as_deref(), Some("image-model"));
    }

    #[tokio::test]
    async fn malformed_body_is_rejected() {
        let bridge = ApiBridge::new(Arc::new(GenerationClient::mock()));
        let response = warp::test::request()
            .method("POST")
            .path("/api/generate")
            .header("content-type", "application/json")
            .body("{\"map\": 12}")
            .reply(&bridge.routes())
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_reports_mode_and_metrics() {
        let client = Arc::new(GenerationClient::mock());
        let bridge = ApiBridge::new(client.clone());
        warp::test::request()
            .method("POST")
            .path("/api/generate")
            .json(&body())
            .reply(&bridge.routes())
            .await;

        let response = warp::test::request()
            .method("GET")
            .path("/api/health")
            .reply(&bridge.routes())
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let health: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(health["mode"], "mock");
        assert_eq!(health["model"], "mock");
        assert_eq!(health["metrics"]["mock"], 1);
    }
}
