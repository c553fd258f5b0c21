use crate::model::InlineImage;
use crate::prelude::ViewResult;
use crate::telemetry::{GenerationMetrics, LogManager};
use std::future::Future;
use std::sync::Arc;

/// Payload handed to an image service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceCall {
    pub context: String,
    pub preview: Option<InlineImage>,
}

/// What came back from a call that completed at the transport level.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ServiceResponse {
    pub image: Option<InlineImage>,
    pub safety_labels: Vec<String>,
}

/// Remote text+image generation backend.
pub trait ImageService: Send + Sync {
    fn name(&self) -> &'static str;

    fn generate_image(
        &self,
        call: &ServiceCall,
    ) -> impl Future<Output = ViewResult<ServiceResponse>> + Send;
}

/// Calls `primary`, and on any error calls `secondary` exactly once.
pub struct FallbackService<P, S> {
    primary: P,
    secondary: S,
    metrics: Arc<GenerationMetrics>,
    logger: LogManager,
}

impl<P: ImageService, S: ImageService> FallbackService<P, S> {
    pub fn new(primary: P, secondary: S, metrics: Arc<GenerationMetrics>) -> Self {
        Self {
            primary,
            secondary,
            metrics,
            logger: LogManager::new("fallback"),
        }
    }
}

impl<P: ImageService, S: ImageService> ImageService for FallbackService<P, S> {
    fn name(&self) -> &'static str {
        self.primary.name()
    }

    async fn generate_image(&self, call: &ServiceCall) -> ViewResult<ServiceResponse> {
        match self.primary.generate_image(call).await {
            Ok(response) => Ok(response),
            Err(err) => {
                self.logger.warn(&format!(
                    "{} failed ({err}); retrying once via {}",
                    self.primary.name(),
                    self.secondary.name()
                ));
                self.metrics.record_fallback();
                self.secondary.generate_image(call).await
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod stubs {
    use super::*;
    use crate::prelude::ViewError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted service that counts how often it is called.
    pub struct StubService {
        pub label: &'static str,
        pub outcome: Result<ServiceResponse, String>,
        pub calls: Arc<AtomicUsize>,
    }

    impl StubService {
        pub fn ok(label: &'static str, response: ServiceResponse) -> Self {
            Self {
                label,
                outcome: Ok(response),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn failing(label: &'static str, message: &str) -> Self {
            Self {
                label,
                outcome: Err(message.to_string()),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn call_count(&self) -> Arc<AtomicUsize> {
            self.calls.clone()
        }
    }

    impl ImageService for StubService {
        fn name(&self) -> &'static str {
            self.label
        }

        async fn generate_image(&self, _call: &ServiceCall) -> ViewResult<ServiceResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone().map_err(ViewError::Transport)
        }
    }

    pub fn png_response() -> ServiceResponse {
        ServiceResponse {
            image: Some(InlineImage::from_bytes("image/png", b"\x89PNG")),
            safety_labels: vec!["HARM_CATEGORY_DANGEROUS_CONTENT:NEGLIGIBLE".into()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::stubs::*;
    use super::*;
    use std::sync::atomic::Ordering;

    fn call() -> ServiceCall {
        ServiceCall {
            context: "context".into(),
            preview: None,
        }
    }

    #[tokio::test]
    async fn primary_success_skips_secondary() {
        let primary = StubService::ok("primary", png_response());
        let secondary = StubService::ok("secondary", ServiceResponse::default());
        let secondary_calls = secondary.call_count();
        let metrics = Arc::new(GenerationMetrics::new());
        let service = FallbackService::new(primary, secondary, metrics.clone());

        let response = service.generate_image(&call()).await.unwrap();
        assert_eq!(response, png_response());
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
        assert_eq!(metrics.snapshot().fallback_attempts, 0);
    }

    #[tokio::test]
    async fn primary_failure_falls_back_once() {
        let primary = StubService::failing("primary", "connection reset");
        let secondary = StubService::ok("secondary", png_response());
        let secondary_calls = secondary.call_count();
        let metrics = Arc::new(GenerationMetrics::new());
        let service = FallbackService::new(primary, secondary, metrics.clone());

        let response = service.generate_image(&call()).await.unwrap();
        assert!(response.image.is_some());
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(metrics.snapshot().fallback_attempts, 1);
    }

    #[tokio::test]
    async fn double_failure_surfaces_secondary_error() {
        let primary = StubService::failing("primary", "sdk exploded");
        let primary_calls = primary.call_count();
        let secondary = StubService::failing("secondary", "dns lookup failed");
        let secondary_calls = secondary.call_count();
        let service =
            FallbackService::new(primary, secondary, Arc::new(GenerationMetrics::new()));

        let err = service.generate_image(&call()).await.unwrap_err();
        assert!(err.to_string().contains("dns lookup failed"));
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 1);
    }
}
