pub mod client;
pub mod context;
pub mod gemini;
pub mod placeholder;
pub mod service;

pub use client::{GeminiService, GenerationClient};
pub use context::build_context;
pub use gemini::{GeminiClient, GeminiRestTransport, GeminiSettings, DEFAULT_MODEL};
pub use placeholder::{placeholder_caption, placeholder_image, CAPTION_LIMIT, MOCK_MODEL};
pub use service::{FallbackService, ImageService, ServiceCall, ServiceResponse};
