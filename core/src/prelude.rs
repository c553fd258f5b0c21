/// Common error type for generation, storage and rendering paths.
#[derive(thiserror::Error, Debug)]
pub enum ViewError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("service responded with {status}: {body}")]
    Service { status: u16, body: String },
    #[error("model did not return an image")]
    MissingImage,
    #[error("storage failure: {0}")]
    Storage(String),
    #[error("preview rendering failed: {0}")]
    Render(String),
    #[error("serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ViewError {
    fn from(err: reqwest::Error) -> Self {
        ViewError::Transport(err.to_string())
    }
}

impl From<std::io::Error> for ViewError {
    fn from(err: std::io::Error) -> Self {
        ViewError::Storage(err.to_string())
    }
}

pub type ViewResult<T> = Result<T, ViewError>;

pub use crate::geometry::{ArrowOverlay, ScreenPoint};
pub use crate::model::{
    ArrowSelection, GenerationRequest, GenerationResult, InlineImage, LatLng, MapBounds,
    MapStateSnapshot,
};
