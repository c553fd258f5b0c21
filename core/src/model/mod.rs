pub mod request;
pub mod selection;
pub mod wire;

pub use request::{GenerationRequest, GenerationResult, InlineImage};
pub use selection::{ArrowSelection, LatLng, MapBounds, MapStateSnapshot};
pub use wire::{ErrorReply, GenerateBody, GenerateReply};
