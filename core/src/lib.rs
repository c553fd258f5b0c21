//! Core library for the Viewpoint tool.
//!
//! Pick a spot on the map, aim an arrow, and ask an image model what a person
//! standing there would see. The modules cover the arrow geometry, the Web
//! Mercator viewport behind the map canvas, the generation client with its
//! mock fallback, and the locally persisted history of results.

pub mod controller;
pub mod generation;
pub mod geometry;
pub mod history;
pub mod map;
pub mod model;
pub mod prelude;
pub mod preview;
pub mod telemetry;

pub use prelude::{ViewError, ViewResult};
