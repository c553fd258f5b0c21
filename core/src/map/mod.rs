pub mod tiles;
pub mod viewport;

pub use tiles::{TileId, TilePlacement, TileSource, TILE_SIZE};
pub use viewport::{MapViewport, MAX_LATITUDE, MAX_ZOOM, MIN_ZOOM};
