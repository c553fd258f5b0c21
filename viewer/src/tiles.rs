use crate::api::fetch_tile;
use crate::Message;
use iced::widget::image;
use iced::Task;
use std::collections::{HashMap, HashSet};
use viewpointcore::map::{TileId, TilePlacement, TileSource};
use viewpointcore::model::InlineImage;

enum TileEntry {
    Loading,
    Ready { bytes: Vec<u8>, handle: image::Handle },
    Failed,
}

/// Tiles kept around the visible range so short pans do not refetch.
const KEEP_MARGIN: i64 = 1;

/// Fetched map tiles keyed by slippy address.
#[derive(Default)]
pub struct TileCache {
    entries: HashMap<TileId, TileEntry>,
}

impl TileCache {
    /// Drops tiles outside `placements` plus a one-tile margin, other zooms included.
    pub fn retain_around(&mut self, placements: &[TilePlacement]) {
        let keep = neighbourhood(placements);
        self.entries.retain(|tile, _| keep.contains(tile));
    }

    /// Marks unknown or failed tiles as loading and returns the fetches for them.
    pub fn request_missing(
        &mut self,
        placements: &[TilePlacement],
        source: &TileSource,
        client: &reqwest::Client,
    ) -> Task<Message> {
        let mut fetches = Vec::new();
        for placement in placements {
            let tile = placement.tile;
            if matches!(
                self.entries.get(&tile),
                Some(TileEntry::Loading | TileEntry::Ready { .. })
            ) {
                continue;
            }
            self.entries.insert(tile, TileEntry::Loading);
            let url = source.url(tile);
            fetches.push(Task::perform(
                fetch_tile(client.clone(), url),
                move |result| Message::TileLoaded(tile, result),
            ));
        }
        Task::batch(fetches)
    }

    /// Stores a fetch result; tiles evicted while in flight are dropped.
    pub fn insert(&mut self, tile: TileId, result: Result<Vec<u8>, String>) {
        if !self.entries.contains_key(&tile) {
            return;
        }
        let entry = match result {
            Ok(bytes) => TileEntry::Ready {
                handle: image::Handle::from_bytes(bytes.clone()),
                bytes,
            },
            Err(err) => {
                log::warn!("tile {}/{}/{} failed: {}", tile.z, tile.x, tile.y, err);
                TileEntry::Failed
            }
        };
        self.entries.insert(tile, entry);
    }

    pub fn handle(&self, tile: TileId) -> Option<&image::Handle> {
        match self.entries.get(&tile) {
            Some(TileEntry::Ready { handle, .. }) => Some(handle),
            _ => None,
        }
    }

    /// Tile payload as an inline image, for preview composition.
    pub fn inline(&self, tile: TileId) -> Option<InlineImage> {
        match self.entries.get(&tile) {
            Some(TileEntry::Ready { bytes, .. }) => {
                Some(InlineImage::from_bytes(sniff_mime(bytes), bytes))
            }
            _ => None,
        }
    }

    pub fn pending(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| matches!(entry, TileEntry::Loading))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| matches!(entry, TileEntry::Failed))
            .count()
    }
}

fn neighbourhood(placements: &[TilePlacement]) -> HashSet<TileId> {
    let mut keep = HashSet::new();
    for placement in placements {
        let tile = placement.tile;
        let count = 1_i64 << tile.z;
        for dy in -KEEP_MARGIN..=KEEP_MARGIN {
            let y = tile.y as i64 + dy;
            if y < 0 || y >= count {
                continue;
            }
            for dx in -KEEP_MARGIN..=KEEP_MARGIN {
                keep.insert(TileId {
                    z: tile.z,
                    x: (tile.x as i64 + dx).rem_euclid(count) as u32,
                    y: y as u32,
                });
            }
        }
    }
    keep
}

fn sniff_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(b"WEBP".as_slice()) {
        "image/webp"
    } else {
        "image/png"
    }
}
