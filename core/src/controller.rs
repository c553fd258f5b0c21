//! Interaction state behind the viewer: mode, slider values, generation gate.

use crate::geometry::{bearing_between, normalize_bearing};
use crate::model::{
    ArrowSelection, GenerateReply, GenerationRequest, GenerationResult, LatLng, MapStateSnapshot,
};
use chrono::Utc;

pub const MIN_LENGTH_METERS: f64 = 10.0;
pub const MAX_LENGTH_METERS: f64 = 1_000.0;
pub const DEFAULT_LENGTH_METERS: f64 = 150.0;

/// Pan drags the map; draw places the arrow. Never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    #[default]
    Pan,
    Draw,
}

/// Request handed out by [`ViewController::begin_generation`] and returned on completion.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingGeneration {
    pub request: GenerationRequest,
    pub preview: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ViewController {
    mode: InteractionMode,
    origin: Option<LatLng>,
    bearing_deg: f64,
    length_m: f64,
    prompt: String,
    generating: bool,
    status: Option<String>,
}

impl Default for ViewController {
    fn default() -> Self {
        Self {
            mode: InteractionMode::Pan,
            origin: None,
            bearing_deg: 0.0,
            length_m: DEFAULT_LENGTH_METERS,
            prompt: String::new(),
            generating: false,
            status: None,
        }
    }
}

impl ViewController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: InteractionMode) {
        self.mode = mode;
    }

    pub fn allows_drag_pan(&self) -> bool {
        self.mode == InteractionMode::Pan
    }

    pub fn allows_click_placement(&self) -> bool {
        self.mode == InteractionMode::Draw
    }

    /// Places the arrow origin; ignored outside draw mode.
    pub fn place_arrow(&mut self, at: LatLng) -> bool {
        if !self.allows_click_placement() {
            return false;
        }
        self.origin = Some(at);
        true
    }

    /// Points the arrow at `target`; ignored until an origin exists.
    pub fn aim_at(&mut self, target: LatLng) -> bool {
        let Some(origin) = self.origin else {
            return false;
        };
        self.bearing_deg = bearing_between(origin, target);
        true
    }

    pub fn clear_arrow(&mut self) {
        self.origin = None;
    }

    pub fn bearing(&self) -> f64 {
        self.bearing_deg
    }

    pub fn set_bearing(&mut self, degrees: f64) {
        self.bearing_deg = normalize_bearing(degrees);
    }

    pub fn length(&self) -> f64 {
        self.length_m
    }

    pub fn set_length(&mut self, meters: f64) {
        self.length_m = meters.clamp(MIN_LENGTH_METERS, MAX_LENGTH_METERS);
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn selection(&self) -> Option<ArrowSelection> {
        self.origin
            .map(|origin| ArrowSelection::new(origin, self.bearing_deg, self.length_m))
    }

    pub fn can_generate(&self) -> bool {
        !self.generating && self.origin.is_some()
    }

    /// Snapshots the current inputs and raises the in-progress flag.
    pub fn begin_generation(
        &mut self,
        map: MapStateSnapshot,
        preview: Option<String>,
    ) -> Option<PendingGeneration> {
        if !self.can_generate() {
            return None;
        }
        let prompt = self.prompt.trim();
        let request = GenerationRequest {
            prompt: (!prompt.is_empty()).then(|| prompt.to_string()),
            arrow: self.selection(),
            map,
        };
        self.generating = true;
        self.status = Some("Generating view...".into());
        Some(PendingGeneration { request, preview })
    }

    /// Assembles the history entry for a successful reply.
    pub fn complete_generation(
        &mut self,
        pending: PendingGeneration,
        reply: GenerateReply,
    ) -> GenerationResult {
        self.generating = false;
        self.status = Some(match reply.model_identifier.as_deref() {
            Some(model) => format!("Generated with {model}"),
            None => "Generated".into(),
        });
        GenerationResult {
            id: reply.id,
            created_at: Utc::now().timestamp_millis(),
            request: pending.request,
            map_snapshot_image: pending.preview,
            generated_image: reply.generated_image,
            model_identifier: reply.model_identifier,
            safety_labels: reply.safety_labels,
        }
    }

    pub fn fail_generation(&mut self, message: impl Into<String>) {
        self.generating = false;
        self.status = Some(format!("Generation failed: {}", message.into()));
    }

    pub fn report(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MapBounds;

    fn map() -> MapStateSnapshot {
        MapStateSnapshot {
            zoom: 16.0,
            center: LatLng::new(1.0, 1.0),
            bounds: MapBounds::default(),
            style: "osm-standard".into(),
        }
    }

    fn reply() -> GenerateReply {
        GenerateReply {
            id: "r-1".into(),
            generated_image: "data:image/svg+xml;base64,PHN2Zy8+".into(),
            model_identifier: Some("mock".into()),
            safety_labels: None,
        }
    }

    #[test]
    fn modes_are_mutually_exclusive() {
        let mut controller = ViewController::new();
        assert!(controller.allows_drag_pan());
        assert!(!controller.allows_click_placement());
        controller.set_mode(InteractionMode::Draw);
        assert!(!controller.allows_drag_pan());
        assert!(controller.allows_click_placement());
    }

    #[test]
    fn placement_requires_draw_mode() {
        let mut controller = ViewController::new();
        assert!(!controller.place_arrow(LatLng::new(1.0, 1.0)));
        assert!(controller.selection().is_none());
        controller.set_mode(InteractionMode::Draw);
        assert!(controller.place_arrow(LatLng::new(1.0, 1.0)));
        let selection = controller.selection().unwrap();
        assert_eq!(selection.length_meters, DEFAULT_LENGTH_METERS);
        assert_eq!(selection.bearing_degrees, 0.0);
    }

    #[test]
    fn sliders_are_normalised() {
        let mut controller = ViewController::new();
        controller.set_bearing(370.0);
        assert_eq!(controller.bearing(), 10.0);
        controller.set_length(5_000.0);
        assert_eq!(controller.length(), MAX_LENGTH_METERS);
        controller.set_length(0.0);
        assert_eq!(controller.length(), MIN_LENGTH_METERS);
    }

    #[test]
    fn aiming_uses_bearing_from_origin() {
        let mut controller = ViewController::new();
        assert!(!controller.aim_at(LatLng::new(0.0, 1.0)));
        controller.set_mode(InteractionMode::Draw);
        controller.place_arrow(LatLng::new(0.0, 0.0));
        assert!(controller.aim_at(LatLng::new(0.0, 1.0)));
        assert!((controller.bearing() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn generation_is_gated() {
        let mut controller = ViewController::new();
        assert!(!controller.can_generate());
        assert!(controller.begin_generation(map(), None).is_none());

        controller.set_mode(InteractionMode::Draw);
        controller.place_arrow(LatLng::new(1.0, 1.0));
        controller.set_prompt("  ");
        let pending = controller.begin_generation(map(), None).unwrap();
        assert!(pending.request.prompt.is_none());
        assert!(controller.is_generating());
        assert!(!controller.can_generate());
        assert!(controller.begin_generation(map(), None).is_none());
    }

    #[test]
    fn completion_builds_result_and_resets_flag() {
        let mut controller = ViewController::new();
        controller.set_mode(InteractionMode::Draw);
        controller.place_arrow(LatLng::new(1.0, 1.0));
        controller.set_prompt("Market street");
        let pending = controller
            .begin_generation(map(), Some("data:image/png;base64,AA==".into()))
            .unwrap();
        let result = controller.complete_generation(pending, reply());
        assert!(!controller.is_generating());
        assert_eq!(result.id, "r-1");
        assert_eq!(result.request.prompt.as_deref(), Some("Market street"));
        assert_eq!(result.map_snapshot_image.as_deref(), Some("data:image/png;base64,AA=="));
        assert_eq!(controller.status(), Some("Generated with mock"));
    }

    #[test]
    fn failure_resets_flag_and_reports() {
        let mut controller = ViewController::new();
        controller.set_mode(InteractionMode::Draw);
        controller.place_arrow(LatLng::new(1.0, 1.0));
        controller.begin_generation(map(), None).unwrap();
        controller.fail_generation("model did not return an image");
        assert!(!controller.is_generating());
        assert!(controller.can_generate());
        assert_eq!(
            controller.status(),
            Some("Generation failed: model did not return an image")
        );
    }
}
