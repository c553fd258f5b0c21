use gallery::GalleryItem;
use iced::{
    widget::{
        button, canvas::Canvas, column, row, scrollable, slider, text, text_input, Container,
    },
    Alignment, Element, Length, Task, Theme,
};
use map_canvas::MapCanvas;
use tiles::TileCache;
use viewpointcore::controller::{
    InteractionMode, PendingGeneration, ViewController, MAX_LENGTH_METERS, MIN_LENGTH_METERS,
};
use viewpointcore::geometry::ScreenPoint;
use viewpointcore::history::{FileStore, HistoryStore, KeyValueStore, MemoryStore, HISTORY_KEY};
use viewpointcore::map::{MapViewport, TileId, TileSource};
use viewpointcore::model::{GenerateBody, GenerateReply, LatLng};
use viewpointcore::preview::PreviewScene;

mod api;
mod gallery;
mod map_canvas;
mod tiles;

const START_CENTER: (f64, f64) = (51.5007, -0.1246);
const START_ZOOM: f64 = 16.0;
const START_SIZE: (f64, f64) = (900.0, 700.0);

fn main() -> iced::Result {
    env_logger::init();
    iced::application(Viewer::boot, Viewer::update, Viewer::view)
        .title(application_title)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Viewer) -> String {
    "Viewpoint".into()
}

fn application_theme(_: &Viewer) -> Theme {
    Theme::Dark
}

struct Viewer {
    controller: ViewController,
    viewport: MapViewport,
    tile_source: TileSource,
    tiles: TileCache,
    history: HistoryStore<Box<dyn KeyValueStore>>,
    gallery: Vec<GalleryItem>,
    pending: Option<PendingGeneration>,
    http: reqwest::Client,
    gateway: String,
}

#[derive(Debug, Clone)]
pub enum Message {
    ModeSelected(InteractionMode),
    MapClicked(LatLng),
    MapAimed(LatLng),
    MapPanned(f64, f64),
    MapZoomed {
        delta: f64,
        anchor: ScreenPoint,
        size: (f64, f64),
    },
    MapResized(f64, f64),
    TileLoaded(TileId, Result<Vec<u8>, String>),
    BearingChanged(f64),
    LengthChanged(f64),
    PromptChanged(String),
    ClearArrow,
    Generate,
    Generated(Result<GenerateReply, String>),
    RemoveEntry(String),
    ClearHistory,
}

fn open_history() -> (HistoryStore<Box<dyn KeyValueStore>>, Option<String>) {
    let location = dirs::config_dir().map(|dir| dir.join("viewpoint"));
    match location.map(FileStore::new) {
        Some(Ok(store)) => {
            log::info!("history at {}", store.path_for(HISTORY_KEY).display());
            (HistoryStore::open(Box::new(store) as Box<dyn KeyValueStore>), None)
        }
        Some(Err(err)) => (
            HistoryStore::open(Box::new(MemoryStore::default()) as Box<dyn KeyValueStore>),
            Some(format!("History will not persist: {err}")),
        ),
        None => (
            HistoryStore::open(Box::new(MemoryStore::default()) as Box<dyn KeyValueStore>),
            Some("History will not persist: no config directory".into()),
        ),
    }
}

impl Viewer {
    fn boot() -> (Self, Task<Message>) {
        let (history, warning) = open_history();
        let mut controller = ViewController::new();
        if let Some(warning) = warning {
            controller.report(warning);
        }
        let mut viewer = Viewer {
            controller,
            viewport: MapViewport::new(
                LatLng::new(START_CENTER.0, START_CENTER.1),
                START_ZOOM,
                START_SIZE.0,
                START_SIZE.1,
            ),
            tile_source: TileSource::from_env(),
            tiles: TileCache::default(),
            gallery: gallery::build(history.entries()),
            history,
            pending: None,
            http: api::http_client(),
            gateway: api::gateway_url(),
        };
        let task = viewer.refresh_tiles();
        (viewer, task)
    }

    fn refresh_tiles(&mut self) -> Task<Message> {
        let placements = self.viewport.visible_tiles();
        self.tiles.retain_around(&placements);
        self.tiles
            .request_missing(&placements, &self.tile_source, &self.http)
    }

    fn rebuild_gallery(&mut self) {
        self.gallery = gallery::build(self.history.entries());
    }

    /// Renders the current map and arrow into a PNG data URL.
    fn capture_preview(&self) -> Option<String> {
        let selection = self.controller.selection();
        let scene = self.viewport.visible_tiles().into_iter().fold(
            PreviewScene::from_viewport(&self.viewport, selection.as_ref()),
            |scene, placement| match self.tiles.inline(placement.tile) {
                Some(image) => scene.with_tile(placement, image),
                None => scene,
            },
        );
        match scene.render_data_url() {
            Ok(url) => Some(url),
            Err(err) => {
                log::warn!("map preview skipped: {}", err);
                None
            }
        }
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::ModeSelected(mode) => {
                state.controller.set_mode(mode);
                Task::none()
            }
            Message::MapClicked(at) => {
                state.controller.place_arrow(at);
                Task::none()
            }
            Message::MapAimed(target) => {
                if !state.controller.aim_at(target) {
                    state.controller.report("Place the arrow before aiming it");
                }
                Task::none()
            }
            Message::MapPanned(dx, dy) => {
                state.viewport.pan_by(dx, dy);
                state.refresh_tiles()
            }
            Message::MapZoomed {
                delta,
                anchor,
                size,
            } => {
                state.viewport.resize(size.0, size.1);
                state.viewport.zoom_at(delta, anchor);
                state.refresh_tiles()
            }
            Message::MapResized(width, height) => {
                if state.viewport.resize(width, height) {
                    state.refresh_tiles()
                } else {
                    Task::none()
                }
            }
            Message::TileLoaded(tile, result) => {
                state.tiles.insert(tile, result);
                Task::none()
            }
            Message::BearingChanged(value) => {
                state.controller.set_bearing(value);
                Task::none()
            }
            Message::LengthChanged(value) => {
                state.controller.set_length(value);
                Task::none()
            }
            Message::PromptChanged(value) => {
                state.controller.set_prompt(value);
                Task::none()
            }
            Message::ClearArrow => {
                state.controller.clear_arrow();
                Task::none()
            }
            Message::Generate => {
                if !state.controller.can_generate() {
                    return Task::none();
                }
                let preview = state.capture_preview();
                let map = state.viewport.snapshot(&state.tile_source.style);
                let Some(pending) = state.controller.begin_generation(map, preview) else {
                    return Task::none();
                };
                let body = GenerateBody::new(pending.request.clone(), pending.preview.clone());
                state.pending = Some(pending);
                Task::perform(
                    api::post_generate(state.http.clone(), state.gateway.clone(), body),
                    Message::Generated,
                )
            }
            Message::Generated(Ok(reply)) => {
                let Some(pending) = state.pending.take() else {
                    return Task::none();
                };
                let result = state.controller.complete_generation(pending, reply);
                if let Err(err) = state.history.add(result) {
                    state.controller.report(format!("Could not save history: {err}"));
                }
                state.rebuild_gallery();
                Task::none()
            }
            Message::Generated(Err(err)) => {
                state.pending = None;
                log::warn!("generation failed: {}", err);
                state.controller.fail_generation(err);
                Task::none()
            }
            Message::RemoveEntry(id) => {
                if let Err(err) = state.history.remove(&id) {
                    state.controller.report(format!("Could not update history: {err}"));
                }
                state.rebuild_gallery();
                Task::none()
            }
            Message::ClearHistory => {
                if let Err(err) = state.history.clear() {
                    state.controller.report(format!("Could not clear history: {err}"));
                }
                state.rebuild_gallery();
                Task::none()
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let controller = &state.controller;
        let mode_button = |label: &'static str, mode: InteractionMode| {
            let active = controller.mode() == mode;
            button(text(label))
                .on_press_maybe((!active).then_some(Message::ModeSelected(mode)))
                .padding(8)
        };

        let arrow_info = match controller.selection() {
            Some(arrow) => text(format!(
                "Origin {:.5}, {:.5}",
                arrow.latitude, arrow.longitude
            )),
            None => text("No arrow yet: switch to Draw and click the map"),
        }
        .size(12);

        let tile_info = text(format!(
            "Tiles: {} loading, {} failed | zoom {:.2}",
            state.tiles.pending(),
            state.tiles.failed(),
            state.viewport.zoom()
        ))
        .size(12);

        let generate_label = if controller.is_generating() {
            "Generating..."
        } else {
            "Generate view"
        };

        let controls = column![
            text("Viewpoint").size(26),
            row![
                mode_button("Pan", InteractionMode::Pan),
                mode_button("Draw", InteractionMode::Draw),
            ]
            .spacing(8),
            arrow_info,
            text(format!("Bearing {:.0}°", controller.bearing())).size(14),
            slider(0.0..=359.0, controller.bearing(), Message::BearingChanged).step(1.0),
            text(format!("Length {:.0} m", controller.length())).size(14),
            slider(
                MIN_LENGTH_METERS..=MAX_LENGTH_METERS,
                controller.length(),
                Message::LengthChanged
            )
            .step(10.0),
            text_input("Describe the scene (optional)", controller.prompt())
                .on_input(Message::PromptChanged)
                .on_submit_maybe(controller.can_generate().then_some(Message::Generate))
                .padding(6),
            row![
                button(generate_label)
                    .on_press_maybe(controller.can_generate().then_some(Message::Generate))
                    .padding(10),
                button("Clear arrow")
                    .on_press_maybe(
                        (controller.selection().is_some() && !controller.is_generating())
                            .then_some(Message::ClearArrow)
                    )
                    .padding(10),
            ]
            .spacing(8),
            text(controller.status().unwrap_or("Ready")).size(14),
            tile_info,
            column![
                text("Controls").size(16),
                text("Pan mode: drag to move the map, scroll to zoom.").size(12),
                text("Draw mode: click to place the arrow origin.").size(12),
                text("Draw mode: right-drag or shift-click to aim the arrow.").size(12),
            ]
            .spacing(4)
            .padding(6),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fixed(320.0));

        let map = Canvas::new(MapCanvas {
            viewport: &state.viewport,
            tiles: &state.tiles,
            selection: controller.selection(),
            mode: controller.mode(),
        })
        .width(Length::Fill)
        .height(Length::Fill);

        let history_panel = column![
            row![
                text(format!("History ({})", state.history.len())).size(20),
                button("Clear all")
                    .on_press_maybe((!state.history.is_empty()).then_some(Message::ClearHistory))
                    .padding(6),
            ]
            .spacing(12)
            .align_y(Alignment::Center),
            scrollable(gallery::view(&state.gallery)).height(Length::Fill),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fixed(480.0));

        Container::new(row![controls, map, history_panel].spacing(8))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}
