use crate::tiles::TileCache;
use crate::Message;
use iced::{
    keyboard, mouse,
    widget::canvas::{self, Frame, Geometry, Path, Stroke},
    Color, Point, Rectangle, Renderer, Size, Theme,
};
use viewpointcore::controller::InteractionMode;
use viewpointcore::geometry::ScreenPoint;
use viewpointcore::map::MapViewport;
use viewpointcore::model::ArrowSelection;

const ARROW_COLOR: Color = Color::from_rgb(0.898, 0.224, 0.208);
/// Wheel lines per zoom level.
const WHEEL_STEP: f32 = 0.5;
const PIXELS_PER_LINE: f32 = 60.0;

/// Slippy map with the arrow drawn on top.
pub struct MapCanvas<'a> {
    pub viewport: &'a MapViewport,
    pub tiles: &'a TileCache,
    pub selection: Option<ArrowSelection>,
    pub mode: InteractionMode,
}

impl MapCanvas<'_> {
    fn aim(view: &MapViewport, position: Point) -> Option<canvas::Action<Message>> {
        let target = view.unproject(to_screen(position));
        Some(canvas::Action::publish(Message::MapAimed(target)).and_capture())
    }

    /// Maps an input event to an action against `view`, the viewport at the canvas size.
    fn interact(
        &self,
        view: &MapViewport,
        state: &mut Interaction,
        event: &canvas::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        match event {
            canvas::Event::Keyboard(keyboard::Event::ModifiersChanged(modifiers)) => {
                state.shift = modifiers.shift();
                None
            }
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let position = cursor.position_in(bounds)?;
                match self.mode {
                    InteractionMode::Draw if state.shift => Self::aim(view, position),
                    InteractionMode::Draw => {
                        let at = view.unproject(to_screen(position));
                        Some(canvas::Action::publish(Message::MapClicked(at)).and_capture())
                    }
                    InteractionMode::Pan => {
                        state.drag_from = Some(position);
                        Some(canvas::Action::capture())
                    }
                }
            }
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Right))
                if self.mode == InteractionMode::Draw =>
            {
                let position = cursor.position_in(bounds)?;
                state.aiming = true;
                Self::aim(view, position)
            }
            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Right)) => {
                state.aiming = false;
                None
            }
            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) if state.aiming => {
                Self::aim(view, cursor.position_in(bounds)?)
            }
            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                let from = state.drag_from?;
                let position = relative(cursor, bounds)?;
                state.drag_from = Some(position);
                Some(canvas::Action::publish(Message::MapPanned(
                    (position.x - from.x) as f64,
                    (position.y - from.y) as f64,
                )))
            }
            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                state.drag_from.take().map(|_| canvas::Action::capture())
            }
            canvas::Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                let position = cursor.position_in(bounds)?;
                let lines = match delta {
                    mouse::ScrollDelta::Lines { y, .. } => *y,
                    mouse::ScrollDelta::Pixels { y, .. } => *y / PIXELS_PER_LINE,
                };
                Some(
                    canvas::Action::publish(Message::MapZoomed {
                        delta: (lines * WHEEL_STEP) as f64,
                        anchor: to_screen(position),
                        size: view.size(),
                    })
                    .and_capture(),
                )
            }
            _ => None,
        }
    }
}

#[derive(Default)]
pub struct Interaction {
    drag_from: Option<Point>,
    aiming: bool,
    shift: bool,
}

fn to_screen(point: Point) -> ScreenPoint {
    ScreenPoint::new(point.x as f64, point.y as f64)
}

fn to_point(point: ScreenPoint) -> Point {
    Point::new(point.x as f32, point.y as f32)
}

fn relative(cursor: mouse::Cursor, bounds: Rectangle) -> Option<Point> {
    cursor
        .position()
        .map(|p| Point::new(p.x - bounds.x, p.y - bounds.y))
}

impl<'a> canvas::Program<Message> for MapCanvas<'a> {
    type State = Interaction;

    fn update(
        &self,
        state: &mut Self::State,
        event: &canvas::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        let view = self
            .viewport
            .with_size(bounds.width as f64, bounds.height as f64);
        let action = self.interact(&view, state, event, bounds, cursor);
        if action.is_some() {
            return action;
        }
        // Size changes ride on events that produced nothing else.
        let (width, height) = self.viewport.size();
        if (width - bounds.width as f64).abs() > 0.5
            || (height - bounds.height as f64).abs() > 0.5
        {
            return Some(canvas::Action::publish(Message::MapResized(
                bounds.width as f64,
                bounds.height as f64,
            )));
        }
        None
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let view = self
            .viewport
            .with_size(bounds.width as f64, bounds.height as f64);
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.12, 0.13, 0.15),
        );

        for placement in view.visible_tiles() {
            let origin = to_point(placement.origin);
            let size = Size::new(placement.size as f32, placement.size as f32);
            match self.tiles.handle(placement.tile) {
                Some(handle) => {
                    frame.draw_image(
                        Rectangle::new(origin, size),
                        canvas::Image::new(handle.clone()),
                    );
                }
                None => {
                    let outline = Path::rectangle(origin, size);
                    frame.stroke(
                        &outline,
                        Stroke::default()
                            .with_width(1.0)
                            .with_color(Color::from_rgb(0.25, 0.26, 0.3)),
                    );
                }
            }
        }

        if let Some(selection) = &self.selection {
            let overlay = view.arrow_overlay(selection);
            let shaft = Path::line(to_point(overlay.origin), to_point(overlay.tip));
            frame.stroke(
                &shaft,
                Stroke::default().with_width(3.0).with_color(ARROW_COLOR),
            );
            let [tip, left, right] = overlay.head();
            let head = Path::new(|builder| {
                builder.move_to(to_point(tip));
                builder.line_to(to_point(left));
                builder.line_to(to_point(right));
                builder.close();
            });
            frame.fill(&head, ARROW_COLOR);
            let marker = Path::circle(to_point(overlay.origin), 5.0);
            frame.fill(&marker, ARROW_COLOR);
            frame.stroke(
                &marker,
                Stroke::default().with_width(1.5).with_color(Color::WHITE),
            );
        }

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if state.drag_from.is_some() {
            return mouse::Interaction::Grabbing;
        }
        if !cursor.is_over(bounds) {
            return mouse::Interaction::default();
        }
        match self.mode {
            InteractionMode::Pan => mouse::Interaction::Grab,
            InteractionMode::Draw => mouse::Interaction::Crosshair,
        }
    }
}
