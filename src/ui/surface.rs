//! The playing surface. Engine coordinates are device pixels; egui works in
//! logical points, so everything crossing that boundary is scaled by
//! `pixels_per_point`.

use std::collections::HashSet;

use eframe::egui;

use crate::engine::EngineCommand;
use crate::geometry::{Point, Rect, ScreenSize};
use crate::grid::{PointF, note_name};
use crate::performance::{SurfaceSnapshot, TouchId};

/// Id for the mouse, which never collides with platform touch ids in practice.
const MOUSE_ID: TouchId = u64::MAX;
/// Raw pressure reported for contacts without force information.
const DEFAULT_RAW_PRESSURE: u32 = 512;

const BACKGROUND: egui::Color32 = egui::Color32::from_rgb(20, 20, 24);
const CELL_LINE: egui::Color32 = egui::Color32::from_rgb(70, 70, 80);
const TONIC_LINE: egui::Color32 = egui::Color32::from_rgb(120, 120, 150);
const LABEL: egui::Color32 = egui::Color32::from_rgb(150, 150, 160);

/// Draws the grid and the active touches.
pub struct SurfaceView<'a> {
    snapshot: Option<&'a SurfaceSnapshot>,
}

impl<'a> SurfaceView<'a> {
    pub fn new(snapshot: Option<&'a SurfaceSnapshot>) -> Self {
        Self { snapshot }
    }

    pub fn show(self, ui: &mut egui::Ui) -> egui::Rect {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let rect = response.rect;
        painter.rect_filled(rect, 0.0, BACKGROUND);

        let Some(snapshot) = self.snapshot else {
            return rect;
        };
        let scale = ui.ctx().pixels_per_point();
        let to_screen = |p: PointF| {
            egui::pos2(
                rect.left() + p.x as f32 / scale,
                rect.top() + p.y as f32 / scale,
            )
        };
        let layout = &snapshot.layout;

        for session in &snapshot.sessions {
            let r = session.rect;
            let intensity = (session.pressure as u16 * 2).min(255) as u8;
            let fill = egui::Color32::from_rgb(intensity, 0, intensity);
            let contact = egui::Rect::from_min_max(
                to_screen(PointF::from(Point::new(r.left, r.top))),
                to_screen(PointF::from(Point::new(r.right, r.bottom))),
            );
            painter.rect_filled(contact, 4.0, fill);
        }

        for cell in layout.cells() {
            let note = layout.cell_to_note(cell);
            let color = if note % 12 == 0 { TONIC_LINE } else { CELL_LINE };
            let outline: Vec<egui::Pos2> = layout
                .cell_outline(cell)
                .into_iter()
                .map(to_screen)
                .collect();
            painter.add(egui::Shape::closed_line(outline, egui::Stroke::new(1.0, color)));
            painter.text(
                to_screen(layout.cell_center(cell)),
                egui::Align2::CENTER_CENTER,
                note_name(note),
                egui::FontId::proportional(12.0),
                LABEL,
            );
        }

        rect
    }
}

/// Size in device pixels of a surface laid out at `surface` points.
pub fn surface_size(surface: egui::Rect, pixels_per_point: f32) -> ScreenSize {
    ScreenSize::new(
        (surface.width().max(0.0) * pixels_per_point).round() as u32,
        (surface.height().max(0.0) * pixels_per_point).round() as u32,
    )
}

/// Turns egui touch and mouse input over the surface into engine commands.
#[derive(Default)]
pub struct TouchInput {
    active: HashSet<TouchId>,
    touch_seen: bool,
}

impl TouchInput {
    pub fn collect(
        &mut self,
        ctx: &egui::Context,
        surface: egui::Rect,
        grid_size: u32,
    ) -> Vec<EngineCommand> {
        let events = ctx.input(|i| i.events.clone());
        self.translate(&events, surface, grid_size, ctx.pixels_per_point())
    }

    pub fn translate(
        &mut self,
        events: &[egui::Event],
        surface: egui::Rect,
        grid_size: u32,
        pixels_per_point: f32,
    ) -> Vec<EngineCommand> {
        let mut commands = Vec::new();
        let contact = Contact {
            surface,
            pixels_per_point,
        };

        for event in events {
            match *event {
                egui::Event::Touch {
                    id, phase, pos, force, ..
                } => {
                    self.touch_seen = true;
                    let raw_pressure = force
                        .map(|f| (f.clamp(0.0, 1.0) * 1024.0) as u32)
                        .unwrap_or(DEFAULT_RAW_PRESSURE);
                    let phase = match phase {
                        egui::TouchPhase::Start => Phase::Down,
                        egui::TouchPhase::Move => Phase::Move,
                        egui::TouchPhase::End | egui::TouchPhase::Cancel => Phase::Up,
                    };
                    self.apply(
                        &mut commands,
                        &contact,
                        id.0,
                        pos,
                        contact_half_extent(force, grid_size),
                        raw_pressure,
                        phase,
                    );
                }
                // egui mirrors the first touch as pointer events; only use
                // those when there is no touchscreen
                egui::Event::PointerButton {
                    pos,
                    button: egui::PointerButton::Primary,
                    pressed,
                    ..
                } if !self.touch_seen => {
                    self.apply(
                        &mut commands,
                        &contact,
                        MOUSE_ID,
                        pos,
                        contact_half_extent(None, grid_size),
                        DEFAULT_RAW_PRESSURE,
                        if pressed { Phase::Down } else { Phase::Up },
                    );
                }
                egui::Event::PointerMoved(pos) if !self.touch_seen => {
                    self.apply(
                        &mut commands,
                        &contact,
                        MOUSE_ID,
                        pos,
                        contact_half_extent(None, grid_size),
                        DEFAULT_RAW_PRESSURE,
                        Phase::Move,
                    );
                }
                // a release outside the window never arrives
                egui::Event::PointerGone if !self.touch_seen => {
                    if self.active.remove(&MOUSE_ID) {
                        commands.push(EngineCommand::TouchUp { id: MOUSE_ID });
                    }
                }
                _ => {}
            }
        }
        commands
    }

    /// Forget all contacts, e.g. after the engine released them.
    pub fn clear(&mut self) {
        self.active.clear();
    }

    #[allow(clippy::too_many_arguments)]
    fn apply(
        &mut self,
        commands: &mut Vec<EngineCommand>,
        contact: &Contact,
        id: TouchId,
        pos: egui::Pos2,
        half_extent: i32,
        raw_pressure: u32,
        phase: Phase,
    ) {
        let point = contact.to_pixels(pos);
        let rect = Rect::from_center(point, half_extent);

        match phase {
            Phase::Down => {
                // contacts that begin off the surface are not ours
                if contact.surface.contains(pos) && self.active.insert(id) {
                    commands.push(EngineCommand::TouchDown {
                        id,
                        rect,
                        point,
                        raw_pressure,
                    });
                }
            }
            Phase::Up => {
                if self.active.remove(&id) {
                    commands.push(EngineCommand::TouchUp { id });
                }
            }
            Phase::Move => {
                if self.active.contains(&id) {
                    commands.push(EngineCommand::TouchMove {
                        id,
                        rect,
                        point,
                        raw_pressure,
                    });
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Down,
    Move,
    Up,
}

struct Contact {
    surface: egui::Rect,
    pixels_per_point: f32,
}

impl Contact {
    fn to_pixels(&self, pos: egui::Pos2) -> Point {
        Point::new(
            ((pos.x - self.surface.left()) * self.pixels_per_point).round() as i32,
            ((pos.y - self.surface.top()) * self.pixels_per_point).round() as i32,
        )
    }
}

/// egui reports no contact size, so one is made up from the force: a
/// quarter cell at half force. In device pixels, like `grid_size`.
fn contact_half_extent(force: Option<f32>, grid_size: u32) -> i32 {
    let force = force.unwrap_or(0.5).clamp(0.0, 1.0);
    (grid_size as f32 / 4.0 * (0.5 + force)).round() as i32
}
