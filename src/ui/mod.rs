mod surface;

use std::path::PathBuf;

use eframe::egui;
use surface::{SurfaceView, TouchInput, surface_size};
use tracing::{info, warn};

use crate::geometry::ScreenSize;
use crate::performance::SurfaceSnapshot;
use crate::prefs::{GRID_SIZE, MIDI_CHANNEL, PITCH_BEND_RANGE, PreferenceSet};
use crate::{EngineClient, EngineCommand, EngineUpdate};

pub struct GridStrumentApp {
    engine: EngineClient,
    prefs: PreferenceSet,
    prefs_path: PathBuf,
    prefs_modified: bool,
    surface: Option<SurfaceSnapshot>,
    surface_size: Option<ScreenSize>,
    midi_devices: Vec<String>,
    selected_device: Option<usize>,
    error_message: Option<String>,
    input: TouchInput,
    focused: bool,
    show_settings: bool,
}

impl GridStrumentApp {
    pub fn new(engine: EngineClient, prefs: PreferenceSet, prefs_path: PathBuf) -> Self {
        Self {
            engine,
            prefs,
            prefs_path,
            prefs_modified: false,
            surface: None,
            surface_size: None,
            midi_devices: Vec::new(),
            selected_device: None,
            error_message: None,
            input: TouchInput::default(),
            focused: true,
            show_settings: false,
        }
    }

    fn send(&self, command: EngineCommand) {
        let _ = self.engine.command_tx.send(command);
    }

    fn process_engine_updates(&mut self) {
        while let Ok(update) = self.engine.update_rx.try_recv() {
            match update {
                EngineUpdate::Surface(snapshot) => {
                    self.surface = Some(snapshot);
                }
                EngineUpdate::MidiDevices { names, selected } => {
                    self.midi_devices = names;
                    self.selected_device = selected;
                }
                EngineUpdate::Error { message } => {
                    self.error_message = Some(message);
                }
            }
        }
    }

    fn preferences_changed(&mut self) {
        self.prefs_modified = true;
        self.send(EngineCommand::SetPreferences(self.prefs.clone()));
    }

    fn save_preferences(&mut self) {
        match self.prefs.save(&self.prefs_path) {
            Ok(()) => {
                self.prefs_modified = false;
                info!("Preferences saved to {}", self.prefs_path.display());
            }
            Err(e) => {
                self.error_message = Some(format!("Failed to save preferences: {}", e));
            }
        }
    }

    fn release_all(&mut self) {
        self.input.clear();
        self.send(EngineCommand::ReleaseAll);
    }

    fn menu_bar(&mut self, ui: &mut egui::Ui) {
        egui::MenuBar::new().ui(ui, |ui| {
            ui.menu_button("File", |ui| {
                let save_button = if self.prefs_modified {
                    ui.button("💾 Save Preferences *")
                } else {
                    ui.button("💾 Save Preferences")
                };
                if save_button.clicked() {
                    self.save_preferences();
                    ui.close();
                }

                ui.separator();

                if ui.button("Quit").clicked() {
                    ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            if ui.button("⚙ Settings").clicked() {
                self.show_settings = !self.show_settings;
            }
            if ui.button("⏹ All Notes Off").clicked() {
                self.release_all();
            }
        });
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        let mut changed = false;

        ui.horizontal(|ui| {
            let selected_text = self
                .selected_device
                .and_then(|i| self.midi_devices.get(i))
                .cloned()
                .unwrap_or_else(|| "No MIDI output".to_string());
            egui::ComboBox::from_label("MIDI out")
                .selected_text(selected_text)
                .show_ui(ui, |ui| {
                    for (i, name) in self.midi_devices.iter().enumerate() {
                        if ui
                            .selectable_label(self.selected_device == Some(i), name)
                            .clicked()
                        {
                            self.prefs.set_midi_device_index(i);
                            changed = true;
                        }
                    }
                });

            ui.separator();

            let mut hex = self.prefs.hex_grid_mode();
            if ui.checkbox(&mut hex, "Hex grid").changed() {
                self.prefs.set_hex_grid_mode(hex);
                changed = true;
            }
            let mut guitar = self.prefs.guitar_mode();
            if ui.checkbox(&mut guitar, "Guitar").changed() {
                self.prefs.set_guitar_mode(guitar);
                changed = true;
            }
            let mut per_row = self.prefs.channel_per_row_mode();
            if ui.checkbox(&mut per_row, "Channel per row").changed() {
                self.prefs.set_channel_per_row_mode(per_row);
                changed = true;
            }

            ui.separator();

            let mut grid_size = self.prefs.grid_size();
            if ui
                .add(egui::Slider::new(&mut grid_size, GRID_SIZE.0..=GRID_SIZE.1).text("Cell size"))
                .changed()
            {
                self.prefs.set_grid_size(grid_size);
                changed = true;
            }
        });

        if changed {
            self.preferences_changed();
        }
    }

    fn settings(&mut self, ui: &mut egui::Ui) {
        let mut changed = false;

        egui::Grid::new("settings").num_columns(2).show(ui, |ui| {
            ui.label("Pitch bend range (semitones)");
            let mut range = self.prefs.pitch_bend_range();
            if ui
                .add(egui::DragValue::new(&mut range).range(PITCH_BEND_RANGE.0..=PITCH_BEND_RANGE.1))
                .changed()
            {
                self.prefs.set_pitch_bend_range(range);
                changed = true;
            }
            ui.end_row();

            ui.label("Pitch bend mask");
            let mut mask = self.prefs.pitch_bend_mask();
            if ui
                .add(egui::DragValue::new(&mut mask).hexadecimal(4, false, true))
                .changed()
            {
                self.prefs.set_pitch_bend_mask(mask);
                changed = true;
            }
            ui.end_row();

            ui.label("Modulation controller");
            let mut controller = self.prefs.modulation_controller();
            if ui.add(egui::DragValue::new(&mut controller)).changed() {
                self.prefs.set_modulation_controller(controller);
                changed = true;
            }
            ui.end_row();

            ui.label("MIDI channels");
            let mut min = self.prefs.midi_channel_min();
            let mut max = self.prefs.midi_channel_max();
            let channels = MIDI_CHANNEL.0..=MIDI_CHANNEL.1;
            ui.horizontal(|ui| {
                let lo = ui.add(egui::DragValue::new(&mut min).range(channels.clone()));
                ui.label("to");
                let hi = ui.add(egui::DragValue::new(&mut max).range(channels));
                if lo.changed() || hi.changed() {
                    self.prefs.set_midi_channel_range(min, max);
                    changed = true;
                }
            });
            ui.end_row();
        });

        if changed {
            self.preferences_changed();
        }
    }

    fn handle_focus(&mut self, ctx: &egui::Context) {
        let focused = ctx.input(|i| i.focused);
        if self.focused && !focused {
            warn!("Window lost focus, releasing all notes");
            self.release_all();
        }
        self.focused = focused;
    }
}

impl eframe::App for GridStrumentApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_engine_updates();
        self.handle_focus(ctx);

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            self.menu_bar(ui);
            self.toolbar(ui);
        });

        if self.show_settings {
            egui::SidePanel::right("settings")
                .min_width(260.0)
                .show(ctx, |ui| {
                    ui.heading("Settings");
                    ui.separator();
                    self.settings(ui);
                });
        }

        if let Some(ref error) = self.error_message {
            egui::TopBottomPanel::top("error").show(ctx, |ui| {
                ui.colored_label(egui::Color32::RED, error);
            });
        }

        let panel = egui::CentralPanel::default().frame(egui::Frame::NONE);
        let surface_rect = panel
            .show(ctx, |ui| SurfaceView::new(self.surface.as_ref()).show(ui))
            .inner;

        let size = surface_size(surface_rect, ctx.pixels_per_point());
        if self.surface_size != Some(size) {
            self.surface_size = Some(size);
            self.send(EngineCommand::Resize(size));
        }

        for command in self
            .input
            .collect(ctx, surface_rect, self.prefs.grid_size())
        {
            self.send(command);
        }

        ctx.request_repaint();
    }
}

impl Drop for GridStrumentApp {
    fn drop(&mut self) {
        if self.prefs_modified {
            self.save_preferences();
        }
    }
}
