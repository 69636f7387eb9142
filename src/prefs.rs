use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::PrefsError;

pub const PITCH_BEND_RANGE: (u32, u32) = (1, 12);
pub const PITCH_BEND_MASK: (u16, u16) = (0x2000, 0x3fff);
pub const MODULATION_CONTROLLER: (u8, u8) = (1, 119);
pub const MIDI_CHANNEL: (u8, u8) = (0, 15);
pub const GRID_SIZE: (u32, u32) = (40, 400);

/// Player preferences. Every setter clamps into the valid range, so a
/// `PreferenceSet` is always usable as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceSet {
    guitar_mode: bool,
    pitch_bend_range: u32,
    pitch_bend_mask: u16,
    modulation_controller: u8,
    midi_channel_min: u8,
    midi_channel_max: u8,
    grid_size: u32,
    channel_per_row_mode: bool,
    hex_grid_mode: bool,
    midi_device_index: usize,
}

impl Default for PreferenceSet {
    fn default() -> Self {
        Self {
            guitar_mode: false,
            pitch_bend_range: 12,
            pitch_bend_mask: 0x3fff,
            modulation_controller: 1,
            midi_channel_min: 0,
            midi_channel_max: 9,
            grid_size: 90,
            channel_per_row_mode: false,
            hex_grid_mode: false,
            midi_device_index: 0,
        }
    }
}

impl PreferenceSet {
    pub fn guitar_mode(&self) -> bool {
        self.guitar_mode
    }

    pub fn set_guitar_mode(&mut self, on: bool) {
        self.guitar_mode = on;
    }

    /// Grid cells of horizontal travel for a full pitch bend.
    pub fn pitch_bend_range(&self) -> u32 {
        self.pitch_bend_range
    }

    pub fn set_pitch_bend_range(&mut self, range: u32) {
        self.pitch_bend_range = range.clamp(PITCH_BEND_RANGE.0, PITCH_BEND_RANGE.1);
    }

    pub fn pitch_bend_mask(&self) -> u16 {
        self.pitch_bend_mask
    }

    pub fn set_pitch_bend_mask(&mut self, mask: u16) {
        self.pitch_bend_mask = mask.clamp(PITCH_BEND_MASK.0, PITCH_BEND_MASK.1);
    }

    pub fn modulation_controller(&self) -> u8 {
        self.modulation_controller
    }

    pub fn set_modulation_controller(&mut self, controller: u8) {
        self.modulation_controller =
            controller.clamp(MODULATION_CONTROLLER.0, MODULATION_CONTROLLER.1);
    }

    pub fn midi_channel_min(&self) -> u8 {
        self.midi_channel_min
    }

    pub fn midi_channel_max(&self) -> u8 {
        self.midi_channel_max
    }

    /// Sets the channel range; `max` is raised to `min` if given below it.
    pub fn set_midi_channel_range(&mut self, min: u8, max: u8) {
        let min = min.clamp(MIDI_CHANNEL.0, MIDI_CHANNEL.1);
        let max = max.clamp(MIDI_CHANNEL.0, MIDI_CHANNEL.1).max(min);
        self.midi_channel_min = min;
        self.midi_channel_max = max;
    }

    /// Number of channels in the configured range.
    pub fn channel_count(&self) -> u8 {
        self.midi_channel_max - self.midi_channel_min + 1
    }

    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    pub fn set_grid_size(&mut self, size: u32) {
        self.grid_size = size.clamp(GRID_SIZE.0, GRID_SIZE.1);
    }

    pub fn channel_per_row_mode(&self) -> bool {
        self.channel_per_row_mode
    }

    pub fn set_channel_per_row_mode(&mut self, on: bool) {
        self.channel_per_row_mode = on;
    }

    pub fn hex_grid_mode(&self) -> bool {
        self.hex_grid_mode
    }

    pub fn set_hex_grid_mode(&mut self, on: bool) {
        self.hex_grid_mode = on;
    }

    pub fn midi_device_index(&self) -> usize {
        self.midi_device_index
    }

    pub fn set_midi_device_index(&mut self, index: usize) {
        self.midi_device_index = index;
    }

    /// Runs every field through its setter. Deserialization bypasses the
    /// setters, so loaded sets go through here.
    pub fn sanitized(mut self) -> Self {
        self.set_pitch_bend_range(self.pitch_bend_range);
        self.set_pitch_bend_mask(self.pitch_bend_mask);
        self.set_modulation_controller(self.modulation_controller);
        self.set_midi_channel_range(self.midi_channel_min, self.midi_channel_max);
        self.set_grid_size(self.grid_size);
        self
    }

    pub fn save(&self, path: &Path) -> Result<(), PrefsError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        fs::write(path, ron_string)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, PrefsError> {
        let ron_string = fs::read_to_string(path)?;
        let prefs: PreferenceSet = ron::from_str(&ron_string)?;
        Ok(prefs.sanitized())
    }

    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, PrefsError> {
        if !path.exists() {
            tracing::info!("No preferences at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }
}
