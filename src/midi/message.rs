//! Channel voice messages as raw MIDI 1.0 bytes.

const NOTE_ON: u8 = 0x90;
const POLY_KEY_PRESSURE: u8 = 0xa0;
const CONTROL_CHANGE: u8 = 0xb0;
const PITCH_BEND: u8 = 0xe0;

/// A three-byte channel voice message: status, then two 7-bit data bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MidiMessage {
    bytes: [u8; 3],
}

impl MidiMessage {
    fn new(status: u8, channel: u8, data1: u8, data2: u8) -> Self {
        Self {
            bytes: [status | (channel & 0x0f), data1 & 0x7f, data2 & 0x7f],
        }
    }

    pub fn note_on(channel: u8, note: u8, velocity: u8) -> Self {
        Self::new(NOTE_ON, channel, note, velocity)
    }

    pub fn control_change(channel: u8, controller: u8, value: u8) -> Self {
        Self::new(CONTROL_CHANGE, channel, controller, value)
    }

    pub fn poly_key_pressure(channel: u8, note: u8, pressure: u8) -> Self {
        Self::new(POLY_KEY_PRESSURE, channel, note, pressure)
    }

    /// `value` is unsigned 14-bit with 0x2000 as center; sent LSB first.
    pub fn pitch_bend(channel: u8, value: u16) -> Self {
        let value = value.min(0x3fff);
        Self::new(PITCH_BEND, channel, (value & 0x7f) as u8, (value >> 7) as u8)
    }

    pub fn status(&self) -> u8 {
        self.bytes[0] & 0xf0
    }

    pub fn channel(&self) -> u8 {
        self.bytes[0] & 0x0f
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}
