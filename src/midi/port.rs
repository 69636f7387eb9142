//! MIDI output port sink over `midir`.

use midir::{MidiOutput, MidiOutputConnection};
use tracing::{debug, info, warn};

use super::{MidiMessage, OutputSink};
use crate::error::MidiError;
use crate::events::PerformanceEvent;

const CLIENT_NAME: &str = "gridstrument";
const PORT_NAME: &str = "gridstrument-out";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiOutputDevice {
    pub index: usize,
    pub name: String,
}

/// Writes performance events to a hardware or virtual MIDI port. Without a
/// connection every event is dropped.
pub struct MidiPortSink {
    connection: Option<MidiOutputConnection>,
    device: Option<MidiOutputDevice>,
    dropped: u64,
}

impl MidiPortSink {
    pub fn disconnected() -> Self {
        Self {
            connection: None,
            device: None,
            dropped: 0,
        }
    }

    pub fn list_devices() -> Result<Vec<MidiOutputDevice>, MidiError> {
        let midi_out = MidiOutput::new(CLIENT_NAME)?;
        let mut devices = Vec::new();
        for (index, port) in midi_out.ports().iter().enumerate() {
            let name = midi_out.port_name(port)?;
            debug!("MIDI output {}: {}", index, name);
            devices.push(MidiOutputDevice { index, name });
        }
        Ok(devices)
    }

    pub fn connect(index: usize) -> Result<Self, MidiError> {
        let midi_out = MidiOutput::new(CLIENT_NAME)?;
        let ports = midi_out.ports();
        let port = ports.get(index).ok_or(MidiError::NoSuchPort(index))?;
        let name = midi_out.port_name(port)?;
        let connection = midi_out.connect(port, PORT_NAME)?;
        info!("Connected MIDI output {}: {}", index, name);
        Ok(Self {
            connection: Some(connection),
            device: Some(MidiOutputDevice { index, name }),
            dropped: 0,
        })
    }

    pub fn device(&self) -> Option<&MidiOutputDevice> {
        self.device.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Messages that could not be written.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    fn write(&mut self, message: MidiMessage) {
        let Some(connection) = self.connection.as_mut() else {
            return;
        };
        if let Err(e) = connection.send(message.as_bytes()) {
            self.dropped += 1;
            warn!("Dropped MIDI message {:02X?}: {}", message.as_bytes(), e);
        }
    }
}

impl OutputSink for MidiPortSink {
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        self.send(PerformanceEvent::NoteOn {
            channel,
            note,
            velocity,
        });
    }

    fn pitch_bend(&mut self, channel: u8, value: u16) {
        self.send(PerformanceEvent::PitchBend { channel, value });
    }

    fn control_change(&mut self, channel: u8, controller: u8, value: u8) {
        self.send(PerformanceEvent::ControlChange {
            channel,
            controller,
            value,
        });
    }

    fn poly_key_pressure(&mut self, channel: u8, note: u8, pressure: u8) {
        self.send(PerformanceEvent::PolyKeyPressure {
            channel,
            note,
            pressure,
        });
    }

    fn send(&mut self, event: PerformanceEvent) {
        self.write(event.to_midi());
    }
}
