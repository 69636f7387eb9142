use crate::midi::MidiMessage;

/// One output from the performance engine, mirroring the sink operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceEvent {
    /// Velocity 0 is a note-off.
    NoteOn { channel: u8, note: u8, velocity: u8 },
    PitchBend { channel: u8, value: u16 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    PolyKeyPressure { channel: u8, note: u8, pressure: u8 },
}

impl PerformanceEvent {
    pub fn channel(&self) -> u8 {
        match *self {
            PerformanceEvent::NoteOn { channel, .. }
            | PerformanceEvent::PitchBend { channel, .. }
            | PerformanceEvent::ControlChange { channel, .. }
            | PerformanceEvent::PolyKeyPressure { channel, .. } => channel,
        }
    }

    pub fn to_midi(&self) -> MidiMessage {
        match *self {
            PerformanceEvent::NoteOn {
                channel,
                note,
                velocity,
            } => MidiMessage::note_on(channel, note, velocity),
            PerformanceEvent::PitchBend { channel, value } => MidiMessage::pitch_bend(channel, value),
            PerformanceEvent::ControlChange {
                channel,
                controller,
                value,
            } => MidiMessage::control_change(channel, controller, value),
            PerformanceEvent::PolyKeyPressure {
                channel,
                note,
                pressure,
            } => MidiMessage::poly_key_pressure(channel, note, pressure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(PerformanceEvent::NoteOn { channel: 2, note: 60, velocity: 100 }, [0x92, 60, 100]; "note on")]
    #[test_case(PerformanceEvent::NoteOn { channel: 2, note: 60, velocity: 0 }, [0x92, 60, 0]; "note on as release")]
    #[test_case(PerformanceEvent::PitchBend { channel: 15, value: 0x3000 }, [0xef, 0x00, 0x60]; "pitch bend")]
    #[test_case(PerformanceEvent::ControlChange { channel: 0, controller: 1, value: 63 }, [0xb0, 1, 63]; "modulation")]
    #[test_case(PerformanceEvent::PolyKeyPressure { channel: 9, note: 40, pressure: 127 }, [0xa9, 40, 127]; "poly pressure")]
    fn encodes_to_wire_bytes(event: PerformanceEvent, expected: [u8; 3]) {
        let message = event.to_midi();
        assert_eq!(message.as_bytes(), &expected);
        assert_eq!(message.channel(), event.channel());
    }
}
