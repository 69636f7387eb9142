use crate::events::PerformanceEvent;

/// Destination for performance output: a MIDI port, a synthesizer, or
/// several at once. Calls must not block and cannot fail from the caller's
/// side; a sink that loses an event deals with it itself.
pub trait OutputSink {
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8);
    fn pitch_bend(&mut self, channel: u8, value: u16);
    fn control_change(&mut self, channel: u8, controller: u8, value: u8);
    fn poly_key_pressure(&mut self, channel: u8, note: u8, pressure: u8);

    fn send(&mut self, event: PerformanceEvent) {
        match event {
            PerformanceEvent::NoteOn {
                channel,
                note,
                velocity,
            } => self.note_on(channel, note, velocity),
            PerformanceEvent::PitchBend { channel, value } => self.pitch_bend(channel, value),
            PerformanceEvent::ControlChange {
                channel,
                controller,
                value,
            } => self.control_change(channel, controller, value),
            PerformanceEvent::PolyKeyPressure {
                channel,
                note,
                pressure,
            } => self.poly_key_pressure(channel, note, pressure),
        }
    }
}

impl<S: OutputSink + ?Sized> OutputSink for Box<S> {
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        (**self).note_on(channel, note, velocity)
    }

    fn pitch_bend(&mut self, channel: u8, value: u16) {
        (**self).pitch_bend(channel, value)
    }

    fn control_change(&mut self, channel: u8, controller: u8, value: u8) {
        (**self).control_change(channel, controller, value)
    }

    fn poly_key_pressure(&mut self, channel: u8, note: u8, pressure: u8) {
        (**self).poly_key_pressure(channel, note, pressure)
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl OutputSink for NullSink {
    fn note_on(&mut self, _channel: u8, _note: u8, _velocity: u8) {}
    fn pitch_bend(&mut self, _channel: u8, _value: u16) {}
    fn control_change(&mut self, _channel: u8, _controller: u8, _value: u8) {}
    fn poly_key_pressure(&mut self, _channel: u8, _note: u8, _pressure: u8) {}
}

/// Records every event in order.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Vec<PerformanceEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[PerformanceEvent] {
        &self.events
    }

    pub fn take(&mut self) -> Vec<PerformanceEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl OutputSink for EventLog {
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        self.events.push(PerformanceEvent::NoteOn {
            channel,
            note,
            velocity,
        });
    }

    fn pitch_bend(&mut self, channel: u8, value: u16) {
        self.events.push(PerformanceEvent::PitchBend { channel, value });
    }

    fn control_change(&mut self, channel: u8, controller: u8, value: u8) {
        self.events.push(PerformanceEvent::ControlChange {
            channel,
            controller,
            value,
        });
    }

    fn poly_key_pressure(&mut self, channel: u8, note: u8, pressure: u8) {
        self.events.push(PerformanceEvent::PolyKeyPressure {
            channel,
            note,
            pressure,
        });
    }
}

/// Fans each event out to every member sink.
#[derive(Default)]
pub struct SinkSet {
    sinks: Vec<Box<dyn OutputSink>>,
}

impl SinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: impl OutputSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    /// Swaps the sink at `index`, returning the old one.
    pub fn replace(
        &mut self,
        index: usize,
        sink: impl OutputSink + 'static,
    ) -> Option<Box<dyn OutputSink>> {
        let slot = self.sinks.get_mut(index)?;
        Some(std::mem::replace(slot, Box::new(sink)))
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl OutputSink for SinkSet {
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        for sink in &mut self.sinks {
            sink.note_on(channel, note, velocity);
        }
    }

    fn pitch_bend(&mut self, channel: u8, value: u16) {
        for sink in &mut self.sinks {
            sink.pitch_bend(channel, value);
        }
    }

    fn control_change(&mut self, channel: u8, controller: u8, value: u8) {
        for sink in &mut self.sinks {
            sink.control_change(channel, controller, value);
        }
    }

    fn poly_key_pressure(&mut self, channel: u8, note: u8, pressure: u8) {
        for sink in &mut self.sinks {
            sink.poly_key_pressure(channel, note, pressure);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<EventLog>>);

    impl OutputSink for Shared {
        fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
            self.0.lock().unwrap().note_on(channel, note, velocity);
        }
        fn pitch_bend(&mut self, channel: u8, value: u16) {
            self.0.lock().unwrap().pitch_bend(channel, value);
        }
        fn control_change(&mut self, channel: u8, controller: u8, value: u8) {
            self.0.lock().unwrap().control_change(channel, controller, value);
        }
        fn poly_key_pressure(&mut self, channel: u8, note: u8, pressure: u8) {
            self.0.lock().unwrap().poly_key_pressure(channel, note, pressure);
        }
    }

    #[test]
    fn send_dispatches_by_variant() {
        let mut log = EventLog::new();
        let events = [
            PerformanceEvent::NoteOn { channel: 1, note: 60, velocity: 90 },
            PerformanceEvent::PitchBend { channel: 1, value: 0x2100 },
            PerformanceEvent::ControlChange { channel: 1, controller: 1, value: 12 },
            PerformanceEvent::PolyKeyPressure { channel: 1, note: 60, pressure: 70 },
        ];
        for event in events {
            log.send(event);
        }
        assert_eq!(log.events(), &events);
        assert_eq!(log.take().len(), 4);
        assert!(log.events().is_empty());
    }

    #[test]
    fn sink_set_fans_out() {
        let first = Shared::default();
        let second = Shared::default();
        let mut set = SinkSet::new();
        set.push(first.clone());
        set.push(NullSink);
        set.push(second.clone());
        assert_eq!(set.len(), 3);

        set.note_on(0, 64, 100);
        set.control_change(0, 1, 0);

        let a = first.0.lock().unwrap().events().to_vec();
        let b = second.0.lock().unwrap().events().to_vec();
        assert_eq!(a.len(), 2);
        assert_eq!(a, b);
    }

    #[test]
    fn replace_swaps_member() {
        let kept = Shared::default();
        let mut set = SinkSet::new();
        set.push(NullSink);
        assert!(set.replace(0, kept.clone()).is_some());
        assert!(set.replace(5, NullSink).is_none());
        set.pitch_bend(2, 0x2000);
        assert_eq!(kept.0.lock().unwrap().events().len(), 1);
    }
}
