use std::collections::HashMap;

use tracing::{debug, trace};

use super::session::{
    TouchId, TouchSession, modulation_from_delta, pitch_bend_from_delta, pressure_from_rect,
};
use crate::error::EngineError;
use crate::events::PerformanceEvent;
use crate::geometry::{Point, Rect, ScreenSize};
use crate::grid::{GridCell, GridExtent, GridLayout};
use crate::midi::OutputSink;
use crate::prefs::PreferenceSet;

/// Read-only view of one touch for drawing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub id: TouchId,
    pub rect: Rect,
    pub point: Point,
    pub note: Option<u8>,
    pub channel: u8,
    pub pressure: u8,
    pub pitch_bend: u16,
    pub modulation: u8,
}

impl From<&TouchSession> for SessionView {
    fn from(session: &TouchSession) -> Self {
        Self {
            id: session.id(),
            rect: session.contact_rect(),
            point: session.point(),
            note: session.note(),
            channel: session.channel(),
            pressure: session.pressure(),
            pitch_bend: session.pitch_bend(),
            modulation: session.modulation(),
        }
    }
}

/// Everything a renderer needs for one frame, detached from the engine.
#[derive(Debug, Clone)]
pub struct SurfaceSnapshot {
    pub layout: GridLayout,
    pub sessions: Vec<SessionView>,
}

impl SurfaceSnapshot {
    pub fn extent(&self) -> GridExtent {
        self.layout.extent()
    }
}

/// Turns touch events into note, pitch-bend, modulation and pressure output.
///
/// Owns the active touches and the round-robin channel cursor. All mutation
/// happens through `touch_down`, `touch_move`, `touch_up` and `release_all`,
/// which must be called from one thread in event order.
pub struct PerformanceEngine<S> {
    prefs: PreferenceSet,
    layout: GridLayout,
    sessions: HashMap<TouchId, TouchSession>,
    next_channel: u8,
    sink: S,
}

impl<S: OutputSink> PerformanceEngine<S> {
    pub fn new(prefs: PreferenceSet, sink: S) -> Self {
        Self {
            layout: GridLayout::new(&prefs),
            next_channel: prefs.midi_channel_min(),
            prefs,
            sessions: HashMap::new(),
            sink,
        }
    }

    pub fn preferences(&self) -> &PreferenceSet {
        &self.prefs
    }

    /// Applies new preferences. Active touches keep their note and channel;
    /// their movement is mapped with the new settings from here on.
    pub fn set_preferences(&mut self, prefs: PreferenceSet) {
        self.layout.configure(&prefs);
        if !(prefs.midi_channel_min()..=prefs.midi_channel_max()).contains(&self.next_channel) {
            self.next_channel = prefs.midi_channel_min();
        }
        self.prefs = prefs;
        debug!("Preferences applied, grid {:?}", self.layout.extent());
    }

    pub fn resize(&mut self, screen: ScreenSize) {
        self.layout.resize(screen);
        debug!(
            "Resized to {}x{}, grid {:?}",
            screen.width,
            screen.height,
            self.layout.extent()
        );
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn extent(&self) -> GridExtent {
        self.layout.extent()
    }

    pub fn next_channel(&self) -> u8 {
        self.next_channel
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn session(&self, id: TouchId) -> Option<&TouchSession> {
        self.sessions.get(&id)
    }

    pub fn sessions(&self) -> impl Iterator<Item = &TouchSession> {
        self.sessions.values()
    }

    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn snapshot(&self) -> SurfaceSnapshot {
        let mut sessions: Vec<SessionView> = self.sessions.values().map(SessionView::from).collect();
        sessions.sort_by_key(|s| s.id);
        SurfaceSnapshot {
            layout: self.layout.clone(),
            sessions,
        }
    }

    pub fn touch_down(
        &mut self,
        id: TouchId,
        rect: Rect,
        point: Point,
        raw_pressure: u32,
    ) -> Result<(), EngineError> {
        if self.sessions.contains_key(&id) {
            return Err(EngineError::DuplicateId(id));
        }

        let cell = self.layout.point_to_cell(point);
        let note = cell.map(|cell| self.layout.cell_to_note(cell));
        let channel = self.allocate_channel(cell);
        let pressure = pressure_from_rect(rect, &self.prefs);

        self.sessions.insert(
            id,
            TouchSession::new(id, rect, point, raw_pressure, note, channel, pressure),
        );
        debug!(
            "Touch {} down at ({}, {}): note {:?} channel {}",
            id, point.x, point.y, note, channel
        );

        if let Some(note) = note {
            // a zero velocity note-on would be a note-off
            let velocity = pressure.max(1);
            emit(
                &mut self.sink,
                PerformanceEvent::NoteOn {
                    channel,
                    note,
                    velocity,
                },
            );
        }
        Ok(())
    }

    pub fn touch_move(
        &mut self,
        id: TouchId,
        rect: Rect,
        point: Point,
        raw_pressure: u32,
    ) -> Result<(), EngineError> {
        let Self {
            prefs,
            sessions,
            sink,
            ..
        } = self;
        let session = active_session(sessions, id)?;
        session.update(rect, point, raw_pressure);

        let channel = session.channel();
        let delta = session.point_change();

        let bend = pitch_bend_from_delta(delta.x, prefs);
        if bend != session.modulation_x {
            session.modulation_x = bend;
            emit(sink, PerformanceEvent::PitchBend { channel, value: bend });
        }

        let modulation = modulation_from_delta(delta.y, prefs);
        if modulation != session.modulation_y {
            session.modulation_y = modulation;
            emit(
                sink,
                PerformanceEvent::ControlChange {
                    channel,
                    controller: prefs.modulation_controller(),
                    value: modulation,
                },
            );
        }

        let pressure = pressure_from_rect(rect, prefs);
        if pressure != session.modulation_z {
            session.modulation_z = pressure;
            if let Some(note) = session.note() {
                emit(
                    sink,
                    PerformanceEvent::PolyKeyPressure {
                        channel,
                        note,
                        pressure,
                    },
                );
            }
        }
        Ok(())
    }

    pub fn touch_up(&mut self, id: TouchId) -> Result<(), EngineError> {
        let session = self
            .sessions
            .remove(&id)
            .ok_or(EngineError::UnknownId(id))?;
        debug!("Touch {} up", id);
        finish(&mut self.sink, &self.prefs, &session);
        Ok(())
    }

    /// Ends every active touch as if its touch-up had arrived, lowest id
    /// first, and rewinds the channel cursor. For when the platform can no
    /// longer deliver touch-ups, e.g. on focus loss or device change.
    pub fn release_all(&mut self) {
        let mut released: Vec<TouchSession> = self.sessions.drain().map(|(_, s)| s).collect();
        released.sort_by_key(|s| s.id());
        for session in &released {
            finish(&mut self.sink, &self.prefs, session);
        }
        self.next_channel = self.prefs.midi_channel_min();
        if !released.is_empty() {
            debug!("Released {} touches", released.len());
        }
    }

    fn allocate_channel(&mut self, cell: Option<GridCell>) -> u8 {
        let min = self.prefs.midi_channel_min();
        let max = self.prefs.midi_channel_max();

        let mut channel = self.next_channel;
        self.next_channel = if channel >= max { min } else { channel + 1 };

        if self.prefs.channel_per_row_mode() {
            if let Some(cell) = cell {
                let count = self.prefs.channel_count() as i32;
                channel = (cell.row.rem_euclid(count) + min as i32) as u8;
                self.next_channel = channel;
            }
        }
        channel
    }
}

fn active_session(
    sessions: &mut HashMap<TouchId, TouchSession>,
    id: TouchId,
) -> Result<&mut TouchSession, EngineError> {
    sessions.get_mut(&id).ok_or(EngineError::UnknownId(id))
}

fn finish<S: OutputSink>(sink: &mut S, prefs: &PreferenceSet, session: &TouchSession) {
    let channel = session.channel();
    if let Some(note) = session.note() {
        emit(
            sink,
            PerformanceEvent::NoteOn {
                channel,
                note,
                velocity: 0,
            },
        );
    }
    emit(
        sink,
        PerformanceEvent::ControlChange {
            channel,
            controller: prefs.modulation_controller(),
            value: 0,
        },
    );
}

fn emit<S: OutputSink>(sink: &mut S, event: PerformanceEvent) {
    trace!(?event, "emit");
    sink.send(event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::EventLog;
    use pretty_assertions::assert_eq;

    fn engine() -> PerformanceEngine<EventLog> {
        let mut prefs = PreferenceSet::default();
        prefs.set_grid_size(90);
        prefs.set_midi_channel_range(0, 2);
        let mut engine = PerformanceEngine::new(prefs, EventLog::new());
        engine.resize(ScreenSize::new(900, 540));
        engine
    }

    fn touch(engine: &mut PerformanceEngine<EventLog>, id: TouchId, x: i32, y: i32) {
        let point = Point::new(x, y);
        engine
            .touch_down(id, Rect::from_center(point, 22), point, 512)
            .unwrap();
    }

    #[test]
    fn rejected_events_leave_state_alone() {
        let mut engine = engine();
        touch(&mut engine, 1, 45, 45);
        engine.sink_mut().clear();
        let cursor = engine.next_channel();

        let point = Point::new(300, 300);
        assert_eq!(
            engine.touch_down(1, Rect::from_center(point, 22), point, 512),
            Err(EngineError::DuplicateId(1))
        );
        assert_eq!(
            engine.touch_move(7, Rect::from_center(point, 22), point, 512),
            Err(EngineError::UnknownId(7))
        );
        assert_eq!(engine.touch_up(7), Err(EngineError::UnknownId(7)));

        assert_eq!(engine.active_count(), 1);
        assert_eq!(engine.session(1).unwrap().point(), Point::new(45, 45));
        assert_eq!(engine.next_channel(), cursor);
        assert!(engine.sink().events().is_empty());
    }

    #[test]
    fn per_row_channel_moves_cursor() {
        let mut engine = engine();
        let mut prefs = engine.preferences().clone();
        prefs.set_channel_per_row_mode(true);
        engine.set_preferences(prefs);

        // row 4, three channels: 4 % 3 = 1
        touch(&mut engine, 1, 45, 4 * 90 + 45);
        assert_eq!(engine.session(1).unwrap().channel(), 1);
        assert_eq!(engine.next_channel(), 1);

        let mut prefs = engine.preferences().clone();
        prefs.set_channel_per_row_mode(false);
        engine.set_preferences(prefs);
        touch(&mut engine, 2, 45, 45);
        assert_eq!(engine.session(2).unwrap().channel(), 1);
        assert_eq!(engine.next_channel(), 2);
    }

    #[test]
    fn per_row_outside_grid_falls_back_to_round_robin() {
        let mut engine = engine();
        let mut prefs = engine.preferences().clone();
        prefs.set_channel_per_row_mode(true);
        engine.set_preferences(prefs);

        touch(&mut engine, 1, 5000, 5000);
        let session = engine.session(1).unwrap();
        assert_eq!(session.note(), None);
        assert_eq!(session.channel(), 0);
        assert_eq!(engine.next_channel(), 1);
    }

    #[test]
    fn narrowing_channel_range_pulls_cursor_back() {
        let mut engine = engine();
        touch(&mut engine, 1, 45, 45);
        touch(&mut engine, 2, 135, 45);
        assert_eq!(engine.next_channel(), 2);

        let mut prefs = engine.preferences().clone();
        prefs.set_midi_channel_range(0, 1);
        engine.set_preferences(prefs);
        assert_eq!(engine.next_channel(), 0);
    }

    #[test]
    fn snapshot_is_sorted_and_detached() {
        let mut engine = engine();
        touch(&mut engine, 9, 45, 45);
        touch(&mut engine, 3, 135, 45);
        let snapshot = engine.snapshot();
        engine.touch_up(9).unwrap();

        let ids: Vec<TouchId> = snapshot.sessions.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![3, 9]);
        assert_eq!(snapshot.extent(), GridExtent { cols: 10, rows: 6 });
        assert_eq!(engine.snapshot().sessions.len(), 1);
    }

    #[test]
    fn zero_area_touch_still_sounds() {
        let mut engine = engine();
        let point = Point::new(45, 45);
        engine.touch_down(1, Rect::new(45, 45, 45, 45), point, 0).unwrap();
        assert_eq!(engine.session(1).unwrap().pressure(), 0);
        assert!(matches!(
            engine.sink().events(),
            [PerformanceEvent::NoteOn { velocity: 1, .. }]
        ));
    }
}
