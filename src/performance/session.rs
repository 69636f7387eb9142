use crate::geometry::{Point, Rect};
use crate::prefs::PreferenceSet;

/// Identity of a finger contact, as supplied by the input layer.
pub type TouchId = u64;

pub const PITCH_BEND_CENTER: u16 = 0x2000;
pub const PITCH_BEND_MAX: u16 = 0x3fff;
pub const MIDI_VALUE_MAX: u8 = 0x7f;

/// Live state of one finger from touch-down to touch-up.
///
/// `note`, `channel` and `starting_point` are fixed when the session is
/// created. The three `modulation_*` fields hold the last values sent for the
/// session and only serve to suppress repeats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TouchSession {
    id: TouchId,
    contact_rect: Rect,
    point: Point,
    starting_point: Point,
    raw_pressure: u32,
    note: Option<u8>,
    channel: u8,
    pub(crate) modulation_x: u16,
    pub(crate) modulation_y: u8,
    pub(crate) modulation_z: u8,
}

impl TouchSession {
    pub fn new(
        id: TouchId,
        contact_rect: Rect,
        point: Point,
        raw_pressure: u32,
        note: Option<u8>,
        channel: u8,
        pressure: u8,
    ) -> Self {
        Self {
            id,
            contact_rect,
            point,
            starting_point: point,
            raw_pressure,
            note,
            channel,
            modulation_x: 0,
            modulation_y: 0,
            modulation_z: pressure,
        }
    }

    pub fn id(&self) -> TouchId {
        self.id
    }

    pub fn contact_rect(&self) -> Rect {
        self.contact_rect
    }

    pub fn point(&self) -> Point {
        self.point
    }

    pub fn starting_point(&self) -> Point {
        self.starting_point
    }

    /// Pressure as reported by the platform. Fingers usually report a
    /// constant, so nothing musical is derived from it.
    pub fn raw_pressure(&self) -> u32 {
        self.raw_pressure
    }

    pub fn note(&self) -> Option<u8> {
        self.note
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn pitch_bend(&self) -> u16 {
        self.modulation_x
    }

    pub fn modulation(&self) -> u8 {
        self.modulation_y
    }

    pub fn pressure(&self) -> u8 {
        self.modulation_z
    }

    pub fn update(&mut self, contact_rect: Rect, point: Point, raw_pressure: u32) {
        self.contact_rect = contact_rect;
        self.point = point;
        self.raw_pressure = raw_pressure;
    }

    /// Movement since touch-down.
    pub fn point_change(&self) -> Point {
        self.point - self.starting_point
    }
}

/// Contact area relative to a quarter cell, square-root linearized, as a
/// MIDI value.
pub fn pressure_from_rect(rect: Rect, prefs: &PreferenceSet) -> u8 {
    let half = (prefs.grid_size() / 2).max(1) as f64;
    let relative = rect.area() as f64 / (half * half);
    let pressure = (relative.sqrt() * 100.0) as i64;
    pressure.clamp(0, MIDI_VALUE_MAX as i64) as u8
}

/// 14-bit pitch bend for a horizontal offset. `pitch_bend_range` cells either
/// way reach full deflection; the result is quantized by the bend mask.
pub fn pitch_bend_from_delta(dx: i32, prefs: &PreferenceSet) -> u16 {
    let span = prefs.pitch_bend_range() as i64 * prefs.grid_size() as i64;
    let bend = PITCH_BEND_CENTER as i64 + dx as i64 * PITCH_BEND_CENTER as i64 / span;
    let bend = bend.clamp(0, PITCH_BEND_MAX as i64) as u16;
    bend & prefs.pitch_bend_mask()
}

/// Modulation for a vertical offset in either direction; one cell saturates.
pub fn modulation_from_delta(dy: i32, prefs: &PreferenceSet) -> u8 {
    let grid_size = prefs.grid_size() as i64;
    let modulation = (dy as i64).abs() * MIDI_VALUE_MAX as i64 / grid_size;
    modulation.min(MIDI_VALUE_MAX as i64) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn prefs() -> PreferenceSet {
        let mut prefs = PreferenceSet::default();
        prefs.set_grid_size(90);
        prefs.set_pitch_bend_range(2);
        prefs
    }

    #[test]
    fn point_change_keeps_start() {
        let start = Point::new(100, 100);
        let mut session = TouchSession::new(1, Rect::from_center(start, 10), start, 512, Some(60), 0, 20);
        session.update(Rect::from_center(Point::new(130, 80), 10), Point::new(130, 80), 512);
        assert_eq!(session.point_change(), Point::new(30, -20));
        assert_eq!(session.starting_point(), start);
        session.update(Rect::from_center(Point::new(90, 120), 10), Point::new(90, 120), 512);
        assert_eq!(session.point_change(), Point::new(-10, 20));
    }

    #[test]
    fn new_session_caches() {
        let session = TouchSession::new(3, Rect::default(), Point::new(1, 2), 0, None, 4, 55);
        assert_eq!(session.pitch_bend(), 0);
        assert_eq!(session.modulation(), 0);
        assert_eq!(session.pressure(), 55);
        assert_eq!(session.note(), None);
    }

    #[test_case(0, 0; "no contact")]
    #[test_case(45, 100; "quarter cell")]
    #[test_case(22, 48; "half side")]
    #[test_case(90, 127; "full cell saturates")]
    fn pressure(side: i32, expected: u8) {
        let rect = Rect::new(0, 0, side, side);
        assert_eq!(pressure_from_rect(rect, &prefs()), expected);
    }

    #[test]
    fn pitch_bend_center_and_saturation() {
        let prefs = prefs();
        assert_eq!(pitch_bend_from_delta(0, &prefs), 0x2000);
        assert_eq!(pitch_bend_from_delta(180, &prefs), 0x3fff);
        assert_eq!(pitch_bend_from_delta(-180, &prefs), 0);
        assert_eq!(pitch_bend_from_delta(10_000, &prefs), 0x3fff);
        assert_eq!(pitch_bend_from_delta(-10_000, &prefs), 0);
        assert_eq!(pitch_bend_from_delta(90, &prefs), 0x3000);
    }

    #[test]
    fn pitch_bend_mask_quantizes() {
        let mut prefs = prefs();
        prefs.set_pitch_bend_mask(0x3f80);
        assert_eq!(pitch_bend_from_delta(0, &prefs), 0x2000);
        assert_eq!(pitch_bend_from_delta(1, &prefs), 0x2000);
        assert_eq!(pitch_bend_from_delta(180, &prefs), 0x3f80);
    }

    #[test]
    fn modulation_is_symmetric_and_saturates() {
        let prefs = prefs();
        for dy in 0..200 {
            assert_eq!(modulation_from_delta(dy, &prefs), modulation_from_delta(-dy, &prefs));
        }
        assert_eq!(modulation_from_delta(0, &prefs), 0);
        assert_eq!(modulation_from_delta(45, &prefs), 63);
        assert_eq!(modulation_from_delta(90, &prefs), 127);
        assert_eq!(modulation_from_delta(-500, &prefs), 127);
    }
}
