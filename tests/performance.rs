use gridstrument::performance::{PITCH_BEND_CENTER, pressure_from_rect};
use gridstrument::{
    EngineError, EventLog, PerformanceEngine, PerformanceEvent, Point, PreferenceSet, Rect,
    ScreenSize, TouchId,
};
use pretty_assertions::assert_eq;
use test_case::test_case;

const GRID: i32 = 90;
const FINGER: i32 = 22;

fn prefs(min: u8, max: u8) -> PreferenceSet {
    let mut prefs = PreferenceSet::default();
    prefs.set_grid_size(GRID as u32);
    prefs.set_midi_channel_range(min, max);
    prefs
}

fn engine_with(prefs: PreferenceSet) -> PerformanceEngine<EventLog> {
    let mut engine = PerformanceEngine::new(prefs, EventLog::new());
    engine.resize(ScreenSize::new(900, 540));
    engine
}

fn down(engine: &mut PerformanceEngine<EventLog>, id: TouchId, x: i32, y: i32) {
    let point = Point::new(x, y);
    engine
        .touch_down(id, Rect::from_center(point, FINGER), point, 512)
        .unwrap();
}

fn moved(engine: &mut PerformanceEngine<EventLog>, id: TouchId, x: i32, y: i32, half: i32) {
    let point = Point::new(x, y);
    engine
        .touch_move(id, Rect::from_center(point, half), point, 512)
        .unwrap();
}

fn finger_pressure() -> u8 {
    pressure_from_rect(
        Rect::from_center(Point::new(0, 0), FINGER),
        &prefs(0, 0),
    )
}

#[test]
fn channels_cycle_through_range() {
    let mut engine = engine_with(prefs(0, 2));
    for id in 1..=4 {
        down(&mut engine, id, 45, 45);
    }

    let channels: Vec<u8> = (1..=4)
        .map(|id| engine.session(id).unwrap().channel())
        .collect();
    assert_eq!(channels, vec![0, 1, 2, 0]);
}

#[test]
fn bottom_left_cell_plays_reference_note() {
    let mut engine = engine_with(prefs(0, 15));
    down(&mut engine, 1, 45, 495);

    assert_eq!(
        engine.sink().events(),
        &[PerformanceEvent::NoteOn {
            channel: 0,
            note: 40,
            velocity: finger_pressure(),
        }]
    );
}

#[test]
fn released_id_can_be_reused() {
    let mut engine = engine_with(prefs(0, 15));
    down(&mut engine, 5, 45, 45);
    engine.touch_up(5).unwrap();
    assert!(engine.session(5).is_none());

    down(&mut engine, 5, 135, 45);
    assert_eq!(engine.session(5).unwrap().point(), Point::new(135, 45));
    assert_eq!(engine.active_count(), 1);
}

#[test]
fn duplicate_down_is_rejected() {
    let mut engine = engine_with(prefs(0, 15));
    down(&mut engine, 5, 45, 45);
    let point = Point::new(45, 45);
    assert_eq!(
        engine.touch_down(5, Rect::from_center(point, FINGER), point, 512),
        Err(EngineError::DuplicateId(5))
    );
    assert_eq!(engine.sink().events().len(), 1);
}

#[test]
fn each_signal_is_debounced_separately() {
    let mut engine = engine_with(prefs(0, 15));
    down(&mut engine, 1, 45, 495);
    engine.sink_mut().clear();

    // half the default twelve cell bend range to the right
    moved(&mut engine, 1, 45 + 6 * GRID, 495, FINGER);
    assert_eq!(
        engine.sink_mut().take(),
        vec![PerformanceEvent::PitchBend {
            channel: 0,
            value: 0x3000,
        }]
    );

    moved(&mut engine, 1, 45 + 6 * GRID, 495, FINGER);
    assert!(engine.sink().events().is_empty());

    moved(&mut engine, 1, 45 + 6 * GRID, 495 - GRID / 2, FINGER);
    assert_eq!(
        engine.sink_mut().take(),
        vec![PerformanceEvent::ControlChange {
            channel: 0,
            controller: 1,
            value: 63,
        }]
    );

    moved(&mut engine, 1, 45 + 6 * GRID, 495 - GRID / 2, 2 * FINGER);
    assert_eq!(
        engine.sink_mut().take(),
        vec![PerformanceEvent::PolyKeyPressure {
            channel: 0,
            note: 40,
            pressure: 127,
        }]
    );
}

#[test]
fn first_move_in_place_centers_the_bend() {
    let mut engine = engine_with(prefs(0, 15));
    down(&mut engine, 1, 45, 45);
    engine.sink_mut().clear();

    moved(&mut engine, 1, 45, 45, FINGER);
    assert_eq!(
        engine.sink().events(),
        &[PerformanceEvent::PitchBend {
            channel: 0,
            value: PITCH_BEND_CENTER,
        }]
    );
}

#[test]
fn touch_up_releases_note_and_modulation() {
    let mut engine = engine_with(prefs(3, 5));
    down(&mut engine, 1, 45, 45);
    engine.sink_mut().clear();

    engine.touch_up(1).unwrap();
    assert_eq!(
        engine.sink().events(),
        &[
            PerformanceEvent::NoteOn {
                channel: 3,
                note: 65,
                velocity: 0,
            },
            PerformanceEvent::ControlChange {
                channel: 3,
                controller: 1,
                value: 0,
            },
        ]
    );
}

#[test]
fn touch_outside_grid_only_modulates() {
    let mut engine = engine_with(prefs(0, 15));
    down(&mut engine, 1, 950, 100);
    assert!(engine.session(1).unwrap().note().is_none());
    assert!(engine.sink().events().is_empty());

    moved(&mut engine, 1, 950, 100 + GRID, 2 * FINGER);
    assert_eq!(
        engine.sink_mut().take(),
        vec![
            PerformanceEvent::PitchBend {
                channel: 0,
                value: PITCH_BEND_CENTER,
            },
            PerformanceEvent::ControlChange {
                channel: 0,
                controller: 1,
                value: 127,
            },
        ]
    );

    engine.touch_up(1).unwrap();
    assert_eq!(
        engine.sink().events(),
        &[PerformanceEvent::ControlChange {
            channel: 0,
            controller: 1,
            value: 0,
        }]
    );
}

#[test]
fn release_all_ends_every_touch_in_id_order() {
    let mut engine = engine_with(prefs(0, 15));
    down(&mut engine, 8, 45, 45);
    down(&mut engine, 2, 135, 45);
    engine.sink_mut().clear();

    engine.release_all();
    assert_eq!(engine.active_count(), 0);
    assert_eq!(engine.next_channel(), 0);
    let channels: Vec<u8> = engine
        .sink()
        .events()
        .iter()
        .map(PerformanceEvent::channel)
        .collect();
    // touch 2 got channel 1, touch 8 channel 0
    assert_eq!(channels, vec![1, 1, 0, 0]);
}

#[test_case(false, 0, 0 ; "round robin")]
#[test_case(true, 5, 5 ; "bottom row")]
#[test_case(true, 0, 0 ; "top row")]
fn per_row_channel(per_row: bool, row: i32, expected: u8) {
    let mut prefs = prefs(0, 15);
    prefs.set_channel_per_row_mode(per_row);
    let mut engine = engine_with(prefs);

    down(&mut engine, 1, 45, row * GRID + 45);
    assert_eq!(engine.session(1).unwrap().channel(), expected);
}
