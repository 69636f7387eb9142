mod engine;
mod session;

pub use engine::{PerformanceEngine, SessionView, SurfaceSnapshot};
pub use session::{
    MIDI_VALUE_MAX, PITCH_BEND_CENTER, PITCH_BEND_MAX, TouchId, TouchSession,
    modulation_from_delta, pitch_bend_from_delta, pressure_from_rect,
};
