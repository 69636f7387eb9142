pub mod engine;
pub mod error;
pub mod events;
pub mod geometry;
pub mod grid;
pub mod midi;
pub mod performance;
pub mod prefs;
#[cfg(feature = "gui")]
mod ui;

pub use engine::{
    EngineClient, EngineCommand, EngineHandle, EngineUpdate, spawn_engine, spawn_engine_with,
};
pub use error::{EngineError, HexError, MidiError, PrefsError};
pub use events::PerformanceEvent;
pub use geometry::{Point, Rect, ScreenSize};
pub use grid::{GridCell, GridExtent, GridLayout};
pub use midi::{EventLog, MidiMessage, NullSink, OutputSink, SinkSet};
pub use performance::{PerformanceEngine, SurfaceSnapshot, TouchId, TouchSession};
pub use prefs::PreferenceSet;
#[cfg(feature = "gui")]
pub use ui::GridStrumentApp;
