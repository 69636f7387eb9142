//! Error types for the grid instrument.

use thiserror::Error;

use crate::performance::TouchId;

/// Touch-event contract violations. The engine rejects the event and leaves
/// its state untouched.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    #[error("touch {0} is already down")]
    DuplicateId(TouchId),

    #[error("no active touch with id {0}")]
    UnknownId(TouchId),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HexError {
    #[error("invalid offset parity {0}, expected +1 (even) or -1 (odd)")]
    InvalidArgument(i32),
}

#[derive(Error, Debug)]
pub enum PrefsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("preferences parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("preferences serialize error: {0}")]
    Serialize(#[from] ron::Error),
}

#[derive(Error, Debug)]
pub enum MidiError {
    #[error("MIDI init error: {0}")]
    Init(String),

    #[error("MIDI connect error: {0}")]
    Connect(String),

    #[error("no MIDI output port at index {0}")]
    NoSuchPort(usize),

    #[error("MIDI port info error: {0}")]
    PortInfo(String),
}

#[cfg(feature = "midi-io")]
impl From<midir::InitError> for MidiError {
    fn from(e: midir::InitError) -> Self {
        MidiError::Init(e.to_string())
    }
}

#[cfg(feature = "midi-io")]
impl From<midir::ConnectError<midir::MidiOutput>> for MidiError {
    fn from(e: midir::ConnectError<midir::MidiOutput>) -> Self {
        MidiError::Connect(e.to_string())
    }
}

#[cfg(feature = "midi-io")]
impl From<midir::PortInfoError> for MidiError {
    fn from(e: midir::PortInfoError) -> Self {
        MidiError::PortInfo(e.to_string())
    }
}
