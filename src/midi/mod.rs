mod message;
#[cfg(feature = "midi-io")]
mod port;
mod sink;

pub use message::MidiMessage;
#[cfg(feature = "midi-io")]
pub use port::{MidiOutputDevice, MidiPortSink};
pub use sink::{EventLog, NullSink, OutputSink, SinkSet};
