use std::thread::JoinHandle;

use crossbeam::channel::{Receiver, Sender, TryRecvError};
use tracing::{info, warn};

use crate::geometry::{Point, Rect, ScreenSize};
use crate::midi::SinkSet;
#[cfg(feature = "midi-io")]
use crate::midi::MidiPortSink;
use crate::performance::{PerformanceEngine, SurfaceSnapshot, TouchId};
use crate::prefs::PreferenceSet;

#[derive(Debug, Clone)]
pub enum EngineCommand {
    TouchDown {
        id: TouchId,
        rect: Rect,
        point: Point,
        raw_pressure: u32,
    },
    TouchMove {
        id: TouchId,
        rect: Rect,
        point: Point,
        raw_pressure: u32,
    },
    TouchUp {
        id: TouchId,
    },
    Resize(ScreenSize),
    SetPreferences(PreferenceSet),
    SelectMidiDevice(usize),
    ReleaseAll,
    Shutdown,
}

#[derive(Debug, Clone)]
pub enum EngineUpdate {
    Surface(SurfaceSnapshot),
    MidiDevices {
        names: Vec<String>,
        selected: Option<usize>,
    },
    Error {
        message: String,
    },
}

/// Channel ends for talking to a running engine. Cheap to clone; does not
/// keep the engine alive.
#[derive(Clone)]
pub struct EngineClient {
    pub command_tx: Sender<EngineCommand>,
    pub update_rx: Receiver<EngineUpdate>,
}

/// Owner of the engine thread. Dropping it shuts the engine down and waits
/// for the final note releases to be sent.
pub struct EngineHandle {
    pub command_tx: Sender<EngineCommand>,
    pub update_rx: Receiver<EngineUpdate>,
    thread: Option<JoinHandle<()>>,
}

impl EngineHandle {
    pub fn client(&self) -> EngineClient {
        EngineClient {
            command_tx: self.command_tx.clone(),
            update_rx: self.update_rx.clone(),
        }
    }

    /// Stops the engine thread once it has released every held note.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        let _ = self.command_tx.send(EngineCommand::Shutdown);
        if thread.join().is_err() {
            warn!("Engine thread panicked");
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Starts the engine thread with a MIDI output on the port named by the
/// preferences.
pub fn spawn_engine(prefs: PreferenceSet) -> EngineHandle {
    spawn_engine_with(prefs, true, SinkSet::new)
}

/// Starts the engine thread. `make_sinks` runs on the engine thread and
/// supplies extra outputs; `open_midi` adds the MIDI port sink in front.
pub fn spawn_engine_with<F>(prefs: PreferenceSet, open_midi: bool, make_sinks: F) -> EngineHandle
where
    F: FnOnce() -> SinkSet + Send + 'static,
{
    let (command_tx, command_rx) = crossbeam::channel::unbounded();
    let (update_tx, update_rx) = crossbeam::channel::unbounded();

    let thread = std::thread::spawn(move || {
        let mut state = EngineState::new(prefs, open_midi, make_sinks(), update_tx);
        state.run(command_rx);
    });

    EngineHandle {
        command_tx,
        update_rx,
        thread: Some(thread),
    }
}

struct EngineState {
    engine: PerformanceEngine<SinkSet>,
    /// Position of the MIDI port sink inside the engine's sink set.
    midi_slot: Option<usize>,
    update_tx: Sender<EngineUpdate>,
}

impl EngineState {
    fn new(
        prefs: PreferenceSet,
        open_midi: bool,
        sinks: SinkSet,
        update_tx: Sender<EngineUpdate>,
    ) -> Self {
        let device_index = prefs.midi_device_index();
        let mut state = Self {
            engine: PerformanceEngine::new(prefs, sinks),
            midi_slot: None,
            update_tx,
        };
        if open_midi {
            state.select_midi_device(device_index);
        }
        state
    }

    fn run(&mut self, command_rx: Receiver<EngineCommand>) {
        loop {
            let Ok(first) = command_rx.recv() else {
                break;
            };
            // apply everything already queued before publishing one snapshot
            let mut batch = vec![first];
            loop {
                match command_rx.try_recv() {
                    Ok(command) => batch.push(command),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => break,
                }
            }

            let mut shutdown = false;
            for command in batch {
                if matches!(command, EngineCommand::Shutdown) {
                    shutdown = true;
                    break;
                }
                self.apply(command);
            }
            if shutdown {
                break;
            }
            self.publish_surface();
        }

        self.engine.release_all();
        info!("Engine thread stopped");
    }

    fn apply(&mut self, command: EngineCommand) {
        let result = match command {
            EngineCommand::TouchDown {
                id,
                rect,
                point,
                raw_pressure,
            } => self.engine.touch_down(id, rect, point, raw_pressure),
            EngineCommand::TouchMove {
                id,
                rect,
                point,
                raw_pressure,
            } => self.engine.touch_move(id, rect, point, raw_pressure),
            EngineCommand::TouchUp { id } => self.engine.touch_up(id),
            EngineCommand::Resize(size) => {
                self.engine.resize(size);
                Ok(())
            }
            EngineCommand::SetPreferences(prefs) => {
                let device_index = prefs.midi_device_index();
                let device_changed = self.engine.preferences().midi_device_index() != device_index;
                self.engine.set_preferences(prefs);
                if device_changed && self.midi_slot.is_some() {
                    self.select_midi_device(device_index);
                }
                Ok(())
            }
            EngineCommand::SelectMidiDevice(index) => {
                self.select_midi_device(index);
                Ok(())
            }
            EngineCommand::ReleaseAll => {
                self.engine.release_all();
                Ok(())
            }
            EngineCommand::Shutdown => Ok(()),
        };

        // the event source misbehaved; drop the event and keep playing
        if let Err(e) = result {
            warn!("Ignoring touch event: {}", e);
        }
    }

    fn publish_surface(&self) {
        let _ = self
            .update_tx
            .send(EngineUpdate::Surface(self.engine.snapshot()));
    }

    #[cfg(feature = "midi-io")]
    fn select_midi_device(&mut self, index: usize) {
        // notes held on the old port would never be released
        self.engine.release_all();

        let names: Vec<String> = match MidiPortSink::list_devices() {
            Ok(devices) => devices.into_iter().map(|d| d.name).collect(),
            Err(e) => {
                self.report(format!("Failed to list MIDI outputs: {}", e));
                Vec::new()
            }
        };

        let sink = match MidiPortSink::connect(index) {
            Ok(sink) => Some(sink),
            Err(e) => {
                self.report(format!("Failed to open MIDI output {}: {}", index, e));
                None
            }
        };
        let selected = sink.as_ref().map(|_| index);
        let sink = sink.unwrap_or_else(MidiPortSink::disconnected);

        let sinks = self.engine.sink_mut();
        match self.midi_slot {
            Some(slot) => {
                sinks.replace(slot, sink);
            }
            None => {
                sinks.push(sink);
                self.midi_slot = Some(sinks.len() - 1);
            }
        }

        let _ = self
            .update_tx
            .send(EngineUpdate::MidiDevices { names, selected });
    }

    #[cfg(not(feature = "midi-io"))]
    fn select_midi_device(&mut self, index: usize) {
        self.report(format!(
            "MIDI output {} unavailable: built without MIDI support",
            index
        ));
    }

    fn report(&self, message: String) {
        warn!("{}", message);
        let _ = self.update_tx.send(EngineUpdate::Error { message });
    }
}
