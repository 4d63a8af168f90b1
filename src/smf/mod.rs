//! Standard MIDI File engine
//!
//! Provides the load and save paths for SMF byte streams:
//! - Header / Track: chunk parsing with a running-status state machine
//! - TempoMap: tick to wall-clock conversion
//! - MidiFile: merged, time-ordered event list of a loaded file
//! - Writer: single-track format-0 serialization of an event list

pub mod bytes;
pub mod event;
pub mod file;
pub mod header;
pub mod tempo;
pub mod track;
pub mod vlq;
pub mod writer;

pub use event::{Event, EventKind};
pub use file::MidiFile;
pub use header::{Format, Header};
pub use tempo::{TempoChange, TempoMap, TimePoint};
pub use track::{RunningStatus, TrackData};
pub use writer::{encode, save, WriterConfig};
