//! Standard MIDI File event engine
//!
//! Loads SMF byte streams into a single time-ordered list of channel events
//! with wall-clock times, and writes event lists back out as format-0 files.

pub mod error;
pub mod smf;

pub use error::SmfError;
pub use smf::{Event, EventKind, MidiFile, TempoMap, WriterConfig};
