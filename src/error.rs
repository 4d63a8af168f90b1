//! Error types for loading and saving MIDI files

use std::io;

use thiserror::Error;

pub type Result<T, E = SmfError> = std::result::Result<T, E>;

/// Errors raised while loading or saving a Standard MIDI File.
///
/// Truncation inside a track body is not an error: the affected track stops
/// early and the load carries on.
#[derive(Debug, Error)]
pub enum SmfError {
    #[error("Could not access file: {0}")]
    Io(#[from] io::Error),
    #[error("File too small for MIDI header ({0} bytes)")]
    TooSmall(usize),
    #[error("Not a MIDI file (missing MThd)")]
    MissingHeaderMagic,
    #[error("Invalid header length: {0}")]
    InvalidHeaderLength(u32),
    #[error("Unsupported MIDI format: {0}")]
    UnsupportedFormat(u16),
    #[error("SMPTE time format not supported")]
    SmpteNotSupported,
    #[error("Unexpected end of file (track header)")]
    UnexpectedEof,
    #[error("Invalid track header (missing MTrk)")]
    MissingTrackMagic,
    #[error("Track length exceeds file size: declared {declared}, available {available}")]
    TrackTooLong { declared: u32, available: usize },
    #[error("Invalid tempo: {0} BPM")]
    InvalidTempo(f64),
    #[error("Invalid ticks per quarter note: {0}")]
    InvalidDivision(u16),
}

impl SmfError {
    /// True for errors caused by the byte stream itself rather than the
    /// filesystem or caller configuration.
    pub fn is_format_error(&self) -> bool {
        !matches!(
            self,
            SmfError::Io(_) | SmfError::InvalidTempo(_) | SmfError::InvalidDivision(_)
        )
    }
}
