//! `MThd` header chunk parsing

use log::debug;

use super::bytes::Reader;
use crate::error::{Result, SmfError};

pub const HEADER_MAGIC: &[u8; 4] = b"MThd";
/// Magic, length field and the three 16-bit fields.
pub const MIN_FILE_SIZE: usize = 14;
pub const MIN_HEADER_LENGTH: u32 = 6;

/// File format declared in the header.
///
/// `Sequential` files are parsed exactly like `Parallel` ones: their tracks
/// are merged onto a single timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Format 0: one track
    SingleTrack,
    /// Format 1: simultaneous tracks
    Parallel,
    /// Format 2: independent sequences
    Sequential,
}

impl Format {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(Format::SingleTrack),
            1 => Some(Format::Parallel),
            2 => Some(Format::Sequential),
            _ => None,
        }
    }

    pub fn as_u16(self) -> u16 {
        match self {
            Format::SingleTrack => 0,
            Format::Parallel => 1,
            Format::Sequential => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub format: Format,
    pub num_tracks: u16,
    pub ticks_per_quarter: u16,
}

impl Header {
    /// Parse the header chunk at the start of `data`.
    ///
    /// Returns the header and the offset of the first track chunk. Header
    /// bytes beyond the six defined ones are skipped.
    pub fn parse(data: &[u8]) -> Result<(Header, usize)> {
        if data.len() < MIN_FILE_SIZE {
            return Err(SmfError::TooSmall(data.len()));
        }

        let mut r = Reader::new(data);
        if r.read_tag() != Some(*HEADER_MAGIC) {
            return Err(SmfError::MissingHeaderMagic);
        }

        let header_len = r.read_be32().ok_or(SmfError::TooSmall(data.len()))?;
        if header_len < MIN_HEADER_LENGTH {
            return Err(SmfError::InvalidHeaderLength(header_len));
        }

        let format_raw = r.read_be16().ok_or(SmfError::TooSmall(data.len()))?;
        let num_tracks = r.read_be16().ok_or(SmfError::TooSmall(data.len()))?;
        let division = r.read_be16().ok_or(SmfError::TooSmall(data.len()))?;

        let format = Format::from_u16(format_raw).ok_or(SmfError::UnsupportedFormat(format_raw))?;

        if division & 0x8000 != 0 {
            return Err(SmfError::SmpteNotSupported);
        }
        let ticks_per_quarter = division & 0x7FFF;

        // A skip running off the end leaves the reader at the end of the
        // data; the first track read then reports the truncation.
        let extra = (header_len - MIN_HEADER_LENGTH) as usize;
        let _ = r.skip(extra);

        debug!(
            "MIDI header: format {}, {} tracks, {} ticks per quarter",
            format_raw, num_tracks, ticks_per_quarter
        );

        Ok((
            Header {
                format,
                num_tracks,
                ticks_per_quarter,
            },
            r.position(),
        ))
    }
}
