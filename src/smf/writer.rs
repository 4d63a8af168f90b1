//! Format-0 SMF writer
//!
//! Serializes a caller-supplied event list as a single-track file. Event
//! positions come from `second_time`; `tick_time` is ignored.

use std::fs;
use std::path::Path;

use log::{debug, warn};

use super::bytes::{write_be16, write_be24, write_be32};
use super::event::Event;
use super::header::HEADER_MAGIC;
use super::track::TRACK_MAGIC;
use super::vlq;
use crate::error::{Result, SmfError};

const END_OF_TRACK: [u8; 3] = [0xFF, 0x2F, 0x00];
const TEMPO_META: [u8; 3] = [0xFF, 0x51, 0x03];
const MAX_MICROSECONDS_PER_QUARTER: f64 = 0xFF_FFFF as f64;

/// Output settings for the writer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WriterConfig {
    /// Tempo written to the file and used to place events, in BPM
    pub tempo_bpm: f64,
    /// Division written to the header
    pub ticks_per_quarter: u16,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            tempo_bpm: 120.0,
            ticks_per_quarter: 480,
        }
    }
}

impl WriterConfig {
    pub fn new(tempo_bpm: f64, ticks_per_quarter: u16) -> Self {
        Self {
            tempo_bpm,
            ticks_per_quarter,
        }
    }

    /// Rejects a non-positive tempo and a division that is zero or has the
    /// SMPTE bit set.
    pub fn validate(&self) -> Result<()> {
        if !self.tempo_bpm.is_finite() || self.tempo_bpm <= 0.0 {
            return Err(SmfError::InvalidTempo(self.tempo_bpm));
        }
        if self.ticks_per_quarter == 0 || self.ticks_per_quarter & 0x8000 != 0 {
            return Err(SmfError::InvalidDivision(self.ticks_per_quarter));
        }
        Ok(())
    }

    /// Tick for a time in seconds at the configured tempo.
    pub fn tick_for(&self, seconds: f64) -> u32 {
        let ticks = seconds * f64::from(self.ticks_per_quarter) * self.tempo_bpm / 60.0;
        let ticks = ticks.round();
        if ticks.is_nan() || ticks <= 0.0 {
            0
        } else if ticks >= f64::from(vlq::MAX_VALUE) {
            vlq::MAX_VALUE
        } else {
            ticks as u32
        }
    }

    /// Tempo meta-event value, clamped to the 24-bit field.
    pub fn microseconds_per_quarter(&self) -> u32 {
        (60_000_000.0 / self.tempo_bpm)
            .round()
            .clamp(1.0, MAX_MICROSECONDS_PER_QUARTER) as u32
    }
}

/// Encode `events` as a complete format-0 file.
///
/// Events are placed by `second_time` and sorted by tick; at equal ticks
/// higher status kinds come first, so a note-on precedes a note-off. The
/// track always opens with a tempo meta-event and closes with End-of-Track.
pub fn encode(events: &[Event], config: &WriterConfig) -> Result<Vec<u8>> {
    config.validate()?;

    let mut placed: Vec<(u32, &Event)> = events
        .iter()
        .map(|event| (config.tick_for(event.second_time), event))
        .collect();
    placed.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then_with(|| (b.1.kind as u8).cmp(&(a.1.kind as u8)))
    });

    let clamped = placed.iter().any(|(tick, _)| *tick == vlq::MAX_VALUE);
    if clamped {
        warn!("Event times beyond the tick range were clamped");
    }

    let mut track = Vec::with_capacity(placed.len() * 4 + 12);

    vlq::write(&mut track, 0);
    track.extend_from_slice(&TEMPO_META);
    write_be24(&mut track, config.microseconds_per_quarter());

    let mut last_tick = 0;
    for (tick, event) in &placed {
        vlq::write(&mut track, tick - last_tick);
        last_tick = *tick;

        track.push(event.status());
        track.push(event.data1);
        if event.kind.data_len() == 2 {
            track.push(event.data2);
        }
    }

    vlq::write(&mut track, 0);
    track.extend_from_slice(&END_OF_TRACK);

    let mut data = Vec::with_capacity(22 + track.len());
    data.extend_from_slice(HEADER_MAGIC);
    write_be32(&mut data, 6);
    write_be16(&mut data, 0);
    write_be16(&mut data, 1);
    write_be16(&mut data, config.ticks_per_quarter);

    data.extend_from_slice(TRACK_MAGIC);
    write_be32(&mut data, track.len() as u32);
    data.extend_from_slice(&track);

    debug!(
        "Encoded {} events into {} bytes at {} BPM",
        placed.len(),
        data.len(),
        config.tempo_bpm
    );

    Ok(data)
}

/// Encode `events` and write them to `path`. Returns the number of bytes
/// written.
pub fn save(path: impl AsRef<Path>, events: &[Event], config: &WriterConfig) -> Result<usize> {
    let data = encode(events, config)?;
    fs::write(path.as_ref(), &data)?;
    Ok(data.len())
}
