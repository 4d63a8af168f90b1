//! Loaded MIDI files
//!
//! Parsing is one linear pass per track followed by a single stable sort of
//! the merged events and one tempo-map conversion pass.

use std::fs;
use std::path::Path;

use log::{debug, warn};

use super::event::Event;
use super::header::{Format, Header};
use super::tempo::{TempoMap, DEFAULT_BPM};
use super::track::parse_track;
use crate::error::{Result, SmfError};

/// A parsed Standard MIDI File.
///
/// All tracks are merged into one list of channel events ordered by tick.
/// Events at the same tick keep their track order, then their order within
/// the track. Format 2 files are merged the same way as format 1, so the
/// independent timelines of their tracks are not preserved.
///
/// Instances are read-only once built. A failed load still yields an
/// instance: `has_error` reports the failure and the event list is empty.
#[derive(Debug)]
pub struct MidiFile {
    error: Option<SmfError>,
    format: Format,
    num_tracks: u16,
    ticks_per_quarter: u16,
    tempo: f64,
    duration_seconds: f64,
    events: Vec<Event>,
    tempo_map: TempoMap,
}

impl MidiFile {
    /// Parse a complete SMF byte stream.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let (header, mut offset) = Header::parse(data)?;

        let mut events = Vec::new();
        let mut tempo_changes = Vec::new();
        for index in 0..header.num_tracks {
            let (track, next) = parse_track(data, offset)?;
            debug!(
                "Track {}: {} channel events, {} tempo changes",
                index,
                track.events.len(),
                track.tempo_changes.len()
            );
            events.extend(track.events);
            tempo_changes.extend(track.tempo_changes);
            offset = next;
        }

        if header.format == Format::Sequential && header.num_tracks > 1 {
            warn!(
                "Format 2 file with {} tracks merged onto one timeline",
                header.num_tracks
            );
        }

        events.sort_by_key(|event| event.tick_time);

        let tempo_map = TempoMap::new(tempo_changes, header.ticks_per_quarter);
        for event in &mut events {
            event.second_time = tempo_map.tick_to_seconds(event.tick_time);
        }

        let max_tick = events.last().map_or(0, |event| event.tick_time);
        let duration_seconds = tempo_map.tick_to_seconds(max_tick);

        Ok(Self {
            error: None,
            format: header.format,
            num_tracks: header.num_tracks,
            ticks_per_quarter: header.ticks_per_quarter,
            tempo: tempo_map.initial_bpm(),
            duration_seconds,
            events,
            tempo_map,
        })
    }

    /// Parse `data`, recording any failure in the returned instance.
    pub fn from_bytes(data: &[u8]) -> Self {
        match Self::parse(data) {
            Ok(file) => file,
            Err(err) => Self::failed(err),
        }
    }

    /// Read and parse the file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = fs::read(path.as_ref())?;
        Self::parse(&data)
    }

    /// Read and parse the file at `path`, recording any failure in the
    /// returned instance.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::open(path) {
            Ok(file) => file,
            Err(err) => {
                warn!("Failed to load {}: {}", path.display(), err);
                Self::failed(err)
            }
        }
    }

    fn failed(error: SmfError) -> Self {
        Self {
            error: Some(error),
            format: Format::SingleTrack,
            num_tracks: 0,
            ticks_per_quarter: 480,
            tempo: DEFAULT_BPM,
            duration_seconds: 0.0,
            events: Vec::new(),
            tempo_map: TempoMap::new(Vec::new(), 480),
        }
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn error(&self) -> Option<&SmfError> {
        self.error.as_ref()
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn num_tracks(&self) -> u16 {
        self.num_tracks
    }

    pub fn ticks_per_quarter(&self) -> u16 {
        self.ticks_per_quarter
    }

    /// Tempo in BPM from the first tempo change, or 120.
    pub fn tempo(&self) -> f64 {
        self.tempo
    }

    /// Time of the last channel event.
    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    /// All channel events, sorted by tick.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Note-on and note-off events only.
    pub fn note_events(&self) -> Vec<Event> {
        self.events
            .iter()
            .filter(|event| event.is_note())
            .copied()
            .collect()
    }

    pub fn tempo_map(&self) -> &TempoMap {
        &self.tempo_map
    }
}
