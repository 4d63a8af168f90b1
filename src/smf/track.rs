//! `MTrk` track chunk parsing
//!
//! A track body is a sequence of `(delta-time, event)` pairs. The parser
//! walks it one step at a time, threading a `RunningStatus` value through
//! `step`. Only channel voice messages and tempo meta-events are kept;
//! everything else is skipped.
//!
//! Running out of bytes inside the body stops that track and keeps what was
//! collected. Only the chunk header itself can fail the load.

use log::debug;

use super::bytes::Reader;
use super::event::{Event, EventKind};
use super::tempo::TempoChange;
use crate::error::{Result, SmfError};

pub const TRACK_MAGIC: &[u8; 4] = b"MTrk";

const META: u8 = 0xFF;
const META_TEMPO: u8 = 0x51;
const SYSEX: u8 = 0xF0;
const SYSEX_ESCAPE: u8 = 0xF7;

/// Parser state carried from one step to the next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunningStatus {
    /// Offset of the next unread byte
    pub position: usize,
    /// Absolute tick of the last event read
    pub tick: u32,
    /// Last channel voice status byte seen, if any
    pub status: Option<u8>,
}

impl RunningStatus {
    pub fn at(position: usize) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

/// Result of decoding one `(delta-time, event)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// An event was consumed; continue from the new state
    Continue(RunningStatus),
    /// The body ended on an event boundary
    Finished,
    /// The body ended inside an event
    Truncated,
}

/// Events collected from one track.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackData {
    pub events: Vec<Event>,
    pub tempo_changes: Vec<TempoChange>,
}

/// Decode the next `(delta-time, event)` pair of the body ending at `end`.
///
/// Channel events and tempo changes are appended to `out`. A data byte that
/// arrives before any running status is established is consumed and dropped
/// as its own step. Older readers left such a byte in place and decoded it
/// as the next delta-time; this parser deliberately does not.
pub fn step(data: &[u8], end: usize, state: RunningStatus, out: &mut TrackData) -> Step {
    let mut r = Reader::with_bounds(data, state.position, end);
    if r.is_at_end() {
        return Step::Finished;
    }

    let tick = state.tick.saturating_add(r.read_vlq());

    let Some(byte) = r.peek() else {
        return Step::Truncated;
    };

    let mut running = state.status;
    let status = if byte & 0x80 == 0 {
        match running {
            Some(status) => status,
            None => {
                // Data byte with nothing to run on
                r.read_u8();
                return Step::Continue(RunningStatus {
                    position: r.position(),
                    tick,
                    status: running,
                });
            }
        }
    } else {
        r.read_u8();
        if byte < 0xF0 {
            running = Some(byte);
        }
        byte
    };

    let complete = match status {
        META => read_meta(&mut r, tick, out),
        SYSEX | SYSEX_ESCAPE => {
            let len = r.read_vlq() as usize;
            r.skip(len).is_some()
        }
        0x80..=0xEF => read_channel_message(&mut r, status, tick, out),
        // System common / real-time bytes carry nothing we keep
        _ => true,
    };

    if !complete {
        return Step::Truncated;
    }

    Step::Continue(RunningStatus {
        position: r.position(),
        tick,
        status: running,
    })
}

fn read_meta(r: &mut Reader<'_>, tick: u32, out: &mut TrackData) -> bool {
    let Some(meta_type) = r.read_u8() else {
        return false;
    };
    let len = r.read_vlq() as usize;

    if meta_type == META_TEMPO && len == 3 {
        return match r.read_be24() {
            Some(microseconds_per_quarter) => {
                out.tempo_changes.push(TempoChange {
                    tick,
                    microseconds_per_quarter,
                });
                true
            }
            None => false,
        };
    }

    r.skip(len).is_some()
}

fn read_channel_message(r: &mut Reader<'_>, status: u8, tick: u32, out: &mut TrackData) -> bool {
    let Some(kind) = EventKind::from_status(status) else {
        return true;
    };

    let Some(data1) = r.read_u8() else {
        return false;
    };
    let data2 = if kind.data_len() == 2 {
        match r.read_u8() {
            Some(byte) => byte,
            None => return false,
        }
    } else {
        0
    };

    out.events
        .push(Event::new(kind, status & 0x0F, data1, data2).at_tick(tick));
    true
}

/// Walk a track body occupying `data[start..end]`.
///
/// Returns the collected data and whether the body was cut off mid-event.
pub fn walk(data: &[u8], start: usize, end: usize) -> (TrackData, bool) {
    let mut out = TrackData::default();
    let mut state = RunningStatus::at(start);
    loop {
        match step(data, end, state, &mut out) {
            Step::Continue(next) => state = next,
            Step::Finished => return (out, false),
            Step::Truncated => return (out, true),
        }
    }
}

/// Parse the track chunk starting at `offset`.
///
/// Returns the track's events and the offset just past the chunk.
pub fn parse_track(data: &[u8], offset: usize) -> Result<(TrackData, usize)> {
    let mut r = Reader::with_bounds(data, offset, data.len());
    if r.remaining() < 8 {
        return Err(SmfError::UnexpectedEof);
    }
    if r.read_tag() != Some(*TRACK_MAGIC) {
        return Err(SmfError::MissingTrackMagic);
    }
    let declared = r.read_be32().ok_or(SmfError::UnexpectedEof)?;
    let available = r.remaining();
    if declared as usize > available {
        return Err(SmfError::TrackTooLong {
            declared,
            available,
        });
    }

    let start = r.position();
    let end = start + declared as usize;
    let (track, truncated) = walk(data, start, end);

    if truncated {
        debug!(
            "Track at offset {} ends mid-event; kept {} events",
            offset,
            track.events.len()
        );
    }

    Ok((track, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(body: &[u8]) -> Vec<u8> {
        let mut data = TRACK_MAGIC.to_vec();
        data.extend_from_slice(&(body.len() as u32).to_be_bytes());
        data.extend_from_slice(body);
        data
    }

    fn body_events(body: &[u8]) -> (TrackData, bool) {
        walk(body, 0, body.len())
    }

    #[test]
    fn test_note_pair() {
        let body = [
            0x00, 0x90, 60, 100, // note on
            0x83, 0x60, 0x80, 60, 0, // note off at 480
            0x00, 0xFF, 0x2F, 0x00,
        ];
        let (track, truncated) = body_events(&body);
        assert!(!truncated);
        assert_eq!(track.events.len(), 2);
        assert_eq!(track.events[0].kind, EventKind::NoteOn);
        assert_eq!(track.events[0].tick_time, 0);
        assert_eq!(track.events[0].data1, 60);
        assert_eq!(track.events[0].data2, 100);
        assert_eq!(track.events[1].kind, EventKind::NoteOff);
        assert_eq!(track.events[1].tick_time, 480);
    }

    #[test]
    fn test_running_status_matches_explicit() {
        let explicit = [
            0x00, 0x91, 60, 100, 0x10, 0x91, 64, 90, 0x10, 0x91, 60, 0, 0x10, 0x91, 64, 0,
        ];
        let running = [0x00, 0x91, 60, 100, 0x10, 64, 90, 0x10, 60, 0, 0x10, 64, 0];
        let (a, _) = body_events(&explicit);
        let (b, _) = body_events(&running);
        assert_eq!(a.events.len(), 4);
        assert_eq!(a, b);
        assert!(b.events.iter().all(|e| e.channel == 1));
    }

    #[test]
    fn test_running_status_survives_meta_and_sysex() {
        let body = [
            0x00, 0x90, 60, 100, // note on
            0x00, 0xFF, 0x01, 0x02, b'h', b'i', // text meta
            0x00, 0xF0, 0x03, 0x7E, 0x7F, 0xF7, // sysex
            0x0A, 60, 0, // running status note on, zero velocity
        ];
        let (track, truncated) = body_events(&body);
        assert!(!truncated);
        assert_eq!(track.events.len(), 2);
        assert_eq!(track.events[1].tick_time, 10);
        assert!(track.events[1].is_note_off());
    }

    #[test]
    fn test_one_byte_messages() {
        let body = [
            0x00, 0xC2, 5, // program change
            0x00, 0xD2, 40, // channel pressure
            0x00, 0xB2, 7, 100, // control change
            0x00, 0xE2, 0x00, 0x40, // pitch bend
            0x00, 0xA2, 60, 30, // poly pressure
        ];
        let (track, truncated) = body_events(&body);
        assert!(!truncated);
        let kinds: Vec<_> = track.events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::ProgramChange,
                EventKind::ChannelPressure,
                EventKind::ControlChange,
                EventKind::PitchBend,
                EventKind::PolyPressure,
            ]
        );
        assert_eq!(track.events[0].data1, 5);
        assert_eq!(track.events[0].data2, 0);
        assert_eq!(track.events[1].data1, 40);
        assert_eq!(track.events[3].data2, 0x40);
    }

    #[test]
    fn test_running_status_one_byte_messages() {
        let body = [0x00, 0xC0, 1, 0x00, 2, 0x00, 3];
        let (track, _) = body_events(&body);
        let programs: Vec<_> = track.events.iter().map(|e| e.data1).collect();
        assert_eq!(programs, vec![1, 2, 3]);
    }

    #[test]
    fn test_tempo_meta() {
        let body = [
            0x00, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20, // 500000 at 0
            0x60, 0xFF, 0x51, 0x03, 0x0F, 0x42, 0x40, // 1000000 at 96
            0x00, 0xFF, 0x51, 0x02, 0x01, 0x02, // wrong length, ignored
        ];
        let (track, truncated) = body_events(&body);
        assert!(!truncated);
        assert!(track.events.is_empty());
        assert_eq!(
            track.tempo_changes,
            vec![
                TempoChange {
                    tick: 0,
                    microseconds_per_quarter: 500_000
                },
                TempoChange {
                    tick: 96,
                    microseconds_per_quarter: 1_000_000
                },
            ]
        );
    }

    #[test]
    fn test_truncated_channel_message() {
        let body = [0x00, 0x90, 60, 100, 0x10, 0x80, 60];
        let (track, truncated) = body_events(&body);
        assert!(truncated);
        assert_eq!(track.events.len(), 1);
        assert_eq!(track.events[0].kind, EventKind::NoteOn);
    }

    #[test]
    fn test_truncated_meta_payload() {
        let body = [0x00, 0x90, 60, 100, 0x00, 0xFF, 0x03, 0x10, b'a'];
        let (track, truncated) = body_events(&body);
        assert!(truncated);
        assert_eq!(track.events.len(), 1);
    }

    #[test]
    fn test_trailing_delta_is_truncation() {
        let body = [0x00, 0x90, 60, 100, 0x81];
        let (track, truncated) = body_events(&body);
        assert!(truncated);
        assert_eq!(track.events.len(), 1);
    }

    #[test]
    fn test_stray_data_byte_skipped() {
        let body = [0x00, 0x42, 0x00, 0x90, 60, 100];
        let (track, truncated) = body_events(&body);
        assert!(!truncated);
        assert_eq!(track.events.len(), 1);
        assert_eq!(track.events[0].data1, 60);
    }

    #[test]
    fn test_step_threads_state() {
        let body = [0x05, 0x93, 60, 100, 0x05, 62, 100];
        let mut out = TrackData::default();
        let first = match step(&body, body.len(), RunningStatus::default(), &mut out) {
            Step::Continue(state) => state,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(
            first,
            RunningStatus {
                position: 4,
                tick: 5,
                status: Some(0x93)
            }
        );
        let second = match step(&body, body.len(), first, &mut out) {
            Step::Continue(state) => state,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(second.tick, 10);
        assert_eq!(second.position, body.len());
        assert_eq!(step(&body, body.len(), second, &mut out), Step::Finished);
        assert_eq!(out.events.len(), 2);
        assert_eq!(out.events[1].channel, 3);
    }

    #[test]
    fn test_parse_track_chunk() {
        let mut data = chunk(&[0x00, 0x90, 60, 100]);
        data.extend_from_slice(b"trailing");
        let (track, next) = parse_track(&data, 0).unwrap();
        assert_eq!(track.events.len(), 1);
        assert_eq!(next, 12);
    }

    #[test]
    fn test_chunk_errors() {
        assert!(matches!(
            parse_track(b"MTrk\x00\x00", 0),
            Err(SmfError::UnexpectedEof)
        ));
        assert!(matches!(
            parse_track(b"XTrk\x00\x00\x00\x00", 0),
            Err(SmfError::MissingTrackMagic)
        ));

        let mut data = chunk(&[0x00, 0x90, 60, 100]);
        data.truncate(10);
        assert!(matches!(
            parse_track(&data, 0),
            Err(SmfError::TrackTooLong {
                declared: 4,
                available: 2
            })
        ));
    }

    #[test]
    fn test_walk_ignores_end_of_track_marker() {
        // Chunk length is authoritative; events after EOT are still read
        let body = [0x00, 0xFF, 0x2F, 0x00, 0x00, 0x90, 60, 100];
        let (track, _) = body_events(&body);
        assert_eq!(track.events.len(), 1);
    }
}
