//! Channel voice events

/// Status category of a channel voice message (status byte with the
/// channel nibble stripped).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum EventKind {
    NoteOff = 0x80,
    NoteOn = 0x90,
    PolyPressure = 0xA0,
    ControlChange = 0xB0,
    ProgramChange = 0xC0,
    ChannelPressure = 0xD0,
    PitchBend = 0xE0,
}

impl EventKind {
    /// Kind for a channel voice status byte (0x80..=0xEF), ignoring the
    /// channel nibble.
    pub fn from_status(status: u8) -> Option<Self> {
        match status & 0xF0 {
            0x80 => Some(EventKind::NoteOff),
            0x90 => Some(EventKind::NoteOn),
            0xA0 => Some(EventKind::PolyPressure),
            0xB0 => Some(EventKind::ControlChange),
            0xC0 => Some(EventKind::ProgramChange),
            0xD0 => Some(EventKind::ChannelPressure),
            0xE0 => Some(EventKind::PitchBend),
            _ => None,
        }
    }

    /// Status byte for this kind on `channel` (0-15).
    pub fn status(self, channel: u8) -> u8 {
        self as u8 | (channel & 0x0F)
    }

    /// Number of data bytes following the status byte.
    pub fn data_len(self) -> usize {
        match self {
            EventKind::ProgramChange | EventKind::ChannelPressure => 1,
            _ => 2,
        }
    }
}

/// A decoded channel voice message with its absolute position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    /// Absolute tick
    pub tick_time: u32,
    /// Absolute time in seconds. Derived from the tempo map on load; set by
    /// the caller for events handed to the writer.
    pub second_time: f64,
    pub kind: EventKind,
    /// MIDI channel (0-15)
    pub channel: u8,
    /// First data byte (key, controller, program, ...)
    pub data1: u8,
    /// Second data byte (velocity, value, ...); 0 for one-byte messages
    pub data2: u8,
}

impl Event {
    pub fn new(kind: EventKind, channel: u8, data1: u8, data2: u8) -> Self {
        Self {
            tick_time: 0,
            second_time: 0.0,
            kind,
            channel: channel & 0x0F,
            data1,
            data2,
        }
    }

    pub fn note_on(seconds: f64, channel: u8, key: u8, velocity: u8) -> Self {
        Self::new(EventKind::NoteOn, channel, key, velocity).at_seconds(seconds)
    }

    pub fn note_off(seconds: f64, channel: u8, key: u8, velocity: u8) -> Self {
        Self::new(EventKind::NoteOff, channel, key, velocity).at_seconds(seconds)
    }

    pub fn at_tick(mut self, tick: u32) -> Self {
        self.tick_time = tick;
        self
    }

    pub fn at_seconds(mut self, seconds: f64) -> Self {
        self.second_time = seconds;
        self
    }

    pub fn status(&self) -> u8 {
        self.kind.status(self.channel)
    }

    /// Note-on with non-zero velocity.
    pub fn is_note_on(&self) -> bool {
        self.kind == EventKind::NoteOn && self.data2 > 0
    }

    /// Note-off, or note-on with zero velocity.
    pub fn is_note_off(&self) -> bool {
        self.kind == EventKind::NoteOff || (self.kind == EventKind::NoteOn && self.data2 == 0)
    }

    pub fn is_note(&self) -> bool {
        self.is_note_on() || self.is_note_off()
    }

    /// Key number for note and poly-pressure messages.
    pub fn key(&self) -> Option<u8> {
        match self.kind {
            EventKind::NoteOn | EventKind::NoteOff | EventKind::PolyPressure => Some(self.data1),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert_eq!(EventKind::from_status(0x93), Some(EventKind::NoteOn));
        assert_eq!(EventKind::from_status(0x8F), Some(EventKind::NoteOff));
        assert_eq!(EventKind::from_status(0xEA), Some(EventKind::PitchBend));
        assert_eq!(EventKind::from_status(0xF0), None);
        assert_eq!(EventKind::from_status(0x40), None);
    }

    #[test]
    fn test_status_byte() {
        assert_eq!(EventKind::ControlChange.status(5), 0xB5);
        assert_eq!(EventKind::NoteOn.status(0x1F), 0x9F);
        let e = Event::new(EventKind::ProgramChange, 9, 12, 0);
        assert_eq!(e.status(), 0xC9);
    }

    #[test]
    fn test_data_len() {
        assert_eq!(EventKind::ProgramChange.data_len(), 1);
        assert_eq!(EventKind::ChannelPressure.data_len(), 1);
        assert_eq!(EventKind::NoteOn.data_len(), 2);
        assert_eq!(EventKind::PitchBend.data_len(), 2);
    }

    #[test]
    fn test_zero_velocity_note_on_is_note_off() {
        let on = Event::note_on(0.0, 0, 60, 100);
        assert!(on.is_note_on());
        assert!(!on.is_note_off());

        let silent = Event::note_on(0.0, 0, 60, 0);
        assert!(!silent.is_note_on());
        assert!(silent.is_note_off());

        let off = Event::note_off(0.5, 0, 60, 64);
        assert!(off.is_note_off());
        assert!(off.is_note());

        let cc = Event::new(EventKind::ControlChange, 0, 7, 0);
        assert!(!cc.is_note());
        assert_eq!(cc.key(), None);
    }

    #[test]
    fn test_kind_order_puts_note_on_above_note_off() {
        assert!((EventKind::NoteOn as u8) > (EventKind::NoteOff as u8));
    }
}
