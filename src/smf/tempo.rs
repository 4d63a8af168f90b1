//! Tempo map and tick/second conversion
//!
//! Tempo is piecewise constant between tempo changes, so wall-clock time is
//! piecewise linear in ticks. `TempoMap` precomputes the elapsed seconds at
//! each change; a conversion is then one lookup plus one segment.

/// 120 BPM
pub const DEFAULT_MICROSECONDS_PER_QUARTER: u32 = 500_000;
pub const DEFAULT_BPM: f64 = 120.0;

const MICROSECONDS_PER_MINUTE: f64 = 60_000_000.0;

/// A tempo meta-event (type 0x51) at an absolute tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TempoChange {
    pub tick: u32,
    pub microseconds_per_quarter: u32,
}

impl TempoChange {
    pub fn bpm(&self) -> f64 {
        MICROSECONDS_PER_MINUTE / f64::from(self.microseconds_per_quarter)
    }
}

impl Default for TempoChange {
    fn default() -> Self {
        Self {
            tick: 0,
            microseconds_per_quarter: DEFAULT_MICROSECONDS_PER_QUARTER,
        }
    }
}

/// Start of a constant-tempo segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimePoint {
    pub tick: u32,
    /// Seconds elapsed at `tick`
    pub seconds: f64,
    /// Tempo in effect from `tick` on
    pub microseconds_per_quarter: u32,
}

impl TimePoint {
    pub fn bpm(&self) -> f64 {
        MICROSECONDS_PER_MINUTE / f64::from(self.microseconds_per_quarter)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TempoMap {
    changes: Vec<TempoChange>,
    points: Vec<TimePoint>,
    ticks_per_quarter: u16,
}

/// Seconds covered by `ticks` at a constant tempo.
fn segment_seconds(ticks: u32, microseconds_per_quarter: u32, ticks_per_quarter: u16) -> f64 {
    f64::from(ticks) * f64::from(microseconds_per_quarter)
        / (f64::from(ticks_per_quarter) * 1_000_000.0)
}

impl TempoMap {
    /// Build the map from tempo changes in any order.
    ///
    /// With no changes the map holds a single 120 BPM entry at tick 0. A
    /// `ticks_per_quarter` of zero is treated as one.
    pub fn new(mut changes: Vec<TempoChange>, ticks_per_quarter: u16) -> Self {
        let ticks_per_quarter = ticks_per_quarter.max(1);

        if changes.is_empty() {
            changes.push(TempoChange::default());
        }
        changes.sort_by_key(|change| change.tick);

        let mut current = if changes[0].tick == 0 {
            changes[0].microseconds_per_quarter
        } else {
            DEFAULT_MICROSECONDS_PER_QUARTER
        };

        let mut points = vec![TimePoint {
            tick: 0,
            seconds: 0.0,
            microseconds_per_quarter: current,
        }];

        let mut seconds = 0.0;
        let mut last_tick = 0;
        for change in &changes {
            if change.tick == 0 {
                points[0].microseconds_per_quarter = change.microseconds_per_quarter;
                current = change.microseconds_per_quarter;
                continue;
            }

            seconds += segment_seconds(change.tick - last_tick, current, ticks_per_quarter);
            last_tick = change.tick;
            current = change.microseconds_per_quarter;
            points.push(TimePoint {
                tick: change.tick,
                seconds,
                microseconds_per_quarter: current,
            });
        }

        Self {
            changes,
            points,
            ticks_per_quarter,
        }
    }

    /// Tempo changes sorted by tick.
    pub fn changes(&self) -> &[TempoChange] {
        &self.changes
    }

    /// Cumulative time table, one entry per segment, starting at tick 0.
    pub fn points(&self) -> &[TimePoint] {
        &self.points
    }

    /// BPM of the earliest tempo change.
    pub fn initial_bpm(&self) -> f64 {
        self.changes[0].bpm()
    }

    pub fn tick_to_seconds(&self, tick: u32) -> f64 {
        let idx = self.points.partition_point(|p| p.tick <= tick) - 1;
        let point = &self.points[idx];
        point.seconds
            + segment_seconds(
                tick - point.tick,
                point.microseconds_per_quarter,
                self.ticks_per_quarter,
            )
    }
}
