//! Duty-cycle estimator.
//!
//! A *period* starts when the fan stops and ends at the next stop, so it is
//! an off stretch followed by an on stretch.  The instantaneous ratio is
//! on-time over elapsed period time; closed periods are folded into a
//! bounded moving average.

use crate::clock::{SECS_PER_DAY, Timestamp};

/// Ratio of on-time to total period time.
///
/// If `period_start > now` the clock is taken to have wrapped past
/// midnight: `now` moves forward one day, as does `on_start` when it too
/// lies before the wrap.  A non-positive denominator yields 0 and the result
/// is always clamped to `[0, 1]`.
pub fn period_ratio(now: Timestamp, on_start: Timestamp, period_start: Timestamp) -> f32 {
    let (mut now, mut on_start) = (now, on_start);
    if period_start > now {
        now += SECS_PER_DAY;
        if on_start < period_start {
            on_start += SECS_PER_DAY;
        }
    }

    let total = now - period_start;
    if total <= 0 {
        return 0.0;
    }
    let on = now - on_start;
    ((on as f64 / total as f64) as f32).clamp(0.0, 1.0)
}

/// Incremental mean with the sample count capped at `max_samples`.
///
/// Once the cap is reached every new sample carries weight
/// `1 / max_samples`.  Returns `(new_average, new_count)`.
pub fn fold_moving_average(average: f32, sample: f32, count: u16, max_samples: u16) -> (f32, u16) {
    let cap = max_samples.max(1);
    let new_count = count.saturating_add(1).min(cap);
    let n = f32::from(new_count);
    let sample = sample.clamp(0.0, 1.0);
    let new_average = (average * (n - 1.0) + sample) / n;
    (new_average.clamp(0.0, 1.0), new_count)
}

/// Estimator state owned by the FSM context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DutyCycleState {
    /// Start of the current on/off period (last stop).
    pub period_start: Timestamp,
    /// When the fan last started.
    pub on_period_start: Timestamp,
    /// Ratio of the open period, updated while running.
    pub current_ratio: f32,
    /// Average of closed periods.
    pub moving_average: f32,
    /// Samples folded so far, capped at `max_samples`.
    pub sample_count: u16,
    pub max_samples: u16,
}

impl DutyCycleState {
    pub fn new(now: Timestamp, max_samples: u16) -> Self {
        Self {
            period_start: now,
            on_period_start: now,
            current_ratio: 0.0,
            moving_average: 0.0,
            sample_count: 0,
            max_samples,
        }
    }

    /// Recompute `current_ratio` for the running fan.
    pub fn update_ratio(&mut self, now: Timestamp) -> f32 {
        self.current_ratio = period_ratio(now, self.on_period_start, self.period_start);
        self.current_ratio
    }

    /// Move both period marks by `delta` seconds, keeping the elapsed on
    /// and off time.  Used when the wall clock is stepped backwards.
    pub fn shift(&mut self, delta: Timestamp) {
        self.period_start += delta;
        self.on_period_start += delta;
    }

    /// Mark the start of an on stretch.
    pub fn start_on(&mut self, now: Timestamp) {
        self.on_period_start = now;
    }

    /// Fold the open period into the average and start a new one.
    /// Returns the ratio that was folded.
    pub fn close_period(&mut self, now: Timestamp) -> f32 {
        let sample = self.current_ratio;
        let (avg, count) = fold_moving_average(
            self.moving_average,
            sample,
            self.sample_count,
            self.max_samples,
        );
        self.moving_average = avg;
        self.sample_count = count;
        self.current_ratio = 0.0;
        self.period_start = now;
        sample
    }
}
