use crate::constants::cycle;
use chrono::{DateTime, Duration, TimeZone};

/// Whether going from `prev` to `curr` crossed a phase boundary.
///
/// Crossings are tested as "previous sample below the threshold, current at
/// or above it" so a coarse poll cadence cannot step over one. A drop from
/// above 90 to below 10 counts as the hour wrapping; a plain decrease does
/// not pulse.
pub fn should_pulse(prev: f64, curr: f64) -> bool {
    let crossed_quarter = cycle::QUARTERS
        .iter()
        .skip(1)
        .any(|&threshold| prev < threshold && curr >= threshold);
    let wrapped = prev > cycle::WRAP_HIGH && curr < cycle::WRAP_LOW;

    crossed_quarter || wrapped
}

/// Carries the previous percent from one tick to the next.
#[derive(Debug, Clone, Default)]
pub struct BoundaryDetector {
    prev: Option<f64>,
}

impl BoundaryDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from a known sample instead of waiting for the first tick.
    pub fn seeded(percent: f64) -> Self {
        Self {
            prev: Some(percent),
        }
    }

    /// Feeds the current sample. The first observation only seeds the
    /// detector and never pulses.
    pub fn observe(&mut self, percent: f64) -> bool {
        let fired = self.prev.is_some_and(|prev| should_pulse(prev, percent));
        self.prev = Some(percent);
        fired
    }

    pub fn previous(&self) -> Option<f64> {
        self.prev
    }
}

/// A one-shot highlight that switches itself off after a fixed duration.
/// Arming it again while lit restarts the countdown.
#[derive(Debug, Clone)]
pub struct Pulse<Tz: TimeZone> {
    duration: Duration,
    until: Option<DateTime<Tz>>,
}

impl<Tz: TimeZone> Pulse<Tz> {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            until: None,
        }
    }

    pub fn arm(&mut self, now: DateTime<Tz>) {
        self.until = Some(now + self.duration);
    }

    pub fn cancel(&mut self) {
        self.until = None;
    }

    pub fn is_active(&self, now: &DateTime<Tz>) -> bool {
        self.until.as_ref().is_some_and(|until| now < until)
    }
}
