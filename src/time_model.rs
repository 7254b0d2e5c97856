use crate::constants::{cycle, ring, time};
use chrono::Timelike;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// One of the four quarter-hour bands of the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Fresh,
    Flowing,
    Ticking,
    Closing,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Phase::Fresh, Phase::Flowing, Phase::Ticking, Phase::Closing];

    pub fn label(self) -> &'static str {
        match self {
            Phase::Fresh => "fresh",
            Phase::Flowing => "flowing",
            Phase::Ticking => "ticking",
            Phase::Closing => "closing",
        }
    }

    /// Stroke color of the ring while in this phase
    pub fn ring(self) -> &'static str {
        match self {
            Phase::Fresh => "#4ADE80",
            Phase::Flowing => "#FACC15",
            Phase::Ticking => "#FB923C",
            Phase::Closing => "#F87171",
        }
    }

    /// Ambient background glow while in this phase
    pub fn glow(self) -> &'static str {
        match self {
            Phase::Fresh => "rgba(74,222,128,0.15)",
            Phase::Flowing => "rgba(250,204,21,0.12)",
            Phase::Ticking => "rgba(251,146,60,0.12)",
            Phase::Closing => "rgba(248,113,113,0.15)",
        }
    }
}

/// Position of `instant` within its hour, in `[0, 100)`.
pub fn cycle_percent<T: Timelike>(instant: &T) -> f64 {
    let elapsed = instant.minute() * time::SECONDS_PER_MINUTE + instant.second();
    f64::from(elapsed) / f64::from(time::SECONDS_PER_HOUR) * 100.0
}

/// Anything at or above 75 is `Closing`, so a value nudged to exactly 100 by
/// rounding still lands in a band.
pub fn classify_phase(percent: f64) -> Phase {
    if percent < 25.0 {
        Phase::Fresh
    } else if percent < 50.0 {
        Phase::Flowing
    } else if percent < 75.0 {
        Phase::Ticking
    } else {
        Phase::Closing
    }
}

/// Whole minutes left in the hour, rounded up and clamped to `[0, 60]`.
///
/// This is a glanceable estimate for the UI, not a countdown: with one
/// second left it still reports 1.
pub fn remaining_minutes(percent: f64) -> u32 {
    let minutes = ((100.0 - percent) / 100.0 * time::MINUTES_PER_HOUR as f64).ceil();
    minutes.clamp(0.0, time::MINUTES_PER_HOUR as f64) as u32
}

/// Integer percent for text rendering. Never 100: the cycle resets first.
pub fn display_percent(percent: f64) -> u8 {
    percent.floor().clamp(0.0, 99.0) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RingGeometry {
    pub circumference: f64,
    pub dash_offset: f64,
}

/// Stroke dash parameters that draw `percent` of a circle of `radius`.
pub fn ring_geometry(percent: f64, radius: f64) -> RingGeometry {
    let circumference = 2.0 * PI * radius;
    RingGeometry {
        circumference,
        dash_offset: circumference - (percent / 100.0) * circumference,
    }
}

pub fn next_milestone(percent: f64) -> &'static str {
    match classify_phase(percent) {
        Phase::Fresh => "Quarter at 25%",
        Phase::Flowing => "Halfway at 50%",
        Phase::Ticking => "Three-quarter at 75%",
        Phase::Closing => "New hour at 100%",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SegmentFill {
    Empty,
    Partial,
    Full,
}

/// Fill state of the four quarter segments under the dial.
pub fn segments(percent: f64) -> [SegmentFill; 4] {
    cycle::QUARTERS.map(|start| {
        if percent >= start + cycle::QUARTER_WIDTH {
            SegmentFill::Full
        } else if percent >= start {
            SegmentFill::Partial
        } else {
            SegmentFill::Empty
        }
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickMark {
    pub tick: f64,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub lit: bool,
}

/// Quarter tick marks around the dial, lit once the cycle has reached them.
pub fn tick_marks(percent: f64) -> [TickMark; 4] {
    cycle::QUARTERS.map(|tick| {
        let angle = (tick / 100.0 * 360.0 - 90.0).to_radians();
        let (sin, cos) = angle.sin_cos();
        TickMark {
            tick,
            x1: ring::CENTER + ring::TICK_OUTER * cos,
            y1: ring::CENTER + ring::TICK_OUTER * sin,
            x2: ring::CENTER + ring::TICK_INNER * cos,
            y2: ring::CENTER + ring::TICK_INNER * sin,
            lit: percent >= tick,
        }
    })
}
