use crate::boundary::{BoundaryDetector, Pulse};
use crate::clock::Clock;
use crate::display::format_time;
use crate::settings::AppSettings;
use crate::shift::{ShiftConfig, ShiftStore};
use crate::store::KeyValueStore;
use crate::time_model::{
    self, Phase, SegmentFill, TickMark, classify_phase, cycle_percent, display_percent,
    next_milestone, remaining_minutes, ring_geometry,
};
use chrono::Local;
use log::debug;
use serde::Serialize;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};

/// Everything the dial and the tray need for one frame.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub percent: f64,
    pub display_percent: u8,
    pub phase: Phase,
    pub ring: &'static str,
    pub glow: &'static str,
    pub remaining_minutes: u32,
    pub dash_offset: f64,
    pub next_milestone: &'static str,
    pub segments: [SegmentFill; 4],
    pub ticks: [TickMark; 4],
    /// Shifted time when a shift is active, otherwise the real time
    pub clock_time: String,
    /// Real time, only present while shifted
    pub local_time: Option<String>,
    pub shift_active: bool,
    pub offset_minutes: Option<i32>,
    pub pulse: bool,
}

pub struct Ticker<C, S> {
    clock: C,
    shifts: ShiftStore<S>,
    pinned: Option<ShiftConfig>,
    detector: BoundaryDetector,
    pulse: Pulse<Local>,
    ring_radius: f64,
    hour12: bool,
}

impl<C: Clock, S: KeyValueStore> Ticker<C, S> {
    /// The boundary detector is seeded from the clock right away so the
    /// first tick never pulses.
    pub fn new(clock: C, shifts: ShiftStore<S>, settings: &AppSettings) -> Self {
        let detector = BoundaryDetector::seeded(cycle_percent(&clock.now()));
        Self {
            clock,
            shifts,
            pinned: settings.pinned_config(),
            detector,
            pulse: Pulse::new(settings.pulse_duration()),
            ring_radius: settings.ring_radius,
            hour12: settings.hour12,
        }
    }

    /// A pinned shift wins over the stored record; a stored record only
    /// counts while enabled.
    pub fn active_shift(&self) -> Option<ShiftConfig> {
        self.pinned
            .clone()
            .or_else(|| self.shifts.load().filter(|config| config.enabled))
    }

    pub fn tick(&mut self) -> Snapshot {
        let now = self.clock.now();
        let percent = cycle_percent(&now);

        if self.detector.observe(percent) {
            debug!("Boundary crossed at {percent:.2}%");
            self.pulse.arm(now);
        }

        let phase = classify_phase(percent);
        let shift = self.active_shift();
        let (clock_time, local_time) = match &shift {
            Some(config) => (
                format_time(&config.apply(now), self.hour12),
                Some(format_time(&now, self.hour12)),
            ),
            None => (format_time(&now, self.hour12), None),
        };

        Snapshot {
            percent,
            display_percent: display_percent(percent),
            phase,
            ring: phase.ring(),
            glow: phase.glow(),
            remaining_minutes: remaining_minutes(percent),
            dash_offset: ring_geometry(percent, self.ring_radius).dash_offset,
            next_milestone: next_milestone(percent),
            segments: time_model::segments(percent),
            ticks: time_model::tick_marks(percent),
            clock_time,
            local_time,
            shift_active: shift.is_some(),
            offset_minutes: shift.map(|config| config.offset_minutes),
            pulse: self.pulse.is_active(&now),
        }
    }

    /// Ticks forever at `period`, feeding each snapshot to `sink`. Ticks
    /// that fall behind are skipped rather than replayed. Stop it by
    /// aborting the task it runs on.
    pub async fn run<F>(mut self, period: Duration, mut sink: F)
    where
        F: FnMut(Snapshot),
    {
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            sink(self.tick());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::shift::TimeOfDay;
    use crate::store::MemoryStore;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn setup(
        h: u32,
        m: u32,
        s: u32,
        settings: &AppSettings,
    ) -> (Arc<FixedClock>, Arc<MemoryStore>, Ticker<Arc<FixedClock>, Arc<MemoryStore>>) {
        let start = Local.with_ymd_and_hms(2024, 3, 1, h, m, s).unwrap();
        let clock = Arc::new(FixedClock::new(start));
        let store = Arc::new(MemoryStore::new());
        let ticker = Ticker::new(clock.clone(), ShiftStore::new(store.clone()), settings);
        (clock, store, ticker)
    }

    fn tod(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    #[test]
    fn first_tick_never_pulses() {
        let (_clock, _store, mut ticker) = setup(9, 15, 0, &AppSettings::default());
        let snap = ticker.tick();
        assert!(!snap.pulse);
        assert_eq!(snap.display_percent, 25);
        assert_eq!(snap.phase, Phase::Flowing);
        assert_eq!(snap.remaining_minutes, 45);
        assert_eq!(snap.next_milestone, "Halfway at 50%");
    }

    #[test]
    fn quarter_crossing_lights_pulse_briefly() {
        let (clock, _store, mut ticker) = setup(9, 14, 58, &AppSettings::default());
        assert!(!ticker.tick().pulse);

        clock.advance(chrono::Duration::seconds(2));
        let snap = ticker.tick();
        assert!(snap.pulse);
        assert_eq!(snap.phase, Phase::Flowing);
        assert_eq!(snap.ring, "#FACC15");

        clock.advance(chrono::Duration::milliseconds(500));
        assert!(ticker.tick().pulse);

        clock.advance(chrono::Duration::milliseconds(500));
        assert!(!ticker.tick().pulse);
    }

    #[test]
    fn hour_wrap_pulses() {
        let (clock, _store, mut ticker) = setup(9, 59, 59, &AppSettings::default());
        let before = ticker.tick();
        assert_eq!(before.display_percent, 99);
        assert_eq!(before.phase, Phase::Closing);

        clock.advance(chrono::Duration::seconds(1));
        let after = ticker.tick();
        assert!(after.pulse);
        assert_eq!(after.display_percent, 0);
        assert_eq!(after.phase, Phase::Fresh);
        assert_eq!(after.remaining_minutes, 60);
    }

    #[test]
    fn unshifted_clock_shows_real_time() {
        let (_clock, _store, mut ticker) = setup(9, 14, 58, &AppSettings::default());
        let snap = ticker.tick();
        assert_eq!(snap.clock_time, "09:14 AM");
        assert_eq!(snap.local_time, None);
        assert!(!snap.shift_active);
        assert_eq!(snap.offset_minutes, None);
    }

    #[test]
    fn enabled_shift_moves_clock_and_keeps_real_time() {
        let (_clock, store, mut ticker) = setup(9, 14, 58, &AppSettings::default());
        let shifts = ShiftStore::new(store.clone());
        shifts.save(tod("10:00"), tod("06:00"), 240, true);

        let snap = ticker.tick();
        assert!(snap.shift_active);
        assert_eq!(snap.offset_minutes, Some(240));
        assert_eq!(snap.clock_time, "05:14 AM");
        assert_eq!(snap.local_time.as_deref(), Some("09:14 AM"));
        // the cycle follows the real clock
        assert_eq!(snap.display_percent, 24);

        shifts.disable();
        let snap = ticker.tick();
        assert!(!snap.shift_active);
        assert_eq!(snap.clock_time, "09:14 AM");
    }

    #[test]
    fn pinned_shift_overrides_store() {
        let settings = AppSettings {
            hour12: false,
            pinned_shift: Some(crate::settings::PinnedShift {
                actual_wake: tod("08:30"),
                ideal_wake: tod("07:00"),
            }),
            ..AppSettings::default()
        };
        let (_clock, store, mut ticker) = setup(9, 14, 58, &settings);
        ShiftStore::new(store.clone()).save(tod("10:00"), tod("06:00"), 240, false);

        let snap = ticker.tick();
        assert!(snap.shift_active);
        assert_eq!(snap.offset_minutes, Some(90));
        assert_eq!(snap.clock_time, "07:44");
        assert_eq!(snap.local_time.as_deref(), Some("09:14"));
    }

    #[test]
    fn broken_store_reads_as_no_shift() {
        let (_clock, store, mut ticker) = setup(9, 14, 58, &AppSettings::default());
        ShiftStore::new(store.clone()).save(tod("10:00"), tod("06:00"), 240, true);
        store.set_failing(true);

        let snap = ticker.tick();
        assert!(!snap.shift_active);
        assert_eq!(snap.clock_time, "09:14 AM");
    }

    #[test]
    fn snapshot_serializes_camel_case() {
        let (_clock, _store, mut ticker) = setup(9, 30, 0, &AppSettings::default());
        let value = serde_json::to_value(ticker.tick()).unwrap();
        assert_eq!(value["displayPercent"], 50);
        assert_eq!(value["phase"], "ticking");
        assert_eq!(value["remainingMinutes"], 30);
        assert_eq!(value["shiftActive"], false);
        assert_eq!(value["segments"][1], "full");
        assert_eq!(value["segments"][2], "partial");
        assert!(value["localTime"].is_null());
    }

    #[tokio::test(start_paused = true)]
    async fn run_loop_ticks_until_aborted() {
        let (_clock, _store, ticker) = setup(9, 14, 58, &AppSettings::default());
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let handle = tokio::spawn(ticker.run(Duration::from_secs(1), move |snap| {
            let _ = tx.send(snap);
        }));

        for _ in 0..3 {
            let snap = rx.recv().await.unwrap();
            assert_eq!(snap.display_percent, 24);
        }

        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());
        // the sender went away with the task, so the channel drains and closes
        while rx.recv().await.is_some() {}
    }
}
