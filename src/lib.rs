pub mod boundary;
pub mod clock;
pub mod constants;
pub mod display;
pub mod settings;
pub mod shift;
pub mod store;
pub mod ticker;
pub mod time_model;
pub mod tray_menu;

#[cfg(feature = "tray")]
mod tray;

pub use boundary::{BoundaryDetector, Pulse, should_pulse};
pub use clock::{Clock, FixedClock, SystemClock};
pub use settings::{AppSettings, PinnedShift, SettingsManager};
pub use shift::{
    ShiftConfig, ShiftPreview, ShiftStore, TimeOfDay, TimeOfDayError, apply_shift,
    compute_offset_minutes, format_offset,
};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use ticker::{Snapshot, Ticker};
pub use time_model::{
    Phase, RingGeometry, classify_phase, cycle_percent, display_percent, remaining_minutes,
    ring_geometry,
};
#[cfg(feature = "tray")]
pub use tray::run;
