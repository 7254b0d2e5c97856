/// Config directory name (under ~/.config/)
pub const CONFIG_DIR_NAME: &str = "centihour";

/// Storage key of the persisted schedule-shift record
pub const SHIFT_KEY: &str = "driftShift";

/// Storage key of the application settings
pub const SETTINGS_KEY: &str = "settings";

/// Extension used for every stored record
pub const RECORD_EXTENSION: &str = "json";

/// Tray icon ID
pub const TRAY_ID: &str = "main-tray";

/// Default tray title before the first tick
pub const TRAY_TITLE_DEFAULT: &str = "--%";

/// Event emitted to the webview on every tick
pub const TICK_EVENT: &str = "tick";

/// Menu item IDs
pub mod menu {
    pub const PHASE: &str = "phase";
    pub const SHIFT_STATUS: &str = "shift-status";
    pub const SHIFT_OFF: &str = "shift-off";
    pub const SHOW: &str = "show";
    pub const LAUNCH_AT_LOGIN: &str = "launch-at-login";
    pub const QUIT: &str = "quit";
}

/// Time constants
pub mod time {
    /// Seconds per minute
    pub const SECONDS_PER_MINUTE: u32 = 60;

    /// Minutes per hour
    pub const MINUTES_PER_HOUR: i64 = 60;

    /// Seconds per hour, the length of one cycle
    pub const SECONDS_PER_HOUR: u32 = 3600;

    /// Minutes per day
    pub const MINUTES_PER_DAY: i32 = 1440;

    /// Largest offset magnitude a shift can have (half a day)
    pub const MAX_OFFSET_MINUTES: i32 = 720;

    /// Default poll cadence
    pub const TICK_INTERVAL_MS: u64 = 1000;

    /// Fastest poll cadence the settings accept
    pub const MIN_TICK_INTERVAL_MS: u64 = 100;

    /// How long the boundary pulse stays lit
    pub const PULSE_MS: u64 = 800;

    /// Longest pulse the settings accept
    pub const MAX_PULSE_MS: u64 = 10_000;
}

/// Cycle thresholds, in percent
pub mod cycle {
    /// Quarter boundaries that split the hour into phases
    pub const QUARTERS: [f64; 4] = [0.0, 25.0, 50.0, 75.0];

    /// Width of one phase band
    pub const QUARTER_WIDTH: f64 = 25.0;

    /// Previous sample must be above this for a wraparound pulse
    pub const WRAP_HIGH: f64 = 90.0;

    /// Current sample must be below this for a wraparound pulse
    pub const WRAP_LOW: f64 = 10.0;
}

/// Ring dial geometry
pub mod ring {
    /// Default progress ring radius
    pub const RADIUS: f64 = 88.0;

    /// Center of the 220x220 dial
    pub const CENTER: f64 = 110.0;

    /// Outer end of a tick mark
    pub const TICK_OUTER: f64 = 96.0;

    /// Inner end of a tick mark
    pub const TICK_INNER: f64 = 88.0;
}
