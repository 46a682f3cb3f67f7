/// World geometry constants
pub mod world {
    /// Base width/height of the arena with no players connected
    pub const BASE_SIZE: f32 = 2000.0;
    /// Extra width/height granted per connected player
    pub const GROWTH_PER_PLAYER: f32 = 100.0;
    /// Soft blob cap divisor: cap = ((width + height) / 2) / CAP_DIVISOR
    pub const CAP_DIVISOR: f32 = 10.0;
    /// No blob may grow past this fraction of the larger world dimension
    pub const RADIUS_CEILING_RATIO: f32 = 0.25;
}

/// Blob physics and lifecycle constants
pub mod blob {
    /// Radius floor; a player at this size with expired protection dies
    pub const MIN_RADIUS: f32 = 10.0;
    /// Autonomous spawn radius is MIN_RADIUS + round(rand * SPAWN_RADIUS_SPREAD)
    pub const SPAWN_RADIUS_SPREAD: f32 = 20.0;
    /// Hostile victims below this radius are absorbed outright instead of bouncing
    pub const INSTANT_EAT_THRESHOLD: f32 = 8.0;
    /// Maximum drift speed per axis for autonomous blobs
    pub const DRIFT_RANGE: f32 = 2.0;
    /// Offspring created when an oversized autonomous blob splits
    pub const SPLIT_COUNT: usize = 5;
    /// Radius of each split offspring
    pub const SPLIT_RADIUS: f32 = 10.0;
    /// Offspring scatter: placed within +/- half this of the parent's position
    pub const SPLIT_SCATTER: f32 = 20.0;

    pub const PREY_COLOR: &str = "#00FF00";
    pub const HOSTILE_COLOR: &str = "#FF0000";
}

/// Player (piloted blob) constants
pub mod player {
    /// Initial radius when a client attaches
    pub const START_RADIUS: f32 = 20.0;
    /// Base acceleration per active directional flag per tick
    pub const BASE_SPEED: f32 = 1.0;
    /// Momentum decay per tick, applied regardless of input
    pub const FRICTION: f32 = 0.9;
    /// Speed multiplier never drops below this, no matter how large the blob
    pub const MIN_SPEED_MULTIPLIER: f32 = 0.25;
    /// Viewport zoom: multiplier = (viewport.width / ZOOM_DIVISOR) / radius
    pub const ZOOM_DIVISOR: f32 = 16.0;
    /// Leaderboard fallback when the top blob carries no display name
    pub const FALLBACK_NAME: &str = "Bob Jenkins";
}

/// Tick cadence constants
pub mod tick {
    /// Simulation tick rate in Hz
    pub const RATE: u32 = 30;
    /// Tick duration in milliseconds
    pub const DURATION_MS: u64 = 1000 / RATE as u64;
}
