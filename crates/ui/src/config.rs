//! Tunable animation constants.

/// Timing and travel limits of the eye animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AnimationConfig {
    /// Horizontal pupil travel either side of centre, in pixels.
    pub max_dx: u16,
    /// Vertical pupil travel either side of centre, in pixels.
    pub max_dy: u16,
    /// How long the eyes stay shut once a blink starts.
    pub blink_hold_ms: u64,
    /// Shortest gap between blinks.
    pub blink_min_ms: u64,
    /// Longest gap between blinks (exclusive).
    pub blink_max_ms: u64,
    /// Shortest time spent in one mode.
    pub mode_min_ms: u64,
    /// Longest time spent in one mode (exclusive).
    pub mode_max_ms: u64,
}

impl AnimationConfig {
    /// Reference tuning for the 320×240 panel.
    pub const fn money_eyes() -> Self {
        Self {
            max_dx: 30,
            max_dy: 15,
            blink_hold_ms: 120,
            blink_min_ms: 2000,
            blink_max_ms: 5000,
            mode_min_ms: 4000,
            mode_max_ms: 8000,
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self::money_eyes()
    }
}
