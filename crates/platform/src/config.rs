//! Application configuration and constants
//!
//! This module defines central configuration values used across the application.
//! All naming and fixed asset locations should reference these constants
//! rather than hardcoding values.

/// The application name
pub const APP_NAME: &str = "Money-Eyes";

/// Application version (synchronized with Cargo.toml)
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Path of the episode sound on the storage medium.
pub const SOUND_ASSET_PATH: &str = "/cash_44_stereo.wav";

/// Size of the fixed header preceding the PCM frames in the sound asset.
pub const PCM_HEADER_BYTES: usize = 44;

/// Longest a single playback may block the tick loop, in milliseconds.
pub const MAX_PLAYBACK_MS: u64 = 5000;

/// Target period of the animation tick, in milliseconds.
pub const FRAME_PERIOD_MS: u64 = 10;

/// Full application title (name + version)
pub const fn app_title() -> &'static str {
    concat!("Money-Eyes ", env!("CARGO_PKG_VERSION"))
}
