//! Face configuration
//!
//! Everything the boot sequence and the tick driver need, gathered from the
//! platform constants. Hardware builds use [`FaceConfig::default`]; the
//! emulator and tests override single fields.

use heapless::String;
use platform::config::{FRAME_PERIOD_MS, MAX_PLAYBACK_MS, SOUND_ASSET_PATH};
use platform::{AudioChannelConfig, I2sPins};
use ui::AnimationConfig;

use crate::audio::cue::MAX_ASSET_PATH;
use crate::ui::EyeLayout;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Asset path does not fit the fixed-capacity string
    #[error("asset path is {0} bytes, limit is {}", MAX_ASSET_PATH)]
    AssetPathTooLong(usize),
}

/// Firmware-wide settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceConfig {
    /// Sound asset played on Special entry.
    pub asset_path: String<MAX_ASSET_PATH>,
    /// Upper bound on one playback.
    pub max_playback_ms: u64,
    /// Target tick period.
    pub frame_period_ms: u64,
    /// I²S stream format and DMA ring.
    pub audio: AudioChannelConfig,
    /// I²S pin routing.
    pub pins: I2sPins,
    /// Eye animation tuning.
    pub animation: AnimationConfig,
    /// Eye geometry.
    pub layout: EyeLayout,
}

impl FaceConfig {
    /// Replace the asset path.
    pub fn with_asset_path(mut self, path: &str) -> Result<Self, ConfigError> {
        self.asset_path =
            String::try_from(path).map_err(|_| ConfigError::AssetPathTooLong(path.len()))?;
        Ok(self)
    }
}

impl Default for FaceConfig {
    fn default() -> Self {
        Self {
            asset_path: String::try_from(SOUND_ASSET_PATH).unwrap_or_default(),
            max_playback_ms: MAX_PLAYBACK_MS,
            frame_period_ms: FRAME_PERIOD_MS,
            audio: AudioChannelConfig::money_eyes(),
            pins: I2sPins::M5STACK_MAX98357A,
            animation: AnimationConfig::default(),
            layout: EyeLayout::default(),
        }
    }
}
