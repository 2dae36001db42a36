//! Audio peripheral configuration for the Money-Eyes face.
//!
//! The face drives a MAX98357A class-D amplifier from the ESP32 I²S0
//! peripheral in master transmit mode. The amplifier derives its clock from
//! BCLK, so no MCLK line is routed.
//!
//! # Pin Assignments (M5Stack Core, MAX98357A breakout)
//!
//! | Function  | GPIO |
//! |-----------|------|
//! | I2S_BCLK  | 12   |
//! | I2S_WS    | 13   |
//! | I2S_DOUT  | 15   |
//!
//! GPIO25 and GPIO26 are the legacy built-in DAC speaker pins. They are left
//! floating by the I²S routing and pick up audible noise unless pulled down.

/// I²S transmit configuration.
///
/// Immutable once applied; re-applying a configuration tears the channel
/// down and recreates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AudioChannelConfig {
    /// Sample rate in Hz (44 100 for the bundled asset).
    pub sample_rate_hz: u32,
    /// Bits per sample; must be a whole number of bytes.
    pub bit_depth: u8,
    /// Number of interleaved channels (1 = mono, 2 = stereo).
    pub channels: u8,
    /// Frames held by one DMA buffer.
    pub buffer_frames: u16,
    /// Number of DMA buffers in the ring.
    pub buffer_count: u8,
}

impl AudioChannelConfig {
    /// Reference configuration: 44.1 kHz, 16-bit signed, stereo, 8 × 1024 frames.
    ///
    /// BCLK = 16 × 2 × 44 100 = 1.4112 MHz.
    pub const fn money_eyes() -> Self {
        Self {
            sample_rate_hz: 44_100,
            bit_depth: 16,
            channels: 2,
            buffer_frames: 1024,
            buffer_count: 8,
        }
    }

    /// Bytes occupied by one interleaved frame (`bit_depth / 8 × channels`).
    pub const fn bytes_per_frame(&self) -> usize {
        (self.bit_depth as usize / 8).saturating_mul(self.channels as usize)
    }

    /// Bytes held by one DMA buffer.
    pub const fn buffer_bytes(&self) -> usize {
        self.bytes_per_frame().saturating_mul(self.buffer_frames as usize)
    }

    /// Calculate the bit clock (BCLK) frequency in Hz.
    ///
    /// BCLK = `bit_depth` × `channels` × `sample_rate_hz`.
    pub fn bclk_hz(&self) -> u32 {
        u32::from(self.bit_depth)
            .saturating_mul(u32::from(self.channels))
            .saturating_mul(self.sample_rate_hz)
    }

    /// Milliseconds of audio needed to play `bytes` of PCM at this rate.
    ///
    /// Returns 0 for an unusable configuration.
    pub fn duration_ms(&self, bytes: usize) -> u64 {
        let per_second = (self.bytes_per_frame() as u64).saturating_mul(u64::from(self.sample_rate_hz));
        if per_second == 0 {
            return 0;
        }
        (bytes as u64).saturating_mul(1000).checked_div(per_second).unwrap_or(0)
    }

    /// Check the configuration can be handed to the driver.
    ///
    /// # Errors
    ///
    /// Returns the first field found out of range.
    pub fn validate(&self) -> Result<(), AudioConfigError> {
        if self.sample_rate_hz == 0 {
            return Err(AudioConfigError::ZeroSampleRate);
        }
        if self.bit_depth == 0 || self.bit_depth % 8 != 0 || self.bit_depth > 32 {
            return Err(AudioConfigError::UnsupportedBitDepth(self.bit_depth));
        }
        if !(1..=2).contains(&self.channels) {
            return Err(AudioConfigError::UnsupportedChannels(self.channels));
        }
        if self.buffer_frames == 0 {
            return Err(AudioConfigError::EmptyBuffer);
        }
        if self.buffer_count < 2 {
            return Err(AudioConfigError::TooFewBuffers(self.buffer_count));
        }
        Ok(())
    }
}

impl Default for AudioChannelConfig {
    fn default() -> Self {
        Self::money_eyes()
    }
}

/// Reason an [`AudioChannelConfig`] was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AudioConfigError {
    /// Sample rate of 0 Hz.
    #[error("sample rate must be non-zero")]
    ZeroSampleRate,
    /// Bit depth that is zero, above 32 or not a whole number of bytes.
    #[error("unsupported bit depth: {0}")]
    UnsupportedBitDepth(u8),
    /// Channel count other than mono or stereo.
    #[error("unsupported channel count: {0}")]
    UnsupportedChannels(u8),
    /// DMA buffers of zero frames.
    #[error("DMA buffer length must be non-zero")]
    EmptyBuffer,
    /// Fewer than two DMA buffers; the ring cannot double-buffer.
    #[error("at least 2 DMA buffers required, got {0}")]
    TooFewBuffers(u8),
}

/// GPIO numbers used by the I²S transmitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2sPins {
    /// Bit clock.
    pub bclk: u8,
    /// Word select (LRCLK).
    pub ws: u8,
    /// Serial data out.
    pub data_out: u8,
}

impl I2sPins {
    /// M5Stack Core with a MAX98357A breakout.
    pub const M5STACK_MAX98357A: Self = Self { bclk: 12, ws: 13, data_out: 15 };

    /// Legacy speaker pins that must be pulled down to keep the output quiet.
    pub const LEGACY_SPEAKER_PINS: [u8; 2] = [25, 26];
}

impl Default for I2sPins {
    fn default() -> Self {
        Self::M5STACK_MAX98357A
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn money_eyes_config_is_valid() {
        let cfg = AudioChannelConfig::money_eyes();
        assert_eq!(cfg.validate(), Ok(()));
        assert_eq!(cfg.bytes_per_frame(), 4);
        assert_eq!(cfg.buffer_bytes(), 4096);
    }

    #[test]
    fn bclk_for_cd_quality_stereo() {
        assert_eq!(AudioChannelConfig::money_eyes().bclk_hz(), 1_411_200);
    }

    #[test]
    fn duration_of_one_second_of_audio() {
        let cfg = AudioChannelConfig::money_eyes();
        assert_eq!(cfg.duration_ms(176_400), 1000);
        assert_eq!(cfg.duration_ms(0), 0);
    }

    #[test]
    fn validate_rejects_zero_sample_rate() {
        let cfg = AudioChannelConfig { sample_rate_hz: 0, ..AudioChannelConfig::money_eyes() };
        assert_eq!(cfg.validate(), Err(AudioConfigError::ZeroSampleRate));
    }

    #[test]
    fn validate_rejects_non_byte_bit_depth() {
        let cfg = AudioChannelConfig { bit_depth: 12, ..AudioChannelConfig::money_eyes() };
        assert_eq!(cfg.validate(), Err(AudioConfigError::UnsupportedBitDepth(12)));
    }

    #[test]
    fn validate_rejects_surround() {
        let cfg = AudioChannelConfig { channels: 6, ..AudioChannelConfig::money_eyes() };
        assert_eq!(cfg.validate(), Err(AudioConfigError::UnsupportedChannels(6)));
    }

    #[test]
    fn validate_rejects_degenerate_ring() {
        let single = AudioChannelConfig { buffer_count: 1, ..AudioChannelConfig::money_eyes() };
        assert_eq!(single.validate(), Err(AudioConfigError::TooFewBuffers(1)));
        let empty = AudioChannelConfig { buffer_frames: 0, ..AudioChannelConfig::money_eyes() };
        assert_eq!(empty.validate(), Err(AudioConfigError::EmptyBuffer));
    }

    #[test]
    fn reference_pins() {
        let pins = I2sPins::default();
        assert_eq!((pins.bclk, pins.ws, pins.data_out), (12, 13, 15));
        assert_eq!(I2sPins::LEGACY_SPEAKER_PINS, [25, 26]);
    }
}
