//! Boot sequence for the Money-Eyes face.
//!
//! Initialization order:
//!   1. Storage: the medium must answer, otherwise the caller halts
//!   2. Asset probe: a missing sound file only disables sound
//!   3. Quiet environment: radios off, legacy speaker pins pulled low
//!   4. I²S bring-up: driver, pins, clock, then a silent prime of the DMA ring
//!   5. Tick loop
//!
//! Steps 3 and 4 happen inside
//! [`AudioOutputChannel::configure`](playback::AudioOutputChannel::configure);
//! an audio failure leaves the face animating without sound.

use embedded_hal_async::delay::DelayNs;
use platform::{AudioBus, Clock, QuietEnvironment, Storage};
use playback::AudioOutputChannel;

use crate::audio::EpisodeSound;
use crate::config::FaceConfig;

/// Ordered list of boot sequence steps for documentation and testing.
pub const BOOT_SEQUENCE_STEPS: &[&str] = &[
    "1. Storage: mount the medium; halt with a periodic idle if it does not answer",
    "2. Asset: probe for the episode sound; warn and continue if missing",
    "3. Quiet environment: radios off, legacy speaker pins low",
    "4. I2S: install driver, route pins, set clock, prime the DMA ring with silence",
    "5. Tick loop: advance, render, push, maybe play",
];

/// Period of the idle loop after a fatal startup error.
pub const IDLE_PERIOD_MS: u32 = 1000;

/// Fatal startup errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartupError {
    /// The storage medium did not respond
    #[error("storage unavailable")]
    StorageUnavailable,
}

/// What the boot sequence found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BootReport {
    /// The sound asset exists on storage.
    pub asset_present: bool,
    /// The output channel configured and primed.
    pub audio_ready: bool,
}

/// Probe storage and bring up audio.
///
/// Only a storage failure is fatal. A missing asset or a failed audio
/// configuration is logged and the returned cue reports itself unavailable
/// whenever asked to play.
pub async fn boot<S, B, E, D, C>(
    mut storage: S,
    mut channel: AudioOutputChannel<B, E, D, C>,
    config: &FaceConfig,
) -> Result<(EpisodeSound<S, B, E, D, C>, BootReport), StartupError>
where
    S: Storage,
    B: AudioBus,
    E: QuietEnvironment,
    D: DelayNs,
    C: Clock,
{
    info!("{}", platform::config::app_title());

    let asset_present = match storage.exists(&config.asset_path).await {
        Ok(present) => present,
        Err(_) => {
            warn!("storage probe failed");
            return Err(StartupError::StorageUnavailable);
        }
    };
    if !asset_present {
        warn!("sound asset missing; continuing without sound");
    }

    let audio_ready = match channel.configure(config.audio).await {
        Ok(()) => true,
        Err(e) => {
            warn!("audio configuration failed: {:?}; continuing without sound", e);
            false
        }
    };

    info!("boot complete: asset_present={}, audio_ready={}", asset_present, audio_ready);
    let cue = EpisodeSound::new(storage, channel, config.asset_path.clone(), config.max_playback_ms);
    Ok((cue, BootReport { asset_present, audio_ready }))
}

/// Park after a fatal startup error.
pub async fn idle_forever<D: DelayNs>(mut delay: D) -> ! {
    loop {
        delay.delay_ms(IDLE_PERIOD_MS).await;
    }
}
