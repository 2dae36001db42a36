//! Sound cue played on entry into Special mode.

use core::future::Future;

use embedded_hal_async::delay::DelayNs;
use heapless::String;
use platform::{AudioBus, Clock, QuietEnvironment, Storage};
use playback::{AudioError, AudioOutputChannel, PcmSource, PlaybackReport, PlaybackSession};

/// Longest asset path [`EpisodeSound`] stores.
pub const MAX_ASSET_PATH: usize = 64;

/// What happened when the cue was asked to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CueOutcome {
    /// The whole asset was streamed.
    Played(PlaybackReport),
    /// A session started but stopped early.
    Interrupted(AudioError),
    /// The asset could not be opened; nothing was written.
    SourceUnavailable,
    /// The channel refused the session; nothing was written.
    ChannelUnavailable(AudioError),
}

impl CueOutcome {
    /// `true` once a session reached the bus, whether or not it finished.
    pub fn started(&self) -> bool {
        matches!(self, Self::Played(_) | Self::Interrupted(_))
    }
}

/// Something that can play the episode sound.
pub trait SoundCue {
    /// Play the sound to completion (or until it fails).
    fn play_episode_sound(&mut self) -> impl Future<Output = CueOutcome>;
}

/// [`SoundCue`] streaming a PCM asset through an owned output channel.
pub struct EpisodeSound<S, B, E, D, C> {
    storage: S,
    channel: AudioOutputChannel<B, E, D, C>,
    asset_path: String<MAX_ASSET_PATH>,
    max_playback_ms: u64,
}

impl<S, B, E, D, C> EpisodeSound<S, B, E, D, C>
where
    S: Storage,
    B: AudioBus,
    E: QuietEnvironment,
    D: DelayNs,
    C: Clock,
{
    /// Cue that plays `asset_path` from `storage`, cut off after
    /// `max_playback_ms`.
    pub fn new(
        storage: S,
        channel: AudioOutputChannel<B, E, D, C>,
        asset_path: String<MAX_ASSET_PATH>,
        max_playback_ms: u64,
    ) -> Self {
        Self { storage, channel, asset_path, max_playback_ms }
    }

    /// The output channel.
    pub fn channel(&self) -> &AudioOutputChannel<B, E, D, C> {
        &self.channel
    }

    /// The output channel, mutably (reconfigure, shutdown).
    pub fn channel_mut(&mut self) -> &mut AudioOutputChannel<B, E, D, C> {
        &mut self.channel
    }

    /// The asset storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Path of the asset played.
    pub fn asset_path(&self) -> &str {
        &self.asset_path
    }
}

impl<S, B, E, D, C> SoundCue for EpisodeSound<S, B, E, D, C>
where
    S: Storage,
    B: AudioBus,
    E: QuietEnvironment,
    D: DelayNs,
    C: Clock,
{
    async fn play_episode_sound(&mut self) -> CueOutcome {
        let Some(config) = self.channel.config() else {
            debug!("episode sound skipped: channel not configured");
            return CueOutcome::ChannelUnavailable(AudioError::NotConfigured);
        };

        let source = match PcmSource::open(&mut self.storage, &self.asset_path).await {
            Ok(source) => source,
            Err(e) => {
                warn!("episode sound unavailable: {:?}", e);
                return CueOutcome::SourceUnavailable;
            }
        };

        let now = self.channel.clock().now_ms();
        let session = PlaybackSession::new(source, &config, now, self.max_playback_ms);
        match self.channel.play(session).await {
            Ok(report) => CueOutcome::Played(report),
            Err(e) if e.is_unavailable() => CueOutcome::ChannelUnavailable(e),
            Err(e) => CueOutcome::Interrupted(e),
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation
)]
mod tests {
    use super::*;
    use platform::mocks::{MockAudioBus, MockClock, MockDelay, MockQuietEnvironment, MockStorage};
    use platform::{AudioChannelConfig, I2sPins};
    use playback::ChannelState;

    type Cue = EpisodeSound<MockStorage, MockAudioBus, MockQuietEnvironment, MockDelay, MockClock>;

    const PATH: &str = "/cash_44_stereo.wav";

    fn asset(pcm_bytes: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; 44];
        bytes[0..4].copy_from_slice(b"RIFF");
        bytes[8..12].copy_from_slice(b"WAVE");
        bytes[12..16].copy_from_slice(b"fmt ");
        bytes[22..24].copy_from_slice(&2u16.to_le_bytes());
        bytes[24..28].copy_from_slice(&44_100u32.to_le_bytes());
        bytes[34..36].copy_from_slice(&16u16.to_le_bytes());
        bytes.extend((0..pcm_bytes).map(|i| (i % 251) as u8));
        bytes
    }

    fn cue(storage: MockStorage, bus: MockAudioBus) -> Cue {
        let clock = MockClock::new(0);
        let channel = AudioOutputChannel::new(
            bus,
            MockQuietEnvironment::new(),
            MockDelay::with_clock(clock.clone()),
            clock,
            I2sPins::M5STACK_MAX98357A,
        );
        EpisodeSound::new(storage, channel, String::try_from(PATH).unwrap(), 5000)
    }

    #[tokio::test]
    async fn test_unconfigured_channel_is_unavailable_and_opens_nothing() {
        let mut cue = cue(MockStorage::new().with_file(PATH, asset(64)), MockAudioBus::new());
        let outcome = cue.play_episode_sound().await;
        assert_eq!(outcome, CueOutcome::ChannelUnavailable(AudioError::NotConfigured));
        assert!(!outcome.started());
        assert_eq!(cue.storage().opened(), 0);
    }

    #[tokio::test]
    async fn test_missing_asset_is_source_unavailable() {
        let mut cue = cue(MockStorage::new(), MockAudioBus::new());
        cue.channel_mut().configure(AudioChannelConfig::money_eyes()).await.unwrap();
        let outcome = cue.play_episode_sound().await;
        assert_eq!(outcome, CueOutcome::SourceUnavailable);
        assert!(!outcome.started());
        assert_eq!(cue.channel().stats().sessions_started, 0);
    }

    #[tokio::test]
    async fn test_configured_channel_plays_whole_asset() {
        let mut cue = cue(MockStorage::new().with_file(PATH, asset(10_000)), MockAudioBus::new());
        cue.channel_mut().configure(AudioChannelConfig::money_eyes()).await.unwrap();
        let outcome = cue.play_episode_sound().await;
        match outcome {
            CueOutcome::Played(report) => assert_eq!(report.bytes_written, 10_000),
            other => panic!("expected Played, got {other:?}"),
        }
        assert!(outcome.started());
        assert_eq!(cue.channel().state(), ChannelState::Configured);
    }

    #[tokio::test]
    async fn test_write_failure_is_interrupted_but_started() {
        // 15 priming writes succeed, the first payload write fails.
        let bus = MockAudioBus::new().failing_writes_after(15);
        let mut cue = cue(MockStorage::new().with_file(PATH, asset(10_000)), bus);
        cue.channel_mut().configure(AudioChannelConfig::money_eyes()).await.unwrap();
        let outcome = cue.play_episode_sound().await;
        assert_eq!(outcome, CueOutcome::Interrupted(AudioError::Write));
        assert!(outcome.started());
    }

    #[test]
    fn test_started_classification() {
        assert!(CueOutcome::Played(PlaybackReport::default()).started());
        assert!(CueOutcome::Interrupted(AudioError::DeadlineExceeded).started());
        assert!(!CueOutcome::SourceUnavailable.started());
        assert!(!CueOutcome::ChannelUnavailable(AudioError::Busy).started());
    }
}
