//! Audio-path error taxonomy.
//!
//! None of these ever reach the render path: the caller degrades every one of
//! them to "no sound this episode".

/// Configuration step that failed in [`crate::AudioOutputChannel::configure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigStage {
    /// The requested [`platform::AudioChannelConfig`] was rejected.
    Validate,
    /// The I²S driver could not be installed.
    DriverInstall,
    /// Signals could not be routed to the output pins.
    PinRouting,
    /// The bit clock could not be programmed.
    Clock,
}

/// Errors raised while configuring the channel or playing a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AudioError {
    /// Configuration failed; the channel is left uninitialized.
    #[error("audio configuration failed at {stage:?}")]
    Configuration {
        /// Step that failed.
        stage: ConfigStage,
    },
    /// A blocking PCM write failed; the session was aborted and drained.
    #[error("I2S write failed")]
    Write,
    /// The asset is missing or could not be opened; no session started.
    #[error("PCM source unavailable")]
    SourceUnavailable,
    /// Reading the asset failed mid-stream.
    #[error("PCM source read failed")]
    SourceRead,
    /// The session ran past its deadline and was cut short.
    #[error("playback deadline exceeded")]
    DeadlineExceeded,
    /// `play` was called before a successful `configure`.
    #[error("audio channel not configured")]
    NotConfigured,
    /// An earlier session never finished; the channel refuses to interleave.
    #[error("audio channel busy")]
    Busy,
}

impl AudioError {
    /// `true` when the error prevented any session from starting.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::SourceUnavailable | Self::NotConfigured | Self::Busy | Self::Configuration { .. }
        )
    }
}
