//! One triggered playback: a source, a deadline and the frame size.

use platform::{AudioChannelConfig, File};

use crate::pcm_source::PcmSource;

/// Transient playback of a single asset.
///
/// Created on a mode-entry edge and consumed by
/// [`AudioOutputChannel::play`](crate::AudioOutputChannel::play).
pub struct PlaybackSession<F: File> {
    pub(crate) source: PcmSource<F>,
    pub(crate) deadline_ms: u64,
    pub(crate) bytes_per_frame: usize,
}

impl<F: File> PlaybackSession<F> {
    /// Build a session that must finish by `started_at_ms + max_duration_ms`.
    ///
    /// A source whose header disagrees with `config` is still played as if it
    /// matched; the mismatch is only logged.
    pub fn new(
        source: PcmSource<F>,
        config: &AudioChannelConfig,
        started_at_ms: u64,
        max_duration_ms: u64,
    ) -> Self {
        if let Some(header) = source.header() {
            if !header.matches(config) {
                warn!(
                    "asset header is {} ch / {} Hz / {} bit, channel is {} ch / {} Hz / {} bit",
                    header.channels,
                    header.sample_rate_hz,
                    header.bits_per_sample,
                    config.channels,
                    config.sample_rate_hz,
                    config.bit_depth
                );
            }
        }
        Self {
            source,
            deadline_ms: started_at_ms.saturating_add(max_duration_ms),
            bytes_per_frame: config.bytes_per_frame().max(1),
        }
    }

    /// Absolute time after which streaming stops.
    pub fn deadline_ms(&self) -> u64 {
        self.deadline_ms
    }

    /// Frame size every write is aligned to.
    pub fn bytes_per_frame(&self) -> usize {
        self.bytes_per_frame
    }
}

/// Outcome of a completed session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlaybackReport {
    /// PCM bytes accepted by the bus.
    pub bytes_written: usize,
    /// Aligned writes issued.
    pub chunks_written: usize,
    /// Wall time from first read to end of stream.
    pub elapsed_ms: u64,
}
