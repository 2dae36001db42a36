//! Audio playback: raw PCM asset reader and pop-free I²S output channel
//!
//! The channel primes the DMA ring with silence when configured, streams
//! frame-aligned chunks of a [`PcmSource`] during a [`PlaybackSession`], and
//! drains with staged silence afterwards so the amplifier never sees a step.
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(clippy::unwrap_used)]

// Must come first so the logging macros are visible to every module.
mod fmt;

pub mod channel;
pub mod chunk;
pub mod error;
pub mod pcm_source;
pub mod session;

pub use channel::{AudioOutputChannel, ChannelState, ChannelStats, DrainProfile, DrainStage};
pub use chunk::{ChunkBuffer, CHUNK_BYTES};
pub use error::{AudioError, ConfigStage};
pub use pcm_source::{PcmChunk, PcmHeader, PcmSource};
pub use session::{PlaybackReport, PlaybackSession};
