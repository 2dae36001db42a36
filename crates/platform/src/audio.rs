//! Audio bus abstraction (I²S transmit with a DMA descriptor ring)

use crate::audio_config::{AudioChannelConfig, I2sPins};

/// How long a write may block waiting for free space in the DMA ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WriteTimeout {
    /// Block until every byte has been queued.
    Forever,
    /// Give up after this many milliseconds; the write may be partial.
    Millis(u32),
}

/// I²S transmit peripheral.
///
/// The driver owns a ring of `buffer_count` DMA buffers of `buffer_frames`
/// frames each. Writes copy into the ring and block while it is full; the
/// peripheral drains it at the configured sample rate.
///
/// Configuration is split into the same steps the hardware negotiates so a
/// failure can be attributed to one of them.
pub trait AudioBus {
    /// Error type
    type Error: core::fmt::Debug;

    /// Switch the bit-clock, word-select and data pins to high-impedance inputs.
    fn release_pins(
        &mut self,
        pins: &I2sPins,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Install the transmit driver and allocate its DMA ring.
    fn install_driver(
        &mut self,
        config: &AudioChannelConfig,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Route the peripheral's signals to `pins`.
    fn set_pins(
        &mut self,
        pins: &I2sPins,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Program the bit clock for the configured rate, depth and channel count.
    fn set_clock(
        &mut self,
        config: &AudioChannelConfig,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Tear the driver down. Must be harmless when nothing is installed.
    fn uninstall_driver(&mut self) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Queue interleaved PCM bytes, returning how many were accepted.
    fn write(
        &mut self,
        bytes: &[u8],
        timeout: WriteTimeout,
    ) -> impl core::future::Future<Output = Result<usize, Self::Error>>;

    /// Overwrite every DMA buffer in the ring with silence.
    fn zero_dma_buffer(&mut self) -> impl core::future::Future<Output = Result<(), Self::Error>>;
}
