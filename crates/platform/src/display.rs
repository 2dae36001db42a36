//! Display abstraction layer

use embedded_graphics::prelude::Size;

/// Panel width in pixels.
pub const DISPLAY_WIDTH: u32 = 320;

/// Panel height in pixels.
pub const DISPLAY_HEIGHT: u32 = 240;

/// Bytes per pixel (RGB565).
pub const BYTES_PER_PIXEL: usize = 2;

/// Size of one full frame in bytes.
pub const FRAME_BYTES: usize = DISPLAY_WIDTH as usize * DISPLAY_HEIGHT as usize * BYTES_PER_PIXEL;

/// Panel dimensions as an embedded-graphics [`Size`].
pub const DISPLAY_SIZE: Size = Size::new(DISPLAY_WIDTH, DISPLAY_HEIGHT);

/// Pixel sink accepting a whole frame at once.
///
/// The LCD on the reference board is written with a single blit per tick
/// from an off-screen buffer, which avoids tearing.
pub trait FrameSink {
    /// Error type
    type Error: core::fmt::Debug;

    /// Push one frame of [`FRAME_BYTES`] bytes: row-major, big-endian RGB565.
    fn push_frame(
        &mut self,
        pixels: &[u8],
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;
}

/// Display errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error
    #[error("display communication error")]
    Communication,
    /// Frame length does not match the panel
    #[error("frame is {0} bytes, panel expects {}", FRAME_BYTES)]
    FrameSize(usize),
}
