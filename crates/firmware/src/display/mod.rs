//! Off-screen RGB565 frame for the 320×240 LCD
//!
//! Every tick draws the whole face into a [`Frame`] and pushes it to the
//! panel in one blit. The frame borrows its pixel storage so the 150 KB
//! buffer can live in a `static` on hardware and on the heap on the host,
//! never on the stack.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::pixelcolor::{IntoStorage, Rgb565};
use embedded_graphics::prelude::*;

pub use platform::display::{
    DisplayError, BYTES_PER_PIXEL, DISPLAY_HEIGHT, DISPLAY_SIZE, DISPLAY_WIDTH, FRAME_BYTES,
};

/// Full-screen RGB565 frame, row-major, big-endian pixels.
pub struct Frame<'a> {
    buf: &'a mut [u8],
}

impl<'a> Frame<'a> {
    /// Wrap `buf` as a frame.
    ///
    /// # Errors
    ///
    /// [`DisplayError::FrameSize`] unless `buf` is exactly [`FRAME_BYTES`] long.
    pub fn new(buf: &'a mut [u8]) -> Result<Self, DisplayError> {
        if buf.len() != FRAME_BYTES {
            return Err(DisplayError::FrameSize(buf.len()));
        }
        Ok(Self { buf })
    }

    /// Raw bytes, ready for [`platform::FrameSink::push_frame`].
    pub fn as_bytes(&self) -> &[u8] {
        self.buf
    }

    /// Colour of the pixel at (`x`, `y`), if on screen.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb565> {
        let idx = byte_index(x, y)?;
        let hi = *self.buf.get(idx)?;
        let lo = *self.buf.get(idx.checked_add(1)?)?;
        Some(Rgb565::from(RawU16::new(u16::from_be_bytes([hi, lo]))))
    }

    fn put(&mut self, x: u32, y: u32, color: Rgb565) {
        let Some(idx) = byte_index(x, y) else {
            return;
        };
        let Some(end) = idx.checked_add(BYTES_PER_PIXEL) else {
            return;
        };
        if let Some(px) = self.buf.get_mut(idx..end) {
            px.copy_from_slice(&color.into_storage().to_be_bytes());
        }
    }
}

fn byte_index(x: u32, y: u32) -> Option<usize> {
    if x >= DISPLAY_WIDTH || y >= DISPLAY_HEIGHT {
        return None;
    }
    (y as usize)
        .checked_mul(DISPLAY_WIDTH as usize)?
        .checked_add(x as usize)?
        .checked_mul(BYTES_PER_PIXEL)
}

impl OriginDimensions for Frame<'_> {
    fn size(&self) -> Size {
        DISPLAY_SIZE
    }
}

impl DrawTarget for Frame<'_> {
    type Color = Rgb565;
    type Error = Infallible;

    /// Write pixels into the frame; points off screen are dropped.
    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) else {
                continue;
            };
            self.put(x, y, color);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let bytes = color.into_storage().to_be_bytes();
        for px in self.buf.chunks_exact_mut(BYTES_PER_PIXEL) {
            px.copy_from_slice(&bytes);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    #[test]
    fn rejects_wrong_length_buffer() {
        let mut small = vec![0u8; 16];
        assert_eq!(Frame::new(&mut small).err(), Some(DisplayError::FrameSize(16)));
    }

    #[test]
    fn clear_fills_every_pixel_big_endian() {
        let mut buf = vec![0u8; FRAME_BYTES];
        let mut frame = Frame::new(&mut buf).unwrap();
        frame.clear(Rgb565::RED).unwrap();
        assert_eq!(frame.pixel(0, 0), Some(Rgb565::RED));
        assert_eq!(frame.pixel(319, 239), Some(Rgb565::RED));
        // 0xF800 big-endian
        assert_eq!(&frame.as_bytes()[..2], &[0xF8, 0x00]);
    }

    #[test]
    fn off_screen_pixels_are_dropped() {
        let mut buf = vec![0u8; FRAME_BYTES];
        let mut frame = Frame::new(&mut buf).unwrap();
        Rectangle::new(Point::new(-10, -10), Size::new(20, 20))
            .into_styled(PrimitiveStyle::with_fill(Rgb565::WHITE))
            .draw(&mut frame)
            .unwrap();
        assert_eq!(frame.pixel(0, 0), Some(Rgb565::WHITE));
        assert_eq!(frame.pixel(10, 10), Some(Rgb565::BLACK));
        assert_eq!(frame.pixel(320, 0), None);
    }
}
