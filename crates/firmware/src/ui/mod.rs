//! Eye rendering
//!
//! Draws one [`AnimationState`] onto any RGB565 [`DrawTarget`]: black
//! background, two white eyes, then either lids (blinking), `$` glyphs
//! (Special) or round pupils (Normal).
//!
//! The `$` is the 5×8 mono glyph blown up [`GLYPH_SCALE`] times, so it
//! fills roughly the area a pupil would.

// Rendering code does coordinate arithmetic on small i32 screen positions.
// The panel is 320×240 and pupil offsets are bounded by the animation
// envelope, so none of these operations can overflow i32.
#![allow(clippy::arithmetic_side_effects)]

use embedded_graphics::mono_font::ascii::FONT_5X8;
use embedded_graphics::mono_font::{MonoFont, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use ui::{AnimationState, Mode, Offset};

/// Geometry of the two eyes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EyeLayout {
    /// Centre of the left eye.
    pub left: Point,
    /// Centre of the right eye.
    pub right: Point,
    /// Radius of the white of each eye.
    pub eye_radius: u32,
    /// Radius of each pupil.
    pub pupil_radius: u32,
    /// Width and height of the closed-lid bar.
    pub lid: Size,
}

impl EyeLayout {
    /// Layout for the 320×240 panel.
    pub const fn money_eyes() -> Self {
        Self {
            left: Point::new(100, 120),
            right: Point::new(220, 120),
            eye_radius: 55,
            pupil_radius: 20,
            lid: Size::new(60, 10),
        }
    }

    /// Both eye centres, left first.
    pub fn centers(&self) -> [Point; 2] {
        [self.left, self.right]
    }
}

impl Default for EyeLayout {
    fn default() -> Self {
        Self::money_eyes()
    }
}

/// Circle of `radius` around `center`, covering `2 × radius + 1` pixels.
fn disc(center: Point, radius: u32) -> Circle {
    Circle::with_center(center, radius.saturating_mul(2).saturating_add(1))
}

fn shifted(center: Point, offset: Offset) -> Point {
    center + Point::new(offset.dx, offset.dy)
}

/// Font the `$` pupil is drawn from.
const GLYPH_FONT: &MonoFont<'static> = &FONT_5X8;

/// Every font pixel becomes a square this many screen pixels wide.
pub const GLYPH_SCALE: u32 = 5;

/// Draw target that blows every pixel up to a `factor`×`factor` block
/// placed at `origin + point × factor` on the wrapped target.
struct Scaled<'a, D> {
    target: &'a mut D,
    origin: Point,
    block: Size,
    step: i32,
}

impl<'a, D> Scaled<'a, D> {
    fn new(target: &'a mut D, origin: Point, factor: u32) -> Self {
        let factor = factor.max(1);
        Self {
            target,
            origin,
            block: Size::new_equal(factor),
            step: i32::try_from(factor).unwrap_or(1),
        }
    }
}

impl<D: DrawTarget> Dimensions for Scaled<'_, D> {
    fn bounding_box(&self) -> Rectangle {
        let outer = self.target.bounding_box();
        Rectangle::new(
            (outer.top_left - self.origin) / self.step,
            outer.size / self.block.width + Size::new(1, 1),
        )
    }
}

impl<D: DrawTarget> DrawTarget for Scaled<'_, D> {
    type Color = D::Color;
    type Error = D::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let top_left = self.origin + point * self.step;
            self.target.fill_solid(&Rectangle::new(top_left, self.block), color)?;
        }
        Ok(())
    }
}

/// Draw a scaled `$` centred on `center`.
fn draw_dollar<D>(display: &mut D, center: Point) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let style = MonoTextStyleBuilder::new()
        .font(GLYPH_FONT)
        .text_color(Rgb565::BLACK)
        .background_color(Rgb565::WHITE)
        .build();
    let cell = GLYPH_FONT.character_size * GLYPH_SCALE;
    let mut scaled = Scaled::new(display, center - cell / 2, GLYPH_SCALE);
    Text::with_baseline("$", Point::zero(), style, Baseline::Top).draw(&mut scaled)?;
    Ok(())
}

/// Stateless face renderer.
pub struct EyeRenderer;

impl EyeRenderer {
    /// Draw `state` onto `display`.
    ///
    /// # Errors
    ///
    /// Returns `D::Error` if any drawing operation fails.
    pub fn render<D>(display: &mut D, layout: &EyeLayout, state: &AnimationState) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        display.clear(Rgb565::BLACK)?;

        let white = PrimitiveStyle::with_fill(Rgb565::WHITE);
        let black = PrimitiveStyle::with_fill(Rgb565::BLACK);

        for center in layout.centers() {
            disc(center, layout.eye_radius).into_styled(white).draw(display)?;
        }

        if state.is_blinking() {
            for center in layout.centers() {
                Rectangle::with_center(center, layout.lid).into_styled(black).draw(display)?;
            }
        } else if state.mode() == Mode::Special {
            for center in layout.centers() {
                draw_dollar(display, shifted(center, state.pupil()))?;
            }
        } else {
            for center in layout.centers() {
                disc(shifted(center, state.pupil()), layout.pupil_radius)
                    .into_styled(black)
                    .draw(display)?;
            }
        }

        Ok(())
    }
}
