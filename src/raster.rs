//! Text rasterization
//!
//! [`PixelBuffer`] is the one-bit bitmap handed from the rasterizer to the
//! frame composer. It is rebuilt for every scroll step and never kept.

use core::convert::Infallible;

use embedded_graphics::Pixel;
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::{DrawTarget, OriginDimensions, Point, Size};
use embedded_graphics::text::{Baseline, Text};
use embedded_graphics::Drawable;

/// One-bit bitmap of `W` columns by `H` rows
///
/// Each column is stored as a bit mask, row 0 in the least significant bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBuffer<const W: usize, const H: usize> {
    columns: [u32; W],
}

impl<const W: usize, const H: usize> PixelBuffer<W, H> {
    const ROWS_FIT: () = assert!(H <= 32, "pixel buffer columns hold at most 32 rows");

    /// Create an empty buffer
    pub const fn new() -> Self {
        let () = Self::ROWS_FIT;
        Self { columns: [0; W] }
    }

    /// Turn every pixel off
    pub fn clear(&mut self) {
        self.columns = [0; W];
    }

    /// Set pixel `(x, y)`; coordinates outside the buffer are ignored
    pub fn set(&mut self, x: usize, y: usize, on: bool) {
        if y >= H {
            return;
        }
        let Some(column) = self.columns.get_mut(x) else {
            return;
        };
        if on {
            *column |= 1u32 << y;
        } else {
            *column &= !(1u32 << y);
        }
    }

    /// Whether pixel `(x, y)` is lit
    pub fn get(&self, x: usize, y: usize) -> bool {
        y < H
            && self
                .columns
                .get(x)
                .is_some_and(|&column| column & (1u32 << y) != 0)
    }

    /// Bit mask of column `x`
    pub fn column(&self, x: usize) -> u32 {
        self.columns.get(x).copied().unwrap_or(0)
    }

    /// Number of lit pixels
    pub fn lit_count(&self) -> u32 {
        self.columns.iter().map(|column| column.count_ones()).sum()
    }

    /// Iterate over lit pixels, column by column
    pub fn lit(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.columns.iter().enumerate().flat_map(|(x, &column)| {
            (0..H)
                .filter(move |&y| column & (1u32 << y) != 0)
                .map(move |y| (x, y))
        })
    }

    /// Width in pixels
    pub const fn width(&self) -> usize {
        W
    }

    /// Height in pixels
    pub const fn height(&self) -> usize {
        H
    }
}

impl<const W: usize, const H: usize> Default for PixelBuffer<W, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const W: usize, const H: usize> OriginDimensions for PixelBuffer<W, H> {
    #[allow(clippy::cast_possible_truncation)]
    fn size(&self) -> Size {
        Size::new(W as u32, H as u32)
    }
}

impl<const W: usize, const H: usize> DrawTarget for PixelBuffer<W, H> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y)) else {
                continue;
            };
            self.set(x, y, color.is_on());
        }
        Ok(())
    }
}

/// Renders a string into a panel-sized bitmap
pub trait TextRasterizer<const W: usize, const H: usize> {
    /// Render `text` with its left edge at column `x_offset`.
    ///
    /// Offsets may be negative or beyond the panel; whatever falls outside
    /// is clipped.
    fn rasterize(&mut self, text: &str, x_offset: i32) -> PixelBuffer<W, H>;
}

/// Rasterizer backed by an `embedded-graphics` monospaced font
#[derive(Clone, Copy)]
pub struct MonoTextRasterizer<'f> {
    font: &'f MonoFont<'f>,
}

impl<'f> MonoTextRasterizer<'f> {
    /// Create a rasterizer for `font`
    pub const fn new(font: &'f MonoFont<'f>) -> Self {
        Self { font }
    }

    /// Horizontal advance of one glyph, spacing included
    pub const fn glyph_advance(&self) -> u32 {
        self.font.character_size.width + self.font.character_spacing
    }
}

impl<const W: usize, const H: usize> TextRasterizer<W, H> for MonoTextRasterizer<'_> {
    fn rasterize(&mut self, text: &str, x_offset: i32) -> PixelBuffer<W, H> {
        let mut buffer = PixelBuffer::new();
        let style = MonoTextStyle::new(self.font, BinaryColor::On);
        let Ok(_) =
            Text::with_baseline(text, Point::new(x_offset, 0), style, Baseline::Top).draw(&mut buffer);
        buffer
    }
}
