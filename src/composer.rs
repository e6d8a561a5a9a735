//! Scrolling text composer
//!
//! Each step rasterizes the banner one column further to the left and
//! replays the bitmap pixel by pixel into the hidden matrix frame, which
//! is then flipped into view.

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::MatrixDriver;
use crate::bus::Bus;
use crate::error::Result;
use crate::frame::{DoubleBuffer, FrameWriter};
use crate::raster::{PixelBuffer, TextRasterizer};

/// Horizontal travel per character, in scroll steps
pub const DEFAULT_GLYPH_WIDTH: u16 = 9;

/// Brightness of a lit banner pixel
pub const DEFAULT_PIXEL_BRIGHTNESS: u8 = 128;

/// How bitmap coordinates map onto the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Traversal {
    /// Bit `(x, y)` lights pixel `(x, y)`
    #[default]
    Forward,
    /// Bit `(x, y)` lights pixel `(W-1-x, H-1-y)`, for panels mounted
    /// upside down
    Mirrored,
}

impl Traversal {
    /// Panel coordinate for bitmap pixel `(x, y)` on a `W`×`H` panel
    #[allow(clippy::cast_possible_truncation)]
    pub const fn map<const W: usize, const H: usize>(self, x: usize, y: usize) -> (u8, u8) {
        let (x, y) = match self {
            Self::Forward => (x, y),
            Self::Mirrored => (W - 1 - x, H - 1 - y),
        };
        (x as u8, y as u8)
    }
}

/// Outcome of one scroll step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScrollStatus {
    /// More steps remain in this pass
    Scrolling,
    /// The step just shown was the last one; the cursor is back at zero
    PassComplete,
}

/// Horizontal position of the banner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollCursor {
    position: u32,
    pass_len: u32,
}

impl ScrollCursor {
    /// Cursor for `chars` characters advancing `glyph_width` steps each.
    ///
    /// An empty banner still takes one (blank) step per pass.
    pub const fn new(chars: usize, glyph_width: u16) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let pass_len = (chars as u32).saturating_mul(glyph_width as u32);
        Self {
            position: 0,
            pass_len: if pass_len == 0 { 1 } else { pass_len },
        }
    }

    /// Cursor sized for `text`
    pub fn for_text(text: &str, glyph_width: u16) -> Self {
        Self::new(text.chars().count(), glyph_width)
    }

    /// Steps taken in the current pass
    pub const fn position(&self) -> u32 {
        self.position
    }

    /// Steps in a full pass
    pub const fn pass_len(&self) -> u32 {
        self.pass_len
    }

    /// Column where the banner's left edge is drawn on a `panel_width` panel.
    ///
    /// The banner enters from the right edge and leaves on the left.
    #[allow(clippy::cast_possible_wrap)]
    pub const fn x_offset(&self, panel_width: usize) -> i32 {
        panel_width as i32 - self.position as i32
    }

    /// Move one step; returns `true` when the pass wrapped back to zero
    pub fn advance(&mut self) -> bool {
        self.position += 1;
        if self.position >= self.pass_len {
            self.position = 0;
            return true;
        }
        false
    }

    /// Rewind to the start of a pass
    pub fn reset(&mut self) {
        self.position = 0;
    }
}

/// Rasterizes the banner and replays it into the hidden frame
pub struct FrameComposer<'a, T, const W: usize, const H: usize> {
    rasterizer: T,
    text: &'a str,
    cursor: ScrollCursor,
    brightness: u8,
    traversal: Traversal,
}

impl<'a, T: TextRasterizer<W, H>, const W: usize, const H: usize> FrameComposer<'a, T, W, H> {
    /// Create a composer for `text`
    pub fn new(
        rasterizer: T,
        text: &'a str,
        glyph_width: u16,
        brightness: u8,
        traversal: Traversal,
    ) -> Self {
        Self {
            rasterizer,
            text,
            cursor: ScrollCursor::for_text(text, glyph_width),
            brightness,
            traversal,
        }
    }

    /// Compose, show and advance one scroll step
    pub fn step<M, B>(&mut self, frames: &mut DoubleBuffer<M>, bus: &mut B) -> Result<ScrollStatus>
    where
        M: MatrixDriver,
        B: Bus + ?Sized,
    {
        let bitmap = self
            .rasterizer
            .rasterize(self.text, self.cursor.x_offset(W));
        let brightness = self.brightness;
        let traversal = self.traversal;
        frames.compose(bus, |frame| replay(&bitmap, frame, brightness, traversal))?;

        if self.cursor.advance() {
            #[cfg(feature = "esp32-log")]
            println!("[FrameComposer.step] pass of {} steps complete", self.cursor.pass_len());
            return Ok(ScrollStatus::PassComplete);
        }
        Ok(ScrollStatus::Scrolling)
    }

    /// Current scroll position
    pub const fn cursor(&self) -> &ScrollCursor {
        &self.cursor
    }

    /// Start the next pass from the right edge
    pub fn rewind(&mut self) {
        self.cursor.reset();
    }

    /// Bitmap to panel mapping in use
    pub const fn traversal(&self) -> Traversal {
        self.traversal
    }
}

/// Write every lit bit of `bitmap` into the hidden frame
fn replay<M, B, const W: usize, const H: usize>(
    bitmap: &PixelBuffer<W, H>,
    frame: &mut FrameWriter<'_, M, B>,
    brightness: u8,
    traversal: Traversal,
) -> Result<()>
where
    M: MatrixDriver,
    B: Bus + ?Sized,
{
    for x in 0..W {
        let column = bitmap.column(x);
        if column == 0 {
            continue;
        }
        for y in 0..H {
            if column & (1u32 << y) != 0 {
                let (px, py) = traversal.map::<W, H>(x, y);
                frame.set_pixel(px, py, brightness)?;
            }
        }
    }
    Ok(())
}
