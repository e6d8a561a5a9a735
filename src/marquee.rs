//! Matrix marquee task
//!
//! Alternates between the scrolling banner and idle pictogram episodes.
//! A full scroll pass hands over to a fresh [`IdleEpisode`]; when the
//! episode ends the banner starts again from the right edge.

use embassy_time::Duration;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::MatrixDriver;
use crate::bus::Bus;
use crate::composer::{
    DEFAULT_GLYPH_WIDTH, DEFAULT_PIXEL_BRIGHTNESS, FrameComposer, ScrollCursor, ScrollStatus,
    Traversal,
};
use crate::error::Result;
use crate::frame::DoubleBuffer;
use crate::idle::{IdleConfig, IdleEpisode, IdleStep};
use crate::raster::TextRasterizer;
use crate::task::AnimationTask;

/// Marquee configuration
#[derive(Debug, Clone, Copy)]
pub struct MarqueeConfig<'a> {
    /// Banner text
    pub text: &'a str,
    /// Scroll steps per character
    pub glyph_width: u16,
    /// Brightness of lit banner pixels
    pub brightness: u8,
    /// Bitmap to panel mapping
    pub traversal: Traversal,
    /// Delay after each scroll step, zero for a plain yield
    pub step_delay: Duration,
    /// Idle episode settings
    pub idle: IdleConfig<'a>,
}

impl<'a> MarqueeConfig<'a> {
    /// Default settings for `text`
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            glyph_width: DEFAULT_GLYPH_WIDTH,
            brightness: DEFAULT_PIXEL_BRIGHTNESS,
            traversal: Traversal::Forward,
            step_delay: Duration::from_ticks(0),
            idle: IdleConfig::default(),
        }
    }
}

/// What the matrix is doing
#[derive(Debug, Clone)]
pub enum DisplayMode {
    /// Banner is scrolling
    Scrolling,
    /// Idle episode in progress
    Idle(IdleEpisode),
}

/// Marquee task driving the matrix panel
pub struct MarqueeTask<'a, M: MatrixDriver, T, const W: usize, const H: usize> {
    frames: DoubleBuffer<M>,
    composer: FrameComposer<'a, T, W, H>,
    idle: IdleConfig<'a>,
    step_delay: Duration,
    mode: DisplayMode,
    passes: u32,
}

impl<'a, M, T, const W: usize, const H: usize> MarqueeTask<'a, M, T, W, H>
where
    M: MatrixDriver,
    T: TextRasterizer<W, H>,
{
    /// Create a marquee owning the panel driver and rasterizer
    pub fn new(driver: M, rasterizer: T, config: &MarqueeConfig<'a>) -> Self {
        Self {
            frames: DoubleBuffer::new(driver),
            composer: FrameComposer::new(
                rasterizer,
                config.text,
                config.glyph_width,
                config.brightness,
                config.traversal,
            ),
            idle: config.idle,
            step_delay: config.step_delay,
            mode: DisplayMode::Scrolling,
            passes: 0,
        }
    }

    /// Run one scroll step or one idle transition
    pub fn step<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<Duration> {
        match &mut self.mode {
            DisplayMode::Scrolling => {
                if self.composer.step(&mut self.frames, bus)? == ScrollStatus::PassComplete {
                    self.passes = self.passes.wrapping_add(1);
                    self.mode = DisplayMode::Idle(IdleEpisode::new());
                }
                Ok(self.step_delay)
            }
            DisplayMode::Idle(episode) => match episode.step(&self.idle, &mut self.frames, bus)? {
                IdleStep::Wait(delay) => Ok(delay),
                IdleStep::Done => {
                    #[cfg(feature = "esp32-log")]
                    println!("[MarqueeTask.step] resuming banner after pass {}", self.passes);
                    self.composer.rewind();
                    self.mode = DisplayMode::Scrolling;
                    Ok(Duration::from_ticks(0))
                }
            },
        }
    }

    /// Current mode
    pub const fn mode(&self) -> &DisplayMode {
        &self.mode
    }

    /// Whether an idle episode is running
    pub const fn is_idle(&self) -> bool {
        matches!(self.mode, DisplayMode::Idle(_))
    }

    /// Banner scroll position
    pub const fn cursor(&self) -> &ScrollCursor {
        self.composer.cursor()
    }

    /// Completed scroll passes
    pub const fn passes(&self) -> u32 {
        self.passes
    }

    /// Frame multiplexer
    pub const fn frames(&self) -> &DoubleBuffer<M> {
        &self.frames
    }

    /// Get a mutable reference to the panel driver.
    pub fn driver_mut(&mut self) -> &mut M {
        self.frames.driver_mut()
    }
}

impl<M, T, const W: usize, const H: usize> AnimationTask for MarqueeTask<'_, M, T, W, H>
where
    M: MatrixDriver,
    T: TextRasterizer<W, H>,
{
    fn poll<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<Duration> {
        self.step(bus)
    }
}
