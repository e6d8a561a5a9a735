//! Double-buffered matrix frames
//!
//! The matrix panel keeps two hardware frames. One is shown, the other is
//! the drawing target. [`DoubleBuffer`] is the only owner of the panel
//! driver and the only place that decides which frame is visible:
//!
//! - [`DoubleBuffer::compose`] clears the hidden frame, hands out a
//!   [`FrameWriter`] bound to it and flips once the writer is done;
//! - [`DoubleBuffer::hold`] suspends the panel so both frames can be
//!   written, for pre-rendering static content;
//! - [`DoubleBuffer::flip`] swaps the frames.
//!
//! The viewer therefore sees either the previous frame or the next one in
//! full, never a frame that is still being written.

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::MatrixDriver;
use crate::bus::Bus;
use crate::error::Result;

/// One of the two hardware frames of the matrix panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameSlot {
    /// Hardware frame 0
    First,
    /// Hardware frame 1
    Second,
}

impl FrameSlot {
    /// The other frame
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }

    /// Hardware frame number
    pub const fn index(self) -> u8 {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }

    /// Frame used for the `n`-th item of an alternating sequence
    pub const fn alternating(n: usize) -> Self {
        if n.is_multiple_of(2) {
            Self::First
        } else {
            Self::Second
        }
    }
}

/// Live-update state of the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    /// Panel drives its LEDs from the visible frame
    On,
    /// Panel is dark and frame memory can be written unobserved
    Off,
}

/// Writes pixels into the hidden frame during [`DoubleBuffer::compose`]
pub struct FrameWriter<'a, M: MatrixDriver, B: Bus + ?Sized> {
    driver: &'a mut M,
    bus: &'a mut B,
    target: FrameSlot,
}

impl<M: MatrixDriver, B: Bus + ?Sized> FrameWriter<'_, M, B> {
    /// Light pixel `(x, y)` of the hidden frame
    pub fn set_pixel(&mut self, x: u8, y: u8, brightness: u8) -> Result<()> {
        self.driver
            .set_pixel(&mut *self.bus, self.target, x, y, brightness)
    }

    /// Frame being written
    pub const fn target(&self) -> FrameSlot {
        self.target
    }
}

/// Writes both frames while the panel is suspended
pub struct HeldFrames<'a, M: MatrixDriver, B: Bus + ?Sized> {
    driver: &'a mut M,
    bus: &'a mut B,
    visible: &'a mut FrameSlot,
}

impl<M: MatrixDriver, B: Bus + ?Sized> HeldFrames<'_, M, B> {
    /// Turn every pixel of `slot` off
    pub fn clear(&mut self, slot: FrameSlot) -> Result<()> {
        self.driver.select_frame(&mut *self.bus, slot)?;
        self.driver.clear(&mut *self.bus, slot)
    }

    /// Light pixel `(x, y)` of `slot`
    pub fn set_pixel(&mut self, slot: FrameSlot, x: u8, y: u8, brightness: u8) -> Result<()> {
        self.driver.select_frame(&mut *self.bus, slot)?;
        self.driver.set_pixel(&mut *self.bus, slot, x, y, brightness)
    }

    /// Make `slot` the visible frame once the panel resumes
    pub fn present(&mut self, slot: FrameSlot) -> Result<()> {
        self.driver.show(&mut *self.bus, slot)?;
        *self.visible = slot;
        Ok(())
    }
}

/// Display multiplexer over the two hardware frames
pub struct DoubleBuffer<M: MatrixDriver> {
    driver: M,
    visible: FrameSlot,
}

impl<M: MatrixDriver> DoubleBuffer<M> {
    /// Take ownership of the panel driver.
    ///
    /// Assumes the panel shows [`FrameSlot::First`]; call [`sync`] to make
    /// sure it does.
    ///
    /// [`sync`]: DoubleBuffer::sync
    pub const fn new(driver: M) -> Self {
        Self {
            driver,
            visible: FrameSlot::First,
        }
    }

    /// Show the frame the multiplexer believes is visible
    pub fn sync<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<()> {
        self.driver.show(bus, self.visible)
    }

    /// Frame currently shown
    pub const fn visible(&self) -> FrameSlot {
        self.visible
    }

    /// Frame that receives the next composition
    pub const fn hidden(&self) -> FrameSlot {
        self.visible.other()
    }

    /// Compose the next frame and show it.
    ///
    /// Selects and clears the hidden frame, lets `draw` fill it, then flips.
    /// If any write fails the flip is skipped and the previous frame stays
    /// on screen.
    pub fn compose<B, F>(&mut self, bus: &mut B, draw: F) -> Result<()>
    where
        B: Bus + ?Sized,
        F: FnOnce(&mut FrameWriter<'_, M, B>) -> Result<()>,
    {
        let target = self.hidden();
        self.driver.select_frame(bus, target)?;
        self.driver.clear(bus, target)?;

        let mut writer = FrameWriter {
            driver: &mut self.driver,
            bus: &mut *bus,
            target,
        };
        draw(&mut writer)?;

        self.flip(bus)
    }

    /// Swap the visible and hidden frames
    pub fn flip<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<()> {
        let next = self.hidden();
        self.driver.show(bus, next)?;
        self.visible = next;
        Ok(())
    }

    /// Suspend the panel, run `prepare`, resume.
    ///
    /// While held the panel is dark, so `prepare` may write either frame.
    /// Panels without a suspend state keep showing the visible frame.
    pub fn hold<B, F>(&mut self, bus: &mut B, prepare: F) -> Result<()>
    where
        B: Bus + ?Sized,
        F: FnOnce(&mut HeldFrames<'_, M, B>) -> Result<()>,
    {
        #[cfg(feature = "esp32-log")]
        println!("[DoubleBuffer.hold] suspending panel");
        self.driver.set_power_state(bus, PowerState::Off)?;

        let mut frames = HeldFrames {
            driver: &mut self.driver,
            bus: &mut *bus,
            visible: &mut self.visible,
        };
        prepare(&mut frames)?;

        self.driver.set_power_state(bus, PowerState::On)
    }

    /// Get a reference to the driver.
    pub const fn driver(&self) -> &M {
        &self.driver
    }

    /// Get a mutable reference to the driver.
    pub fn driver_mut(&mut self) -> &mut M {
        &mut self.driver
    }
}
