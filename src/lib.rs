#![no_std]

pub mod bus;
pub mod color;
pub mod composer;
pub mod drivers;
pub mod error;
pub mod frame;
pub mod idle;
pub mod marquee;
pub mod raster;
pub mod ring;
pub mod scheduler;
pub mod task;

pub use bus::{Bus, HalBus, SharedBus};
pub use color::{Rgb, color_wheel};
pub use composer::{FrameComposer, ScrollCursor, ScrollStatus, Traversal};
pub use error::{BusError, Result};
pub use frame::{DoubleBuffer, FrameSlot, PowerState};
pub use idle::{IdleConfig, IdleEpisode, Pictogram};
pub use marquee::{DisplayMode, MarqueeConfig, MarqueeTask};
pub use raster::{MonoTextRasterizer, PixelBuffer, TextRasterizer};
pub use ring::{RingAnimator, RingConfig, RingState};
pub use scheduler::{Scheduler, SchedulerTick};
pub use task::AnimationTask;
pub use embassy_time::{Duration, Instant};

/// Addressable RGB ring on the shared bus
///
/// Colours are buffered by the driver and sent in one transaction by
/// [`commit`](RingDriver::commit).
pub trait RingDriver {
    /// Buffer the colour of LED `index`; out-of-range indices are ignored
    fn set(&mut self, index: usize, color: Rgb);

    /// Send the buffered colours to the ring
    fn commit<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<()>;
}

/// Monochrome matrix panel with two hardware frames
///
/// Every operation is one complete bus transaction sequence.
pub trait MatrixDriver {
    /// Direct subsequent frame-memory writes at `slot`
    fn select_frame<B: Bus + ?Sized>(&mut self, bus: &mut B, slot: FrameSlot) -> Result<()>;

    /// Turn every pixel of `slot` off
    fn clear<B: Bus + ?Sized>(&mut self, bus: &mut B, slot: FrameSlot) -> Result<()>;

    /// Set pixel `(x, y)` of `slot` to `brightness`
    fn set_pixel<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        slot: FrameSlot,
        x: u8,
        y: u8,
        brightness: u8,
    ) -> Result<()>;

    /// Make `slot` the visible frame
    fn show<B: Bus + ?Sized>(&mut self, bus: &mut B, slot: FrameSlot) -> Result<()>;

    /// Suspend or resume live output.
    ///
    /// Panels without a suspend state keep the default no-op.
    fn set_power_state<B: Bus + ?Sized>(&mut self, _bus: &mut B, _state: PowerState) -> Result<()> {
        Ok(())
    }
}
