//! Ring animator
//!
//! Paints a colour-wheel gradient around the ring and rotates it by one
//! wheel step per tick. The whole ring is committed in one bus transaction.

use embassy_time::Duration;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::RingDriver;
use crate::bus::Bus;
use crate::color::{BLACK, Rgb, WHEEL_PERIOD, color_wheel};
use crate::error::Result;
use crate::task::AnimationTask;

/// Default tick period, fast enough for smooth rotation without flooding
/// the bus
pub const DEFAULT_RING_PERIOD: Duration = Duration::from_millis(10);

/// Ring animator configuration
#[derive(Debug, Clone, Copy)]
pub struct RingConfig {
    /// Delay between ring commits
    pub period: Duration,
    /// Wheel phase of the first frame
    pub initial_phase: u8,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            period: DEFAULT_RING_PERIOD,
            initial_phase: 0,
        }
    }
}

/// Colours and rotation of the ring
#[derive(Debug, Clone)]
pub struct RingState<const N: usize> {
    phase: u8,
    colors: [Rgb; N],
}

impl<const N: usize> RingState<N> {
    /// Create a dark ring at `phase` (taken modulo the wheel period)
    pub const fn new(phase: u8) -> Self {
        Self {
            phase: phase % WHEEL_PERIOD,
            colors: [BLACK; N],
        }
    }

    /// Phase that the next paint will use
    pub const fn phase(&self) -> u8 {
        self.phase
    }

    /// Colours of the last painted frame
    pub const fn colors(&self) -> &[Rgb; N] {
        &self.colors
    }

    /// Paint every position for the current phase
    pub fn paint(&mut self) {
        let phase = self.phase;
        for (index, color) in self.colors.iter_mut().enumerate() {
            *color = color_wheel(wheel_index::<N>(index, phase));
        }
    }

    /// Rotate the gradient by one wheel step
    pub fn advance(&mut self) {
        self.phase = (self.phase + 1) % WHEEL_PERIOD;
    }
}

/// Wheel position for ring `index` at `phase`.
///
/// Positions are spread evenly over the full wheel, so the ring always
/// shows one complete hue cycle.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub const fn wheel_index<const N: usize>(index: usize, phase: u8) -> i32 {
    let spread = index * 256 / N;
    ((spread + phase as usize) % WHEEL_PERIOD as usize) as i32
}

/// Ring animator task
pub struct RingAnimator<R: RingDriver, const N: usize> {
    driver: R,
    state: RingState<N>,
    period: Duration,
}

impl<R: RingDriver, const N: usize> RingAnimator<R, N> {
    /// Create an animator owning the ring driver
    pub const fn new(driver: R, config: &RingConfig) -> Self {
        Self {
            driver,
            state: RingState::new(config.initial_phase),
            period: config.period,
        }
    }

    /// Paint, commit and rotate.
    ///
    /// The phase only advances when the commit succeeded.
    pub fn tick<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<()> {
        self.state.paint();
        for (index, color) in self.state.colors().iter().enumerate() {
            self.driver.set(index, *color);
        }
        if let Err(error) = self.driver.commit(bus) {
            #[cfg(feature = "esp32-log")]
            println!("[RingAnimator.tick] commit failed: {}", error);
            return Err(error);
        }
        self.state.advance();
        Ok(())
    }

    /// Ring state owned by this animator
    pub const fn state(&self) -> &RingState<N> {
        &self.state
    }

    /// Delay between commits
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Get a reference to the driver.
    pub const fn driver(&self) -> &R {
        &self.driver
    }

    /// Get a mutable reference to the driver.
    pub fn driver_mut(&mut self) -> &mut R {
        &mut self.driver
    }
}

impl<R: RingDriver, const N: usize> AnimationTask for RingAnimator<R, N> {
    fn poll<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<Duration> {
        self.tick(bus)?;
        Ok(self.period)
    }
}
