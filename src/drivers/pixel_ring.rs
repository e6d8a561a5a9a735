//! I2C-attached RGB pixel ring
//!
//! The ring controller takes the whole strip in one write, four bytes per
//! LED: red, green, blue and `0xE0 | brightness` with a 5-bit global
//! brightness. Colours are buffered locally until [`commit`].
//!
//! [`commit`]: crate::RingDriver::commit

use heapless::Vec;

use crate::RingDriver;
use crate::bus::Bus;
use crate::color::{BLACK, Rgb};
use crate::error::{BusError, Result};

/// Default 7-bit address of the ring controller
pub const PIXEL_RING_ADDRESS: u8 = 0x36;

/// Largest ring one transaction can carry
pub const MAX_RING_LEDS: usize = 64;

const BYTES_PER_LED: usize = 4;
const BRIGHTNESS_FLAGS: u8 = 0xE0;

/// Buffered ring of `N` RGB LEDs
#[derive(Debug, Clone)]
pub struct PixelRing<const N: usize> {
    address: u8,
    brightness: u8,
    colors: [Rgb; N],
}

impl<const N: usize> PixelRing<N> {
    const FITS: () = assert!(N <= MAX_RING_LEDS, "ring too long for one transaction");

    /// Ring at the default address and full brightness
    pub const fn new() -> Self {
        Self::with_address(PIXEL_RING_ADDRESS)
    }

    /// Ring at `address` and full brightness
    pub const fn with_address(address: u8) -> Self {
        let () = Self::FITS;
        Self {
            address,
            brightness: u8::MAX,
            colors: [BLACK; N],
        }
    }

    /// Set the global brightness (0-255, sent with 5-bit resolution)
    #[must_use]
    pub const fn with_brightness(mut self, brightness: u8) -> Self {
        self.brightness = brightness;
        self
    }

    /// Buffered colours
    pub const fn colors(&self) -> &[Rgb; N] {
        &self.colors
    }

    /// Bus address of the controller
    pub const fn address(&self) -> u8 {
        self.address
    }

    /// Wire encoding of the buffered colours
    pub fn encode(&self) -> Result<Vec<u8, { MAX_RING_LEDS * BYTES_PER_LED }>> {
        let flags = BRIGHTNESS_FLAGS | (self.brightness >> 3);
        let mut payload = Vec::new();
        for color in &self.colors {
            payload
                .extend_from_slice(&[color.r, color.g, color.b, flags])
                .map_err(|()| BusError::Capacity)?;
        }
        Ok(payload)
    }
}

impl<const N: usize> Default for PixelRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RingDriver for PixelRing<N> {
    fn set(&mut self, index: usize, color: Rgb) {
        if let Some(slot) = self.colors.get_mut(index) {
            *slot = color;
        }
    }

    fn commit<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<()> {
        let payload = self.encode()?;
        bus.write(self.address, &payload)
    }
}
