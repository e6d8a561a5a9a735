//! IS31FL3731 charlieplexed matrix driver
//!
//! The chip has eight picture frames and a function register bank, all
//! reached through a bank-select register. Only frames 0 and 1 are used,
//! as the two halves of the double buffer. The 16×9 layout matches the
//! common breakout boards: pixel address `x + 16 * y`.

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::MatrixDriver;
use crate::bus::Bus;
use crate::error::Result;
use crate::frame::{FrameSlot, PowerState};

/// Default 7-bit address (AD pin tied to GND)
pub const IS31FL3731_ADDRESS: u8 = 0x74;

/// Panel width in pixels
pub const MATRIX_WIDTH: usize = 16;

/// Panel height in pixels
pub const MATRIX_HEIGHT: usize = 9;

const BANK_REGISTER: u8 = 0xFD;
const FUNCTION_BANK: u8 = 0x0B;

const MODE_REGISTER: u8 = 0x00;
const FRAME_REGISTER: u8 = 0x01;
const AUDIO_SYNC_REGISTER: u8 = 0x06;
const SHUTDOWN_REGISTER: u8 = 0x0A;
const PICTURE_MODE: u8 = 0x00;

const ENABLE_OFFSET: u8 = 0x00;
const ENABLE_BYTES: usize = 18;
const PWM_OFFSET: u8 = 0x24;
const PWM_BYTES: usize = 144;

/// IS31FL3731 matrix driver
#[derive(Debug, Clone)]
pub struct Is31fl3731 {
    address: u8,
    /// Bank last selected on the chip, `None` when unknown
    bank: Option<u8>,
}

impl Is31fl3731 {
    /// Driver for a chip at the default address
    pub const fn new() -> Self {
        Self::with_address(IS31FL3731_ADDRESS)
    }

    /// Driver for a chip at `address`
    pub const fn with_address(address: u8) -> Self {
        Self { address, bank: None }
    }

    /// Bus address of the chip
    pub const fn address(&self) -> u8 {
        self.address
    }

    /// Put the chip into picture mode showing a blank frame 0, with every
    /// LED of both frames enabled
    pub fn init<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<()> {
        #[cfg(feature = "esp32-log")]
        println!("[Is31fl3731.init] address {:#04x}", self.address);
        self.set_power_state(bus, PowerState::Off)?;
        self.write_function(bus, MODE_REGISTER, PICTURE_MODE)?;
        self.write_function(bus, AUDIO_SYNC_REGISTER, 0)?;

        let mut enable = [0xFF; ENABLE_BYTES + 1];
        enable[0] = ENABLE_OFFSET;
        for slot in [FrameSlot::First, FrameSlot::Second] {
            self.select_bank(bus, slot.index())?;
            bus.write(self.address, &enable)?;
            self.clear(bus, slot)?;
        }

        self.show(bus, FrameSlot::First)?;
        self.set_power_state(bus, PowerState::On)
    }

    /// PWM register offset of pixel `(x, y)`, `None` outside the panel
    #[allow(clippy::cast_possible_truncation)]
    pub const fn pixel_address(x: u8, y: u8) -> Option<u8> {
        if x as usize >= MATRIX_WIDTH || y as usize >= MATRIX_HEIGHT {
            return None;
        }
        Some(x + y * MATRIX_WIDTH as u8)
    }

    fn select_bank<B: Bus + ?Sized>(&mut self, bus: &mut B, bank: u8) -> Result<()> {
        if self.bank == Some(bank) {
            return Ok(());
        }
        self.bank = None;
        bus.write(self.address, &[BANK_REGISTER, bank])?;
        self.bank = Some(bank);
        Ok(())
    }

    fn write_function<B: Bus + ?Sized>(&mut self, bus: &mut B, register: u8, value: u8) -> Result<()> {
        self.select_bank(bus, FUNCTION_BANK)?;
        bus.write(self.address, &[register, value])
    }
}

impl Default for Is31fl3731 {
    fn default() -> Self {
        Self::new()
    }
}

impl MatrixDriver for Is31fl3731 {
    fn select_frame<B: Bus + ?Sized>(&mut self, bus: &mut B, slot: FrameSlot) -> Result<()> {
        self.select_bank(bus, slot.index())
    }

    fn clear<B: Bus + ?Sized>(&mut self, bus: &mut B, slot: FrameSlot) -> Result<()> {
        self.select_bank(bus, slot.index())?;
        let mut pwm = [0; PWM_BYTES + 1];
        pwm[0] = PWM_OFFSET;
        bus.write(self.address, &pwm)
    }

    fn set_pixel<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        slot: FrameSlot,
        x: u8,
        y: u8,
        brightness: u8,
    ) -> Result<()> {
        let Some(pixel) = Self::pixel_address(x, y) else {
            return Ok(());
        };
        self.select_bank(bus, slot.index())?;
        bus.write(self.address, &[PWM_OFFSET + pixel, brightness])
    }

    fn show<B: Bus + ?Sized>(&mut self, bus: &mut B, slot: FrameSlot) -> Result<()> {
        self.write_function(bus, FRAME_REGISTER, slot.index())
    }

    fn set_power_state<B: Bus + ?Sized>(&mut self, bus: &mut B, state: PowerState) -> Result<()> {
        let normal = match state {
            PowerState::On => 1,
            PowerState::Off => 0,
        };
        self.write_function(bus, SHUTDOWN_REGISTER, normal)
    }
}
