//! Shared command bus
//!
//! Both devices hang off one low-speed bus. The core never talks to the bus
//! directly: it lends `&mut` access to whichever device driver is running a
//! transaction, so two transactions can never interleave on a single
//! execution context.
//!
//! [`SharedBus`] covers deployments where the ring and matrix tasks run on
//! separate contexts (another core, an interrupt executor). It serializes
//! whole task steps through a critical section instead of single writes.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::error::{BusError, Result};

/// Byte-oriented bus transport
///
/// Implement this for the transport in use. Devices are selected by their
/// 7-bit address.
pub trait Bus {
    /// Write `bytes` to the device at `address` as one transfer
    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<()>;
}

impl<B: Bus + ?Sized> Bus for &mut B {
    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<()> {
        (**self).write(address, bytes)
    }
}

/// Adapter from any `embedded-hal` I2C controller to [`Bus`]
#[derive(Debug)]
pub struct HalBus<I> {
    i2c: I,
}

impl<I> HalBus<I> {
    /// Wrap an I2C controller
    pub const fn new(i2c: I) -> Self {
        Self { i2c }
    }

    /// Release the wrapped controller
    pub fn into_inner(self) -> I {
        self.i2c
    }
}

impl<I: embedded_hal::i2c::I2c> Bus for HalBus<I> {
    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<()> {
        self.i2c
            .write(address, bytes)
            .map_err(|error| BusError::from_hal(&error))
    }
}

/// Bus guarded by a critical section
///
/// Only needed when tasks are polled from different execution contexts.
pub struct SharedBus<B> {
    inner: Mutex<RefCell<B>>,
}

impl<B> SharedBus<B> {
    /// Wrap a bus for shared use
    pub const fn new(bus: B) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(bus)),
        }
    }

    /// Run one complete transaction group with exclusive bus access.
    ///
    /// Everything `f` writes lands on the bus without any other context
    /// getting in between. Keep `f` short: interrupts are masked for its
    /// whole duration on single-core targets.
    pub fn transaction<R>(&self, f: impl FnOnce(&mut B) -> R) -> R {
        critical_section::with(|cs| {
            let mut bus = self.inner.borrow(cs).borrow_mut();
            f(&mut *bus)
        })
    }

    /// Take the bus back
    pub fn into_inner(self) -> B {
        self.inner.into_inner().into_inner()
    }
}
