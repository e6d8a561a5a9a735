//! Bus-attached device drivers
//!
//! Reference implementations of [`RingDriver`](crate::RingDriver) and
//! [`MatrixDriver`](crate::MatrixDriver) for the parts the marquee was
//! built around. Any other part works as long as it implements the traits.

mod is31fl3731;
mod pixel_ring;

pub use is31fl3731::{IS31FL3731_ADDRESS, Is31fl3731, MATRIX_HEIGHT, MATRIX_WIDTH};
pub use pixel_ring::{MAX_RING_LEDS, PIXEL_RING_ADDRESS, PixelRing};
