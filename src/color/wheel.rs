//! Colour wheel
//!
//! Maps a position on a 255-step hue circle to a fully saturated colour.
//! The circle is made of three 85-step linear segments:
//! green → red, red → blue, blue → green.

use super::{BLACK, Rgb};

/// Number of distinct wheel positions before the colours repeat
pub const WHEEL_PERIOD: u8 = 255;

const SEGMENT: u8 = 85;

/// Colour at wheel `position`.
///
/// Positions outside `0..=255` are clamped to black rather than wrapped.
/// `color_wheel(255)` equals `color_wheel(0)`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub const fn color_wheel(position: i32) -> Rgb {
    if position < 0 || position > 255 {
        return BLACK;
    }
    let position = position as u8;

    if position < SEGMENT {
        Rgb {
            r: position * 3,
            g: 255 - position * 3,
            b: 0,
        }
    } else if position < SEGMENT * 2 {
        let position = position - SEGMENT;
        Rgb {
            r: 255 - position * 3,
            g: 0,
            b: position * 3,
        }
    } else {
        let position = position - SEGMENT * 2;
        Rgb {
            r: 0,
            g: position * 3,
            b: 255 - position * 3,
        }
    }
}
