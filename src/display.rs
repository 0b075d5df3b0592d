//! Numeric display encoding
//!
//! A value in `1..=127` is shown as seven lines, most significant bit first.

use crate::OutputDriver;
use crate::driver::SharedDriver;
use crate::error::{EffectError, Result};
use crate::line::{Level, Line};

/// Number of lines carrying the value.
pub const DISPLAY_BITS: usize = 7;

/// Encode `value` as line levels, most significant bit first.
///
/// ```
/// use myrtio_pin_effects::Level::{High, Low};
/// use myrtio_pin_effects::display::encode;
///
/// assert_eq!(encode(5).unwrap(), [Low, Low, Low, Low, High, Low, High]);
/// assert!(encode(128).is_err());
/// ```
pub fn encode(value: i64) -> Result<[Level; DISPLAY_BITS]> {
    if !(1..1_i64 << DISPLAY_BITS).contains(&value) {
        return Err(EffectError::OutOfRange(value));
    }
    let mut levels = [Level::Low; DISPLAY_BITS];
    for (i, level) in levels.iter_mut().enumerate() {
        let bit = DISPLAY_BITS - 1 - i;
        *level = Level::from((value >> bit) & 1 == 1);
    }
    Ok(levels)
}

/// Read a value back from line levels, most significant bit first.
pub fn decode(levels: &[Level; DISPLAY_BITS]) -> u8 {
    levels
        .iter()
        .fold(0, |value, level| (value << 1) | u8::from(level.is_high()))
}

pub(crate) fn write<D: OutputDriver>(
    driver: &SharedDriver<D>,
    lines: &[Line],
    levels: &[Level; DISPLAY_BITS],
) {
    driver.with(|driver| {
        for (&line, &level) in lines.iter().zip(levels) {
            driver.write(line, level);
        }
    });
}
