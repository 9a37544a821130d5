#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! Conversion from the Embassy time driver to the controller's wrapping clock.
//!
//! The time driver counts a 64-bit tick value; the controller only needs the
//! low 32 bits of the millisecond count and tolerates the wrap every ~49.7
//! days.

use annunciator_core::clock::Millis;

/// Truncates a 64-bit millisecond count to the controller's 32-bit clock.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn truncate_millis(millis: u64) -> Millis {
    Millis::new(millis as u32)
}

/// Reads the current time as a [`Millis`] value.
#[must_use]
#[cfg(target_os = "none")]
pub fn now() -> Millis {
    truncate_millis(embassy_time::Instant::now().as_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_low_bits_of_millisecond_count() {
        assert_eq!(truncate_millis(1_234), Millis::new(1_234));
        assert_eq!(truncate_millis(u64::from(u32::MAX)), Millis::new(u32::MAX));
        assert_eq!(truncate_millis(u64::from(u32::MAX) + 11), Millis::new(10));
    }

    #[test]
    fn truncated_readings_still_measure_elapsed_time() {
        let before = truncate_millis(u64::from(u32::MAX) - 99);
        let after = truncate_millis(u64::from(u32::MAX) + 401);
        assert_eq!(after.elapsed_since(before), 500);
    }
}
