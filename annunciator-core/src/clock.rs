//! Millisecond clock readings shared by every timed rule in the controller.
//!
//! The board timer counts milliseconds since boot in 32 bits and wraps
//! silently. Every elapsed-time check goes through [`Millis::elapsed_since`],
//! which subtracts with wraparound so a rollover never reads as a huge or
//! negative interval.

use core::fmt;

/// Milliseconds since boot, wrapping at `u32::MAX`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Millis(u32);

impl Millis {
    /// Reading taken at boot.
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn new(millis: u32) -> Self {
        Self(millis)
    }

    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Milliseconds from `earlier` to `self`, modulo 2^32.
    #[must_use]
    pub const fn elapsed_since(self, earlier: Self) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    /// Advances the reading by `millis`, wrapping like the hardware counter.
    #[must_use]
    pub const fn wrapping_add(self, millis: u32) -> Self {
        Self(self.0.wrapping_add(millis))
    }
}

impl From<u32> for Millis {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for Millis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}
