//! Shift-register debouncer for the silence button.
//!
//! Every [`BUTTON_SAMPLE_INTERVAL_MS`] the raw pin level is shifted into an
//! eight-bit history, newest sample in bit 0 and oldest in bit 7. A set bit
//! means the line read high (released, the pull-up wins); a clear bit means the
//! button held it low.
//!
//! Only five bits are inspected through [`HISTORY_MASK`]: the three newest
//! samples and the two oldest. The three bits in between are never checked,
//! which spreads each edge over most of the window. A press edge is three
//! newest samples low with the two oldest high; a release edge is the mirror
//! image and only counts after a press edge has been seen.

use crate::clock::Millis;
use crate::io::Level;
use crate::timing::BUTTON_SAMPLE_INTERVAL_MS;

/// Bits of the history compared against the edge patterns.
pub const HISTORY_MASK: u8 = 0b1100_0111;
/// Masked history for a press edge: three newest samples low, two oldest high.
pub const PRESS_PATTERN: u8 = 0b1100_0000;
/// Masked history for a release edge: three newest samples high, two oldest low.
pub const RELEASE_PATTERN: u8 = 0b0000_0111;

/// Event produced by [`Debouncer::poll`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DebounceEvent {
    /// A full press and release cycle was confirmed; silent mode should flip.
    SilentModeToggled,
}

/// Edge detector state for the silence button.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Debouncer {
    history: u8,
    last_sample: Millis,
    keydown: bool,
}

impl Debouncer {
    /// Creates a debouncer with an all-clear history, sampled at boot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            history: 0,
            last_sample: Millis::ZERO,
            keydown: false,
        }
    }

    /// Raw eight-sample history (bit 0 newest).
    #[must_use]
    pub const fn history(&self) -> u8 {
        self.history
    }

    /// Returns `true` between a confirmed press edge and its release edge.
    #[must_use]
    pub const fn keydown(&self) -> bool {
        self.keydown
    }

    /// Time of the most recent sample.
    #[must_use]
    pub const fn last_sample(&self) -> Millis {
        self.last_sample
    }

    /// Samples `level` if the sampling interval has elapsed and reports a
    /// confirmed press/release cycle.
    pub fn poll(&mut self, level: Level, now: Millis) -> Option<DebounceEvent> {
        if now.elapsed_since(self.last_sample) < BUTTON_SAMPLE_INTERVAL_MS {
            return None;
        }

        self.last_sample = now;
        self.history = (self.history << 1) | u8::from(level == Level::High);

        match self.history & HISTORY_MASK {
            PRESS_PATTERN => {
                self.keydown = true;
                None
            }
            RELEASE_PATTERN if self.keydown => {
                self.keydown = false;
                Some(DebounceEvent::SilentModeToggled)
            }
            _ => None,
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new()
    }
}
