//! Build-time timing constants for the annunciator.
//!
//! All values are milliseconds. They are fixed at compile time; the device has
//! no runtime configuration surface.

/// Minimum spacing between two button samples.
pub const BUTTON_SAMPLE_INTERVAL_MS: u32 = 10;
/// How long the bell output stays active after a strike.
pub const BELL_PULSE_MS: u32 = 500;
/// Strike spacing during the initial burst. A strike needs strictly more than this.
pub const INITIAL_BELL_INTERVAL_MS: u32 = 1_000;
/// Strike spacing once the initial burst is finished (five minutes).
pub const REPEAT_BELL_INTERVAL_MS: u32 = 300_000;
/// Quiet period after an alarm clears before the device re-arms.
pub const COOLDOWN_MS: u32 = 10_000;
/// Number of strikes in the initial burst.
pub const INITIAL_BELL_COUNT: u8 = 2;

// A strike must finish its pulse before the next strike can start.
const _: () = assert!(BELL_PULSE_MS < INITIAL_BELL_INTERVAL_MS);
const _: () = assert!(INITIAL_BELL_INTERVAL_MS < REPEAT_BELL_INTERVAL_MS);
