//! Status snapshot and its text rendering.
//!
//! The emulator's `status` command and the firmware's periodic heartbeat both
//! render a [`StatusSnapshot`] through [`StatusFormatter`] so the wording stays
//! identical across front-ends.

use core::fmt;

use crate::sequencer::AlarmState;

/// Point-in-time view of the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub state: AlarmState,
    pub silent_mode: bool,
    pub keydown: bool,
    pub bells_remaining: u8,
    pub bell_active: bool,
    /// Last state written to the alarm indicator.
    pub alarm_lit: bool,
    /// Milliseconds since the most recent strike (or since boot).
    pub since_last_bell: u32,
    /// Milliseconds into the current cooldown, while in [`AlarmState::Cooldown2`].
    pub cooldown_elapsed: Option<u32>,
}

/// Helper that renders a [`StatusSnapshot`] into human-readable lines.
#[derive(Clone, Copy, Debug)]
pub struct StatusFormatter<'a> {
    snapshot: &'a StatusSnapshot,
}

impl<'a> StatusFormatter<'a> {
    /// Creates a new formatter for the provided snapshot.
    #[must_use]
    pub const fn new(snapshot: &'a StatusSnapshot) -> Self {
        Self { snapshot }
    }

    /// Writes the state line (e.g. `state alarm-2 bells-remaining=1`).
    pub fn write_state_line<W: fmt::Write>(&self, writer: &mut W) -> fmt::Result {
        write!(
            writer,
            "state {} bells-remaining={}",
            self.snapshot.state, self.snapshot.bells_remaining
        )
    }

    /// Writes the output line (e.g. `outputs bell=ringing alarm=lit silent=off`).
    pub fn write_outputs_line<W: fmt::Write>(&self, writer: &mut W) -> fmt::Result {
        writer.write_str("outputs bell=")?;
        writer.write_str(if self.snapshot.bell_active {
            "ringing"
        } else {
            "idle"
        })?;
        writer.write_str(" alarm=")?;
        writer.write_str(if self.snapshot.alarm_lit {
            "lit"
        } else {
            "dark"
        })?;
        writer.write_str(" silent=")?;
        writer.write_str(if self.snapshot.silent_mode { "on" } else { "off" })?;
        write!(writer, " keydown={}", self.snapshot.keydown)
    }

    /// Writes the timer line (e.g. `timers last-bell=+1.2s cooldown=n/a`).
    pub fn write_timers_line<W: fmt::Write>(&self, writer: &mut W) -> fmt::Result {
        writer.write_str("timers last-bell=")?;
        write_elapsed(writer, Some(self.snapshot.since_last_bell))?;
        writer.write_str(" cooldown=")?;
        write_elapsed(writer, self.snapshot.cooldown_elapsed)
    }
}

fn write_elapsed<W: fmt::Write>(writer: &mut W, millis: Option<u32>) -> fmt::Result {
    match millis {
        None => writer.write_str("n/a"),
        Some(value) if value >= 1_000 => {
            let seconds = value / 1_000;
            let tenths = (value % 1_000) / 100;
            write!(writer, "+{seconds}.{tenths}s")
        }
        Some(value) => write!(writer, "+{value}ms"),
    }
}
