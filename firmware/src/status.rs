#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! Status heartbeat for the debug probe.
//!
//! [`StatusWatch`] decides when the control loop should render a
//! [`StatusSnapshot`]: on every state change and otherwise once per
//! [`HEARTBEAT_INTERVAL_MS`]. The rendered lines go to defmt only; the
//! diagnostic UART carries nothing but the fixed log lines.

use core::fmt;

use annunciator_core::clock::Millis;
use annunciator_core::device::{StatusFormatter, StatusSnapshot};
use annunciator_core::sequencer::AlarmState;
use heapless::String;

/// Interval between unsolicited status reports.
pub const HEARTBEAT_INTERVAL_MS: u32 = 60_000;

/// Capacity of one rendered status line.
pub const STATUS_LINE_LEN: usize = 64;

/// Tracks the last reported state and report time.
#[derive(Clone, Copy, Debug)]
pub struct StatusWatch {
    reported: Option<AlarmState>,
    last_report: Millis,
}

impl StatusWatch {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            reported: None,
            last_report: Millis::ZERO,
        }
    }

    /// Returns `true` when a report is due for `state` at `now`.
    pub fn poll(&mut self, state: AlarmState, now: Millis) -> bool {
        let changed = self.reported != Some(state);
        let stale = now.elapsed_since(self.last_report) >= HEARTBEAT_INTERVAL_MS;
        if changed || stale {
            self.reported = Some(state);
            self.last_report = now;
            true
        } else {
            false
        }
    }
}

impl Default for StatusWatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders the three status lines for `snapshot`.
///
/// # Errors
///
/// Returns [`fmt::Error`] if a line does not fit in [`STATUS_LINE_LEN`].
pub fn render(snapshot: &StatusSnapshot) -> Result<[String<STATUS_LINE_LEN>; 3], fmt::Error> {
    let formatter = StatusFormatter::new(snapshot);
    let mut lines = [String::new(), String::new(), String::new()];
    formatter.write_state_line(&mut lines[0])?;
    formatter.write_outputs_line(&mut lines[1])?;
    formatter.write_timers_line(&mut lines[2])?;
    Ok(lines)
}

/// Emits `snapshot` to the debug log.
pub fn report(snapshot: &StatusSnapshot) {
    match render(snapshot) {
        Ok(lines) => {
            for line in &lines {
                emit_status(line.as_str());
            }
        }
        Err(fmt::Error) => emit_status("status line overflow"),
    }
}

#[cfg(target_os = "none")]
fn emit_status(line: &str) {
    defmt::info!("annunciator:status {}", line);
}

#[cfg(not(target_os = "none"))]
fn emit_status(line: &str) {
    println!("annunciator:status {line}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_first_poll_and_every_state_change() {
        let mut watch = StatusWatch::new();
        assert!(watch.poll(AlarmState::WaitReady, Millis::new(1)));
        assert!(!watch.poll(AlarmState::WaitReady, Millis::new(2)));
        assert!(watch.poll(AlarmState::Idle, Millis::new(3)));
        assert!(!watch.poll(AlarmState::Idle, Millis::new(4)));
    }

    #[test]
    fn reports_heartbeat_when_state_is_steady() {
        let mut watch = StatusWatch::new();
        let start = Millis::new(u32::MAX - 10);
        assert!(watch.poll(AlarmState::Alarm3, start));

        let almost = start.wrapping_add(HEARTBEAT_INTERVAL_MS - 1);
        assert!(!watch.poll(AlarmState::Alarm3, almost));

        let due = start.wrapping_add(HEARTBEAT_INTERVAL_MS);
        assert!(watch.poll(AlarmState::Alarm3, due));
        assert!(!watch.poll(AlarmState::Alarm3, due.wrapping_add(1)));
    }

    #[test]
    fn renders_snapshot_lines() {
        let snapshot = StatusSnapshot {
            state: AlarmState::Cooldown2,
            silent_mode: true,
            keydown: false,
            bells_remaining: 0,
            bell_active: false,
            alarm_lit: false,
            since_last_bell: 42,
            cooldown_elapsed: Some(2_500),
        };

        let [state, outputs, timers] = render(&snapshot).unwrap();
        assert_eq!(state.as_str(), "state cooldown-2 bells-remaining=0");
        assert_eq!(
            outputs.as_str(),
            "outputs bell=idle alarm=dark silent=on keydown=false"
        );
        assert_eq!(timers.as_str(), "timers last-bell=+42ms cooldown=+2.5s");
    }

    #[test]
    fn widest_snapshot_fits_status_lines() {
        let snapshot = StatusSnapshot {
            state: AlarmState::WaitReady,
            silent_mode: false,
            keydown: false,
            bells_remaining: u8::MAX,
            bell_active: true,
            alarm_lit: false,
            since_last_bell: u32::MAX,
            cooldown_elapsed: Some(u32::MAX),
        };

        let [state, outputs, timers] = render(&snapshot).unwrap();
        assert_eq!(state.as_str(), "state wait-ready bells-remaining=255");
        assert_eq!(
            outputs.as_str(),
            "outputs bell=ringing alarm=dark silent=off keydown=false"
        );
        assert_eq!(
            timers.as_str(),
            "timers last-bell=+4294967.2s cooldown=+4294967.2s"
        );
    }
}
