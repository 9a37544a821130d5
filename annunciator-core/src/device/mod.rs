//! Device controller tying the debouncer and sequencer to the board.
//!
//! [`Annunciator`] is the single owner of every piece of mutable device state.
//! The control loop calls [`Annunciator::tick`] once per pass with a fresh
//! clock reading and input sample; the tick never blocks.

pub mod status;

use crate::clock::Millis;
use crate::debounce::{DebounceEvent, Debouncer};
use crate::diagnostics::{DiagnosticSink, LogLine};
use crate::io::{InputSample, OutputDriver, OutputLine};
use crate::sequencer::{AlarmState, Effect, Sequencer, Signals};
use crate::timing::BELL_PULSE_MS;

pub use status::{StatusFormatter, StatusSnapshot};

/// Complete volatile state of the annunciator.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Annunciator {
    debouncer: Debouncer,
    sequencer: Sequencer,
    silent: bool,
    bell_active: bool,
    alarm_lit: bool,
}

impl Annunciator {
    /// Power-on state: waiting for link, not silenced, bell idle.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            debouncer: Debouncer::new(),
            sequencer: Sequencer::new(),
            silent: false,
            bell_active: false,
            alarm_lit: false,
        }
    }

    /// Current sequencer state.
    #[must_use]
    pub const fn state(&self) -> AlarmState {
        self.sequencer.state()
    }

    /// Returns `true` while the bell is muted.
    #[must_use]
    pub const fn silent_mode(&self) -> bool {
        self.silent
    }

    /// Returns `true` while a bell pulse is being driven.
    #[must_use]
    pub const fn bell_active(&self) -> bool {
        self.bell_active
    }

    /// Last state written to the alarm indicator.
    #[must_use]
    pub const fn alarm_lit(&self) -> bool {
        self.alarm_lit
    }

    #[must_use]
    pub const fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    #[must_use]
    pub const fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    /// Drives every output to its rest level and announces the boot.
    pub fn start<D, L>(&mut self, now: Millis, outputs: &mut D, log: &mut L)
    where
        D: OutputDriver,
        L: DiagnosticSink,
    {
        outputs.apply_rest_levels();
        self.bell_active = false;
        self.alarm_lit = false;
        log.emit(now, LogLine::Started);
    }

    /// Runs one pass of the control loop and returns the resulting state.
    pub fn tick<D, L>(
        &mut self,
        now: Millis,
        inputs: InputSample,
        outputs: &mut D,
        log: &mut L,
    ) -> AlarmState
    where
        D: OutputDriver,
        L: DiagnosticSink,
    {
        outputs.set(OutputLine::SilentLed, self.silent);

        if now.elapsed_since(self.sequencer.last_bell()) >= BELL_PULSE_MS {
            outputs.set(OutputLine::Bell, false);
            self.bell_active = false;
        }

        if let Some(DebounceEvent::SilentModeToggled) = self.debouncer.poll(inputs.button, now) {
            self.silent = !self.silent;
            outputs.set(OutputLine::SilentLed, self.silent);
            log.emit(now, LogLine::SilentModeToggled(self.silent));
        }

        let signals = Signals::new(inputs.link_ready, inputs.target_detected);
        for effect in self.sequencer.step(signals, now) {
            self.apply(effect, now, outputs, log);
        }

        self.sequencer.state()
    }

    /// Read-only view of the device for status reporting.
    #[must_use]
    pub fn snapshot(&self, now: Millis) -> StatusSnapshot {
        let state = self.sequencer.state();
        StatusSnapshot {
            state,
            silent_mode: self.silent,
            keydown: self.debouncer.keydown(),
            bells_remaining: self.sequencer.bells_remaining(),
            bell_active: self.bell_active,
            alarm_lit: self.alarm_lit,
            since_last_bell: now.elapsed_since(self.sequencer.last_bell()),
            cooldown_elapsed: (state == AlarmState::Cooldown2)
                .then(|| now.elapsed_since(self.sequencer.cooldown_start())),
        }
    }

    fn apply<D, L>(&mut self, effect: Effect, now: Millis, outputs: &mut D, log: &mut L)
    where
        D: OutputDriver,
        L: DiagnosticSink,
    {
        match effect {
            Effect::AlarmIndicator(lit) => {
                outputs.set(OutputLine::AlarmLed, lit);
                self.alarm_lit = lit;
            }
            Effect::StrikeBell => {
                if !self.silent {
                    outputs.set(OutputLine::Bell, true);
                    self.bell_active = true;
                }
            }
            Effect::Log(line) => log.emit(now, line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{DiagnosticHistory, NullSink};
    use crate::io::{Level, OutputLatch};

    fn sample(link_ready: bool, target_detected: bool) -> InputSample {
        InputSample::idle_button(link_ready, target_detected)
    }

    #[test]
    fn start_applies_rest_levels_and_announces() {
        let mut device = Annunciator::new();
        let mut outputs = OutputLatch::new();
        let mut log = DiagnosticHistory::<8>::new();

        device.start(Millis::ZERO, &mut outputs, &mut log);

        assert!(outputs.is_active(OutputLine::PowerLed));
        assert!(!outputs.is_active(OutputLine::Bell));
        assert_eq!(log.latest().map(|record| record.line), Some(LogLine::Started));
        assert_eq!(device.state(), AlarmState::WaitReady);
    }

    #[test]
    fn bell_pulse_ends_after_pulse_duration() {
        let mut device = Annunciator::new();
        let mut outputs = OutputLatch::new();
        let mut log = DiagnosticHistory::<16>::new();

        let mut now = Millis::new(5_000);
        for _ in 0..3 {
            device.tick(now, sample(true, true), &mut outputs, &mut log);
        }
        device.tick(now, sample(true, true), &mut outputs, &mut log);
        assert!(device.bell_active());
        assert!(outputs.is_active(OutputLine::Bell));

        now = now.wrapping_add(BELL_PULSE_MS - 1);
        device.tick(now, sample(true, true), &mut outputs, &mut log);
        assert!(outputs.is_active(OutputLine::Bell));

        now = now.wrapping_add(1);
        device.tick(now, sample(true, true), &mut outputs, &mut log);
        assert!(!outputs.is_active(OutputLine::Bell));
        assert!(!device.bell_active());
        assert_eq!(outputs.level(OutputLine::Bell), Level::High);
    }

    #[test]
    fn silent_mode_mutes_strikes_but_keeps_timing() {
        let mut device = Annunciator {
            silent: true,
            ..Annunciator::new()
        };
        let mut outputs = OutputLatch::new();
        let mut log = DiagnosticHistory::<16>::new();

        let mut now = Millis::new(5_000);
        for _ in 0..4 {
            device.tick(now, sample(true, true), &mut outputs, &mut log);
        }
        now = now.wrapping_add(1_001);
        device.tick(now, sample(true, true), &mut outputs, &mut log);

        assert_eq!(device.state(), AlarmState::Alarm3);
        assert_eq!(outputs.bell_activations(), 0);
        assert!(outputs.is_active(OutputLine::SilentLed));
        let dings = log
            .oldest_first()
            .filter(|record| record.line == LogLine::Ding)
            .count();
        assert_eq!(dings, 2);
    }

    #[test]
    fn snapshot_reports_cooldown_progress_only_while_cooling() {
        let mut device = Annunciator::new();
        let mut outputs = OutputLatch::new();
        let mut log = DiagnosticHistory::<16>::new();

        let now = Millis::new(100);
        for _ in 0..3 {
            device.tick(now, sample(true, true), &mut outputs, &mut log);
        }
        assert_eq!(device.snapshot(now).cooldown_elapsed, None);

        device.tick(now, sample(true, false), &mut outputs, &mut log);
        device.tick(Millis::new(120), sample(true, false), &mut outputs, &mut log);
        let snapshot = device.snapshot(Millis::new(620));
        assert_eq!(snapshot.state, AlarmState::Cooldown2);
        assert_eq!(snapshot.cooldown_elapsed, Some(500));
        assert_eq!(snapshot.since_last_bell, 620);
    }

    #[test]
    fn snapshot_reports_the_driven_alarm_indicator() {
        let mut device = Annunciator::new();
        let mut outputs = OutputLatch::new();
        let now = Millis::new(100);

        device.start(now, &mut outputs, &mut NullSink);
        device.tick(now, sample(true, false), &mut outputs, &mut NullSink);
        device.tick(now, sample(true, true), &mut outputs, &mut NullSink);
        assert_eq!(device.state(), AlarmState::Alarm1);
        assert!(!device.snapshot(now).alarm_lit);
        assert!(!outputs.is_active(OutputLine::AlarmLed));

        device.tick(now, sample(true, true), &mut outputs, &mut NullSink);
        assert_eq!(device.state(), AlarmState::Alarm2);
        assert!(device.snapshot(now).alarm_lit);
        assert!(outputs.is_active(OutputLine::AlarmLed));

        device.tick(now, sample(false, true), &mut outputs, &mut NullSink);
        assert_eq!(device.state(), AlarmState::WaitReady);
        assert_eq!(device.alarm_lit(), outputs.is_active(OutputLine::AlarmLed));
        assert!(!device.alarm_lit());
    }
}
