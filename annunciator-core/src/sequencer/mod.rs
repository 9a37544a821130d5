//! Alarm state machine.
//!
//! One call to [`Sequencer::step`] evaluates exactly one state handler. Each
//! handler inspects the fresh radio signals and the clock, updates the timing
//! fields it owns, and returns the next state together with the side effects
//! the device must apply (indicator writes, bell strikes, log lines). The
//! sequencer never touches hardware itself.
//!
//! ```text
//!  WaitReady ──ready──► Idle ──target──► Alarm1 ──► Alarm2 ──2 strikes──► Alarm3
//!      ▲                 ▲                            │                    │
//!      │                 │                            └──── target lost ───┤
//!      │                 └──── 10 s ──── Cooldown2 ◄── Cooldown1 ◄──────────┘
//!      └──────────── link lost (Idle, Alarm2, Alarm3, Cooldown2) ────────────
//! ```

use core::fmt;

use heapless::Vec;

use crate::clock::Millis;
use crate::diagnostics::LogLine;
use crate::timing::{
    COOLDOWN_MS, INITIAL_BELL_COUNT, INITIAL_BELL_INTERVAL_MS, REPEAT_BELL_INTERVAL_MS,
};

/// Largest number of effects a single handler produces, plus one slot of headroom.
pub const MAX_EFFECTS: usize = 4;

/// Bounded effect list returned by one step.
pub type Effects = Vec<Effect, MAX_EFFECTS>;

/// Phases of the alarm response.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum AlarmState {
    /// Waiting for the radio module to report link-ready.
    #[default]
    WaitReady,
    /// Armed, waiting for a target.
    Idle,
    /// One-shot: light the alarm indicator and load the strike counter.
    Alarm1,
    /// Initial burst of strikes at one-second spacing.
    Alarm2,
    /// Slow reminder strikes every five minutes.
    Alarm3,
    /// One-shot: record the cooldown start.
    Cooldown1,
    /// Waiting out the cooldown before re-arming.
    Cooldown2,
}

impl AlarmState {
    /// Every state, in table order.
    pub const ALL: [AlarmState; 7] = [
        AlarmState::WaitReady,
        AlarmState::Idle,
        AlarmState::Alarm1,
        AlarmState::Alarm2,
        AlarmState::Alarm3,
        AlarmState::Cooldown1,
        AlarmState::Cooldown2,
    ];

    /// Returns `true` when the handler for this state samples link-ready.
    #[must_use]
    pub const fn watches_link(self) -> bool {
        !matches!(self, AlarmState::Alarm1 | AlarmState::Cooldown1)
    }

    /// Short lowercase label used in status output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            AlarmState::WaitReady => "wait-ready",
            AlarmState::Idle => "idle",
            AlarmState::Alarm1 => "alarm-1",
            AlarmState::Alarm2 => "alarm-2",
            AlarmState::Alarm3 => "alarm-3",
            AlarmState::Cooldown1 => "cooldown-1",
            AlarmState::Cooldown2 => "cooldown-2",
        }
    }
}

impl fmt::Display for AlarmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Logical radio-module signals sampled for one evaluation.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Signals {
    pub link_ready: bool,
    pub target_detected: bool,
}

impl Signals {
    #[must_use]
    pub const fn new(link_ready: bool, target_detected: bool) -> Self {
        Self {
            link_ready,
            target_detected,
        }
    }
}

/// Side effect requested by a state handler.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Effect {
    /// Drive the alarm indicator on or off.
    AlarmIndicator(bool),
    /// Start a bell pulse (muted by the device in silent mode).
    StrikeBell,
    /// Emit a diagnostic line.
    Log(LogLine),
}

/// Result of one handler: the next state and what to do about it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Step {
    pub next: AlarmState,
    pub effects: Effects,
}

impl Step {
    const fn to(next: AlarmState) -> Self {
        Self {
            next,
            effects: Vec::new(),
        }
    }

    fn with(mut self, effect: Effect) -> Self {
        let pushed = self.effects.push(effect);
        debug_assert!(pushed.is_ok(), "sequencer effect buffer overflow");
        self
    }

    fn log(self, line: LogLine) -> Self {
        self.with(Effect::Log(line))
    }
}

/// Alarm state machine and the timing state it owns.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Sequencer {
    state: AlarmState,
    bells_remaining: u8,
    last_bell: Millis,
    cooldown_start: Millis,
}

impl Sequencer {
    /// Creates a sequencer in [`AlarmState::WaitReady`] with all timers at boot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: AlarmState::WaitReady,
            bells_remaining: INITIAL_BELL_COUNT,
            last_bell: Millis::ZERO,
            cooldown_start: Millis::ZERO,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> AlarmState {
        self.state
    }

    /// Strikes left in the initial burst.
    #[must_use]
    pub const fn bells_remaining(&self) -> u8 {
        self.bells_remaining
    }

    /// Time of the most recent strike (boot if none yet).
    #[must_use]
    pub const fn last_bell(&self) -> Millis {
        self.last_bell
    }

    /// Time the most recent cooldown began (boot if none yet).
    #[must_use]
    pub const fn cooldown_start(&self) -> Millis {
        self.cooldown_start
    }

    /// Evaluates the current state once and returns the effects to apply.
    pub fn step(&mut self, signals: Signals, now: Millis) -> Effects {
        let step = self.evaluate(signals, now);
        self.state = step.next;
        step.effects
    }

    /// Runs the handler for the current state without committing the transition.
    fn evaluate(&mut self, signals: Signals, now: Millis) -> Step {
        match self.state {
            AlarmState::WaitReady => Self::wait_ready(signals),
            AlarmState::Idle => Self::idle(signals),
            AlarmState::Alarm1 => self.alarm_start(),
            AlarmState::Alarm2 => self.initial_bells(signals, now),
            AlarmState::Alarm3 => self.repeat_bells(signals, now),
            AlarmState::Cooldown1 => self.cooldown_start_at(now),
            AlarmState::Cooldown2 => self.cooldown_wait(signals, now),
        }
    }

    fn wait_ready(signals: Signals) -> Step {
        let step = if signals.link_ready {
            Step::to(AlarmState::Idle).log(LogLine::LinkReady)
        } else {
            Step::to(AlarmState::WaitReady)
        };
        step.with(Effect::AlarmIndicator(false))
    }

    fn idle(signals: Signals) -> Step {
        if !signals.link_ready {
            Step::to(AlarmState::WaitReady).log(LogLine::LinkNotReady)
        } else if signals.target_detected {
            Step::to(AlarmState::Alarm1).log(LogLine::AlarmActivated)
        } else {
            Step::to(AlarmState::Idle)
        }
    }

    fn alarm_start(&mut self) -> Step {
        self.bells_remaining = INITIAL_BELL_COUNT;
        Step::to(AlarmState::Alarm2).with(Effect::AlarmIndicator(true))
    }

    fn initial_bells(&mut self, signals: Signals, now: Millis) -> Step {
        if let Some(step) = Self::alarm_exit(signals) {
            return step;
        }

        if now.elapsed_since(self.last_bell) <= INITIAL_BELL_INTERVAL_MS {
            return Step::to(AlarmState::Alarm2);
        }

        self.last_bell = now;
        self.bells_remaining = self.bells_remaining.saturating_sub(1);
        let step = Step::to(AlarmState::Alarm2)
            .with(Effect::StrikeBell)
            .log(LogLine::Ding);

        if self.bells_remaining == 0 {
            Step {
                next: AlarmState::Alarm3,
                ..step
            }
            .log(LogLine::InitialBellFinished)
        } else {
            step
        }
    }

    fn repeat_bells(&mut self, signals: Signals, now: Millis) -> Step {
        if let Some(step) = Self::alarm_exit(signals) {
            return step;
        }

        if now.elapsed_since(self.last_bell) <= REPEAT_BELL_INTERVAL_MS {
            return Step::to(AlarmState::Alarm3);
        }

        self.last_bell = now;
        Step::to(AlarmState::Alarm3)
            .with(Effect::StrikeBell)
            .log(LogLine::Ding)
    }

    /// Shared exits for the two ringing states. Link loss wins over target loss.
    fn alarm_exit(signals: Signals) -> Option<Step> {
        if !signals.link_ready {
            Some(
                Step::to(AlarmState::WaitReady)
                    .with(Effect::AlarmIndicator(false))
                    .log(LogLine::LinkNotReady),
            )
        } else if !signals.target_detected {
            Some(
                Step::to(AlarmState::Cooldown1)
                    .with(Effect::AlarmIndicator(false))
                    .log(LogLine::AlarmDeactivated),
            )
        } else {
            None
        }
    }

    fn cooldown_start_at(&mut self, now: Millis) -> Step {
        self.cooldown_start = now;
        Step::to(AlarmState::Cooldown2).log(LogLine::CooldownStart)
    }

    fn cooldown_wait(&self, signals: Signals, now: Millis) -> Step {
        if !signals.link_ready {
            Step::to(AlarmState::WaitReady).log(LogLine::LinkNotReady)
        } else if now.elapsed_since(self.cooldown_start) >= COOLDOWN_MS {
            Step::to(AlarmState::Idle).log(LogLine::CooldownComplete)
        } else {
            Step::to(AlarmState::Cooldown2)
        }
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}
