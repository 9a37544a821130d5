//! Board I/O description shared by firmware and host targets.
//!
//! The controller never touches registers. It reads an [`InputSample`] taken
//! once per iteration and writes logical on/off requests through an
//! [`OutputDriver`]; the line catalog below records how each logical line is
//! wired so the firmware and emulator agree on polarity and rest levels.

/// Electrical level of a pin.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// Level that drives a line with `polarity` to the requested logical state.
    #[must_use]
    pub const fn for_state(polarity: Polarity, active: bool) -> Self {
        match (polarity, active) {
            (Polarity::ActiveLow, true) | (Polarity::ActiveHigh, false) => Level::Low,
            (Polarity::ActiveLow, false) | (Polarity::ActiveHigh, true) => Level::High,
        }
    }

    /// Returns `true` when this level means "asserted" for `polarity`.
    #[must_use]
    pub const fn is_active(self, polarity: Polarity) -> bool {
        matches!(
            (polarity, self),
            (Polarity::ActiveLow, Level::Low) | (Polarity::ActiveHigh, Level::High)
        )
    }
}

/// Which electrical level asserts a line.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Polarity {
    ActiveLow,
    ActiveHigh,
}

/// Logical input lines sampled every iteration.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InputLine {
    Button,
    LinkReady,
    TargetDetected,
}

/// Logical output lines driven by the controller.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputLine {
    Bell,
    PowerLed,
    SilentLed,
    AlarmLed,
}

impl OutputLine {
    /// Deterministic index for lookups into [`ALL_OUTPUTS`].
    #[must_use]
    pub const fn as_index(self) -> usize {
        match self {
            OutputLine::Bell => 0,
            OutputLine::PowerLed => 1,
            OutputLine::SilentLed => 2,
            OutputLine::AlarmLed => 3,
        }
    }
}

/// Wiring metadata for an input line. Inputs use the MCU pull-up.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct InputPin {
    pub line: InputLine,
    pub polarity: Polarity,
}

/// Wiring metadata for an output line.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct OutputPin {
    pub line: OutputLine,
    pub name: &'static str,
    pub polarity: Polarity,
    /// Logical state the line holds before the controller runs.
    pub rest_active: bool,
}

impl OutputPin {
    /// Electrical level matching the documented rest state.
    #[must_use]
    pub const fn rest_level(&self) -> Level {
        Level::for_state(self.polarity, self.rest_active)
    }
}

/// Compile-time catalog of the three input lines.
pub const ALL_INPUTS: [InputPin; 3] = [
    InputPin {
        line: InputLine::Button,
        polarity: Polarity::ActiveLow,
    },
    InputPin {
        line: InputLine::TargetDetected,
        polarity: Polarity::ActiveLow,
    },
    InputPin {
        line: InputLine::LinkReady,
        polarity: Polarity::ActiveLow,
    },
];

/// Compile-time catalog of the four output lines, indexed by [`OutputLine::as_index`].
pub const ALL_OUTPUTS: [OutputPin; 4] = [
    OutputPin {
        line: OutputLine::Bell,
        name: "BELL*",
        polarity: Polarity::ActiveLow,
        rest_active: false,
    },
    OutputPin {
        line: OutputLine::PowerLed,
        name: "LED_POWER",
        polarity: Polarity::ActiveHigh,
        rest_active: true,
    },
    OutputPin {
        line: OutputLine::SilentLed,
        name: "LED_SILENT",
        polarity: Polarity::ActiveHigh,
        rest_active: false,
    },
    OutputPin {
        line: OutputLine::AlarmLed,
        name: "LED_ALARM",
        polarity: Polarity::ActiveHigh,
        rest_active: false,
    },
];

/// Retrieve output wiring by line.
#[must_use]
pub const fn output_pin(line: OutputLine) -> OutputPin {
    ALL_OUTPUTS[line.as_index()]
}

/// Retrieve input wiring by line.
#[must_use]
pub const fn input_pin(line: InputLine) -> InputPin {
    match line {
        InputLine::Button => ALL_INPUTS[0],
        InputLine::TargetDetected => ALL_INPUTS[1],
        InputLine::LinkReady => ALL_INPUTS[2],
    }
}

/// Fresh reading of every input line for one iteration.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct InputSample {
    /// Raw button level; the debouncer works on the electrical level.
    pub button: Level,
    pub link_ready: bool,
    pub target_detected: bool,
}

impl InputSample {
    /// Decodes raw pin levels using the polarity in [`ALL_INPUTS`].
    #[must_use]
    pub const fn from_levels(button: Level, link_ready: Level, target_detected: Level) -> Self {
        Self {
            button,
            link_ready: link_ready.is_active(input_pin(InputLine::LinkReady).polarity),
            target_detected: target_detected
                .is_active(input_pin(InputLine::TargetDetected).polarity),
        }
    }

    /// Sample with the button released and both radio lines at the given logical states.
    #[must_use]
    pub const fn idle_button(link_ready: bool, target_detected: bool) -> Self {
        Self {
            button: Level::High,
            link_ready,
            target_detected,
        }
    }

    /// Returns `true` when the button line reads as pressed.
    #[must_use]
    pub const fn button_pressed(&self) -> bool {
        self.button.is_active(input_pin(InputLine::Button).polarity)
    }
}

/// Abstraction over the physical output drivers.
pub trait OutputDriver {
    /// Drives `line` to its logical active or inactive state.
    fn set(&mut self, line: OutputLine, active: bool);

    /// Returns every output to its documented rest level.
    fn apply_rest_levels(&mut self) {
        for pin in &ALL_OUTPUTS {
            self.set(pin.line, pin.rest_active);
        }
    }
}

/// Output driver that remembers the last logical state of each line.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct OutputLatch {
    states: [bool; ALL_OUTPUTS.len()],
    bell_activations: u32,
}

impl OutputLatch {
    /// Creates a latch with every line inactive.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            states: [false; ALL_OUTPUTS.len()],
            bell_activations: 0,
        }
    }

    /// Last logical state written to `line`.
    #[must_use]
    pub const fn is_active(&self, line: OutputLine) -> bool {
        self.states[line.as_index()]
    }

    /// Electrical level currently driven on `line`.
    #[must_use]
    pub const fn level(&self, line: OutputLine) -> Level {
        Level::for_state(output_pin(line).polarity, self.is_active(line))
    }

    /// Number of inactive-to-active edges seen on the bell line.
    #[must_use]
    pub const fn bell_activations(&self) -> u32 {
        self.bell_activations
    }
}

impl OutputDriver for OutputLatch {
    fn set(&mut self, line: OutputLine, active: bool) {
        let slot = &mut self.states[line.as_index()];
        if line == OutputLine::Bell && active && !*slot {
            self.bell_activations = self.bell_activations.saturating_add(1);
        }
        *slot = active;
    }
}
