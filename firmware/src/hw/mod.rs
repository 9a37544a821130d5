//! GPIO bindings between the STM32G0 pins and the controller's board model.
//!
//! Polarities and rest levels come from [`ALL_INPUTS`] and [`ALL_OUTPUTS`];
//! the MCU pin for each line is chosen in `runtime::main`. This module only
//! translates logical states into electrical levels and back.
//!
//! [`ALL_INPUTS`]: annunciator_core::io::ALL_INPUTS
//! [`ALL_OUTPUTS`]: annunciator_core::io::ALL_OUTPUTS

#![cfg(target_os = "none")]

use annunciator_core::io::{self, InputSample, OutputDriver, OutputLine, output_pin};
use embassy_stm32::gpio::{Input, Level, Output};

const fn from_gpio(level: Level) -> io::Level {
    match level {
        Level::Low => io::Level::Low,
        Level::High => io::Level::High,
    }
}

const fn to_gpio(level: io::Level) -> Level {
    match level {
        io::Level::Low => Level::Low,
        io::Level::High => Level::High,
    }
}

/// GPIO level `line` must hold before the controller starts.
#[must_use]
pub const fn rest_level(line: OutputLine) -> Level {
    to_gpio(output_pin(line).rest_level())
}

/// Push-pull outputs for the bell and the three indicators.
pub struct GpioOutputs {
    bell: Output<'static>,
    power_led: Output<'static>,
    silent_led: Output<'static>,
    alarm_led: Output<'static>,
}

impl GpioOutputs {
    #[must_use]
    pub fn new(
        bell: Output<'static>,
        power_led: Output<'static>,
        silent_led: Output<'static>,
        alarm_led: Output<'static>,
    ) -> Self {
        Self {
            bell,
            power_led,
            silent_led,
            alarm_led,
        }
    }

    fn pin_mut(&mut self, line: OutputLine) -> &mut Output<'static> {
        match line {
            OutputLine::Bell => &mut self.bell,
            OutputLine::PowerLed => &mut self.power_led,
            OutputLine::SilentLed => &mut self.silent_led,
            OutputLine::AlarmLed => &mut self.alarm_led,
        }
    }
}

impl OutputDriver for GpioOutputs {
    fn set(&mut self, line: OutputLine, active: bool) {
        let level = io::Level::for_state(output_pin(line).polarity, active);
        self.pin_mut(line).set_level(to_gpio(level));
    }
}

/// Pulled-up inputs for the button and the two radio-module lines.
pub struct BoardInputs {
    button: Input<'static>,
    link_ready: Input<'static>,
    target_detected: Input<'static>,
}

impl BoardInputs {
    #[must_use]
    pub fn new(
        button: Input<'static>,
        link_ready: Input<'static>,
        target_detected: Input<'static>,
    ) -> Self {
        Self {
            button,
            link_ready,
            target_detected,
        }
    }

    /// Reads all three lines for one control-loop pass.
    #[must_use]
    pub fn sample(&self) -> InputSample {
        InputSample::from_levels(
            from_gpio(self.button.get_level()),
            from_gpio(self.link_ready.get_level()),
            from_gpio(self.target_detected.get_level()),
        )
    }
}
