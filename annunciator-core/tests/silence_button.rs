use annunciator_core::clock::Millis;
use annunciator_core::device::Annunciator;
use annunciator_core::diagnostics::{DiagnosticHistory, LogLine};
use annunciator_core::io::{InputSample, Level, OutputLatch, OutputLine};
use annunciator_core::sequencer::AlarmState;

struct Panel {
    device: Annunciator,
    outputs: OutputLatch,
    log: DiagnosticHistory<64>,
    now: Millis,
    button: Level,
    target_detected: bool,
}

impl Panel {
    fn boot() -> Self {
        let mut panel = Self {
            device: Annunciator::new(),
            outputs: OutputLatch::new(),
            log: DiagnosticHistory::new(),
            now: Millis::ZERO,
            button: Level::High,
            target_detected: false,
        };
        panel
            .device
            .start(panel.now, &mut panel.outputs, &mut panel.log);
        panel
    }

    fn run_for(&mut self, millis: u32) {
        for _ in 0..millis {
            self.now = self.now.wrapping_add(1);
            let inputs = InputSample {
                button: self.button,
                link_ready: true,
                target_detected: self.target_detected,
            };
            self.device
                .tick(self.now, inputs, &mut self.outputs, &mut self.log);
        }
    }

    /// Holds the button down for `hold_ms` and then lets go for long enough to settle.
    fn press(&mut self, hold_ms: u32) {
        self.button = Level::Low;
        self.run_for(hold_ms);
        self.button = Level::High;
        self.run_for(200);
    }

    fn toggles(&self) -> Vec<bool> {
        self.log
            .oldest_first()
            .filter_map(|record| match record.line {
                LogLine::SilentModeToggled(on) => Some(on),
                _ => None,
            })
            .collect()
    }
}

#[test]
fn clean_press_toggles_silent_mode_once() {
    let mut panel = Panel::boot();
    panel.run_for(200);

    panel.press(100);

    assert!(panel.device.silent_mode());
    assert!(panel.outputs.is_active(OutputLine::SilentLed));
    assert_eq!(panel.toggles(), vec![true]);
}

#[test]
fn second_press_restores_audible_mode() {
    let mut panel = Panel::boot();
    panel.run_for(200);

    panel.press(100);
    panel.press(100);

    assert!(!panel.device.silent_mode());
    assert!(!panel.outputs.is_active(OutputLine::SilentLed));
    assert_eq!(panel.toggles(), vec![true, false]);
}

#[test]
fn button_held_at_boot_does_not_toggle_until_cycled() {
    let mut panel = Panel::boot();
    panel.button = Level::Low;
    panel.run_for(500);
    assert!(panel.toggles().is_empty());

    panel.button = Level::High;
    panel.run_for(200);
    assert!(
        panel.toggles().is_empty(),
        "a release without a confirmed press edge must be ignored"
    );
}

#[test]
fn silenced_alarm_never_drives_bell() {
    let mut panel = Panel::boot();
    panel.run_for(200);
    panel.press(100);
    assert!(panel.device.silent_mode());

    panel.target_detected = true;
    panel.run_for(310_000);

    assert_eq!(panel.device.state(), AlarmState::Alarm3);
    assert!(panel.outputs.is_active(OutputLine::AlarmLed));
    assert_eq!(panel.outputs.bell_activations(), 0);
    let dings = panel
        .log
        .oldest_first()
        .filter(|record| record.line == LogLine::Ding)
        .count();
    assert_eq!(dings, 3);
}

#[test]
fn unsilencing_mid_alarm_lets_next_strike_ring() {
    let mut panel = Panel::boot();
    panel.run_for(200);
    panel.press(100);
    panel.target_detected = true;
    panel.run_for(2_500);
    assert_eq!(panel.device.state(), AlarmState::Alarm3);
    assert_eq!(panel.outputs.bell_activations(), 0);

    panel.press(100);
    assert!(!panel.device.silent_mode());

    panel.run_for(300_000);
    assert_eq!(panel.outputs.bell_activations(), 1);
}
