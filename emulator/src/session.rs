use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use annunciator_core::clock::Millis;
use annunciator_core::device::{Annunciator, StatusFormatter};
use annunciator_core::diagnostics::{DiagnosticHistory, DiagnosticSink, LogLine};
use annunciator_core::io::{
    ALL_OUTPUTS, InputLine, InputSample, Level, OutputLatch, input_pin,
};

use crate::grammar::{self, Command, CommandError, HELP_TOPICS};

/// Diagnostic lines retained for the `history` command.
pub const HISTORY_CAPACITY: usize = 64;

/// Released time after `press` so the debouncer sees the release edge.
pub const PRESS_SETTLE_MS: u32 = 80;

/// Scripted sessions recorded by `capture_transcripts`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TranscriptProfile {
    AlarmCycle,
    LinkLoss,
    SilentMode,
}

impl TranscriptProfile {
    pub const ALL: [TranscriptProfile; 3] = [
        TranscriptProfile::AlarmCycle,
        TranscriptProfile::LinkLoss,
        TranscriptProfile::SilentMode,
    ];

    pub fn log_path(self) -> &'static str {
        match self {
            TranscriptProfile::AlarmCycle => "evidence/emulator-alarm-cycle.log",
            TranscriptProfile::LinkLoss => "evidence/emulator-link-loss.log",
            TranscriptProfile::SilentMode => "evidence/emulator-silent-mode.log",
        }
    }

    pub fn header(self) -> &'static str {
        match self {
            TranscriptProfile::AlarmCycle => "Annunciator emulator alarm cycle transcript",
            TranscriptProfile::LinkLoss => "Annunciator emulator link loss transcript",
            TranscriptProfile::SilentMode => "Annunciator emulator silent mode transcript",
        }
    }

    pub fn from_tag(tag: &str) -> Result<Self, String> {
        Self::ALL
            .into_iter()
            .find(|profile| profile.tag().eq_ignore_ascii_case(tag))
            .ok_or_else(|| format!("Unknown transcript profile `{tag}`"))
    }

    pub fn tag(self) -> &'static str {
        match self {
            TranscriptProfile::AlarmCycle => "alarm-cycle",
            TranscriptProfile::LinkLoss => "link-loss",
            TranscriptProfile::SilentMode => "silent-mode",
        }
    }

    /// Commands replayed for this profile.
    pub fn script(self) -> &'static [&'static str] {
        match self {
            TranscriptProfile::AlarmCycle => &[
                "status",
                "advance 5",
                "link up",
                "advance 5",
                "target on",
                "advance 2500",
                "status",
                "advance 300s",
                "target off",
                "advance 20",
                "status",
                "advance 10s",
                "history",
            ],
            TranscriptProfile::LinkLoss => &[
                "link up",
                "target on",
                "advance 2500",
                "status",
                "link down",
                "advance 20",
                "status",
                "advance 15s",
                "link up",
                "advance 5",
                "status",
            ],
            TranscriptProfile::SilentMode => &[
                "link up",
                "advance 200",
                "press",
                "status",
                "target on",
                "advance 2500",
                "status",
                "press",
                "advance 300s",
                "history",
            ],
        }
    }
}

/// Pin levels seen by the controller, plus the latched outputs.
#[derive(Debug)]
struct SimBoard {
    button: Level,
    link_ready: Level,
    target_detected: Level,
    outputs: OutputLatch,
}

impl SimBoard {
    fn new() -> Self {
        Self {
            button: Level::High,
            link_ready: Level::High,
            target_detected: Level::High,
            outputs: OutputLatch::new(),
        }
    }

    fn drive(line: InputLine, active: bool) -> Level {
        Level::for_state(input_pin(line).polarity, active)
    }

    fn sample(&self) -> InputSample {
        InputSample::from_levels(self.button, self.link_ready, self.target_detected)
    }
}

/// Sink that records into the history ring and queues lines for display.
struct Tee<'a> {
    history: &'a mut DiagnosticHistory<HISTORY_CAPACITY>,
    fresh: &'a mut Vec<LogLine>,
}

impl DiagnosticSink for Tee<'_> {
    fn emit(&mut self, now: Millis, line: LogLine) {
        self.history.emit(now, line);
        self.fresh.emit(now, line);
    }
}

pub struct Session {
    device: Annunciator,
    board: SimBoard,
    history: DiagnosticHistory<HISTORY_CAPACITY>,
    now: Millis,
    transcript: Option<TranscriptLogger>,
    closed: bool,
}

impl Session {
    /// Boots a fresh controller at virtual time zero.
    pub fn new(transcript: Option<TranscriptLogger>) -> Self {
        Self {
            device: Annunciator::new(),
            board: SimBoard::new(),
            history: DiagnosticHistory::new(),
            now: Millis::ZERO,
            transcript,
            closed: false,
        }
    }

    /// Opens a session recording to the transcript file for `profile`.
    pub fn for_profile(profile: TranscriptProfile) -> io::Result<Self> {
        let transcript = TranscriptLogger::create(Path::new(profile.log_path()), profile.header())?;
        Ok(Self::new(Some(transcript)))
    }

    /// Runs the controller's start-up step and returns the resulting lines.
    pub fn boot(&mut self) -> io::Result<Vec<String>> {
        let mut fresh = Vec::new();
        let mut sink = Tee {
            history: &mut self.history,
            fresh: &mut fresh,
        };
        self.device
            .start(self.now, &mut self.board.outputs, &mut sink);

        let lines: Vec<String> = fresh
            .into_iter()
            .map(|line| uart_line(self.now, line))
            .collect();
        self.record_output(&lines)?;
        Ok(lines)
    }

    #[must_use]
    pub const fn now(&self) -> Millis {
        self.now
    }

    #[must_use]
    pub const fn device(&self) -> &Annunciator {
        &self.device
    }

    /// Returns `true` once `exit` has been handled.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    #[cfg(test)]
    const fn outputs(&self) -> &OutputLatch {
        &self.board.outputs
    }

    pub fn handle_command(&mut self, line: &str) -> io::Result<Vec<String>> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(transcript) = self.transcript.as_mut() {
            transcript.append_line(self.now, TranscriptRole::Host, trimmed)?;
        }

        let lines = match grammar::parse_command(trimmed) {
            Ok(command) => self.execute(command),
            Err(err) => vec![describe_error(&err)],
        };

        self.record_output(&lines)?;
        Ok(lines)
    }

    fn execute(&mut self, command: Command<'_>) -> Vec<String> {
        match command {
            Command::Link(up) => {
                self.board.link_ready = SimBoard::drive(InputLine::LinkReady, up);
                vec![format!("OK link {}", if up { "up" } else { "down" })]
            }
            Command::Target(on) => {
                self.board.target_detected = SimBoard::drive(InputLine::TargetDetected, on);
                vec![format!("OK target {}", if on { "on" } else { "off" })]
            }
            Command::Button { pressed } => {
                self.board.button = SimBoard::drive(InputLine::Button, pressed);
                vec![format!(
                    "OK button {}",
                    if pressed { "down" } else { "up" }
                )]
            }
            Command::Press { hold_ms } => {
                let mut lines = vec![format!("OK press hold={hold_ms}ms")];
                self.board.button = SimBoard::drive(InputLine::Button, true);
                self.run_for(hold_ms, &mut lines);
                self.board.button = SimBoard::drive(InputLine::Button, false);
                self.run_for(PRESS_SETTLE_MS, &mut lines);
                lines
            }
            Command::Advance { millis } => {
                let mut lines = Vec::new();
                self.run_for(millis, &mut lines);
                lines.push(format!(
                    "OK t=+{} state={}",
                    self.now,
                    self.device.state()
                ));
                lines
            }
            Command::Status => self.status_lines(),
            Command::History => self.history_lines(),
            Command::Help(topic) => help_lines(topic),
            Command::Exit => {
                self.closed = true;
                vec!["Session closed.".to_string()]
            }
        }
    }

    /// Ticks the controller once per virtual millisecond.
    fn run_for(&mut self, millis: u32, lines: &mut Vec<String>) {
        let mut fresh = Vec::new();
        for _ in 0..millis {
            self.now = self.now.wrapping_add(1);
            let mut sink = Tee {
                history: &mut self.history,
                fresh: &mut fresh,
            };
            self.device
                .tick(self.now, self.board.sample(), &mut self.board.outputs, &mut sink);
            lines.extend(fresh.drain(..).map(|line| uart_line(self.now, line)));
        }
    }

    fn status_lines(&self) -> Vec<String> {
        let snapshot = self.device.snapshot(self.now);
        let formatter = StatusFormatter::new(&snapshot);

        let mut state = String::new();
        let mut outputs = String::new();
        let mut timers = String::new();
        formatter
            .write_state_line(&mut state)
            .expect("write status into String");
        formatter
            .write_outputs_line(&mut outputs)
            .expect("write status into String");
        formatter
            .write_timers_line(&mut timers)
            .expect("write status into String");

        let inputs = self.board.sample();
        vec![
            format!("clock +{}", self.now),
            state,
            outputs,
            timers,
            format!(
                "inputs link={} target={} button={}",
                if inputs.link_ready { "up" } else { "down" },
                if inputs.target_detected { "on" } else { "off" },
                if inputs.button_pressed() { "down" } else { "up" },
            ),
            pin_levels(&self.board.outputs),
        ]
    }

    fn history_lines(&self) -> Vec<String> {
        if self.history.is_empty() {
            return vec!["history empty".to_string()];
        }

        let mut lines = vec![format!(
            "history {} of {} lines",
            self.history.len(),
            self.history.total_recorded()
        )];
        lines.extend(self.history.oldest_first().map(|record| {
            format!("  #{:<3} +{:<10} {}", record.id, record.timestamp, record.line)
        }));
        lines
    }

    fn record_output(&mut self, lines: &[String]) -> io::Result<()> {
        if let Some(transcript) = self.transcript.as_mut() {
            for line in lines {
                transcript.append_line(self.now, TranscriptRole::Emulator, line)?;
            }
        }
        Ok(())
    }
}

fn uart_line(now: Millis, line: LogLine) -> String {
    format!("UART +{now} {line}")
}

fn describe_error(err: &CommandError) -> String {
    match err {
        CommandError::DurationTooLong { .. } => format!("ERR range {err}"),
        _ => format!("ERR syntax {err}"),
    }
}

fn pin_levels(outputs: &OutputLatch) -> String {
    let mut line = String::from("pins");
    for pin in &ALL_OUTPUTS {
        let level = match outputs.level(pin.line) {
            Level::Low => "low",
            Level::High => "high",
        };
        line.push_str(&format!(" {}={level}", pin.name));
    }
    line
}

fn help_lines(topic: Option<&str>) -> Vec<String> {
    let mut lines = Vec::new();
    match topic {
        Some(target) => {
            if let Some((_, detail)) = HELP_TOPICS
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(target))
            {
                lines.push((*detail).to_string());
            } else {
                lines.push(format!("No help available for `{target}`."));
                lines.push(format!("Available topics: {}", help_topic_list()));
            }
        }
        None => {
            lines.push("Available commands:".to_string());
            for (_, detail) in HELP_TOPICS {
                lines.push(format!("  {detail}"));
            }
            lines.push("Type `help <topic>` for a specific command.".to_string());
        }
    }
    lines
}

fn help_topic_list() -> String {
    HELP_TOPICS
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Append-only transcript file keyed by virtual time.
pub struct TranscriptLogger {
    writer: BufWriter<std::fs::File>,
}

impl TranscriptLogger {
    pub fn create(path: &Path, header: &str) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let mut logger = Self {
            writer: BufWriter::new(file),
        };

        logger.write_header(header)?;
        Ok(logger)
    }

    fn write_header(&mut self, header: &str) -> io::Result<()> {
        writeln!(self.writer, "# {header}")?;
        writeln!(
            self.writer,
            "# Timestamps are virtual milliseconds since controller boot"
        )?;
        writeln!(self.writer)?;
        self.writer.flush()
    }

    fn append_line(&mut self, now: Millis, role: TranscriptRole, line: &str) -> io::Result<()> {
        writeln!(
            self.writer,
            "[+{:>9} ms] {} {}",
            now.as_u32(),
            role.prefix(),
            line
        )?;
        self.writer.flush()
    }
}

enum TranscriptRole {
    Host,
    Emulator,
}

impl TranscriptRole {
    fn prefix(&self) -> &'static str {
        match self {
            TranscriptRole::Host => "HOST>",
            TranscriptRole::Emulator => "EMU <",
        }
    }
}
