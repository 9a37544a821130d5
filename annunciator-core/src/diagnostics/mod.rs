//! Diagnostic line catalog and history ring shared by firmware and host targets.
//!
//! The controller reports every transition as a [`LogLine`]. Sinks decide where
//! the text goes: the firmware writes it to the serial port, the emulator
//! prints it, and [`DiagnosticHistory`] keeps the most recent lines in a
//! fixed-size ring for status queries.

use core::fmt;

use heapless::{HistoryBuf, OldestOrdered};

use crate::clock::Millis;

/// Terminator appended to every line on the wire.
pub const LINE_TERMINATOR: &str = "\r\n";

/// Total number of diagnostic records retained in memory.
pub const DIAGNOSTIC_RING_CAPACITY: usize = 32;

/// Identifier assigned to recorded lines.
pub type RecordId = u32;

/// Every line the annunciator can emit.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LogLine {
    Started,
    LinkReady,
    LinkNotReady,
    AlarmActivated,
    AlarmDeactivated,
    Ding,
    InitialBellFinished,
    CooldownStart,
    CooldownComplete,
    SilentModeToggled(bool),
}

impl LogLine {
    /// Fixed text of the line, excluding the silent-mode value.
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            LogLine::Started => "Started.",
            LogLine::LinkReady => "WiFi is ready.",
            LogLine::LinkNotReady => "WiFi is not ready.",
            LogLine::AlarmActivated => "Alarm activated.",
            LogLine::AlarmDeactivated => "Alarm deactivated.",
            LogLine::Ding => "Ding.",
            LogLine::InitialBellFinished => "Initial bell finished.",
            LogLine::CooldownStart => "Cooldown start.",
            LogLine::CooldownComplete => "Cooldown complete.",
            LogLine::SilentModeToggled(_) => "Toggle silent mode: ",
        }
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())?;
        if let LogLine::SilentModeToggled(silent) = self {
            f.write_str(if *silent { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Destination for diagnostic lines.
pub trait DiagnosticSink {
    /// Emits one line observed at `now`.
    fn emit(&mut self, now: Millis, line: LogLine);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn emit(&mut self, now: Millis, line: LogLine) {
        (**self).emit(now, line);
    }
}

#[cfg(feature = "alloc")]
impl DiagnosticSink for alloc::vec::Vec<LogLine> {
    fn emit(&mut self, _: Millis, line: LogLine) {
        self.push(line);
    }
}

/// Sink that discards every line.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&mut self, _: Millis, _: LogLine) {}
}

/// Diagnostic record stored in the history ring.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DiagnosticRecord {
    pub id: RecordId,
    pub timestamp: Millis,
    pub line: LogLine,
}

/// Records diagnostic lines into a fixed-size ring buffer.
pub struct DiagnosticHistory<const CAPACITY: usize = DIAGNOSTIC_RING_CAPACITY> {
    ring: HistoryBuf<DiagnosticRecord, CAPACITY>,
    next_id: RecordId,
}

impl<const CAPACITY: usize> DiagnosticHistory<CAPACITY> {
    /// Creates an empty history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ring: HistoryBuf::new(),
            next_id: 0,
        }
    }

    /// Returns an iterator over the retained records in chronological order.
    pub fn oldest_first(&self) -> OldestOrdered<'_, DiagnosticRecord> {
        self.ring.oldest_ordered()
    }

    /// Returns the most recent record, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&DiagnosticRecord> {
        self.ring.recent()
    }

    /// Returns the number of records currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Returns `true` when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Total number of lines ever recorded, including evicted ones.
    #[must_use]
    pub const fn total_recorded(&self) -> RecordId {
        self.next_id
    }

    /// Records a line and returns its identifier.
    pub fn record(&mut self, timestamp: Millis, line: LogLine) -> RecordId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.ring.write(DiagnosticRecord {
            id,
            timestamp,
            line,
        });
        id
    }
}

impl<const CAPACITY: usize> Default for DiagnosticHistory<CAPACITY> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CAPACITY: usize> DiagnosticSink for DiagnosticHistory<CAPACITY> {
    fn emit(&mut self, now: Millis, line: LogLine) {
        self.record(now, line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;
    use heapless::String;

    fn render(line: LogLine) -> String<32> {
        let mut text = String::new();
        write!(text, "{line}").unwrap();
        text
    }

    #[test]
    fn lines_render_exact_text() {
        assert_eq!(render(LogLine::Started), "Started.");
        assert_eq!(render(LogLine::LinkReady), "WiFi is ready.");
        assert_eq!(render(LogLine::LinkNotReady), "WiFi is not ready.");
        assert_eq!(render(LogLine::AlarmActivated), "Alarm activated.");
        assert_eq!(render(LogLine::AlarmDeactivated), "Alarm deactivated.");
        assert_eq!(render(LogLine::Ding), "Ding.");
        assert_eq!(
            render(LogLine::InitialBellFinished),
            "Initial bell finished."
        );
        assert_eq!(render(LogLine::CooldownStart), "Cooldown start.");
        assert_eq!(render(LogLine::CooldownComplete), "Cooldown complete.");
        assert_eq!(
            render(LogLine::SilentModeToggled(true)),
            "Toggle silent mode: 1"
        );
        assert_eq!(
            render(LogLine::SilentModeToggled(false)),
            "Toggle silent mode: 0"
        );
    }

    #[test]
    fn history_keeps_newest_records_in_order() {
        let mut history = DiagnosticHistory::<2>::new();
        assert!(history.is_empty());

        assert_eq!(history.record(Millis::new(5), LogLine::Started), 0);
        history.emit(Millis::new(9), LogLine::LinkReady);
        history.emit(Millis::new(12), LogLine::AlarmActivated);

        assert_eq!(history.len(), 2);
        assert_eq!(history.total_recorded(), 3);

        let latest = history.latest().copied().unwrap();
        assert_eq!(latest.id, 2);
        assert_eq!(latest.timestamp, Millis::new(12));

        let lines: heapless::Vec<LogLine, 2> =
            history.oldest_first().map(|record| record.line).collect();
        assert_eq!(lines.as_slice(), &[LogLine::LinkReady, LogLine::AlarmActivated]);
    }
}
