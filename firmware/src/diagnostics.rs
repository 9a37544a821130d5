#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! Serial diagnostic channel.
//!
//! Every [`LogLine`] is written to the diagnostic UART as plain ASCII followed
//! by `\r\n`, and mirrored to defmt (or stdout on host builds) tagged with the
//! controller clock. A failed UART write drops the line; the controller never
//! blocks or retries on the diagnostic channel.

use core::fmt::Write as _;

use annunciator_core::clock::Millis;
use annunciator_core::diagnostics::{DiagnosticSink, LINE_TERMINATOR, LogLine};
use heapless::String;

/// Longest rendered line plus terminator, with headroom.
pub const MAX_FRAME_LEN: usize = 40;

/// Baud rate of the diagnostic UART.
pub const DIAGNOSTIC_BAUD: u32 = 115_200;

/// One framed diagnostic line ready for the wire.
pub type Frame = String<MAX_FRAME_LEN>;

/// Byte sink carrying framed lines off the board.
pub trait LineTransport {
    type Error;

    /// Writes every byte of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns the transport error if any byte could not be sent.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
}

/// Renders `line` followed by the line terminator.
#[must_use]
pub fn frame_line(line: LogLine) -> Option<Frame> {
    let mut frame = Frame::new();
    write!(frame, "{line}{LINE_TERMINATOR}").ok()?;
    Some(frame)
}

/// [`DiagnosticSink`] that writes lines to a [`LineTransport`].
pub struct UartDiagnostics<T> {
    transport: T,
    dropped: u32,
}

impl<T: LineTransport> UartDiagnostics<T> {
    #[must_use]
    pub const fn new(transport: T) -> Self {
        Self {
            transport,
            dropped: 0,
        }
    }

    /// Number of lines lost to transport errors since boot.
    #[must_use]
    pub const fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Writes an empty line, used to separate the boot banner.
    pub fn blank_line(&mut self) {
        if self.transport.write_all(LINE_TERMINATOR.as_bytes()).is_err() {
            self.dropped = self.dropped.wrapping_add(1);
        }
    }

    #[cfg(test)]
    fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: LineTransport> DiagnosticSink for UartDiagnostics<T> {
    fn emit(&mut self, now: Millis, line: LogLine) {
        mirror_line(now, line);

        let Some(frame) = frame_line(line) else {
            return;
        };

        if self.transport.write_all(frame.as_bytes()).is_err() {
            self.dropped = self.dropped.wrapping_add(1);
            warn_dropped(now, self.dropped);
        }
    }
}

#[cfg(target_os = "none")]
impl LineTransport for embassy_stm32::usart::UartTx<'static, embassy_stm32::mode::Blocking> {
    type Error = embassy_stm32::usart::Error;

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.blocking_write(bytes)?;
        self.blocking_flush()
    }
}

#[cfg(target_os = "none")]
fn mirror_line(now: Millis, line: LogLine) {
    defmt::info!("annunciator:uart t={}ms {}", now.as_u32(), line.text());
    if let LogLine::SilentModeToggled(on) = line {
        defmt::info!("annunciator:silent {}", on);
    }
}

#[cfg(not(target_os = "none"))]
fn mirror_line(now: Millis, line: LogLine) {
    println!("annunciator:uart t={}ms {}", now.as_u32(), line);
}

#[cfg(target_os = "none")]
fn warn_dropped(now: Millis, dropped: u32) {
    defmt::warn!(
        "annunciator:uart write error t={}ms dropped={}",
        now.as_u32(),
        dropped
    );
}

#[cfg(not(target_os = "none"))]
fn warn_dropped(now: Millis, dropped: u32) {
    println!(
        "annunciator:uart write error t={}ms dropped={}",
        now.as_u32(),
        dropped
    );
}
