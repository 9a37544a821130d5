//! Command grammar for the emulator REPL.
//!
//! Commands are case-insensitive keywords followed by at most one argument.
//! Durations accept a bare millisecond count or an `ms`/`s` suffix.

use std::fmt;

use winnow::ascii::{Caseless, alpha1, dec_uint, space0, space1};
use winnow::combinator::{alt, delimited, opt, preceded};
use winnow::error::{ContextError, ErrMode, ModalResult};
use winnow::prelude::*;

/// Button hold used by `press` when no duration is given.
pub const DEFAULT_PRESS_HOLD_MS: u32 = 100;

/// Longest span a single `advance` or `press` may simulate.
pub const MAX_ADVANCE_MS: u32 = 3_600_000;

pub const HELP_TOPICS: &[(&str, &str)] = &[
    ("link", "link up|down           - drive the radio link-ready line"),
    ("target", "target on|off          - drive the radio target-detected line"),
    ("button", "button down|up         - hold or release the silence button"),
    (
        "press",
        "press [hold]           - tap the silence button (default 100ms)",
    ),
    (
        "advance",
        "advance <duration>     - run the controller for <duration> of virtual time",
    ),
    ("status", "status                 - show controller state, outputs and timers"),
    ("history", "history                - list the retained diagnostic lines"),
    ("help", "help [topic]           - show help for a command"),
    ("exit", "exit|quit              - leave the emulator"),
];

/// Parsed REPL command.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Command<'a> {
    Link(bool),
    Target(bool),
    Button { pressed: bool },
    Press { hold_ms: u32 },
    Advance { millis: u32 },
    Status,
    History,
    Help(Option<&'a str>),
    Exit,
}

/// Reasons a line was rejected.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CommandError {
    UnknownCommand(String),
    InvalidArguments {
        command: &'static str,
        usage: &'static str,
    },
    DurationTooLong {
        requested: u32,
        limit: u32,
    },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::UnknownCommand(keyword) => {
                write!(f, "unknown command `{keyword}`")
            }
            CommandError::InvalidArguments { command, usage } => {
                write!(f, "invalid arguments for `{command}`; usage: {usage}")
            }
            CommandError::DurationTooLong { requested, limit } => {
                write!(f, "duration {requested}ms exceeds limit of {limit}ms")
            }
        }
    }
}

impl std::error::Error for CommandError {}

/// Parses one REPL line.
///
/// # Errors
///
/// Returns [`CommandError`] when the keyword is unknown, its arguments do not
/// match the grammar, or a duration exceeds [`MAX_ADVANCE_MS`].
pub fn parse_command(line: &str) -> Result<Command<'_>, CommandError> {
    let command = delimited(space0, command, space0)
        .parse(line)
        .map_err(|_| classify(line))?;

    match command {
        Command::Press { hold_ms: millis } | Command::Advance { millis }
            if millis > MAX_ADVANCE_MS =>
        {
            Err(CommandError::DurationTooLong {
                requested: millis,
                limit: MAX_ADVANCE_MS,
            })
        }
        other => Ok(other),
    }
}

fn classify(line: &str) -> CommandError {
    let keyword = line.split_whitespace().next().unwrap_or_default();
    match HELP_TOPICS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(keyword))
    {
        Some(&(name, usage)) => CommandError::InvalidArguments {
            command: name,
            usage: usage.split(" - ").next().unwrap_or(usage).trim_end(),
        },
        None => CommandError::UnknownCommand(keyword.to_string()),
    }
}

fn command<'a>(input: &mut &'a str) -> ModalResult<Command<'a>> {
    alt((
        preceded((Caseless("link"), space1), switch("up", "down")).map(Command::Link),
        preceded((Caseless("target"), space1), switch("on", "off")).map(Command::Target),
        preceded((Caseless("button"), space1), switch("down", "up"))
            .map(|pressed| Command::Button { pressed }),
        preceded(Caseless("press"), opt(preceded(space1, duration_ms))).map(|hold| {
            Command::Press {
                hold_ms: hold.unwrap_or(DEFAULT_PRESS_HOLD_MS),
            }
        }),
        preceded((Caseless("advance"), space1), duration_ms)
            .map(|millis| Command::Advance { millis }),
        Caseless("status").value(Command::Status),
        Caseless("history").value(Command::History),
        preceded(Caseless("help"), opt(preceded(space1, alpha1))).map(Command::Help),
        alt((Caseless("exit"), Caseless("quit"))).value(Command::Exit),
    ))
    .parse_next(input)
}

fn switch<'a>(
    on: &'static str,
    off: &'static str,
) -> impl Parser<&'a str, bool, ErrMode<ContextError>> {
    alt((Caseless(on).value(true), Caseless(off).value(false)))
}

fn duration_ms(input: &mut &str) -> ModalResult<u32> {
    (
        dec_uint::<_, u32, _>,
        opt(alt((Caseless("ms").value(1_u32), Caseless("s").value(1_000_u32)))),
    )
        .verify_map(|(value, scale)| value.checked_mul(scale.unwrap_or(1)))
        .parse_next(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_line_switches_case_insensitively() {
        assert_eq!(parse_command("link up"), Ok(Command::Link(true)));
        assert_eq!(parse_command("LINK Down"), Ok(Command::Link(false)));
        assert_eq!(parse_command("target on"), Ok(Command::Target(true)));
        assert_eq!(parse_command("  target   off "), Ok(Command::Target(false)));
        assert_eq!(
            parse_command("button down"),
            Ok(Command::Button { pressed: true })
        );
    }

    #[test]
    fn parses_durations_with_units() {
        assert_eq!(
            parse_command("advance 250"),
            Ok(Command::Advance { millis: 250 })
        );
        assert_eq!(
            parse_command("advance 250ms"),
            Ok(Command::Advance { millis: 250 })
        );
        assert_eq!(
            parse_command("advance 5s"),
            Ok(Command::Advance { millis: 5_000 })
        );
        assert_eq!(
            parse_command("press"),
            Ok(Command::Press {
                hold_ms: DEFAULT_PRESS_HOLD_MS
            })
        );
        assert_eq!(
            parse_command("press 40ms"),
            Ok(Command::Press { hold_ms: 40 })
        );
    }

    #[test]
    fn parses_help_topics() {
        assert_eq!(parse_command("help"), Ok(Command::Help(None)));
        assert_eq!(
            parse_command("help advance"),
            Ok(Command::Help(Some("advance")))
        );
        assert_eq!(parse_command("status"), Ok(Command::Status));
        assert_eq!(parse_command("history"), Ok(Command::History));
    }

    #[test]
    fn parses_exit_aliases() {
        assert_eq!(parse_command("exit"), Ok(Command::Exit));
        assert_eq!(parse_command(" QUIT "), Ok(Command::Exit));
        assert_eq!(
            parse_command("exit now"),
            Err(CommandError::InvalidArguments {
                command: "exit",
                usage: "exit|quit",
            })
        );
    }

    #[test]
    fn rejects_bad_arguments_with_usage() {
        let err = parse_command("link sideways").unwrap_err();
        assert_eq!(
            err,
            CommandError::InvalidArguments {
                command: "link",
                usage: "link up|down",
            }
        );
        assert_eq!(
            err.to_string(),
            "invalid arguments for `link`; usage: link up|down"
        );

        assert!(matches!(
            parse_command("advance"),
            Err(CommandError::InvalidArguments {
                command: "advance",
                ..
            })
        ));
        assert!(matches!(
            parse_command("status now"),
            Err(CommandError::InvalidArguments {
                command: "status",
                ..
            })
        ));
    }

    #[test]
    fn rejects_unknown_keywords() {
        assert_eq!(
            parse_command("reboot now"),
            Err(CommandError::UnknownCommand("reboot".to_string()))
        );
    }

    #[test]
    fn caps_simulated_durations() {
        assert_eq!(
            parse_command("advance 2h"),
            Err(CommandError::InvalidArguments {
                command: "advance",
                usage: "advance <duration>",
            })
        );
        assert_eq!(
            parse_command("advance 3601s"),
            Err(CommandError::DurationTooLong {
                requested: 3_601_000,
                limit: MAX_ADVANCE_MS,
            })
        );
        assert!(matches!(
            parse_command("advance 99999999999"),
            Err(CommandError::InvalidArguments { .. })
        ));
    }
}
