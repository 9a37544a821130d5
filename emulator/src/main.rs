mod grammar;
mod session;

use std::env;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use session::{Session, TranscriptLogger, TranscriptProfile};

const SESSION_HEADER: &str = "Annunciator emulator interactive transcript";

enum Mode {
    Interactive { transcript: Option<PathBuf> },
    Replay(TranscriptProfile),
}

fn main() -> io::Result<()> {
    let mode = parse_mode().unwrap_or_else(|err| {
        eprintln!("{err}");
        eprintln!(
            "Usage: annunciator-emulator [--transcript <path>] | annunciator-emulator --replay <alarm-cycle|link-loss|silent-mode>"
        );
        process::exit(2);
    });

    match mode {
        Mode::Interactive { transcript } => run_interactive(transcript.as_deref()),
        Mode::Replay(profile) => run_replay(profile),
    }
}

fn run_replay(profile: TranscriptProfile) -> io::Result<()> {
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    let mut session = Session::for_profile(profile)?;
    writeln!(writer, "Recording transcript to {}", profile.log_path())?;

    for response in session.boot()? {
        writeln!(writer, "{response}")?;
    }
    for command in profile.script() {
        writeln!(writer, "> {command}")?;
        for response in session.handle_command(command)? {
            writeln!(writer, "{response}")?;
        }
        if session.is_closed() {
            break;
        }
    }
    Ok(())
}

fn run_interactive(transcript_path: Option<&Path>) -> io::Result<()> {
    let transcript = transcript_path
        .map(|path| TranscriptLogger::create(path, SESSION_HEADER))
        .transpose()?;

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    let mut session = Session::new(transcript);
    let mut line = String::new();

    writeln!(
        writer,
        "Annunciator Emulator ready. Type `help` for commands or `exit` to quit."
    )?;
    if let Some(path) = transcript_path.map(Path::display) {
        writeln!(writer, "Recording transcript to {path}")?;
    }
    for response in session.boot()? {
        writeln!(writer, "{response}")?;
    }

    loop {
        line.clear();
        write!(
            writer,
            "[+{} {}] > ",
            session.now(),
            session.device().state()
        )?;
        writer.flush()?;

        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            writeln!(writer)?;
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let responses = session.handle_command(trimmed)?;
        for response in responses {
            writeln!(writer, "{response}")?;
        }
        if session.is_closed() {
            break;
        }
    }

    Ok(())
}

fn parse_mode() -> Result<Mode, String> {
    let mut args = env::args().skip(1);
    let Some(arg) = args.next() else {
        return Ok(Mode::Interactive { transcript: None });
    };

    let mode = if let Some(value) = arg.strip_prefix("--transcript=") {
        Mode::Interactive {
            transcript: Some(PathBuf::from(value)),
        }
    } else if arg == "--transcript" {
        let value = args
            .next()
            .ok_or_else(|| "Expected value after --transcript".to_string())?;
        Mode::Interactive {
            transcript: Some(PathBuf::from(value)),
        }
    } else if let Some(value) = arg.strip_prefix("--replay=") {
        Mode::Replay(TranscriptProfile::from_tag(value)?)
    } else if arg == "--replay" {
        let value = args
            .next()
            .ok_or_else(|| "Expected value after --replay".to_string())?;
        Mode::Replay(TranscriptProfile::from_tag(&value)?)
    } else {
        return Err(format!("Unknown argument `{arg}`"));
    };

    if let Some(extra) = args.next() {
        return Err(format!("Unexpected argument `{extra}`"));
    }
    Ok(mode)
}
