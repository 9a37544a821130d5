use std::io;

#[allow(dead_code)]
#[path = "../grammar.rs"]
mod grammar;
#[allow(dead_code)]
#[path = "../session.rs"]
mod session;

use session::{Session, TranscriptProfile};

fn main() -> io::Result<()> {
    for profile in TranscriptProfile::ALL {
        record_profile(profile)?;
        println!("wrote {}", profile.log_path());
    }
    Ok(())
}

fn record_profile(profile: TranscriptProfile) -> io::Result<()> {
    let mut session = Session::for_profile(profile)?;
    let _ = session.boot()?;
    for command in profile.script() {
        let _ = session.handle_command(command)?;
    }
    Ok(())
}
