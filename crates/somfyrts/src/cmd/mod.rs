use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use somfyrts_frame::{Button, Frame, RemoteIdentity, DEFAULT_PIN, DEFAULT_REPETITIONS};

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod code;
pub mod decode;
pub mod frame;
pub mod send;
pub mod version;
pub mod waveform;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Press a button once: transmit and advance the rolling code.
    Send(SendArgs),
    /// Print the obfuscated frame for a button press (no side effects).
    Frame(FrameArgs),
    /// Print the pulse train for a button press (no side effects).
    Waveform(WaveformArgs),
    /// Decode an obfuscated 7-byte frame.
    Decode(DecodeArgs),
    /// Inspect or resynchronize a remote's stored rolling code.
    #[command(subcommand)]
    Code(CodeCommand),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args, format),
        Command::Frame(args) => frame::run(args, format),
        Command::Waveform(args) => waveform::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Code(CodeCommand::Get(args)) => code::get(args, format),
        Command::Code(CodeCommand::Set(args)) => code::set(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Which remote, and where its rolling code lives.
#[derive(Args, Debug)]
pub struct RemoteArgs {
    /// 24-bit remote address, decimal or 0x-prefixed hex.
    #[arg(long, env = "SOMFYRTS_ID")]
    pub id: RemoteIdentity,
    /// Directory holding one `<id>.txt` rolling code file per remote.
    #[arg(long, value_name = "DIR", env = "SOMFYRTS_STATE_DIR", default_value = ".")]
    pub state_dir: PathBuf,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Button to press: up, down, my (alias stop) or prog.
    pub button: Button,
    #[command(flatten)]
    pub remote: RemoteArgs,
    /// GPIO driving the emitter's data pin.
    #[arg(long, default_value_t = DEFAULT_PIN)]
    pub pin: u8,
    /// Frame repetitions.
    #[arg(long, default_value_t = DEFAULT_REPETITIONS)]
    pub repetitions: usize,
    /// Maximum time to wait for the transmitter to go idle (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
    /// Append the pulse train as a JSON line to this file or FIFO instead of
    /// a dry run.
    #[arg(long, value_name = "PATH")]
    pub pulse_file: Option<PathBuf>,
    /// Dry run only: block for the waveform's real playing time.
    #[arg(long, conflicts_with = "pulse_file")]
    pub realtime: bool,
    /// Persist the next code before transmitting.
    #[arg(long)]
    pub reserve: bool,
}

#[derive(Args, Debug)]
pub struct FrameArgs {
    /// Button to encode.
    pub button: Button,
    /// 24-bit remote address, decimal or 0x-prefixed hex.
    #[arg(long, env = "SOMFYRTS_ID")]
    pub id: RemoteIdentity,
    /// Rolling code to encode.
    #[arg(long)]
    pub code: u32,
}

#[derive(Args, Debug)]
pub struct WaveformArgs {
    #[command(flatten)]
    pub frame: FrameArgs,
    /// Frame repetitions.
    #[arg(long, default_value_t = DEFAULT_REPETITIONS)]
    pub repetitions: usize,
    /// GPIO driving the emitter's data pin.
    #[arg(long, default_value_t = DEFAULT_PIN)]
    pub pin: u8,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// 14 hex digits, e.g. a78e8e8fd9edff.
    pub frame: Frame,
}

#[derive(Subcommand, Debug)]
pub enum CodeCommand {
    /// Print the stored rolling code.
    Get(RemoteArgs),
    /// Overwrite the stored rolling code.
    Set(CodeSetArgs),
}

#[derive(Args, Debug)]
pub struct CodeSetArgs {
    /// New rolling code.
    pub code: u32,
    #[command(flatten)]
    pub remote: RemoteArgs,
    /// Allow moving the code backwards.
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    if millis {
        Ok(Duration::from_millis(value))
    } else {
        Ok(Duration::from_secs(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("").is_err());
    }
}
