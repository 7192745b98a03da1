mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "somfyrts", version, about = "Somfy RTS remote control simulator")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr). SOMFYRTS_LOG takes precedence.
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use somfyrts_frame::Button;

    use super::*;
    use crate::cmd::CodeCommand;

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from([
            "somfyrts",
            "send",
            "down",
            "--id",
            "0x123456",
            "--state-dir",
            "/tmp/somfyrts",
            "--repetitions",
            "2",
        ])
        .expect("send args should parse");

        match cli.command {
            Command::Send(args) => {
                assert_eq!(args.button, Button::Down);
                assert_eq!(args.remote.id.get(), 0x123456);
                assert_eq!(args.repetitions, 2);
                assert_eq!(args.pin, 4);
                assert!(!args.reserve);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_realtime_with_pulse_file() {
        let err = Cli::try_parse_from([
            "somfyrts",
            "send",
            "up",
            "--id",
            "1",
            "--pulse-file",
            "/tmp/pulses",
            "--realtime",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn rejects_out_of_range_identity() {
        let err = Cli::try_parse_from(["somfyrts", "frame", "up", "--id", "0x1000000", "--code", "1"])
            .expect_err("identity above 24 bits should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn rejects_unknown_button() {
        let err = Cli::try_parse_from(["somfyrts", "frame", "open", "--id", "1", "--code", "1"])
            .expect_err("unknown button should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn parses_code_set_subcommand() {
        let cli = Cli::try_parse_from(["somfyrts", "code", "set", "120", "--id", "42", "--force"])
            .expect("code set args should parse");
        match cli.command {
            Command::Code(CodeCommand::Set(args)) => {
                assert_eq!(args.code, 120);
                assert!(args.force);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
