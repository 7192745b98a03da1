use somfyrts_frame::Button;
use somfyrts_remote::{CommitPolicy, Remote, RemoteConfig, SendReport};
use somfyrts_store::FileStore;
use somfyrts_transport::{DryRunTransmitter, PulseFileTransmitter, Transmitter};

use crate::cmd::{parse_duration, SendArgs};
use crate::exit::{remote_error, store_error, transport_error, CliResult, SUCCESS};
use crate::output::{hex_bytes, print_json, print_rows, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let policy = if args.reserve {
        CommitPolicy::ReserveBeforeTransmit
    } else {
        CommitPolicy::AfterTransmit
    };
    let config = RemoteConfig::new(args.remote.id.get())
        .with_repetitions(args.repetitions)
        .with_pin(args.pin)
        .with_transmit_timeout(timeout)
        .with_commit_policy(policy);
    let store = FileStore::new(&args.remote.state_dir);
    // Held until the next code is saved, across every somfyrts process.
    let _lock = store
        .lock(args.remote.id)
        .map_err(|err| store_error("cannot lock rolling code", err))?;

    let report = match &args.pulse_file {
        Some(path) => {
            tracing::debug!(path = %path.display(), "using pulse file transmitter");
            let transmitter = PulseFileTransmitter::create(path)
                .map_err(|err| transport_error("cannot open pulse file", err))?;
            press(config, store, transmitter, args.button)?
        }
        None => {
            let transmitter = DryRunTransmitter::new().with_realtime(args.realtime);
            press(config, store, transmitter, args.button)?
        }
    };

    print_report(&report, format);
    Ok(SUCCESS)
}

fn press<T: Transmitter>(
    config: RemoteConfig,
    store: FileStore,
    transmitter: T,
    button: Button,
) -> CliResult<SendReport> {
    let mut remote = Remote::new(config, store, transmitter)
        .map_err(|err| remote_error("invalid remote", err))?;
    remote
        .send(button)
        .map_err(|err| remote_error("send failed", err))
}

fn print_report(report: &SendReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Raw => println!("{}", report.next_code),
        other => print_rows(
            &[
                ("identity", format!("{:#08x}", report.identity)),
                ("button", report.button.to_string()),
                ("rolling_code", report.rolling_code.to_string()),
                ("next_code", report.next_code.to_string()),
                ("frame", hex_bytes(report.frame.as_bytes())),
                ("pulses", report.pulses.to_string()),
                ("duration_us", report.duration_us.to_string()),
                ("persisted", report.persisted.to_string()),
            ],
            other,
        ),
    }
}
