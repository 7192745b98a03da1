use somfyrts_frame::{expected_pulse_count, ENCRYPTION_KEY, DEFAULT_PIN, DEFAULT_REPETITIONS};
use somfyrts_transport::DEFAULT_TRANSMIT_TIMEOUT;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

/// How concurrent senders for one remote are kept apart on this platform.
const CODE_LOCK: &str = if cfg!(unix) { "flock" } else { "none" };

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("somfyrts {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: somfyrts");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "build: {} ({})",
        option_env!("SOMFYRTS_BUILD_TARGET").unwrap_or("unknown"),
        option_env!("SOMFYRTS_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!("features: cli={}", cfg!(feature = "cli"));
    println!("transmitters: dry-run, pulse-file");
    println!("state_file: <dir>/<id>.txt");
    println!("code_lock: {CODE_LOCK}");
    println!("frame_key: {ENCRYPTION_KEY:#04x}");
    println!(
        "defaults: pin={DEFAULT_PIN} repetitions={DEFAULT_REPETITIONS} pulses={} timeout={}s",
        expected_pulse_count(DEFAULT_REPETITIONS),
        DEFAULT_TRANSMIT_TIMEOUT.as_secs()
    );

    Ok(SUCCESS)
}
