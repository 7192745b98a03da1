use serde::Serialize;
use somfyrts_frame::{RemoteIdentity, RollingCode};
use somfyrts_remote::{Remote, RemoteConfig};
use somfyrts_store::{FileStore, RollingCodeStore};
use somfyrts_transport::DryRunTransmitter;

use crate::cmd::{CodeSetArgs, RemoteArgs};
use crate::exit::{remote_error, store_error, CliResult, SUCCESS};
use crate::output::{print_json, print_rows, OutputFormat};

#[derive(Serialize)]
struct CodeOutput {
    identity: RemoteIdentity,
    rolling_code: RollingCode,
    /// False when no valid record exists and the remote would start at 1.
    stored: bool,
    path: String,
}

pub fn get(args: RemoteArgs, format: OutputFormat) -> CliResult<i32> {
    let store = FileStore::new(&args.state_dir);
    let stored = match store.read(args.id) {
        Ok(found) => found,
        Err(err) => {
            tracing::warn!(identity = %args.id, error = %err, "ignoring unreadable record");
            None
        }
    };

    print_code(
        &CodeOutput {
            identity: args.id,
            rolling_code: stored.unwrap_or(RollingCode::INITIAL),
            stored: stored.is_some(),
            path: store.path_for(args.id).display().to_string(),
        },
        format,
    );
    Ok(SUCCESS)
}

pub fn set(args: CodeSetArgs, format: OutputFormat) -> CliResult<i32> {
    let store = FileStore::new(&args.remote.state_dir);
    let path = store.path_for(args.remote.id).display().to_string();
    let _lock = store
        .lock(args.remote.id)
        .map_err(|err| store_error("cannot lock rolling code", err))?;

    // No transmission happens here; the remote is only used for its resync rules.
    let mut remote = Remote::new(
        RemoteConfig::new(args.remote.id.get()),
        store,
        DryRunTransmitter::new(),
    )
    .map_err(|err| remote_error("invalid remote", err))?;
    remote
        .resync(RollingCode::new(args.code), args.force)
        .map_err(|err| remote_error("resync failed", err))?;

    print_code(
        &CodeOutput {
            identity: remote.identity(),
            rolling_code: remote.rolling_code(),
            stored: true,
            path,
        },
        format,
    );
    Ok(SUCCESS)
}

fn print_code(output: &CodeOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(output),
        OutputFormat::Raw => println!("{}", output.rolling_code),
        other => print_rows(
            &[
                ("identity", format!("{:#08x}", output.identity)),
                ("rolling_code", output.rolling_code.to_string()),
                ("stored", output.stored.to_string()),
                ("path", output.path.clone()),
            ],
            other,
        ),
    }
}
