use serde::Serialize;
use somfyrts_frame::{encode_frame, Button, Frame, RemoteIdentity, RollingCode};

use crate::cmd::FrameArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{hex_bytes, print_json, print_rows, OutputFormat};

#[derive(Serialize)]
struct FrameOutput {
    identity: RemoteIdentity,
    button: Button,
    rolling_code: RollingCode,
    frame: Frame,
    bytes: Vec<u8>,
}

pub fn run(args: FrameArgs, format: OutputFormat) -> CliResult<i32> {
    let code = RollingCode::new(args.code);
    let frame = encode_frame(args.id, code, args.button);

    match format {
        OutputFormat::Json => print_json(&FrameOutput {
            identity: args.id,
            button: args.button,
            rolling_code: code,
            frame,
            bytes: frame.as_bytes().to_vec(),
        }),
        OutputFormat::Raw => println!("{frame}"),
        other => print_rows(
            &[
                ("identity", format!("{:#08x}", args.id)),
                ("button", args.button.to_string()),
                ("rolling_code", code.to_string()),
                ("frame", hex_bytes(frame.as_bytes())),
            ],
            other,
        ),
    }

    Ok(SUCCESS)
}
