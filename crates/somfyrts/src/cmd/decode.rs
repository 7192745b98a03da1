use somfyrts_frame::decode_frame;

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_json, print_rows, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let decoded = decode_frame(&args.frame).map_err(|err| frame_error("decode failed", err))?;

    match format {
        OutputFormat::Json => print_json(&decoded),
        OutputFormat::Raw => println!(
            "{} {} {}",
            decoded.identity, decoded.rolling_code, decoded.button
        ),
        other => print_rows(
            &[
                ("key", format!("{:#04x}", decoded.key)),
                ("button", decoded.button.to_string()),
                ("rolling_code", decoded.rolling_code.to_string()),
                ("identity", format!("{:#08x}", decoded.identity)),
            ],
            other,
        ),
    }

    Ok(SUCCESS)
}
