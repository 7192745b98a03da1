use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use somfyrts_frame::{encode_frame, generate_waveform, Frame, PulseInstruction, RollingCode};

use crate::cmd::WaveformArgs;
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_json, print_pretty, OutputFormat};

#[derive(Serialize)]
struct WaveformOutput<'a> {
    frame: Frame,
    pin: u8,
    repetitions: usize,
    pulse_count: usize,
    duration_us: u64,
    pulses: &'a [PulseInstruction],
}

pub fn run(args: WaveformArgs, format: OutputFormat) -> CliResult<i32> {
    let frame = encode_frame(
        args.frame.id,
        RollingCode::new(args.frame.code),
        args.frame.button,
    );
    let waveform = generate_waveform(&frame, args.repetitions, args.pin)
        .map_err(|err| frame_error("cannot build waveform", err))?;
    let duration_us = waveform.total_duration().as_micros() as u64;

    match format {
        OutputFormat::Json => print_json(&WaveformOutput {
            frame,
            pin: waveform.pin(),
            repetitions: args.repetitions,
            pulse_count: waveform.len(),
            duration_us,
            pulses: waveform.pulses(),
        }),
        OutputFormat::Raw => {
            // gpio_on gpio_off us_delay, one pulse per line
            for p in &waveform {
                println!("{} {} {}", p.gpio_on, p.gpio_off, p.us_delay);
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "LEVEL", "US"]);
            for (i, p) in waveform.iter().enumerate() {
                let level = if p.is_asserted() { "high" } else { "low" };
                table.add_row(vec![i.to_string(), level.to_string(), p.us_delay.to_string()]);
            }
            println!("{table}");
            println!("{} pulses, {} us", waveform.len(), duration_us);
        }
        OutputFormat::Pretty => print_pretty(&[
            ("frame", frame.to_string()),
            ("pin", waveform.pin().to_string()),
            ("repetitions", args.repetitions.to_string()),
            ("pulses", waveform.len().to_string()),
            ("duration_us", duration_us.to_string()),
        ]),
    }

    Ok(SUCCESS)
}
