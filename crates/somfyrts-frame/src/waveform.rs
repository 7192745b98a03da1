//! Frame to pulse-train conversion.
//!
//! Timings follow the RTS air interface at a 640 µs half-symbol. The emitter
//! is on/off keyed, so a pulse either asserts or deasserts the data pin for a
//! fixed number of microseconds.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::codec::{Frame, FRAME_LEN};
use crate::error::{FrameError, Result};

/// Repetitions used for every command; enough even for `Prog`.
pub const DEFAULT_REPETITIONS: usize = 4;

/// GPIO wired to the emitter's data pin on a stock Raspberry Pi setup.
pub const DEFAULT_PIN: u8 = 4;

const WAKEUP_HIGH_US: u32 = 9415;
const WAKEUP_LOW_US: u32 = 89565;
const HW_SYNC_US: u32 = 2560;
const SW_SYNC_HIGH_US: u32 = 4550;
const HALF_SYMBOL_US: u32 = 640;
const INTER_FRAME_GAP_US: u32 = 30415;

/// The first frame after wake-up needs fewer hardware syncs than repeats.
const FIRST_FRAME_HW_SYNCS: usize = 2;
const REPEAT_FRAME_HW_SYNCS: usize = 7;

const PAYLOAD_BITS: usize = FRAME_LEN * 8;

/// One generic-wave step: set `gpio_on` bits, clear `gpio_off` bits, then hold
/// for `us_delay` microseconds. Masks are `1 << gpio`, zero for "none".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PulseInstruction {
    pub gpio_on: u32,
    pub gpio_off: u32,
    pub us_delay: u32,
}

impl PulseInstruction {
    /// Drive the pin high for `us_delay`.
    pub fn asserted(mask: u32, us_delay: u32) -> Self {
        Self {
            gpio_on: mask,
            gpio_off: 0,
            us_delay,
        }
    }

    /// Drive the pin low for `us_delay`.
    pub fn deasserted(mask: u32, us_delay: u32) -> Self {
        Self {
            gpio_on: 0,
            gpio_off: mask,
            us_delay,
        }
    }

    /// True when this pulse raises the output.
    pub fn is_asserted(&self) -> bool {
        self.gpio_on != 0
    }
}

/// An ordered pulse train for one button press.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waveform {
    pin: u8,
    pulses: Vec<PulseInstruction>,
}

impl Waveform {
    /// GPIO the waveform drives.
    pub fn pin(&self) -> u8 {
        self.pin
    }

    pub fn pulses(&self) -> &[PulseInstruction] {
        &self.pulses
    }

    pub fn len(&self) -> usize {
        self.pulses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pulses.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PulseInstruction> {
        self.pulses.iter()
    }

    /// Wall-clock time the emitter needs to play the whole train.
    pub fn total_duration(&self) -> Duration {
        let micros: u64 = self.pulses.iter().map(|p| u64::from(p.us_delay)).sum();
        Duration::from_micros(micros)
    }

    pub fn into_pulses(self) -> Vec<PulseInstruction> {
        self.pulses
    }
}

impl<'a> IntoIterator for &'a Waveform {
    type Item = &'a PulseInstruction;
    type IntoIter = std::slice::Iter<'a, PulseInstruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.pulses.iter()
    }
}

/// Number of pulses [`generate_waveform`] emits for `repetitions` frames.
pub fn expected_pulse_count(repetitions: usize) -> usize {
    let per_frame = |syncs: usize| syncs * 2 + 2 + PAYLOAD_BITS * 2 + 1;
    match repetitions {
        0 => 0,
        n => 2 + per_frame(FIRST_FRAME_HW_SYNCS) + (n - 1) * per_frame(REPEAT_FRAME_HW_SYNCS),
    }
}

/// Build the pulse train for `frame`, sent `repetitions` times on `pin`.
///
/// ```text
/// wake-up │ hw sync ×2 │ sw sync │ 56 bits │ gap │ hw sync ×7 │ sw sync │ 56 bits │ gap │ …
/// ```
/// A `1` bit is low-then-high, a `0` bit high-then-low.
pub fn generate_waveform(frame: &Frame, repetitions: usize, pin: u8) -> Result<Waveform> {
    if repetitions == 0 {
        return Err(FrameError::InvalidRepetitions);
    }
    if pin > 31 {
        return Err(FrameError::InvalidPin(pin));
    }

    let mask = 1u32 << pin;
    let high = |us| PulseInstruction::asserted(mask, us);
    let low = |us| PulseInstruction::deasserted(mask, us);

    let mut pulses = Vec::with_capacity(expected_pulse_count(repetitions));

    pulses.push(high(WAKEUP_HIGH_US));
    pulses.push(low(WAKEUP_LOW_US));

    for j in 0..repetitions {
        let syncs = if j == 0 {
            FIRST_FRAME_HW_SYNCS
        } else {
            REPEAT_FRAME_HW_SYNCS
        };
        for _ in 0..syncs {
            pulses.push(high(HW_SYNC_US));
            pulses.push(low(HW_SYNC_US));
        }

        pulses.push(high(SW_SYNC_HIGH_US));
        pulses.push(low(HALF_SYMBOL_US));

        for i in 0..PAYLOAD_BITS {
            if frame.bit(i) {
                pulses.push(low(HALF_SYMBOL_US));
                pulses.push(high(HALF_SYMBOL_US));
            } else {
                pulses.push(high(HALF_SYMBOL_US));
                pulses.push(low(HALF_SYMBOL_US));
            }
        }

        pulses.push(low(INTER_FRAME_GAP_US));
    }

    Ok(Waveform { pin, pulses })
}
