//! Somfy RTS frame encoding and pulse waveform generation.
//!
//! This is the pure layer of somfyrts. Nothing here touches hardware or disk:
//! - [`encode_frame`] builds the 7-byte frame (key, button + checksum,
//!   rolling code, remote address) and applies the obfuscation chain
//! - [`generate_waveform`] turns a frame into the timed pulse list a
//!   433.42 MHz OOK emitter replays (wake-up, syncs, Manchester payload, gaps)
//! - [`decode_frame`] reverses the obfuscation for diagnostics

pub mod button;
pub mod codec;
pub mod error;
pub mod waveform;

pub use button::Button;
pub use codec::{
    checksum, decode_frame, encode_frame, DecodedFrame, Frame, RemoteIdentity, RollingCode,
    ENCRYPTION_KEY, FRAME_LEN,
};
pub use error::{FrameError, Result};
pub use waveform::{
    expected_pulse_count, generate_waveform, PulseInstruction, Waveform, DEFAULT_PIN,
    DEFAULT_REPETITIONS,
};
