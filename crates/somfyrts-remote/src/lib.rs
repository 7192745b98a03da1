//! Somfy RTS transmission controller.
//!
//! A [`Remote`] ties one remote identity to a rolling code store and a
//! transmitter. Each [`Remote::send`] encodes a frame, plays its waveform and,
//! once the emitter reports completion, advances and persists the code.

pub mod config;
pub mod error;
pub mod remote;

pub use config::{CommitPolicy, RemoteConfig};
pub use error::{RemoteError, Result};
pub use remote::{Remote, SendReport, SendState};
