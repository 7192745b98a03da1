//! Pulse transmitter abstraction.
//!
//! The radio driver lives outside this workspace. Everything above this layer
//! talks to it through the [`Transmitter`] trait: submit a pulse train, wait
//! until the emitter is idle, release the handle.
//!
//! Provided implementations:
//! - [`DryRunTransmitter`] records waveforms in memory (tests, dry runs)
//! - [`PulseFileTransmitter`] hands waveforms to an external driver as JSON lines
//! - [`SharedTransmitter`] serializes several remotes onto one output pin

pub mod dry_run;
pub mod error;
pub mod pulse_file;
pub mod shared;
pub mod traits;

pub use dry_run::DryRunTransmitter;
pub use error::{Result, TransportError};
pub use pulse_file::PulseFileTransmitter;
pub use shared::SharedTransmitter;
pub use traits::{Transmitter, WaveHandle, DEFAULT_POLL_INTERVAL, DEFAULT_TRANSMIT_TIMEOUT};
