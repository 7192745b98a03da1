//! Somfy RTS remote control simulation.
//!
//! somfyrts produces the exact frames and pulse timings a genuine Somfy RTS
//! remote transmits at 433.42 MHz, and keeps the per-remote rolling code in
//! step with the motor receivers across restarts.
//!
//! # Crate Structure
//!
//! - [`frame`]: Frame encoding, checksum, obfuscation and waveform generation
//! - [`transport`]: Transmitter boundary (dry-run, pulse file, shared pin)
//! - [`store`]: Durable rolling code storage
//! - [`remote`]: Transmission controller tying the above together

/// Re-export frame types.
pub mod frame {
    pub use somfyrts_frame::*;
}

/// Re-export transport types.
pub mod transport {
    pub use somfyrts_transport::*;
}

/// Re-export store types.
pub mod store {
    pub use somfyrts_store::*;
}

/// Re-export remote types.
pub mod remote {
    pub use somfyrts_remote::*;
}
