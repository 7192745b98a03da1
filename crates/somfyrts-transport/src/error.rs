use std::path::PathBuf;
use std::time::Duration;

/// Errors reported by a transmitter.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The emitter did not report idle within the allowed time.
    #[error("transmitter still busy after {0:?}")]
    Timeout(Duration),

    /// The driver rejected or aborted the waveform.
    #[error("driver error: {0}")]
    Driver(String),

    /// Failed to open the pulse sink.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error occurred while handing pulses to the driver.
    #[error("transmitter I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The waveform could not be serialized for the driver.
    #[error("failed to serialize waveform: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The handle was never issued or has already been released.
    #[error("unknown wave handle {0}")]
    UnknownHandle(u64),

    /// Another thread panicked while holding the output pin.
    #[error("output pin lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, TransportError>;
