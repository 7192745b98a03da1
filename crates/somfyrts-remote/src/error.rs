use somfyrts_frame::RollingCode;

/// Errors that can occur in remote operations.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The remote configuration is invalid. Raised at construction only.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Frame or waveform construction failed.
    #[error("frame error: {0}")]
    Frame(#[from] somfyrts_frame::FrameError),

    /// The transmitter reported a failure; the rolling code was not advanced.
    #[error("transmission failed: {0}")]
    Transmission(#[from] somfyrts_transport::TransportError),

    /// The rolling code could not be persisted where persistence is mandatory.
    #[error("persistence failed: {0}")]
    Persistence(#[from] somfyrts_store::StoreError),

    /// The counter reached its maximum; sending again would replay a code.
    #[error("rolling code {0} is exhausted; resync the remote")]
    CodeExhausted(RollingCode),

    /// A resync would move the rolling code backwards.
    #[error("refusing to move rolling code back from {current} to {requested}")]
    CodeRegression {
        current: RollingCode,
        requested: RollingCode,
    },
}

pub type Result<T> = std::result::Result<T, RemoteError>;
