use std::fmt;

use somfyrts_frame::FrameError;
use somfyrts_remote::RemoteError;
use somfyrts_store::StoreError;
use somfyrts_transport::TransportError;

// Exit codes follow sysexits where one fits.
pub const SUCCESS: i32 = 0;
pub const TRANSMISSION_ERROR: i32 = 3;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const PERSISTENCE_ERROR: i32 = 74;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::ChecksumMismatch { .. }
        | FrameError::UnknownButton(_)
        | FrameError::InvalidHex(_) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        other => CliError::new(USAGE, format!("{context}: {other}")),
    }
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Timeout(_) => CliError::new(TIMEOUT, format!("{context}: {err}")),
        TransportError::LockPoisoned => CliError::new(INTERNAL, format!("{context}: {err}")),
        other => CliError::new(TRANSMISSION_ERROR, format!("{context}: {other}")),
    }
}

pub fn store_error(context: &str, err: StoreError) -> CliError {
    match err {
        StoreError::Corrupt { .. } => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        other => CliError::new(PERSISTENCE_ERROR, format!("{context}: {other}")),
    }
}

pub fn remote_error(context: &str, err: RemoteError) -> CliError {
    match err {
        RemoteError::Configuration(_)
        | RemoteError::CodeRegression { .. }
        | RemoteError::CodeExhausted(_) => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        RemoteError::Frame(err) => frame_error(context, err),
        RemoteError::Transmission(err) => transport_error(context, err),
        RemoteError::Persistence(err) => store_error(context, err),
    }
}
