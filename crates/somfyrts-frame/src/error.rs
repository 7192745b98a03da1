/// Errors that can occur while building or decoding frames and waveforms.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The remote address does not fit in 24 bits.
    #[error("remote identity {0:#x} out of range (max 0xFFFFFF)")]
    IdentityOutOfRange(u64),

    /// A waveform needs at least one frame repetition.
    #[error("repetitions must be at least 1")]
    InvalidRepetitions,

    /// The GPIO number cannot be expressed in a 32-bit pin mask.
    #[error("gpio {0} out of range (max 31)")]
    InvalidPin(u8),

    /// The checksum nibble does not match the frame contents.
    #[error("checksum mismatch (expected {expected:#x}, found {found:#x})")]
    ChecksumMismatch { expected: u8, found: u8 },

    /// The button nibble is not one of My, Up, Down, Prog.
    #[error("unknown button code {0:#x}")]
    UnknownButton(u8),

    /// A button name could not be parsed.
    #[error("unknown button name {0:?} (expected my, up, down or prog)")]
    UnknownButtonName(String),

    /// A frame hex string is malformed.
    #[error("invalid frame hex: {0}")]
    InvalidHex(String),

    /// A remote identity string could not be parsed.
    #[error("invalid remote identity {0:?}")]
    InvalidIdentity(String),
}

pub type Result<T> = std::result::Result<T, FrameError>;
