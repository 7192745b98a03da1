use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use crate::button::Button;
use crate::error::{FrameError, Result};

/// Number of bytes in an RTS frame.
pub const FRAME_LEN: usize = 7;

/// Value of frame byte 0. Receivers do not care much about it.
pub const ENCRYPTION_KEY: u8 = 0xA7;

/// Largest 24-bit remote address.
const MAX_IDENTITY: u32 = 0x00FF_FFFF;

/// A 24-bit remote address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct RemoteIdentity(u32);

impl RemoteIdentity {
    /// Create an identity, rejecting values that do not fit in 3 bytes.
    pub fn new(id: u32) -> Result<Self> {
        if id > MAX_IDENTITY {
            return Err(FrameError::IdentityOutOfRange(id.into()));
        }
        Ok(Self(id))
    }

    /// The raw address.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for RemoteIdentity {
    type Error = FrameError;

    fn try_from(id: u32) -> Result<Self> {
        Self::new(id)
    }
}

impl From<RemoteIdentity> for u32 {
    fn from(id: RemoteIdentity) -> Self {
        id.0
    }
}

impl fmt::Display for RemoteIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::LowerHex for RemoteIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// Accepts decimal (`1193046`) or `0x`-prefixed hex (`0x123456`).
impl FromStr for RemoteIdentity {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => s.parse::<u64>(),
        }
        .map_err(|_| FrameError::InvalidIdentity(s.to_string()))?;

        let id = u32::try_from(parsed).map_err(|_| FrameError::IdentityOutOfRange(parsed))?;
        Self::new(id)
    }
}

/// The per-remote rolling code.
///
/// Only the low 16 bits go over the air; the counter itself keeps counting.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RollingCode(u32);

impl RollingCode {
    /// First code of a remote with no stored state. Zero is never sent.
    pub const INITIAL: RollingCode = RollingCode(1);

    pub const fn new(code: u32) -> Self {
        Self(code)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// The 16-bit value carried in frame bytes 2 and 3.
    pub fn wire(self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }

    /// The code that follows this one, or `None` once the counter is spent.
    ///
    /// The counter never wraps: wrapping would move it backwards and replay
    /// codes the receivers have already seen.
    pub fn successor(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl From<u32> for RollingCode {
    fn from(code: u32) -> Self {
        Self(code)
    }
}

impl fmt::Display for RollingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// An obfuscated 7-byte frame, ready for waveform generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame([u8; FRAME_LEN]);

impl Frame {
    /// Wrap bytes that are already obfuscated (e.g. captured off the air).
    pub fn from_bytes(bytes: [u8; FRAME_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }

    /// Bit `index` (0..56) in transmission order: MSB of byte 0 first.
    pub fn bit(&self, index: usize) -> bool {
        (self.0[index / 8] >> (7 - (index % 8))) & 1 == 1
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl Serialize for Frame {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parses 14 hex digits; whitespace, `:` and a leading `0x` are ignored.
impl FromStr for Frame {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let trimmed = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let digits: Vec<char> = trimmed
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ':')
            .collect();
        if digits.len() != FRAME_LEN * 2 {
            return Err(FrameError::InvalidHex(format!(
                "expected {} hex digits, got {}",
                FRAME_LEN * 2,
                digits.len()
            )));
        }

        let mut bytes = [0u8; FRAME_LEN];
        for (slot, pair) in bytes.iter_mut().zip(digits.chunks(2)) {
            let hi = pair[0].to_digit(16);
            let lo = pair[1].to_digit(16);
            match (hi, lo) {
                (Some(hi), Some(lo)) => *slot = (hi << 4 | lo) as u8,
                _ => {
                    return Err(FrameError::InvalidHex(format!(
                        "non-hex digit in {}{}",
                        pair[0], pair[1]
                    )))
                }
            }
        }
        Ok(Self(bytes))
    }
}

/// Fold used by RTS receivers: `acc ^= b ^ (b >> 4)` over all bytes, low nibble.
///
/// Over a frame whose checksum nibble is already filled in the result is 0.
pub fn checksum(bytes: &[u8; FRAME_LEN]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc ^ b ^ (b >> 4)) & 0x0F
}

/// Build the obfuscated frame for one button press.
///
/// Layout before obfuscation:
/// ```text
/// ┌──────┬─────────────┬──────────┬──────────┬───────┬────────┬─────────┐
/// │ 0xA7 │ btn<<4 | ck │ code hi  │ code lo  │ id lo │ id mid │ id hi   │
/// └──────┴─────────────┴──────────┴──────────┴───────┴────────┴─────────┘
/// ```
/// The checksum goes in first; then every byte from index 1 is XORed with the
/// already obfuscated byte before it.
pub fn encode_frame(identity: RemoteIdentity, code: RollingCode, button: Button) -> Frame {
    let id = identity.get();
    let code = code.wire();

    let mut bytes = [
        ENCRYPTION_KEY,
        button.code() << 4,
        (code >> 8) as u8,
        code as u8,
        id as u8,
        (id >> 8) as u8,
        (id >> 16) as u8,
    ];

    bytes[1] |= checksum(&bytes);

    for i in 1..FRAME_LEN {
        bytes[i] ^= bytes[i - 1];
    }

    Frame(bytes)
}

/// Fields recovered from an obfuscated frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DecodedFrame {
    pub key: u8,
    pub button: Button,
    pub rolling_code: u16,
    pub identity: RemoteIdentity,
}

/// Undo the obfuscation chain and validate the checksum.
pub fn decode_frame(frame: &Frame) -> Result<DecodedFrame> {
    let obfuscated = frame.as_bytes();
    let mut plain = *obfuscated;
    for i in 1..FRAME_LEN {
        plain[i] = obfuscated[i] ^ obfuscated[i - 1];
    }

    let found = plain[1] & 0x0F;
    let mut zeroed = plain;
    zeroed[1] &= 0xF0;
    let expected = checksum(&zeroed);
    if expected != found {
        return Err(FrameError::ChecksumMismatch { expected, found });
    }

    let button_code = plain[1] >> 4;
    let button = Button::from_code(button_code).ok_or(FrameError::UnknownButton(button_code))?;
    let rolling_code = u16::from_be_bytes([plain[2], plain[3]]);
    let identity = RemoteIdentity(u32::from_le_bytes([plain[4], plain[5], plain[6], 0]));

    Ok(DecodedFrame {
        key: plain[0],
        button,
        rolling_code,
        identity,
    })
}
