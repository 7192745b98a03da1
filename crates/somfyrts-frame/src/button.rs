//! Remote buttons and their 4-bit command codes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FrameError;

/// A button on the simulated remote.
///
/// The discriminant is the command nibble placed in the high half of frame
/// byte 1.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    /// Stop, or move to the favourite position when idle.
    My = 0x1,
    Up = 0x2,
    Down = 0x4,
    /// Programming / pairing.
    Prog = 0x8,
}

impl Button {
    /// All buttons in the order a physical remote lists them.
    pub const ALL: [Button; 4] = [Button::Up, Button::My, Button::Down, Button::Prog];

    /// The 4-bit command code.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Map a command nibble back to a button.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x1 => Some(Button::My),
            0x2 => Some(Button::Up),
            0x4 => Some(Button::Down),
            0x8 => Some(Button::Prog),
            _ => None,
        }
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Button::My => "My",
            Button::Up => "Up",
            Button::Down => "Down",
            Button::Prog => "Prog",
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Button {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "my" | "stop" => Ok(Button::My),
            "up" => Ok(Button::Up),
            "down" => Ok(Button::Down),
            "prog" => Ok(Button::Prog),
            _ => Err(FrameError::UnknownButtonName(s.to_string())),
        }
    }
}
