use std::time::Duration;

use serde::{Deserialize, Serialize};
use somfyrts_frame::{RemoteIdentity, DEFAULT_PIN, DEFAULT_REPETITIONS};
use somfyrts_transport::DEFAULT_TRANSMIT_TIMEOUT;

use crate::error::{RemoteError, Result};

/// When the rolling code is written relative to the transmission.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommitPolicy {
    /// Advance and persist only after the transmitter reports completion.
    /// A crash mid-transmission can leave the stored code one behind what the
    /// receiver has seen.
    #[default]
    AfterTransmit,
    /// Persist the next code before any RF is emitted. A failed transmission
    /// then consumes its code, which the receiver's forward window absorbs.
    ReserveBeforeTransmit,
}

/// Configuration for one simulated remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// 24-bit remote address. Validated when the remote is built.
    pub id: u32,
    /// Frame repetitions per button press. Default: 4.
    pub repetitions: usize,
    /// GPIO driving the emitter. Default: 4.
    pub pin: u8,
    /// Upper bound on waiting for the emitter to go idle. Default: 5s.
    pub transmit_timeout: Duration,
    /// Default: [`CommitPolicy::AfterTransmit`].
    pub commit_policy: CommitPolicy,
}

impl RemoteConfig {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            repetitions: DEFAULT_REPETITIONS,
            pin: DEFAULT_PIN,
            transmit_timeout: DEFAULT_TRANSMIT_TIMEOUT,
            commit_policy: CommitPolicy::default(),
        }
    }

    pub fn with_repetitions(mut self, repetitions: usize) -> Self {
        self.repetitions = repetitions;
        self
    }

    pub fn with_pin(mut self, pin: u8) -> Self {
        self.pin = pin;
        self
    }

    pub fn with_transmit_timeout(mut self, timeout: Duration) -> Self {
        self.transmit_timeout = timeout;
        self
    }

    pub fn with_commit_policy(mut self, policy: CommitPolicy) -> Self {
        self.commit_policy = policy;
        self
    }

    /// Check every field and return the validated identity.
    pub fn validate(&self) -> Result<RemoteIdentity> {
        let identity =
            RemoteIdentity::new(self.id).map_err(|err| RemoteError::Configuration(err.to_string()))?;
        if self.repetitions == 0 {
            return Err(RemoteError::Configuration(
                "repetitions must be at least 1".into(),
            ));
        }
        if self.pin > 31 {
            return Err(RemoteError::Configuration(format!(
                "gpio {} out of range (max 31)",
                self.pin
            )));
        }
        if self.transmit_timeout.is_zero() {
            return Err(RemoteError::Configuration(
                "transmit timeout must be greater than zero".into(),
            ));
        }
        Ok(identity)
    }
}
