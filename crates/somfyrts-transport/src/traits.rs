use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use somfyrts_frame::Waveform;

use crate::error::{Result, TransportError};

/// How long [`Transmitter::transmit`] waits for idle before giving up.
///
/// A four-repetition waveform plays in well under a second; this is only a
/// guard against a driver that never reports completion.
pub const DEFAULT_TRANSMIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Sleep between busy checks in the default [`Transmitter::wait_idle`].
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Identifies a submitted waveform until it is released.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WaveHandle(u64);

impl WaveHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WaveHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wave-{}", self.0)
    }
}

/// The boundary to whatever physically emits the pulses.
///
/// Implementors execute the pulse list at hardware-accurate timing. Only one
/// waveform may be in flight per output pin; callers serialize through
/// `&mut self` or a [`SharedTransmitter`](crate::SharedTransmitter).
pub trait Transmitter {
    /// Queue a waveform and start playing it.
    fn submit(&mut self, waveform: &Waveform) -> Result<WaveHandle>;

    /// Whether the waveform behind `handle` is still playing.
    fn is_busy(&mut self, handle: WaveHandle) -> Result<bool>;

    /// Free driver resources held for `handle`.
    fn release(&mut self, handle: WaveHandle) -> Result<()>;

    /// Interval used by the default [`wait_idle`](Transmitter::wait_idle).
    fn poll_interval(&self) -> Duration {
        DEFAULT_POLL_INTERVAL
    }

    /// Block until `handle` is idle or `timeout` elapses.
    ///
    /// The default sleeps between checks. Drivers with a completion
    /// notification should override this.
    fn wait_idle(&mut self, handle: WaveHandle, timeout: Duration) -> Result<()> {
        let start = Instant::now();
        loop {
            if !self.is_busy(handle)? {
                return Ok(());
            }
            let elapsed = start.elapsed();
            if elapsed >= timeout {
                return Err(TransportError::Timeout(timeout));
            }
            thread::sleep(self.poll_interval().min(timeout - elapsed));
        }
    }

    /// Submit, wait for completion and release, in one call.
    ///
    /// The handle is released even when waiting fails.
    fn transmit(&mut self, waveform: &Waveform, timeout: Duration) -> Result<()> {
        let handle = self.submit(waveform)?;
        let waited = self.wait_idle(handle, timeout);
        let released = self.release(handle);
        waited?;
        released
    }
}
