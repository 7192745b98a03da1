use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use somfyrts_frame::Waveform;

use crate::error::{Result, TransportError};
use crate::traits::{Transmitter, WaveHandle};

/// A transmitter shared by several remotes wired to the same output pin.
///
/// [`transmit`](Transmitter::transmit) holds the lock from submit to release,
/// so waveforms from different remotes are played back to back and never
/// interleaved.
pub struct SharedTransmitter<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> SharedTransmitter<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    /// Lock the underlying transmitter.
    pub fn lock(&self) -> Result<MutexGuard<'_, T>> {
        self.inner.lock().map_err(|_| TransportError::LockPoisoned)
    }
}

impl<T> Clone for SharedTransmitter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transmitter> Transmitter for SharedTransmitter<T> {
    fn submit(&mut self, waveform: &Waveform) -> Result<WaveHandle> {
        self.lock()?.submit(waveform)
    }

    fn is_busy(&mut self, handle: WaveHandle) -> Result<bool> {
        self.lock()?.is_busy(handle)
    }

    fn release(&mut self, handle: WaveHandle) -> Result<()> {
        self.lock()?.release(handle)
    }

    fn wait_idle(&mut self, handle: WaveHandle, timeout: Duration) -> Result<()> {
        self.lock()?.wait_idle(handle, timeout)
    }

    fn transmit(&mut self, waveform: &Waveform, timeout: Duration) -> Result<()> {
        self.lock()?.transmit(waveform, timeout)
    }
}
