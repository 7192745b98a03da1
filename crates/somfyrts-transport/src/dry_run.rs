use std::time::{Duration, Instant};

use somfyrts_frame::Waveform;
use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::{Transmitter, WaveHandle};

/// In-memory transmitter that records every waveform instead of emitting it.
///
/// With `realtime` enabled it stays busy for the waveform's playing time, so
/// callers block exactly as long as they would on real hardware.
#[derive(Debug, Default)]
pub struct DryRunTransmitter {
    sent: Vec<Waveform>,
    active: Option<Active>,
    next_handle: u64,
    realtime: bool,
    stuck: bool,
    fail_next: Option<String>,
}

#[derive(Debug)]
struct Active {
    handle: WaveHandle,
    busy_until: Instant,
}

impl DryRunTransmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stay busy for the waveform's real duration.
    pub fn with_realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    /// Never report idle (simulates a hung driver).
    pub fn set_stuck(&mut self, stuck: bool) {
        self.stuck = stuck;
    }

    /// Reject the next submit with a driver error.
    pub fn fail_next(&mut self, message: impl Into<String>) {
        self.fail_next = Some(message.into());
    }

    /// Waveforms accepted so far, oldest first.
    pub fn sent(&self) -> &[Waveform] {
        &self.sent
    }

    pub fn take_sent(&mut self) -> Vec<Waveform> {
        std::mem::take(&mut self.sent)
    }
}

impl Transmitter for DryRunTransmitter {
    fn submit(&mut self, waveform: &Waveform) -> Result<WaveHandle> {
        if let Some(message) = self.fail_next.take() {
            return Err(TransportError::Driver(message));
        }
        if self.active.is_some() {
            return Err(TransportError::Driver("waveform already in flight".into()));
        }

        self.next_handle += 1;
        let handle = WaveHandle::new(self.next_handle);
        let play_time = if self.realtime {
            waveform.total_duration()
        } else {
            Duration::ZERO
        };

        info!(
            %handle,
            pin = waveform.pin(),
            pulses = waveform.len(),
            duration_us = waveform.total_duration().as_micros() as u64,
            "dry-run transmit"
        );

        self.sent.push(waveform.clone());
        self.active = Some(Active {
            handle,
            busy_until: Instant::now() + play_time,
        });
        Ok(handle)
    }

    fn is_busy(&mut self, handle: WaveHandle) -> Result<bool> {
        match &self.active {
            Some(active) if active.handle == handle => {
                Ok(self.stuck || Instant::now() < active.busy_until)
            }
            _ => Err(TransportError::UnknownHandle(handle.id())),
        }
    }

    fn release(&mut self, handle: WaveHandle) -> Result<()> {
        match &self.active {
            Some(active) if active.handle == handle => {
                debug!(%handle, "released");
                self.active = None;
                Ok(())
            }
            _ => Err(TransportError::UnknownHandle(handle.id())),
        }
    }
}

#[cfg(test)]
mod tests {
    use somfyrts_frame::{encode_frame, generate_waveform, Button, RemoteIdentity, RollingCode};

    use super::*;

    fn waveform(repetitions: usize) -> Waveform {
        let frame = encode_frame(
            RemoteIdentity::new(0x42).unwrap(),
            RollingCode::new(9),
            Button::Down,
        );
        generate_waveform(&frame, repetitions, 4).unwrap()
    }

    #[test]
    fn records_transmitted_waveforms() {
        let mut tx = DryRunTransmitter::new();
        tx.transmit(&waveform(1), Duration::from_secs(1)).unwrap();
        tx.transmit(&waveform(2), Duration::from_secs(1)).unwrap();

        assert_eq!(tx.sent().len(), 2);
        assert_eq!(tx.sent()[1], waveform(2));
        assert_eq!(tx.take_sent().len(), 2);
        assert!(tx.sent().is_empty());
    }

    #[test]
    fn fail_next_rejects_one_submit() {
        let mut tx = DryRunTransmitter::new();
        tx.fail_next("carrier lost");

        let err = tx.transmit(&waveform(1), Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, TransportError::Driver(ref m) if m == "carrier lost"));
        assert!(tx.sent().is_empty());

        tx.transmit(&waveform(1), Duration::from_secs(1)).unwrap();
        assert_eq!(tx.sent().len(), 1);
    }

    #[test]
    fn stuck_driver_times_out() {
        let mut tx = DryRunTransmitter::new();
        tx.set_stuck(true);
        let err = tx
            .transmit(&waveform(1), Duration::from_millis(15))
            .unwrap_err();
        assert!(matches!(err, TransportError::Timeout(_)));

        tx.set_stuck(false);
        tx.transmit(&waveform(1), Duration::from_secs(1))
            .expect("handle released after timeout");
    }

    #[test]
    fn realtime_blocks_for_waveform_duration() {
        let mut tx = DryRunTransmitter::new().with_realtime(true);
        let wf = waveform(1);
        let start = Instant::now();
        tx.transmit(&wf, Duration::from_secs(2)).unwrap();
        assert!(start.elapsed() >= wf.total_duration());
    }

    #[test]
    fn unknown_handle_is_rejected() {
        let mut tx = DryRunTransmitter::new();
        assert!(matches!(
            tx.is_busy(WaveHandle::new(99)),
            Err(TransportError::UnknownHandle(99))
        ));
        assert!(matches!(
            tx.release(WaveHandle::new(99)),
            Err(TransportError::UnknownHandle(99))
        ));
    }
}
