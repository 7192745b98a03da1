use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use serde::Serialize;
use somfyrts_frame::{PulseInstruction, Waveform};
use tracing::{debug, warn};

use crate::error::{Result, TransportError};
use crate::traits::{Transmitter, WaveHandle};

/// One line of the pulse file.
#[derive(Serialize)]
struct PulseRecord<'a> {
    handle: u64,
    pin: u8,
    pulses: &'a [PulseInstruction],
}

/// Hands waveforms to an external pulse driver as JSON lines.
///
/// Each submit appends one line:
/// ```text
/// {"handle":1,"pin":4,"pulses":[{"gpio_on":16,"gpio_off":0,"us_delay":9415},...]}
/// ```
/// The sink is usually a FIFO read by a driver daemon. A waveform counts as
/// done once its line has been flushed.
///
/// A record is far larger than `PIPE_BUF`, so a sink opened with
/// [`create`](PulseFileTransmitter::create) is locked while each line is
/// written and lines from concurrent processes never interleave.
pub struct PulseFileTransmitter<W> {
    inner: W,
    buf: Vec<u8>,
    next_handle: u64,
    in_flight: Option<WaveHandle>,
    sink_lock: Option<File>,
}

impl PulseFileTransmitter<File> {
    /// Open `path` for appending, creating it if needed.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| TransportError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        let sink_lock = file.try_clone()?;
        Ok(Self {
            sink_lock: Some(sink_lock),
            ..Self::new(file)
        })
    }
}

impl<W: Write> PulseFileTransmitter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            buf: Vec::new(),
            next_handle: 0,
            in_flight: None,
            sink_lock: None,
        }
    }

    /// Borrow the underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Consume the transmitter and return the sink.
    pub fn into_inner(self) -> W {
        self.inner
    }

    fn write_line(&mut self) -> Result<()> {
        let _guard = match &self.sink_lock {
            Some(file) => SinkGuard::acquire(file)?,
            None => None,
        };

        let mut offset = 0usize;
        let mut outcome = Ok(());
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => {
                    outcome = Err(TransportError::Driver("pulse sink closed".into()));
                    break;
                }
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    outcome = Err(TransportError::Io(err));
                    break;
                }
            }
        }

        if outcome.is_ok() {
            outcome = loop {
                match self.inner.flush() {
                    Ok(()) => break Ok(()),
                    Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                    Err(err) => break Err(TransportError::Io(err)),
                }
            };
        }

        if outcome.is_err() && offset > 0 && offset < self.buf.len() {
            // End the torn record so the driver's next line parses.
            let _ = self.inner.write_all(b"\n");
            let _ = self.inner.flush();
            warn!(
                written = offset,
                total = self.buf.len(),
                "pulse record truncated"
            );
        }
        outcome
    }
}

/// Holds an exclusive `flock` on the sink for the duration of one write.
struct SinkGuard<'a> {
    #[cfg_attr(not(unix), allow(dead_code))]
    file: &'a File,
}

impl<'a> SinkGuard<'a> {
    #[cfg(unix)]
    fn acquire(file: &'a File) -> Result<Option<Self>> {
        use std::os::fd::AsRawFd;

        loop {
            // SAFETY: the descriptor belongs to `file`, which outlives the call.
            let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX) };
            if rc == 0 {
                return Ok(Some(Self { file }));
            }
            let err = std::io::Error::last_os_error();
            match err.raw_os_error() {
                Some(libc::EINTR) => continue,
                // Some character devices cannot be locked; write unguarded.
                Some(libc::EINVAL) | Some(libc::EOPNOTSUPP) => {
                    debug!(error = %err, "pulse sink does not support locking");
                    return Ok(None);
                }
                _ => return Err(TransportError::Io(err)),
            }
        }
    }

    #[cfg(not(unix))]
    fn acquire(_file: &'a File) -> Result<Option<Self>> {
        Ok(None)
    }
}

#[cfg(unix)]
impl Drop for SinkGuard<'_> {
    fn drop(&mut self) {
        use std::os::fd::AsRawFd;

        // SAFETY: as in `acquire`; unlocking a held lock cannot fail usefully.
        unsafe {
            libc::flock(self.file.as_raw_fd(), libc::LOCK_UN);
        }
    }
}

impl<W: Write> Transmitter for PulseFileTransmitter<W> {
    fn submit(&mut self, waveform: &Waveform) -> Result<WaveHandle> {
        if self.in_flight.is_some() {
            return Err(TransportError::Driver("waveform already in flight".into()));
        }

        self.next_handle += 1;
        let handle = WaveHandle::new(self.next_handle);
        let record = PulseRecord {
            handle: handle.id(),
            pin: waveform.pin(),
            pulses: waveform.pulses(),
        };

        self.buf.clear();
        serde_json::to_writer(&mut self.buf, &record)?;
        self.buf.push(b'\n');
        self.write_line()?;

        debug!(%handle, bytes = self.buf.len(), "pulse record written");
        self.in_flight = Some(handle);
        Ok(handle)
    }

    fn is_busy(&mut self, handle: WaveHandle) -> Result<bool> {
        match self.in_flight {
            Some(active) if active == handle => Ok(false),
            _ => Err(TransportError::UnknownHandle(handle.id())),
        }
    }

    fn release(&mut self, handle: WaveHandle) -> Result<()> {
        match self.in_flight {
            Some(active) if active == handle => {
                self.in_flight = None;
                Ok(())
            }
            _ => Err(TransportError::UnknownHandle(handle.id())),
        }
    }
}
