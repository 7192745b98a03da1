use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};

/// Exclusive advisory lock on one remote's rolling code.
///
/// Processes sharing a state directory take it before loading the code and
/// keep it until the next code is saved, so two senders for one remote can
/// never transmit the same code. Dropping the lock releases it, and so does
/// the process exiting.
///
/// The lock file is left in place after release.
#[derive(Debug)]
pub struct CodeLock {
    path: PathBuf,
    _file: File,
}

impl CodeLock {
    /// Take the lock at `path`, waiting for the current holder if `wait`.
    ///
    /// Returns `Ok(None)` only when `wait` is false and someone else holds it.
    pub(crate) fn acquire(path: PathBuf, wait: bool) -> Result<Option<Self>> {
        let opened = (|| -> io::Result<File> {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            OpenOptions::new()
                .create(true)
                .truncate(false)
                .read(true)
                .write(true)
                .open(&path)
        })();
        let file = match opened {
            Ok(file) => file,
            Err(source) => return Err(StoreError::Lock { path, source }),
        };

        match lock_exclusive(&file, wait) {
            Ok(true) => Ok(Some(Self { path, _file: file })),
            Ok(false) => Ok(None),
            Err(source) => Err(StoreError::Lock { path, source }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(unix)]
fn lock_exclusive(file: &File, wait: bool) -> io::Result<bool> {
    use std::os::fd::AsRawFd;

    let op = if wait {
        libc::LOCK_EX
    } else {
        libc::LOCK_EX | libc::LOCK_NB
    };
    loop {
        // SAFETY: the descriptor belongs to `file`, which outlives the call.
        let rc = unsafe { libc::flock(file.as_raw_fd(), op) };
        if rc == 0 {
            return Ok(true);
        }
        let err = io::Error::last_os_error();
        match err.kind() {
            ErrorKind::Interrupted => continue,
            ErrorKind::WouldBlock => return Ok(false),
            _ => return Err(err),
        }
    }
}

// TODO: LockFileEx on Windows; until then senders there are not serialized.
#[cfg(not(unix))]
fn lock_exclusive(_file: &File, _wait: bool) -> io::Result<bool> {
    Ok(true)
}
