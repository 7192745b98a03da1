use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use somfyrts_frame::{RemoteIdentity, RollingCode};

use crate::error::{Result, StoreError};
use crate::traits::RollingCodeStore;

/// Volatile store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    codes: Mutex<HashMap<RemoteIdentity, RollingCode>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail until switched off again.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn codes(&self) -> Result<std::sync::MutexGuard<'_, HashMap<RemoteIdentity, RollingCode>>> {
        self.codes
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }
}

impl RollingCodeStore for MemoryStore {
    fn read(&self, identity: RemoteIdentity) -> Result<Option<RollingCode>> {
        Ok(self.codes()?.get(&identity).copied())
    }

    fn write(&self, identity: RemoteIdentity, code: RollingCode) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".into()));
        }
        self.codes()?.insert(identity, code);
        Ok(())
    }
}
