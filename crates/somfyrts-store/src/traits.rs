use somfyrts_frame::{RemoteIdentity, RollingCode};
use tracing::{debug, warn};

use crate::error::{Result, StoreError};

/// Persistent rolling code counter, keyed by remote identity.
///
/// Implementations only need `read` and `write`; `load` and `save` carry the
/// fallback and logging rules every backend shares.
pub trait RollingCodeStore {
    /// The stored code, or `None` if nothing has been stored yet.
    fn read(&self, identity: RemoteIdentity) -> Result<Option<RollingCode>>;

    /// Overwrite the stored code.
    fn write(&self, identity: RemoteIdentity, code: RollingCode) -> Result<()>;

    /// Current code for `identity`, falling back to [`RollingCode::INITIAL`]
    /// when the record is missing, unreadable or corrupt.
    fn load(&self, identity: RemoteIdentity) -> RollingCode {
        match self.read(identity) {
            Ok(Some(code)) => {
                debug!(%identity, %code, "loaded rolling code");
                code
            }
            Ok(None) => {
                debug!(%identity, "no stored rolling code, starting at 1");
                RollingCode::INITIAL
            }
            Err(err) => {
                warn!(%identity, error = %err, "cannot read rolling code, starting at 1");
                RollingCode::INITIAL
            }
        }
    }

    /// Persist `code` for `identity`.
    fn save(&self, identity: RemoteIdentity, code: RollingCode) -> Result<()> {
        self.write(identity, code)?;
        debug!(%identity, %code, "saved rolling code");
        Ok(())
    }
}

impl<S: RollingCodeStore + ?Sized> RollingCodeStore for &S {
    fn read(&self, identity: RemoteIdentity) -> Result<Option<RollingCode>> {
        (**self).read(identity)
    }

    fn write(&self, identity: RemoteIdentity, code: RollingCode) -> Result<()> {
        (**self).write(identity, code)
    }
}

impl<S: RollingCodeStore + ?Sized> RollingCodeStore for std::sync::Arc<S> {
    fn read(&self, identity: RemoteIdentity) -> Result<Option<RollingCode>> {
        (**self).read(identity)
    }

    fn write(&self, identity: RemoteIdentity, code: RollingCode) -> Result<()> {
        (**self).write(identity, code)
    }
}

/// Parse a stored record: a decimal non-negative integer, surrounding
/// whitespace ignored.
pub fn parse_code(content: &str) -> Result<RollingCode> {
    let trimmed = content.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(StoreError::Corrupt {
            content: content.to_string(),
        });
    }
    trimmed
        .parse::<u32>()
        .map(RollingCode::new)
        .map_err(|_| StoreError::Corrupt {
            content: content.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenStore;

    impl RollingCodeStore for BrokenStore {
        fn read(&self, _identity: RemoteIdentity) -> Result<Option<RollingCode>> {
            Err(StoreError::Unavailable("disk on fire".into()))
        }

        fn write(&self, _identity: RemoteIdentity, _code: RollingCode) -> Result<()> {
            Err(StoreError::Unavailable("disk on fire".into()))
        }
    }

    #[test]
    fn parse_accepts_plain_integers() {
        assert_eq!(parse_code("42").unwrap(), RollingCode::new(42));
        assert_eq!(parse_code(" 7\n").unwrap(), RollingCode::new(7));
        assert_eq!(parse_code("0").unwrap(), RollingCode::new(0));
    }

    #[test]
    fn parse_rejects_garbage() {
        for bad in ["", "  ", "-3", "abc", "12abc", "1.5", "99999999999"] {
            assert!(
                matches!(parse_code(bad), Err(StoreError::Corrupt { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn load_falls_back_to_initial_on_error() {
        let id = RemoteIdentity::new(5).unwrap();
        assert_eq!(BrokenStore.load(id), RollingCode::INITIAL);
        assert!(BrokenStore.save(id, RollingCode::new(3)).is_err());
    }
}
