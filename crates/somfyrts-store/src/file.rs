use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use somfyrts_frame::{RemoteIdentity, RollingCode};
use tracing::info;

use crate::error::{Result, StoreError};
use crate::lock::CodeLock;
use crate::traits::{parse_code, RollingCodeStore};

/// Stores each remote's code in `<dir>/<identity>.txt`.
///
/// The file holds the decimal code and a trailing newline. Writes go through
/// a temporary file and a rename, so a crash leaves either the old or the new
/// value on disk, never a truncated one.
///
/// The store itself does not serialize access. Anything that loads, sends
/// and saves a code from more than one process must hold
/// [`lock`](FileStore::lock) for the whole sequence.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Location of the record for `identity`.
    pub fn path_for(&self, identity: RemoteIdentity) -> PathBuf {
        self.dir.join(format!("{identity}.txt"))
    }

    /// Location of the lock file guarding `identity`.
    pub fn lock_path_for(&self, identity: RemoteIdentity) -> PathBuf {
        self.dir.join(format!("{identity}.lock"))
    }

    /// Take the exclusive lock for `identity`, waiting for other holders.
    pub fn lock(&self, identity: RemoteIdentity) -> Result<CodeLock> {
        let path = self.lock_path_for(identity);
        if let Some(lock) = CodeLock::acquire(path.clone(), false)? {
            return Ok(lock);
        }

        info!(%identity, path = %path.display(), "waiting for another sender");
        CodeLock::acquire(path, true)?
            .ok_or_else(|| StoreError::Unavailable(format!("lock for {identity} not granted")))
    }

    /// Take the lock for `identity` only if nobody holds it.
    pub fn try_lock(&self, identity: RemoteIdentity) -> Result<Option<CodeLock>> {
        CodeLock::acquire(self.lock_path_for(identity), false)
    }
}

impl RollingCodeStore for FileStore {
    fn read(&self, identity: RemoteIdentity) -> Result<Option<RollingCode>> {
        let path = self.path_for(identity);
        match fs::read_to_string(&path) {
            Ok(content) => parse_code(&content).map(Some),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read { path, source }),
        }
    }

    fn write(&self, identity: RemoteIdentity, code: RollingCode) -> Result<()> {
        let path = self.path_for(identity);
        let tmp = path.with_extension("txt.tmp");

        let result = (|| -> std::io::Result<()> {
            fs::create_dir_all(&self.dir)?;
            let mut file = File::create(&tmp)?;
            writeln!(file, "{code}")?;
            file.sync_all()?;
            fs::rename(&tmp, &path)?;
            sync_dir(&self.dir);
            Ok(())
        })();

        result.map_err(|source| {
            let _ = fs::remove_file(&tmp);
            StoreError::Write { path, source }
        })
    }
}

/// Make the rename durable. Best effort: not every platform lets a directory
/// be opened for syncing.
fn sync_dir(dir: &Path) {
    if cfg!(unix) {
        if let Ok(handle) = File::open(dir) {
            let _ = handle.sync_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "somfyrts-store-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
        dir
    }

    fn id(value: u32) -> RemoteIdentity {
        RemoteIdentity::new(value).unwrap()
    }

    #[test]
    fn missing_file_loads_initial_code() {
        let dir = unique_temp_dir("missing");
        let store = FileStore::new(&dir);

        assert!(store.read(id(0x123456)).unwrap().is_none());
        assert_eq!(store.load(id(0x123456)), RollingCode::INITIAL);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn save_then_load_round_trips_as_text() {
        let dir = unique_temp_dir("roundtrip");
        let store = FileStore::new(&dir);

        store.save(id(1193046), RollingCode::new(57)).unwrap();
        assert_eq!(store.load(id(1193046)), RollingCode::new(57));

        let path = dir.join("1193046.txt");
        assert_eq!(store.path_for(id(1193046)), path);
        assert_eq!(fs::read_to_string(&path).unwrap(), "57\n");
        assert!(!dir.join("1193046.txt.tmp").exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn overwrites_previous_value() {
        let dir = unique_temp_dir("overwrite");
        let store = FileStore::new(&dir);

        store.save(id(9), RollingCode::new(1000)).unwrap();
        store.save(id(9), RollingCode::new(1001)).unwrap();
        assert_eq!(store.load(id(9)), RollingCode::new(1001));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn corrupt_file_falls_back_to_initial() {
        let dir = unique_temp_dir("corrupt");
        let store = FileStore::new(&dir);
        fs::write(dir.join("77.txt"), "not a number").unwrap();

        assert!(matches!(
            store.read(id(77)),
            Err(StoreError::Corrupt { .. })
        ));
        assert_eq!(store.load(id(77)), RollingCode::INITIAL);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn hand_edited_value_with_whitespace_is_accepted() {
        let dir = unique_temp_dir("manual");
        let store = FileStore::new(&dir);
        fs::write(dir.join("12.txt"), "  250 \r\n").unwrap();

        assert_eq!(store.load(id(12)), RollingCode::new(250));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn identities_do_not_collide() {
        let dir = unique_temp_dir("multi");
        let store = FileStore::new(&dir);

        store.save(id(1), RollingCode::new(10)).unwrap();
        store.save(id(2), RollingCode::new(20)).unwrap();
        assert_eq!(store.load(id(1)), RollingCode::new(10));
        assert_eq!(store.load(id(2)), RollingCode::new(20));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn creates_missing_directory_on_write() {
        let dir = unique_temp_dir("nested");
        let store = FileStore::new(dir.join("state").join("remotes"));

        store.save(id(3), RollingCode::new(4)).unwrap();
        assert_eq!(store.load(id(3)), RollingCode::new(4));

        let _ = fs::remove_dir_all(&dir);
    }

    #[cfg(unix)]
    #[test]
    fn lock_is_exclusive_until_dropped() {
        let dir = unique_temp_dir("lock");
        let store = FileStore::new(&dir);

        let held = store.lock(id(0x123456)).unwrap();
        assert_eq!(held.path(), dir.join("1193046.lock"));
        assert!(store.try_lock(id(0x123456)).unwrap().is_none());
        assert!(store.try_lock(id(0x654321)).unwrap().is_some());

        drop(held);
        assert!(store.try_lock(id(0x123456)).unwrap().is_some());

        let _ = fs::remove_dir_all(&dir);
    }

    #[cfg(unix)]
    #[test]
    fn lock_waits_for_the_holder() {
        use std::sync::mpsc;
        use std::time::Duration;

        let dir = unique_temp_dir("lock-wait");
        let store = FileStore::new(&dir);
        let held = store.lock(id(8)).unwrap();

        let (tx, rx) = mpsc::channel();
        let waiter_store = store.clone();
        let waiter = std::thread::spawn(move || {
            let lock = waiter_store.lock(id(8)).unwrap();
            tx.send(()).unwrap();
            drop(lock);
        });

        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
        drop(held);
        rx.recv_timeout(Duration::from_secs(5))
            .expect("waiter should get the lock once it is released");
        waiter.join().unwrap();

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn lock_creates_missing_directory() {
        let dir = unique_temp_dir("lock-nested");
        let store = FileStore::new(dir.join("state"));

        let lock = store.lock(id(3)).unwrap();
        assert!(lock.path().exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn write_failure_is_reported() {
        let dir = unique_temp_dir("blocked");
        let blocker = dir.join("not-a-dir");
        fs::write(&blocker, "file").unwrap();
        let store = FileStore::new(&blocker);

        let err = store.save(id(5), RollingCode::new(6)).unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }));

        let _ = fs::remove_dir_all(&dir);
    }
}
