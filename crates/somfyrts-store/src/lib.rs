//! Durable rolling code storage.
//!
//! One counter per remote identity, kept as human-readable text so an
//! operator can inspect or resynchronize it by hand. A missing or unreadable
//! record is never fatal: the remote simply starts again from code 1.

pub mod error;
pub mod file;
pub mod lock;
pub mod memory;
pub mod traits;

pub use error::{Result, StoreError};
pub use file::FileStore;
pub use lock::CodeLock;
pub use memory::MemoryStore;
pub use traits::{parse_code, RollingCodeStore};
