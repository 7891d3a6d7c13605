//! Durable key-value storage the history and camera inventory persist into.
//!
//! Values are small strings (JSON blobs or plain identifiers). Every backend
//! is synchronous; callers decide whether a failure is fatal.

mod json_file;
mod memory;
mod migrations;
mod sqlite;

pub use self::json_file::JsonFileStore;
pub use self::memory::MemoryStore;
pub use self::sqlite::SqliteStore;

use anyhow::Result;

/// Key holding the JSON history array.
pub const HISTORY_KEY: &str = "qr-scanner-history";
/// Key holding the last-used camera device id.
pub const LAST_CAMERA_KEY: &str = "qr-scanner-last-camera";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}
