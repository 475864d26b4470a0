//! # Timestamp Stores
//!
//! The faucet remembers, per recipient, the expiration time of the last
//! transfer it sent. That is the whole schema:
//!
//! | Tree          | Key                      | Value           |
//! |---------------|--------------------------|-----------------|
//! | `drip_times`  | branded address (UTF-8)  | unix secs (8B BE) |
//!
//! A missing key reads as 0, meaning "never served".
//!
//! Two implementations: [`SledTimestampStore`] on disk for the real
//! service, and [`MemoryTimestampStore`] for tests and dry runs.

use dashmap::DashMap;
use sled::{Db, Tree};
use std::path::Path;

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("corrupt value for key {key}: expected 8 bytes, got {len}")]
    Corrupt { key: String, len: usize },
}

pub type StoreResult<T> = Result<T, StoreError>;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// An address-keyed store of unix timestamps.
///
/// Implementations must be safe to share between request handlers.
pub trait TimestampStore: Send + Sync {
    /// The stored value for `key`, or 0 if there is none.
    fn get(&self, key: &str) -> StoreResult<u64>;

    /// Stores `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: u64) -> StoreResult<()>;
}

// ---------------------------------------------------------------------------
// sled
// ---------------------------------------------------------------------------

const TREE_NAME: &str = "drip_times";

/// Persistent store on sled.
///
/// sled handles concurrent access internally, so the store can be shared
/// via `Arc` without extra locking.
#[derive(Debug, Clone)]
pub struct SledTimestampStore {
    db: Db,
    times: Tree,
}

impl SledTimestampStore {
    /// Open or create a store at the given filesystem path.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// A store that lives in a temporary location and is removed on drop.
    pub fn open_temporary() -> StoreResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> StoreResult<Self> {
        let times = db.open_tree(TREE_NAME)?;
        Ok(Self { db, times })
    }

    /// Number of recorded keys.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Flushes pending writes to disk.
    pub fn flush(&self) -> StoreResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

impl TimestampStore for SledTimestampStore {
    fn get(&self, key: &str) -> StoreResult<u64> {
        match self.times.get(key.as_bytes())? {
            Some(bytes) => {
                let arr: [u8; 8] = bytes.as_ref().try_into().map_err(|_| StoreError::Corrupt {
                    key: key.to_string(),
                    len: bytes.len(),
                })?;
                Ok(u64::from_be_bytes(arr))
            }
            None => Ok(0),
        }
    }

    fn put(&self, key: &str, value: u64) -> StoreResult<()> {
        self.times.insert(key.as_bytes(), &value.to_be_bytes())?;
        self.db.flush()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Non-persistent store backed by a concurrent hash map.
#[derive(Debug, Default)]
pub struct MemoryTimestampStore {
    times: DashMap<String, u64>,
}

impl MemoryTimestampStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TimestampStore for MemoryTimestampStore {
    fn get(&self, key: &str) -> StoreResult<u64> {
        Ok(self.times.get(key).map(|v| *v).unwrap_or(0))
    }

    fn put(&self, key: &str, value: u64) -> StoreResult<()> {
        self.times.insert(key.to_string(), value);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn exercise(store: &dyn TimestampStore) {
        assert_eq!(store.get("LemoAAAA").unwrap(), 0);
        store.put("LemoAAAA", 1_700_000_000).unwrap();
        assert_eq!(store.get("LemoAAAA").unwrap(), 1_700_000_000);
        store.put("LemoAAAA", 1_700_086_400).unwrap();
        assert_eq!(store.get("LemoAAAA").unwrap(), 1_700_086_400);
        assert_eq!(store.get("LemoBBBB").unwrap(), 0);
    }

    #[test]
    fn memory_store_semantics() {
        exercise(&MemoryTimestampStore::new());
    }

    #[test]
    fn sled_store_semantics() {
        let store = SledTimestampStore::open_temporary().expect("should create temp store");
        exercise(&store);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn sled_store_persists_across_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let store = SledTimestampStore::open(dir.path()).expect("should open store");
            store.put("LemoCCCC", u64::MAX).unwrap();
        }
        let reopened = SledTimestampStore::open(dir.path()).expect("should reopen store");
        assert_eq!(reopened.get("LemoCCCC").unwrap(), u64::MAX);
    }

    #[test]
    fn sled_values_are_big_endian() {
        let store = SledTimestampStore::open_temporary().unwrap();
        store.put("k", 0x0102).unwrap();
        let raw = store.times.get(b"k").unwrap().unwrap();
        assert_eq!(raw.as_ref(), &[0, 0, 0, 0, 0, 0, 1, 2]);
    }

    #[test]
    fn sled_rejects_corrupt_values() {
        let store = SledTimestampStore::open_temporary().unwrap();
        store.times.insert(b"bad", &b"123"[..]).unwrap();
        assert!(matches!(
            store.get("bad"),
            Err(StoreError::Corrupt { len: 3, .. })
        ));
    }

    #[test]
    fn memory_store_is_shareable() {
        let store = Arc::new(MemoryTimestampStore::new());
        let handles: Vec<_> = (0..4u64)
            .map(|i| {
                let s = Arc::clone(&store);
                std::thread::spawn(move || s.put(&format!("k{}", i), i + 1).unwrap())
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        for i in 0..4u64 {
            assert_eq!(store.get(&format!("k{}", i)).unwrap(), i + 1);
        }
    }
}
