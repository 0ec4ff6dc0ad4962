//! Directory-backed key-value store for persistent storage.
//!
//! Layout:
//!
//! ```text
//! <store_path>/
//! ├─ LOCK                 # Advisory lock for single-process access
//! ├─ 5f5f64625f5f6170.json  # one file per key, named by the hex of the key
//! └─ ...
//! ```

use crate::backend::KeyValueStore;
use crate::error::{StorageError, StorageResult};
use async_trait::async_trait;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

const LOCK_FILE: &str = "LOCK";
const VALUE_EXT: &str = "json";
const TEMP_EXT: &str = "tmp";

/// Longest key, in bytes, a [`FileStore`] accepts.
///
/// File names are the hex of the key, so this keeps value and temp file
/// names below the common 255-byte file name limit.
pub const MAX_KEY_LEN: usize = 100;

/// A key-value store that keeps one file per key inside a directory.
///
/// Values survive process restarts. Each write lands in a temporary file
/// that is renamed over the previous value, so a reader never observes a
/// half-written value.
///
/// # Locking
///
/// The store holds an exclusive advisory lock on `<path>/LOCK` for as long
/// as it is alive. Opening the same directory twice fails with
/// [`StorageError::Locked`].
///
/// # Example
///
/// ```no_run
/// use kvtable_storage::{FileStore, KeyValueStore};
/// use std::path::Path;
///
/// # async fn demo() -> kvtable_storage::StorageResult<()> {
/// let store = FileStore::open(Path::new("data"))?;
/// store.set_item("__db__app", "{\"tables\":[]}").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    _lock_file: File,
    /// Distinguishes temp files of overlapping writes to one key.
    temp_seq: AtomicU64,
}

impl FileStore {
    /// Opens or creates a store rooted at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The directory cannot be created
    /// - `path` exists but is not a directory
    /// - Another process holds the lock (`Locked`)
    pub fn open(path: &Path) -> StorageResult<Self> {
        std::fs::create_dir_all(path)?;

        if !path.is_dir() {
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("path is not a directory: {}", path.display()),
            )));
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.join(LOCK_FILE))?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(StorageError::Locked {
                path: path.display().to_string(),
            });
        }

        tracing::debug!(path = %path.display(), "opened file store");

        Ok(Self {
            path: path.to_path_buf(),
            _lock_file: lock_file,
            temp_seq: AtomicU64::new(0),
        })
    }

    /// Returns the root directory of the store.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn value_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey("key must not be empty".into()));
        }
        if key.len() > MAX_KEY_LEN {
            return Err(StorageError::InvalidKey(format!(
                "key is {} bytes, longer than {MAX_KEY_LEN}",
                key.len()
            )));
        }
        Ok(self.path.join(format!("{}.{VALUE_EXT}", encode_key(key))))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        let seq = self.temp_seq.fetch_add(1, Ordering::Relaxed);
        self.path.join(format!("{}.{seq}.{TEMP_EXT}", encode_key(key)))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn all_keys(&self) -> StorageResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.path).await?;

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let Some(stem) = name.strip_suffix(&format!(".{VALUE_EXT}")) else {
                continue;
            };
            match decode_key(stem) {
                Ok(key) => keys.push(key),
                Err(e) => {
                    tracing::warn!(file = name, error = %e, "skipping foreign file");
                }
            }
        }

        keys.sort();
        Ok(keys)
    }

    async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        match tokio::fs::read_to_string(self.value_path(key)?).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let target = self.value_path(key)?;
        let temp = self.temp_path(key);

        let written = match tokio::fs::write(&temp, value.as_bytes()).await {
            Ok(()) => tokio::fs::rename(&temp, &target).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }

        tracing::trace!(key, len = value.len(), "file store set");
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> StorageResult<()> {
        match tokio::fs::remove_file(self.value_path(key)?).await {
            Ok(()) => {
                tracing::trace!(key, "file store remove");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Hex-encodes a key so any string maps to a portable file name.
fn encode_key(key: &str) -> String {
    key.bytes().map(|b| format!("{b:02x}")).collect()
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

fn decode_key(stem: &str) -> StorageResult<String> {
    if stem.len() % 2 != 0 {
        return Err(StorageError::Corrupted(format!(
            "odd-length key file name: {stem}"
        )));
    }

    let bytes = stem
        .as_bytes()
        .chunks_exact(2)
        .map(|pair| Some((hex_digit(pair[0])? << 4) | hex_digit(pair[1])?))
        .collect::<Option<Vec<u8>>>()
        .ok_or_else(|| StorageError::Corrupted(format!("bad key file name: {stem}")))?;

    String::from_utf8(bytes)
        .map_err(|e| StorageError::Corrupted(format!("key is not UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn key_encoding_roundtrip() {
        for key in ["__db__app", "ключ", "a/b\\c", "emoji 🚀"] {
            assert_eq!(decode_key(&encode_key(key)).unwrap(), key);
        }
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(decode_key("abc"), Err(StorageError::Corrupted(_))));
        assert!(matches!(decode_key("zz"), Err(StorageError::Corrupted(_))));
    }

    #[tokio::test]
    async fn file_set_get_remove() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        assert_eq!(store.get_item("k").await.unwrap(), None);

        store.set_item("k", "héllo").await.unwrap();
        assert_eq!(store.get_item("k").await.unwrap().as_deref(), Some("héllo"));

        store.remove_item("k").await.unwrap();
        assert_eq!(store.get_item("k").await.unwrap(), None);
        assert!(store.remove_item("k").await.is_ok());
    }

    #[tokio::test]
    async fn file_keys_sorted_and_ignore_lock() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store.set_item("__db__zoo", "{}").await.unwrap();
        store.set_item("__db__app", "{}").await.unwrap();
        store.set_item("settings", "x").await.unwrap();

        assert_eq!(
            store.all_keys().await.unwrap(),
            vec![
                "__db__app".to_string(),
                "__db__zoo".to_string(),
                "settings".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn file_values_survive_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = FileStore::open(dir.path()).unwrap();
            store.set_item("persist", "value").await.unwrap();
        }

        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(
            store.get_item("persist").await.unwrap().as_deref(),
            Some("value")
        );
    }

    #[test]
    fn file_second_open_is_locked() {
        let dir = tempdir().unwrap();
        let _first = FileStore::open(dir.path()).unwrap();
        let second = FileStore::open(dir.path());
        assert!(matches!(second, Err(StorageError::Locked { .. })));
    }

    #[test]
    fn decode_rejects_non_ascii_names() {
        assert!(matches!(decode_key("aé"), Err(StorageError::Corrupted(_))));
        assert!(matches!(decode_key("éé"), Err(StorageError::Corrupted(_))));
        assert!(matches!(decode_key("aéb"), Err(StorageError::Corrupted(_))));
    }

    #[tokio::test]
    async fn file_keys_skip_foreign_files() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.set_item("__db__app", "{}").await.unwrap();

        std::fs::write(dir.path().join("aéb.json"), "x").unwrap();
        std::fs::write(dir.path().join("zz.json"), "x").unwrap();
        std::fs::write(dir.path().join("abc.json"), "x").unwrap();

        assert_eq!(store.all_keys().await.unwrap(), vec!["__db__app".to_string()]);
    }

    #[tokio::test]
    async fn file_key_length_limit() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        let longest = "k".repeat(MAX_KEY_LEN);
        store.set_item(&longest, "v").await.unwrap();
        assert_eq!(store.get_item(&longest).await.unwrap().as_deref(), Some("v"));
        assert_eq!(store.all_keys().await.unwrap(), vec![longest]);

        let too_long = format!("__db__{}", "n".repeat(130));
        assert!(matches!(
            store.set_item(&too_long, "v").await,
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            store.get_item(&too_long).await,
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn failed_rename_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        // A directory in place of the value file makes the rename fail.
        let blocker = dir.path().join(format!("{}.{VALUE_EXT}", encode_key("k")));
        std::fs::create_dir(&blocker).unwrap();
        std::fs::write(blocker.join("inner"), "x").unwrap();

        assert!(store.set_item("k", "v").await.is_err());
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(TEMP_EXT))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn file_rejects_empty_key() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.set_item("", "v").await,
            Err(StorageError::InvalidKey(_))
        ));
    }
}
