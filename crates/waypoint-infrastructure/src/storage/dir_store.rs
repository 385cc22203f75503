use super::KeyValueStore;
use super::atomic_file::write_atomic;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use waypoint_core::error::{StoreError, StoreResult};

const VALUE_EXTENSION: &str = "kv";

/// File-backed [`KeyValueStore`]: one file per key inside a directory.
///
/// # Directory Structure
///
/// ```text
/// <root>/
/// ├── simplify_slovakia_session.kv
/// ├── simplify_slovakia_flow_id.kv
/// └── progress_sk_non_eu_employee.kv
/// ```
///
/// Key bytes outside `[A-Za-z0-9_.-]` are percent-encoded in file names.
#[derive(Debug, Clone)]
pub struct DirKeyValueStore {
    root: PathBuf,
    quota_bytes: Option<u64>,
}

impl DirKeyValueStore {
    /// Opens (and creates if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            StoreError::io(format!("Failed to create '{}': {}", root.display(), e))
        })?;
        tracing::debug!("[DirKeyValueStore] Opened store at {}", root.display());
        Ok(Self {
            root,
            quota_bytes: None,
        })
    }

    /// Limits the total key plus value bytes the store accepts.
    pub fn with_quota(mut self, quota_bytes: Option<u64>) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", encode_key(key), VALUE_EXTENSION))
    }

    /// Bytes used by every entry except `key`.
    fn used_bytes_excluding(&self, key: &str) -> io::Result<u64> {
        let skip = self.key_path(key);
        let mut used = 0;
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path == skip || path.extension().and_then(|ext| ext.to_str()) != Some(VALUE_EXTENSION)
            {
                continue;
            }
            let key_len = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(decode_key)
                .map(|decoded| decoded.len() as u64)
                .unwrap_or(0);
            used += key_len + fs::metadata(&path)?.len();
        }
        Ok(used)
    }
}

impl KeyValueStore for DirKeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        match fs::read_to_string(self.key_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) if e.kind() == ErrorKind::InvalidData => Err(StoreError::corrupt(format!(
                "Value under '{}' is not valid UTF-8",
                key
            ))),
            Err(e) => Err(StoreError::io(format!("Failed to read '{}': {}", key, e))),
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        if let Some(quota) = self.quota_bytes {
            let used = self.used_bytes_excluding(key)?;
            if used + (key.len() + value.len()) as u64 > quota {
                tracing::debug!(
                    "[DirKeyValueStore] Refusing write of '{}': {} bytes used of {}",
                    key,
                    used,
                    quota
                );
                return Err(StoreError::quota_exceeded(key));
            }
        }

        write_atomic(&self.key_path(key), value.as_bytes()).map_err(|e| match e.kind() {
            ErrorKind::StorageFull | ErrorKind::FileTooLarge => {
                StoreError::quota_exceeded(key)
            }
            _ => StoreError::io(format!("Failed to write '{}': {}", key, e)),
        })
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        match fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(format!("Failed to remove '{}': {}", key, e))),
        }
    }
}

fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'-' | b'.') {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }
    encoded
}

fn decode_key(encoded: &str) -> Option<String> {
    let bytes = encoded.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = encoded.get(i + 1..i + 3)?;
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded).ok()
}
