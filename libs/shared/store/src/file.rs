use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use shared_config::AppConfig;

use crate::error::StoreError;
use crate::store::KeyValueStore;

/// File-backed store: one JSON document per key under the data directory.
/// Last successful write wins; a failed write leaves the previous file intact.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub async fn new(config: &AppConfig) -> Result<Self, StoreError> {
        tokio::fs::create_dir_all(&config.data_dir).await?;
        Ok(Self {
            dir: config.data_dir.clone(),
        })
    }

    pub async fn at(dir: &Path) -> Result<Self, StoreError> {
        tokio::fs::create_dir_all(dir).await?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys contain ':' separators and arbitrary ids. The escaping is
        // injective: '_' escapes itself and every other unsafe byte becomes
        // '_' plus two hex digits, so distinct keys never share a file.
        let mut name = String::with_capacity(key.len());
        for c in key.chars() {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                name.push(c);
            } else if c == '_' {
                name.push_str("__");
            } else {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    name.push_str(&format!("_{:02x}", byte));
                }
            }
        }
        self.dir.join(format!("{}.json", name))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let path = self.path_for(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let bytes = serde_json::to_vec(&value)?;
        // Write to a sibling temp file first so the previous document
        // survives a failed write.
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!("Wrote {} bytes for key {}", bytes.len(), key);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
