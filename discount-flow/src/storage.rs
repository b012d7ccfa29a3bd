use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::{FlowError, Result};

/// Key the authorization token is stored under.
pub const TOKEN_KEY: &str = "authToken";

/// Trait for durable client-side key/value storage
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: String) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory implementation of TokenStore
#[derive(Default)]
pub struct InMemoryTokenStore {
    values: Arc<DashMap<String, String>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self {
            values: Arc::new(DashMap::new()),
        }
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).map(|entry| entry.clone()))
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// TokenStore backed by a JSON object on disk.
///
/// The whole file is rewritten on every change, through a temporary file that
/// is renamed over the original. A missing file reads as empty. Changes to an
/// unparseable file replace it.
pub struct FileTokenStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<BTreeMap<String, String>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Like `read_all`, but a corrupt file reads as empty and is flagged for rewrite.
    async fn read_for_update(&self) -> Result<(BTreeMap<String, String>, bool)> {
        match self.read_all().await {
            Ok(values) => Ok((values, false)),
            Err(FlowError::Serialization(e)) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Replacing unreadable token file"
                );
                Ok((BTreeMap::new(), true))
            }
            Err(e) => Err(e),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    async fn write_all(&self, values: &BTreeMap<String, String>) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(values)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, bytes).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.remove(key))
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let _guard = self.lock.lock().await;
        let (mut values, _) = self.read_for_update().await?;
        values.insert(key.to_string(), value);
        self.write_all(&values).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let (mut values, corrupt) = self.read_for_update().await?;
        if values.remove(key).is_some() || corrupt {
            self.write_all(&values).await?;
        }
        Ok(())
    }
}
