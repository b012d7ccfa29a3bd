//! Authorization token lifecycle.
//!
//! A token is either absent or a non-empty value. It is generated on first
//! use, persisted through a [`TokenStore`], reused until the server reports it
//! expired, and dropped whenever a transaction attempt fails.

use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    api::DiscountApi,
    error::Result,
    storage::{TOKEN_KEY, TokenStore},
};

/// Placeholder older clients stored instead of removing the key.
pub const LEGACY_ABSENT_SENTINEL: &str = "no-token";

#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Returns `None` for empty values and the legacy absent sentinel.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() || value == LEGACY_ABSENT_SENTINEL {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AuthToken").field(&"<redacted>").finish()
    }
}

/// Holds at most one token and mirrors it into durable storage.
pub struct TokenManager {
    store: Arc<dyn TokenStore>,
    current: Option<AuthToken>,
}

impl TokenManager {
    /// Reads any previously persisted token. An unreadable store counts as no token.
    pub async fn load(store: Arc<dyn TokenStore>) -> Result<Self> {
        let current = match store.get(TOKEN_KEY).await {
            Ok(value) => value.and_then(AuthToken::new),
            Err(e) => {
                warn!(error = %e, "Stored token unreadable, starting without one");
                None
            }
        };
        info!(has_token = current.is_some(), "Loaded token state");
        Ok(Self { store, current })
    }

    pub fn current(&self) -> Option<&AuthToken> {
        self.current.as_ref()
    }

    /// Requests a fresh token for `phone`, replacing and persisting it.
    pub async fn generate(&mut self, api: &dyn DiscountApi, phone: &str) -> Result<AuthToken> {
        self.current = None;
        let token = api.generate_token(phone).await?;
        self.store
            .set(TOKEN_KEY, token.as_str().to_string())
            .await?;
        info!("Generated and stored new token");
        self.current = Some(token.clone());
        Ok(token)
    }

    /// Forgets the current token. The in-memory copy is cleared even if storage fails.
    pub async fn invalidate(&mut self) -> Result<()> {
        self.current = None;
        self.store.remove(TOKEN_KEY).await
    }

    /// Like [`invalidate`](Self::invalidate) but only logs storage failures.
    pub async fn invalidate_quietly(&mut self) {
        if let Err(e) = self.invalidate().await {
            warn!(error = %e, "Failed to clear stored token");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileTokenStore, InMemoryTokenStore};
    use crate::testing::ScriptedApi;

    #[test]
    fn test_auth_token_rejects_absent_markers() {
        assert!(AuthToken::new("").is_none());
        assert!(AuthToken::new("   ").is_none());
        assert!(AuthToken::new("no-token").is_none());
        assert_eq!(AuthToken::new("abc").unwrap().as_str(), "abc");
        assert!(!format!("{:?}", AuthToken::new("secret").unwrap()).contains("secret"));
    }

    #[tokio::test]
    async fn test_load_ignores_sentinel() {
        let store = Arc::new(InMemoryTokenStore::new());
        store
            .set(TOKEN_KEY, LEGACY_ABSENT_SENTINEL.to_string())
            .await
            .unwrap();

        let manager = TokenManager::load(store).await.unwrap();
        assert!(manager.current().is_none());
    }

    #[tokio::test]
    async fn test_generate_persists_and_invalidate_clears() {
        let store = Arc::new(InMemoryTokenStore::new());
        let api = ScriptedApi::new();
        let mut manager = TokenManager::load(store.clone()).await.unwrap();

        let token = manager.generate(&api, "9898989898").await.unwrap();
        assert_eq!(manager.current(), Some(&token));
        assert_eq!(
            store.get(TOKEN_KEY).await.unwrap().as_deref(),
            Some(token.as_str())
        );
        assert_eq!(api.token_calls(), 1);

        let reloaded = TokenManager::load(store.clone()).await.unwrap();
        assert_eq!(reloaded.current(), Some(&token));

        manager.invalidate().await.unwrap();
        assert!(manager.current().is_none());
        assert_eq!(store.get(TOKEN_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failed_generation_leaves_no_token() {
        let store = Arc::new(InMemoryTokenStore::new());
        store.set(TOKEN_KEY, "old".to_string()).await.unwrap();
        let api = ScriptedApi::new().failing_token_generation();
        let mut manager = TokenManager::load(store).await.unwrap();

        assert!(manager.generate(&api, "9898989898").await.is_err());
        assert!(manager.current().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_token_file_loads_as_absent_and_is_repaired() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, br#"{"authToken": "abc"#).unwrap();
        let store = Arc::new(FileTokenStore::new(&path));
        let api = ScriptedApi::new();

        let mut manager = TokenManager::load(store.clone()).await.unwrap();
        assert!(manager.current().is_none());

        let token = manager.generate(&api, "9898989898").await.unwrap();
        assert_eq!(
            store.get(TOKEN_KEY).await.unwrap().as_deref(),
            Some(token.as_str())
        );
        let reloaded = TokenManager::load(store).await.unwrap();
        assert_eq!(reloaded.current(), Some(&token));
    }
}
