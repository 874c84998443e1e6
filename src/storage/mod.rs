use log::{info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

const TOKEN_KEY: &str = "auth_token";
const FAVORITES_KEY: &str = "user_favorites";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("could not determine a data directory")]
    NoDataDir,
}

/// String key/value store kept in memory and written through to one JSON
/// file on every change.
#[derive(Clone)]
pub struct Storage {
    inner: Arc<RwLock<HashMap<String, String>>>,
    path: Option<PathBuf>,
}

impl Storage {
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            path: None,
        }
    }

    /// Loads `path` if it exists; the file is created on first write.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();

        let map = if tokio::fs::try_exists(&path).await? {
            let content = tokio::fs::read_to_string(&path).await?;
            serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("Storage file {:?} unreadable, starting empty: {}", path, e);
                HashMap::new()
            })
        } else {
            info!("No storage file at {:?}, starting empty", path);
            HashMap::new()
        };

        Ok(Self {
            inner: Arc::new(RwLock::new(map)),
            path: Some(path),
        })
    }

    pub fn default_path() -> Result<PathBuf, StorageError> {
        let dirs = directories::ProjectDirs::from("com", "storefront", "storefront-client")
            .ok_or(StorageError::NoDataDir)?;
        Ok(dirs.data_dir().join("storage.json"))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    // ==================================================
    // KEY / VALUE
    // ==================================================

    pub async fn get_item(&self, key: &str) -> Option<String> {
        self.inner.read().await.get(key).cloned()
    }

    pub async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = self.inner.write().await;
        map.insert(key.to_string(), value.to_string());
        self.persist(&map).await
    }

    pub async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut map = self.inner.write().await;
        if map.remove(key).is_none() {
            return Ok(());
        }
        self.persist(&map).await
    }

    async fn persist(&self, map: &HashMap<String, String>) -> Result<(), StorageError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let content = serde_json::to_string_pretty(map)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    // ==================================================
    // AUTH TOKEN
    // ==================================================

    pub async fn get_token(&self) -> Option<String> {
        self.get_item(TOKEN_KEY).await.filter(|t| !t.is_empty())
    }

    /// `None` clears the token.
    pub async fn store_token(&self, token: Option<&str>) -> Result<(), StorageError> {
        match token {
            Some(token) if !token.is_empty() => self.set_item(TOKEN_KEY, token).await,
            _ => self.clear_token().await,
        }
    }

    pub async fn clear_token(&self) -> Result<(), StorageError> {
        self.remove_item(TOKEN_KEY).await
    }

    // ==================================================
    // FAVORITES
    // ==================================================

    pub async fn favorites(&self) -> Vec<i64> {
        parse_favorites(self.inner.read().await.get(FAVORITES_KEY))
    }

    pub async fn is_favorite(&self, product_id: i64) -> bool {
        self.favorites().await.contains(&product_id)
    }

    /// Flips `product_id` in the favorites list and returns the new state.
    pub async fn toggle_favorite(&self, product_id: i64) -> Result<bool, StorageError> {
        let mut map = self.inner.write().await;
        let mut favorites = parse_favorites(map.get(FAVORITES_KEY));

        let now_favorite = if favorites.contains(&product_id) {
            favorites.retain(|id| *id != product_id);
            false
        } else {
            favorites.push(product_id);
            true
        };

        map.insert(FAVORITES_KEY.to_string(), serde_json::to_string(&favorites)?);
        self.persist(&map).await?;
        Ok(now_favorite)
    }
}

fn parse_favorites(raw: Option<&String>) -> Vec<i64> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!("Ignoring malformed favorites list: {}", e);
        Vec::new()
    })
}
