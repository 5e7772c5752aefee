//! Per-user delivery preference storage.
//!
//! The preference map is the only mutable state shared between pipeline
//! tasks, so all access goes through the [`PreferenceStore`] trait: atomic
//! get/set/toggle keyed by user id, guarded by an async lock inside the
//! implementations. The pipeline only ever reads; writes come from the
//! explicit toggle command.

use std::{collections::HashMap, path::PathBuf};

use {
    async_trait::async_trait,
    serde::{Deserialize, Serialize},
    tokio::sync::RwLock,
    tracing::info,
};

/// Crate-wide result type for preference storage.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to persist preferences: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

/// Where a user wants resolved media delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryPreference {
    /// Post in the channel the link appeared in.
    #[default]
    Channel,
    /// Send to the user's DMs.
    DirectMessage,
}

impl DeliveryPreference {
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Channel => Self::DirectMessage,
            Self::DirectMessage => Self::Channel,
        }
    }
}

/// Atomic per-user preference storage, safe under concurrent readers and
/// writers.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Current preference for a user; unknown users get the default.
    async fn get(&self, user_id: u64) -> DeliveryPreference;

    async fn set(&self, user_id: u64, preference: DeliveryPreference) -> Result<()>;

    /// Flip and return the new preference, as one atomic operation.
    async fn toggle(&self, user_id: u64) -> Result<DeliveryPreference>;
}

/// In-memory store, used in tests and when persistence is disabled.
#[derive(Default)]
pub struct MemoryStore {
    map: RwLock<HashMap<u64, DeliveryPreference>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferenceStore for MemoryStore {
    async fn get(&self, user_id: u64) -> DeliveryPreference {
        self.map.read().await.get(&user_id).copied().unwrap_or_default()
    }

    async fn set(&self, user_id: u64, preference: DeliveryPreference) -> Result<()> {
        self.map.write().await.insert(user_id, preference);
        Ok(())
    }

    async fn toggle(&self, user_id: u64) -> Result<DeliveryPreference> {
        let mut map = self.map.write().await;
        let next = map.get(&user_id).copied().unwrap_or_default().flipped();
        map.insert(user_id, next);
        Ok(next)
    }
}

/// JSON-file-backed store. The whole map is rewritten on every change;
/// preference writes are rare (one explicit command per flip) so the
/// simplicity is worth more than an incremental format.
pub struct JsonFileStore {
    path: PathBuf,
    map: RwLock<HashMap<u64, DeliveryPreference>>,
}

impl JsonFileStore {
    /// Open the store, loading any existing file. A missing file is an
    /// empty store, not an error.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let map = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        info!(path = %path.display(), entries = map.len(), "preference store loaded");
        Ok(Self {
            path,
            map: RwLock::new(map),
        })
    }

    async fn persist(&self, map: &HashMap<u64, DeliveryPreference>) -> Result<()> {
        let serialized = serde_json::to_string_pretty(map)?;
        tokio::fs::write(&self.path, serialized).await?;
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for JsonFileStore {
    async fn get(&self, user_id: u64) -> DeliveryPreference {
        self.map.read().await.get(&user_id).copied().unwrap_or_default()
    }

    async fn set(&self, user_id: u64, preference: DeliveryPreference) -> Result<()> {
        let mut map = self.map.write().await;
        map.insert(user_id, preference);
        self.persist(&map).await
    }

    async fn toggle(&self, user_id: u64) -> Result<DeliveryPreference> {
        let mut map = self.map.write().await;
        let next = map.get(&user_id).copied().unwrap_or_default().flipped();
        map.insert(user_id, next);
        self.persist(&map).await?;
        Ok(next)
    }
}
