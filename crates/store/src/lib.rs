// In crates/store/src/lib.rs

use app_config::types::{StoreBackend, StoreSettings};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

pub mod error;
pub mod keys;
pub mod memory;
pub mod upstash;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use upstash::UpstashStore;

/// A plain key-value store: no transactions, last write wins.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// The name of the backend, for logs.
    fn name(&self) -> &'static str;

    /// Reads the raw value under `key`, `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes `value` under `key`, replacing whatever was there.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Builds the store backend selected in the settings.
///
/// # Arguments
///
/// * `settings`: The store configuration settings.
///
/// # Returns
///
/// A shared handle to the backend, or an `Error` if it cannot be built.
pub fn connect(settings: &StoreSettings) -> Result<Arc<dyn KvStore>> {
    let store: Arc<dyn KvStore> = match settings.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store. Tickets will not survive a restart.");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Upstash => Arc::new(UpstashStore::new(settings)?),
    };
    tracing::info!(backend = store.name(), "Key-value store ready.");
    Ok(store)
}

/// Reads and decodes a JSON value.
pub async fn get_json<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> Result<Option<T>> {
    match store.get(key).await? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| Error::Corrupt { key: key.to_string(), source }),
        None => Ok(None),
    }
}

/// Encodes a value as JSON and writes it.
pub async fn set_json<T: Serialize + Sync>(store: &dyn KvStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)
        .map_err(|source| Error::Encode { key: key.to_string(), source })?;
    store.set(key, &raw).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Marker {
        id: String,
        n: u32,
    }

    #[tokio::test]
    async fn json_helpers_round_through_the_store() {
        let store = MemoryStore::new();
        let marker = Marker { id: "A1".into(), n: 3 };

        set_json(&store, "marker", &marker).await.unwrap();
        let back: Option<Marker> = get_json(&store, "marker").await.unwrap();
        assert_eq!(back, Some(marker));

        let missing: Option<Marker> = get_json(&store, "nope").await.unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn corrupt_json_names_the_key() {
        let store = MemoryStore::new();
        store.set("ticket:BAD", "{not json").await.unwrap();

        let err = get_json::<Marker>(&store, "ticket:BAD").await.unwrap_err();
        assert!(matches!(err, Error::Corrupt { ref key, .. } if key == "ticket:BAD"));
    }
}
