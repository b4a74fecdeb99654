use async_trait::async_trait;
use config_manager::StorageConfig;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

pub mod activity;
pub mod wallet_store;

pub use activity::{ActivityEntry, ActivityKind, ActivityLog};
pub use wallet_store::{Wallet, WalletError, WalletStore};

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Redis connection error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Storage backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, PersistenceError>;

/// Storage health information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageHealthStatus {
    pub backend: String,
    pub connected: bool,
    pub latency_ms: u64,
    pub error: Option<String>,
}

/// String key-value storage the client-side stores persist through
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;

    /// Short backend name for logs and health output
    fn backend_name(&self) -> &'static str;

    async fn health_check(&self) -> StorageHealthStatus;
}

/// In-process map, used by tests and the default configuration
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> StorageHealthStatus {
        StorageHealthStatus {
            backend: self.backend_name().to_string(),
            connected: true,
            latency_ms: 0,
            error: None,
        }
    }
}

/// Redis-backed storage; every key is namespaced under `prefix:`
#[derive(Clone)]
pub struct RedisStore {
    conn: MultiplexedConnection,
    prefix: String,
}

impl RedisStore {
    pub async fn connect(redis_url: &str, prefix: &str) -> Result<Self> {
        let client = Client::open(redis_url)?;
        let mut conn = client.get_multiplexed_async_connection().await?;

        // Test the connection
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        info!("🔌 Connected to Redis at {}", redis_url);

        Ok(Self {
            conn,
            prefix: prefix.to_string(),
        })
    }

    fn namespaced(&self, key: &str) -> String {
        namespaced_key(&self.prefix, key)
    }
}

fn namespaced_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}:{}", prefix, key)
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(self.namespaced(key)).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.set(self.namespaced(key), value).await?;
        debug!("Stored {} bytes under {}", value.len(), self.namespaced(key));
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(self.namespaced(key)).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }

    async fn health_check(&self) -> StorageHealthStatus {
        let start_time = std::time::Instant::now();
        let mut conn = self.conn.clone();
        let ping: redis::RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;

        StorageHealthStatus {
            backend: self.backend_name().to_string(),
            connected: ping.is_ok(),
            latency_ms: start_time.elapsed().as_millis() as u64,
            error: ping.err().map(|e| format!("PING failed: {}", e)),
        }
    }
}

/// Build the backend named by `storage.backend`
pub async fn store_from_config(config: &StorageConfig) -> Result<Arc<dyn KeyValueStore>> {
    if config.uses_redis() {
        let store = RedisStore::connect(&config.redis_url, &config.key_prefix).await?;
        return Ok(Arc::new(store));
    }

    match config.backend.trim().to_lowercase().as_str() {
        "memory" => {
            info!("💾 Using in-memory storage backend");
            Ok(Arc::new(MemoryStore::new()))
        }
        other => Err(PersistenceError::Backend(format!(
            "unknown storage backend '{}'",
            other
        ))),
    }
}
