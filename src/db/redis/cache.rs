use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use tokio::sync::mpsc;

use crate::error::AppError;
use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Approved-products catalog for one taxonomy code
    Catalog(String),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Catalog(code) => write!(f, "catalog:{}", code.to_lowercase()),
        }
    }
}

/// Creates a Redis client for catalog caching
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

struct CacheWriteMessage {
    key: String,
    value: String,
    ttl: u64,
}

/// Read-through cache for catalog responses
///
/// Reads hit Redis directly; writes are queued to a background task so a slow
/// cache never delays a routine response.
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<CacheWriteMessage>,
}

/// Handle for gracefully shutting down the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl CacheWriterHandle {
    /// Signals the writer task to flush queued writes and exit
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Cache writer shutdown signal sent");
    }
}

impl Cache {
    /// Creates a cache and spawns its background writer
    pub fn new(redis_client: Client) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let client = redis_client.clone();
        tokio::spawn(async move {
            Self::cache_writer_task(client, write_rx, shutdown_rx).await;
        });

        (
            Self {
                redis_client,
                write_tx,
            },
            CacheWriterHandle { shutdown_tx },
        )
    }

    async fn cache_writer_task(
        client: Client,
        mut write_rx: mpsc::UnboundedReceiver<CacheWriteMessage>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::debug!("Catalog cache writer started");

        loop {
            tokio::select! {
                Some(msg) = write_rx.recv() => {
                    if let Err(e) = Self::write_to_redis(&client, msg).await {
                        tracing::error!(error = %e, "Failed to write catalog to Redis");
                    }
                }
                _ = shutdown_rx.recv() => {
                    write_rx.close();
                    while let Some(msg) = write_rx.recv().await {
                        if let Err(e) = Self::write_to_redis(&client, msg).await {
                            tracing::error!(error = %e, "Failed to flush catalog write during shutdown");
                        }
                    }
                    tracing::info!("Catalog cache writer stopped");
                    break;
                }
            }
        }
    }

    async fn write_to_redis(client: &Client, msg: CacheWriteMessage) -> AppResult<()> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(msg.key, msg.value, msg.ttl).await?;
        Ok(())
    }

    /// Returns the cached value for `key`, if any
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(key.to_string()).await?;

        match cached {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Queues a write without waiting for Redis
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let msg = CacheWriteMessage {
            key: key.to_string(),
            value: json,
            ttl,
        };

        if let Err(e) = self.write_tx.send(msg) {
            tracing::error!(error = %e, "Failed to queue catalog cache write");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_display_catalog() {
        let key = CacheKey::Catalog("drnt".to_string());
        assert_eq!(key.to_string(), "catalog:drnt");
    }

    #[test]
    fn test_cache_key_display_catalog_lowercase() {
        let key = CacheKey::Catalog("ORPT".to_string());
        assert_eq!(key.to_string(), "catalog:orpt");
    }

    #[test]
    fn test_create_redis_client_rejects_bad_url() {
        assert!(create_redis_client("not a url").is_err());
    }

    /// Live Redis from `REDIS_URL`; writer tests are skipped without one
    fn live_redis() -> Option<Client> {
        let redis_url = std::env::var("REDIS_URL").ok()?;
        create_redis_client(&redis_url).ok()
    }

    #[tokio::test]
    async fn test_set_in_background_writes_catalog() {
        let Some(client) = live_redis() else {
            return;
        };
        let (cache, _handle) = Cache::new(client.clone());

        let key = CacheKey::Catalog("test_writer_drnt".to_string());
        let value = vec!["cleansers".to_string(), "moisturizers".to_string()];

        cache.set_in_background(&key, &value, 60);
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let retrieved: Option<Vec<String>> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(retrieved, Some(value));

        let mut conn = client.get_multiplexed_async_connection().await.unwrap();
        let _: () = conn.del(key.to_string()).await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_flushes_queued_writes() {
        let Some(client) = live_redis() else {
            return;
        };
        let (cache, handle) = Cache::new(client.clone());

        let keys: Vec<CacheKey> = ["test_flush_ospw", "test_flush_dspt"]
            .iter()
            .map(|code| CacheKey::Catalog(code.to_string()))
            .collect();
        for key in &keys {
            cache.set_in_background(key, &vec!["cleansers".to_string()], 60);
        }

        handle.shutdown().await;
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        let mut conn = client.get_multiplexed_async_connection().await.unwrap();
        for key in &keys {
            let retrieved: Option<Vec<String>> = cache.get_from_cache(key).await.unwrap();
            assert_eq!(retrieved, Some(vec!["cleansers".to_string()]));
            let _: () = conn.del(key.to_string()).await.unwrap();
        }
    }
}
