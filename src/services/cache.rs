use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cache miss: {0}")]
    CacheMiss(String),
}

/// Two-tier cache for listing responses
///
/// L1 is a per-process moka cache, L2 is Redis shared by every instance.
/// Entries are JSON strings so both tiers hold the same bytes. Only
/// read-side listings go through here; round planning always reads the
/// store directly.
pub struct CacheManager {
    redis: ConnectionManager,
    local: moka::future::Cache<String, String>,
    ttl_secs: u64,
}

impl CacheManager {
    pub async fn new(redis_url: &str, l1_size: u64, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;

        let local = moka::future::Cache::builder()
            .max_capacity(l1_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Ok(Self { redis, local, ttl_secs })
    }

    /// Look up `key` in L1, then L2; an L2 hit is promoted to L1
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, CacheError> {
        if let Some(json) = self.local.get(key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(serde_json::from_str(&json)?);
        }

        let mut conn = self.redis.clone();
        let Some(json) = conn.get::<_, Option<String>>(key).await? else {
            tracing::trace!("Cache miss: {}", key);
            return Err(CacheError::CacheMiss(key.to_string()));
        };

        tracing::trace!("L2 cache hit: {}", key);
        let value = serde_json::from_str(&json)?;
        self.local.insert(key.to_string(), json).await;
        Ok(value)
    }

    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let json = serde_json::to_string(value)?;

        let mut conn = self.redis.clone();
        conn.set_ex::<_, _, ()>(key, &json, self.ttl_secs).await?;
        self.local.insert(key.to_string(), json).await;

        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.local.invalidate(key).await;

        let mut conn = self.redis.clone();
        conn.del::<_, ()>(key).await?;
        Ok(())
    }

    /// Drop every L2 entry whose key matches `pattern`
    ///
    /// L1 cannot be searched by pattern and is emptied entirely.
    pub async fn invalidate_pattern(&self, pattern: &str) -> Result<(), CacheError> {
        self.local.invalidate_all();

        let mut conn = self.redis.clone();
        let keys: Vec<String> = conn.keys(pattern).await?;
        if !keys.is_empty() {
            conn.del::<_, ()>(keys).await?;
        }

        tracing::debug!("Invalidated cache pattern: {}", pattern);
        Ok(())
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Pattern covering every match listing
    pub const MATCHES_PATTERN: &'static str = "netevent:matches:*";

    /// Build a cache key for a match listing
    pub fn matches(round: Option<u8>) -> String {
        match round {
            Some(round) => format!("netevent:matches:round:{}", round),
            None => "netevent:matches:all".to_string(),
        }
    }

    /// Build a cache key for the team listing
    pub fn teams() -> String {
        "netevent:teams".to_string()
    }

    /// Build a cache key for the participant listing
    pub fn participants() -> String {
        "netevent:participants".to_string()
    }
}
