//! Redis post lock - `SET NX PX` with token-checked release.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, Script};
use uuid::Uuid;

use scriptorium_core::ports::{LockError, LockToken, PostLock};

/// Redis connection configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis URL (e.g., redis://localhost:6379)
    pub url: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Key prefix for lock keys
    pub key_prefix: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            connect_timeout: Duration::from_secs(5),
            key_prefix: "scriptorium:post-lock".to_string(),
        }
    }
}

impl RedisConfig {
    /// Load from `REDIS_URL`; `None` when Redis is not configured.
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("REDIS_URL").ok()?;
        Some(Self {
            url,
            connect_timeout: Duration::from_secs(
                std::env::var("REDIS_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            key_prefix: std::env::var("REDIS_LOCK_PREFIX")
                .unwrap_or_else(|_| "scriptorium:post-lock".to_string()),
        })
    }
}

/// Redis-backed post lock, shared by every server instance using the same Redis.
pub struct RedisPostLock {
    conn: ConnectionManager,
    config: RedisConfig,
    /// Deletes the key only if it still holds our token.
    release_script: Script,
}

impl RedisPostLock {
    pub async fn new(config: RedisConfig) -> Result<Self, LockError> {
        let client =
            Client::open(config.url.as_str()).map_err(|e| LockError::Backend(e.to_string()))?;

        // Use timeout to prevent hanging if Redis is unreachable
        let conn = tokio::time::timeout(config.connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| LockError::Backend("Connection timed out".to_string()))?
            .map_err(|e| LockError::Backend(e.to_string()))?;

        let release_script = Script::new(
            r#"
            if redis.call('GET', KEYS[1]) == ARGV[1] then
                return redis.call('DEL', KEYS[1])
            end
            return 0
            "#,
        );

        tracing::info!(url = %config.url, "Connected to Redis post lock");

        Ok(Self {
            conn,
            config,
            release_script,
        })
    }

    fn make_key(&self, post_id: Uuid) -> String {
        format!("{}:{}", self.config.key_prefix, post_id)
    }
}

#[async_trait]
impl PostLock for RedisPostLock {
    async fn try_acquire(&self, post_id: Uuid, ttl: Duration) -> Result<Option<LockToken>, LockError> {
        let mut conn = self.conn.clone();
        let token = LockToken::new();

        let reply: Option<String> = redis::cmd("SET")
            .arg(self.make_key(post_id))
            .arg(token.0.to_string())
            .arg("NX")
            .arg("PX")
            .arg(ttl.as_millis().max(1) as u64)
            .query_async(&mut conn)
            .await
            .map_err(|e| LockError::Backend(e.to_string()))?;

        Ok(reply.map(|_| token))
    }

    async fn release(&self, post_id: Uuid, token: LockToken) -> Result<(), LockError> {
        let mut conn = self.conn.clone();
        let _: i64 = self
            .release_script
            .key(self.make_key(post_id))
            .arg(token.0.to_string())
            .invoke_async(&mut conn)
            .await
            .map_err(|e| LockError::Backend(e.to_string()))?;
        Ok(())
    }
}
