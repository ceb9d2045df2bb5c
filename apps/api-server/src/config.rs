//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use scriptorium_core::services::GenerationSettings;
use scriptorium_infra::{DatabaseConfig, OpenAiConfig, OverlayConfig};

#[cfg(feature = "rate-limit")]
use scriptorium_infra::RateLimitConfig;
#[cfg(feature = "redis")]
use scriptorium_infra::RedisConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// PostgreSQL; in-memory stores when absent.
    pub database: Option<DatabaseConfig>,
    /// Redis post locks; in-memory locks when absent.
    #[cfg(feature = "redis")]
    pub redis: Option<RedisConfig>,
    pub openai: OpenAiConfig,
    pub overlay: OverlayConfig,
    /// Seeds the credential store at startup.
    pub openai_api_key: Option<String>,
    pub generation: GenerationSettings,
    #[cfg(feature = "rate-limit")]
    pub rate_limit: RateLimitConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8001,
            database: None,
            #[cfg(feature = "redis")]
            redis: None,
            openai: OpenAiConfig::default(),
            overlay: OverlayConfig::default(),
            openai_api_key: None,
            generation: GenerationSettings::default(),
            #[cfg(feature = "rate-limit")]
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let openai = OpenAiConfig::from_env();
        let requested_ttl = parse_var("POST_LOCK_TTL_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.generation.lock_ttl);
        let image_size = match env::var("IMAGE_SIZE") {
            Ok(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Ignoring IMAGE_SIZE, using the default");
                defaults.generation.image_size
            }),
            Err(_) => defaults.generation.image_size,
        };
        let generation = GenerationSettings {
            cooldown_days: parse_var("COOLDOWN_DAYS").unwrap_or(defaults.generation.cooldown_days),
            image_size,
            lock_ttl: effective_lock_ttl(requested_ttl, openai.timeout),
        };

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT").unwrap_or(defaults.port),
            database: DatabaseConfig::from_env(),
            #[cfg(feature = "redis")]
            redis: RedisConfig::from_env(),
            openai,
            overlay: OverlayConfig::from_env(),
            openai_api_key: env::var("OPENAI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            generation,
            #[cfg(feature = "rate-limit")]
            rate_limit: RateLimitConfig::from_env(),
        }
    }
}

/// A regeneration holds the post lock across an image and a caption call, so
/// the lock must outlive two full upstream timeouts.
fn effective_lock_ttl(requested: Duration, upstream_timeout: Duration) -> Duration {
    let floor = upstream_timeout.saturating_mul(2);
    if requested < floor {
        tracing::warn!(
            requested_secs = requested.as_secs(),
            timeout_secs = upstream_timeout.as_secs(),
            lock_ttl_secs = floor.as_secs(),
            "POST_LOCK_TTL_SECS is shorter than two generation timeouts, raising it"
        );
        return floor;
    }
    requested
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_lock_ttl_is_raised_to_two_timeouts() {
        let ttl = effective_lock_ttl(Duration::from_secs(30), Duration::from_secs(60));
        assert_eq!(ttl, Duration::from_secs(120));
    }

    #[test]
    fn test_long_lock_ttl_is_kept() {
        let ttl = effective_lock_ttl(Duration::from_secs(300), Duration::from_secs(60));
        assert_eq!(ttl, Duration::from_secs(300));
    }

    #[test]
    fn test_default_lock_ttl_covers_default_timeout() {
        let config = AppConfig::default();
        assert_eq!(
            effective_lock_ttl(config.generation.lock_ttl, config.openai.timeout),
            config.generation.lock_ttl
        );
    }
}
