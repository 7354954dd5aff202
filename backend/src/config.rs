//! Process configuration loaded via OrthoConfig.
//!
//! Values come from `STOREFRONT_*` environment variables, an optional
//! configuration file, and command-line flags, in OrthoConfig's usual
//! precedence order.

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::CartConfig;
use crate::outbound::cache::RedisCacheConfig;
use crate::outbound::persistence::PoolConfig;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/storefront";
const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Connection and cart settings for the storefront core.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "STOREFRONT")]
pub struct StorefrontSettings {
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Redis connection URL for cart documents.
    pub redis_url: Option<String>,
    /// Upper bound on pooled PostgreSQL connections.
    #[ortho_config(default = 10)]
    pub db_max_connections: u32,
    /// Cart expiry in seconds; clamped to [60 s, 90 days].
    pub cart_ttl_seconds: Option<u64>,
}

impl StorefrontSettings {
    /// Return the configured database URL, falling back to a local default.
    pub fn database_url(&self) -> &str {
        self.database_url.as_deref().unwrap_or(DEFAULT_DATABASE_URL)
    }

    /// Return the configured Redis URL, falling back to a local default.
    pub fn redis_url(&self) -> &str {
        self.redis_url.as_deref().unwrap_or(DEFAULT_REDIS_URL)
    }

    /// Cart expiry settings.
    pub fn cart_config(&self) -> CartConfig {
        CartConfig::from_ttl_seconds(self.cart_ttl_seconds)
    }

    /// PostgreSQL pool settings.
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig::new(self.database_url()).with_max_size(self.db_max_connections)
    }

    /// Redis pool settings.
    pub fn cache_config(&self) -> RedisCacheConfig {
        RedisCacheConfig::new(self.redis_url())
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for storefront configuration parsing.

    use super::*;
    use std::ffi::OsString;
    use std::time::Duration;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> StorefrontSettings {
        StorefrontSettings::load_from_iter([OsString::from("storefront")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env([
            ("STOREFRONT_DATABASE_URL", None::<String>),
            ("STOREFRONT_REDIS_URL", None::<String>),
            ("STOREFRONT_DB_MAX_CONNECTIONS", None::<String>),
            ("STOREFRONT_CART_TTL_SECONDS", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.database_url(), DEFAULT_DATABASE_URL);
        assert_eq!(settings.redis_url(), DEFAULT_REDIS_URL);
        assert_eq!(settings.pool_config().max_size(), 10);
        assert_eq!(settings.cart_config(), CartConfig::default());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            (
                "STOREFRONT_DATABASE_URL",
                Some("postgres://shop@db/storefront".to_owned()),
            ),
            ("STOREFRONT_REDIS_URL", Some("redis://cache:6380".to_owned())),
            ("STOREFRONT_DB_MAX_CONNECTIONS", Some("25".to_owned())),
            ("STOREFRONT_CART_TTL_SECONDS", Some("3600".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.database_url(), "postgres://shop@db/storefront");
        assert_eq!(settings.cache_config().redis_url(), "redis://cache:6380");
        assert_eq!(settings.pool_config().max_size(), 25);
        assert_eq!(settings.cart_config().ttl(), Duration::from_secs(3600));
    }

    #[rstest]
    fn out_of_range_ttl_is_clamped() {
        let _guard = lock_env([
            ("STOREFRONT_DATABASE_URL", None::<String>),
            ("STOREFRONT_REDIS_URL", None::<String>),
            ("STOREFRONT_DB_MAX_CONNECTIONS", None::<String>),
            ("STOREFRONT_CART_TTL_SECONDS", Some("5".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.cart_config().ttl(), Duration::from_secs(60));
    }
}
