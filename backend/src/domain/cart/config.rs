//! Cart expiry configuration.

use std::time::Duration;

/// Configuration for cached cart documents.
///
/// Every save re-applies the TTL, so an actively used cart slides forward
/// and only idle carts expire.
///
/// # Example
///
/// ```
/// # use storefront::domain::CartConfig;
/// # use std::time::Duration;
/// let config = CartConfig::default();
/// assert_eq!(config.ttl(), Duration::from_secs(7 * 24 * 3600));
///
/// let clamped = CartConfig::from_ttl_seconds(Some(5));
/// assert_eq!(clamped.ttl(), Duration::from_secs(60));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartConfig {
    ttl: Duration,
}

impl CartConfig {
    /// Default TTL: seven days.
    pub const DEFAULT_TTL_SECS: u64 = 7 * 24 * 3600;

    /// Shorter TTLs would expire carts mid-session.
    const MIN_TTL_SECS: u64 = 60;

    /// Ninety days.
    const MAX_TTL_SECS: u64 = 90 * 24 * 3600;

    /// Build from an optional configured TTL, clamping to [60 s, 90 days].
    pub fn from_ttl_seconds(seconds: Option<u64>) -> Self {
        let secs = seconds
            .unwrap_or(Self::DEFAULT_TTL_SECS)
            .clamp(Self::MIN_TTL_SECS, Self::MAX_TTL_SECS);
        Self {
            ttl: Duration::from_secs(secs),
        }
    }

    /// Create with an explicit TTL, bypassing clamping (for testing).
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl }
    }

    /// Returns the configured TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl Default for CartConfig {
    fn default() -> Self {
        Self::from_ttl_seconds(None)
    }
}
