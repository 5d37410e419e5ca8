//! Resolver configuration.

use std::path::PathBuf;
use std::time::Duration;

use super::client::StoreConfig;
use super::error::ConfigError;

/// Default fuzzy acceptance threshold (0–100).
pub const DEFAULT_FUZZY_THRESHOLD: u8 = 80;

/// Default timeout for one remote tier attempt.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Cache file used when `VESSEL_CACHE_PATH` is not set.
pub const DEFAULT_CACHE_PATH: &str = "vessels_cache.json";

/// How long a fuzzy miss is remembered.
const DEFAULT_MISS_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

/// Configuration for a [`VesselResolver`](super::VesselResolver).
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Primary remote store.
    pub primary: Option<StoreConfig>,

    /// Secondary remote store, tried when the primary is unavailable.
    pub secondary: Option<StoreConfig>,

    /// Local JSON cache file. No disk cache when `None`.
    pub cache_path: Option<PathBuf>,

    /// Minimum token-sort score for a fuzzy match to be accepted.
    pub fuzzy_threshold: u8,

    pub fuzzy_enabled: bool,

    /// Upper bound on each remote call.
    pub timeout: Duration,

    /// How long a name that failed fuzzy matching is skipped.
    pub miss_cache_ttl: Duration,
}

impl ResolverConfig {
    /// Set the primary remote store.
    pub fn with_primary(mut self, store: StoreConfig) -> Self {
        self.primary = Some(store);
        self
    }

    /// Set the secondary remote store.
    pub fn with_secondary(mut self, store: StoreConfig) -> Self {
        self.secondary = Some(store);
        self
    }

    /// Set the cache file location.
    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    /// Keep the index in memory only.
    pub fn without_cache(mut self) -> Self {
        self.cache_path = None;
        self
    }

    /// Set the fuzzy threshold (clamped to 100).
    pub fn with_fuzzy_threshold(mut self, threshold: u8) -> Self {
        self.fuzzy_threshold = threshold.min(100);
        self
    }

    /// Enable or disable fuzzy matching.
    pub fn with_fuzzy(mut self, enabled: bool) -> Self {
        self.fuzzy_enabled = enabled;
        self
    }

    /// Set the remote call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set how long fuzzy misses are remembered.
    pub fn with_miss_cache_ttl(mut self, ttl: Duration) -> Self {
        self.miss_cache_ttl = ttl;
        self
    }

    /// Build a config from `VESSEL_*` environment variables.
    ///
    /// A remote tier is configured only when both its URL and key are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let (Some(url), Some(key)) = (get("VESSEL_DB_PRIMARY_URL"), get("VESSEL_DB_PRIMARY_KEY")) {
            config = config.with_primary(StoreConfig::new(url, key));
        }
        if let (Some(url), Some(key)) =
            (get("VESSEL_DB_SECONDARY_URL"), get("VESSEL_DB_SECONDARY_KEY"))
        {
            config = config.with_secondary(StoreConfig::new(url, key));
        }
        if let Some(path) = get("VESSEL_CACHE_PATH") {
            config = config.with_cache_path(path);
        }
        if let Some(raw) = get("VESSEL_FUZZY_THRESHOLD") {
            let threshold = raw
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|t| *t <= 100)
                .ok_or_else(|| ConfigError {
                    key: "VESSEL_FUZZY_THRESHOLD",
                    reason: format!("expected an integer 0-100, got {raw:?}"),
                })?;
            config = config.with_fuzzy_threshold(threshold);
        }

        Ok(config)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            primary: None,
            secondary: None,
            // Relative to the working directory
            cache_path: Some(PathBuf::from(DEFAULT_CACHE_PATH)),
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            fuzzy_enabled: true,
            timeout: DEFAULT_TIMEOUT,
            miss_cache_ttl: DEFAULT_MISS_CACHE_TTL,
        }
    }
}
