//! Vessel registry: canonical names, aliases, and the tiered stores behind them.

mod cache;
mod client;
mod config;
mod error;
mod fuzzy;
mod memory;
mod resolver;
mod seed;
mod store;
mod writer;

pub use cache::{CacheDocument, VesselCache};
pub use client::{RestVesselStore, StoreConfig};
pub use config::{DEFAULT_CACHE_PATH, DEFAULT_FUZZY_THRESHOLD, ResolverConfig};
pub use error::{CacheError, ConfigError, StoreError};
pub use fuzzy::token_sort_ratio;
pub use memory::MemoryVesselStore;
pub use resolver::{
    MatchKind, ResolverMode, ResolverStats, SyncDirection, SyncStats, VesselMatch, VesselResolver,
};
pub use seed::slug_id;
pub use store::{AliasRecord, AliasSource, VesselEntry, VesselStore, VesselUpsert};
