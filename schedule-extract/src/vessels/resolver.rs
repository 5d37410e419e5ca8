//! Vessel name resolution.
//!
//! The resolver holds an index of canonical vessel names and their aliases,
//! loaded from the first tier that answers: primary store, secondary store,
//! local cache file, then the built-in seed table. Names that match no alias
//! exactly are compared against every canonical name with a token-sort ratio;
//! a good enough fuzzy hit is remembered as a new alias.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use moka::sync::Cache as MokaCache;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::{Carrier, normalize_vessel_name};

use super::cache::{CacheDocument, VesselCache};
use super::client::{RestVesselStore, StoreConfig};
use super::config::ResolverConfig;
use super::error::StoreError;
use super::fuzzy::token_sort_ratio;
use super::seed::{SEED_VESSELS, slug_id};
use super::store::{AliasRecord, AliasSource, VesselEntry, VesselStore, VesselUpsert};
use super::writer::AliasWriter;

/// Confidence stored with a learned alias.
const LEARNED_ALIAS_CONFIDENCE: u8 = 90;

/// Upper bound on remembered fuzzy misses.
const MISS_CACHE_CAPACITY: u64 = 4096;

/// Which tier the current index was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolverMode {
    Primary,
    Secondary,
    Cache,
    Seed,
}

impl ResolverMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ResolverMode::Primary => "primary",
            ResolverMode::Secondary => "secondary",
            ResolverMode::Cache => "cache",
            ResolverMode::Seed => "seed",
        }
    }

    fn is_remote(self) -> bool {
        matches!(self, ResolverMode::Primary | ResolverMode::Secondary)
    }
}

impl fmt::Display for ResolverMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a name was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Exact,
    Fuzzy,
    None,
}

/// Result of [`VesselResolver::match_vessel`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VesselMatch {
    /// Canonical name, or the trimmed input when nothing matched.
    pub name: String,
    /// 0–100.
    pub confidence: u8,
    pub kind: MatchKind,
}

impl VesselMatch {
    fn unmatched(text: &str) -> Self {
        Self {
            name: text.to_string(),
            confidence: 0,
            kind: MatchKind::None,
        }
    }
}

/// Direction for [`VesselResolver::sync`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDirection {
    PrimaryToSecondary,
    SecondaryToPrimary,
}

/// Outcome of a store-to-store sync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    pub vessels_synced: usize,
    pub aliases_synced: usize,
    pub errors: Vec<String>,
}

/// Snapshot of resolver state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolverStats {
    pub total_vessels: usize,
    pub total_aliases: usize,
    pub mode: ResolverMode,
    pub primary_configured: bool,
    pub secondary_configured: bool,
    pub fuzzy_threshold: u8,
    pub fuzzy_enabled: bool,
}

/// Upper-cased, whitespace-collapsed lookup key.
fn alias_key(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// In-memory vessel index.
#[derive(Debug, Clone, Default, PartialEq)]
struct VesselIndex {
    /// id → canonical name
    vessels: BTreeMap<String, String>,
    /// alias key → canonical name
    aliases: BTreeMap<String, String>,
    /// canonical name → id
    vessel_ids: BTreeMap<String, String>,
}

impl VesselIndex {
    fn seed() -> Self {
        let mut index = Self::default();
        for (name, aliases) in SEED_VESSELS {
            index.insert_vessel(&slug_id(name), name);
            for alias in aliases {
                index.insert_alias(alias, name);
            }
        }
        index
    }

    fn from_store(vessels: Vec<VesselEntry>, aliases: Vec<AliasRecord>) -> Self {
        let mut index = Self::default();
        for vessel in vessels.iter().filter(|v| v.is_active) {
            index.insert_vessel(&vessel.id, &vessel.name);
        }
        for alias in aliases {
            match index.vessels.get(&alias.vessel_id).cloned() {
                Some(name) => {
                    index.insert_alias(&alias.alias, &name);
                }
                None => debug!(alias = %alias.alias, vessel_id = %alias.vessel_id, "Skipping alias for unknown vessel"),
            }
        }
        index
    }

    fn from_document(document: CacheDocument) -> Self {
        Self {
            vessels: document.vessels,
            aliases: document.aliases,
            vessel_ids: document.vessel_ids,
        }
    }

    fn to_document(&self, mode: ResolverMode) -> CacheDocument {
        CacheDocument {
            vessels: self.vessels.clone(),
            aliases: self.aliases.clone(),
            vessel_ids: self.vessel_ids.clone(),
            updated_at: Utc::now(),
            source: mode.as_str().to_string(),
        }
    }

    /// Register a vessel. Its own name becomes an alias.
    fn insert_vessel(&mut self, id: &str, name: &str) {
        self.vessels.insert(id.to_string(), name.to_string());
        self.vessel_ids.insert(name.to_string(), id.to_string());
        self.insert_alias(name, name);
    }

    fn insert_alias(&mut self, alias: &str, name: &str) -> bool {
        let key = alias_key(alias);
        if key.is_empty() {
            return false;
        }
        self.aliases.insert(key, name.to_string());
        true
    }

    /// Best fuzzy candidate. Earlier ids win ties.
    fn best_fuzzy(&self, key: &str) -> Option<(String, f64)> {
        let mut best: Option<(&String, f64)> = None;
        for name in self.vessels.values() {
            let score = token_sort_ratio(key, &name.to_uppercase());
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((name, score));
            }
        }
        best.map(|(name, score)| (name.clone(), score))
    }
}

struct ResolverState {
    index: VesselIndex,
    mode: ResolverMode,
    /// Remote store backing the index, if any.
    active: Option<Arc<dyn VesselStore>>,
}

/// Resolves raw vessel names to canonical ones.
///
/// Shared by reference across parsers; all matching is synchronous.
pub struct VesselResolver {
    state: RwLock<ResolverState>,
    primary: Option<Arc<dyn VesselStore>>,
    secondary: Option<Arc<dyn VesselStore>>,
    cache: Option<VesselCache>,
    misses: MokaCache<String, ()>,
    writer: Mutex<Option<AliasWriter>>,
    fuzzy_threshold: u8,
    fuzzy_enabled: bool,
    timeout: Duration,
}

impl VesselResolver {
    /// Build a resolver from configuration, trying every configured tier.
    ///
    /// Never fails: with no reachable store and no cache, the seed table is used.
    pub async fn connect(config: ResolverConfig) -> Self {
        let primary = build_store(config.primary.clone(), ResolverMode::Primary);
        let secondary = build_store(config.secondary.clone(), ResolverMode::Secondary);
        Self::with_stores(config, primary, secondary).await
    }

    /// Build a resolver over the given stores.
    pub async fn with_stores(
        config: ResolverConfig,
        primary: Option<Arc<dyn VesselStore>>,
        secondary: Option<Arc<dyn VesselStore>>,
    ) -> Self {
        let resolver = Self::new(config, primary, secondary);
        if resolver.primary.is_some() || resolver.secondary.is_some() {
            *resolver.writer.lock() = Some(AliasWriter::spawn(resolver.timeout));
        }
        resolver.reload().await;
        resolver
    }

    /// Build a resolver from the cache file or seed table only.
    pub fn offline(config: ResolverConfig) -> Self {
        let resolver = Self::new(config, None, None);
        let (index, mode) = resolver.load_local();
        resolver.install(index, mode, None);
        resolver
    }

    fn new(
        config: ResolverConfig,
        primary: Option<Arc<dyn VesselStore>>,
        secondary: Option<Arc<dyn VesselStore>>,
    ) -> Self {
        let misses = MokaCache::builder()
            .max_capacity(MISS_CACHE_CAPACITY)
            .time_to_live(config.miss_cache_ttl)
            .build();

        Self {
            state: RwLock::new(ResolverState {
                index: VesselIndex::default(),
                mode: ResolverMode::Seed,
                active: None,
            }),
            primary,
            secondary,
            cache: config.cache_path.map(VesselCache::new),
            misses,
            writer: Mutex::new(None),
            fuzzy_threshold: config.fuzzy_threshold.min(100),
            fuzzy_enabled: config.fuzzy_enabled,
            timeout: config.timeout,
        }
    }

    /// Tier the current index came from.
    pub fn mode(&self) -> ResolverMode {
        self.state.read().mode
    }

    /// Trim, space letter→digit boundaries and collapse whitespace.
    pub fn normalize(&self, raw: &str) -> String {
        normalize_vessel_name(raw)
    }

    /// Resolve `text` to a canonical vessel name.
    ///
    /// Exact alias hits score 100. Otherwise the best fuzzy candidate at or
    /// above the threshold is returned and `text` is learned as its alias.
    pub fn match_vessel(&self, text: &str) -> VesselMatch {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return VesselMatch::unmatched("");
        }

        let key = alias_key(trimmed);
        let (name, score) = {
            let state = self.state.read();
            if let Some(name) = state.index.aliases.get(&key) {
                return VesselMatch {
                    name: name.clone(),
                    confidence: 100,
                    kind: MatchKind::Exact,
                };
            }
            if !self.fuzzy_enabled || state.index.vessels.is_empty() {
                return VesselMatch::unmatched(trimmed);
            }
            if self.misses.contains_key(&key) {
                return VesselMatch::unmatched(trimmed);
            }
            match state.index.best_fuzzy(&key) {
                Some((name, score)) if score >= f64::from(self.fuzzy_threshold) => (name, score),
                _ => {
                    // Recorded under the read guard: index writers clear
                    // misses before releasing the write lock.
                    self.misses.insert(key, ());
                    debug!(text = trimmed, "No vessel match");
                    return VesselMatch::unmatched(trimmed);
                }
            }
        };

        self.learn(&key, &name);
        VesselMatch {
            name,
            confidence: score.round().clamp(0.0, 100.0) as u8,
            kind: MatchKind::Fuzzy,
        }
    }

    /// Whether `text` is a known alias or canonical name. Never learns.
    pub fn is_known(&self, text: &str) -> bool {
        let state = self.state.read();
        [alias_key(text), alias_key(&normalize_vessel_name(text))]
            .iter()
            .any(|key| !key.is_empty() && state.index.aliases.contains_key(key))
    }

    /// Record `alias` for `name`, persist the index and queue a remote insert.
    fn learn(&self, alias: &str, name: &str) {
        let (store, vessel_id) = {
            let mut state = self.state.write();
            state.index.insert_alias(alias, name);
            self.persist(&state);
            (state.active.clone(), state.index.vessel_ids.get(name).cloned())
        };
        info!(alias, vessel = name, "Learned vessel alias");

        if let (Some(store), Some(vessel_id)) = (store, vessel_id) {
            self.queue_alias(
                store,
                AliasRecord {
                    vessel_id,
                    alias: alias.to_string(),
                    source: AliasSource::Learned,
                    confidence: LEARNED_ALIAS_CONFIDENCE,
                },
            );
        }
    }

    fn queue_alias(&self, store: Arc<dyn VesselStore>, alias: AliasRecord) {
        match self.writer.lock().as_ref() {
            Some(writer) => {
                writer.insert(store, alias);
            }
            None => debug!(alias = %alias.alias, "No alias writer, remote insert skipped"),
        }
    }

    /// Add a vessel with optional aliases. Returns its id, or `None` for an empty name.
    ///
    /// With a remote tier active the store assigns the id; otherwise (or if
    /// the insert fails) a slug of the name is used.
    pub async fn add_vessel(
        &self,
        name: &str,
        carrier: Option<Carrier>,
        aliases: &[&str],
    ) -> Option<String> {
        let name = normalize_vessel_name(name);
        if name.is_empty() {
            return None;
        }

        let active = self.state.read().active.clone();
        let mut id = None;
        if let Some(store) = &active {
            match timed(
                self.timeout,
                store.insert_vessel(&name, carrier.map(|c| c.as_str())),
            )
            .await
            {
                Ok(entry) => id = Some(entry.id),
                Err(e) => {
                    warn!(store = store.label(), vessel = %name, error = %e, "Remote vessel insert failed")
                }
            }
        }
        let remote = id.is_some();
        let id = id.unwrap_or_else(|| slug_id(&name));

        {
            let mut state = self.state.write();
            state.index.insert_vessel(&id, &name);
            for alias in aliases {
                state.index.insert_alias(alias, &name);
            }
            self.persist(&state);
            self.misses.invalidate_all();
        }
        info!(vessel = %name, id = %id, remote, "Added vessel");

        if let (Some(store), true) = (active, remote) {
            for alias in aliases.iter().map(|a| alias_key(a)).filter(|a| !a.is_empty()) {
                self.queue_alias(
                    store.clone(),
                    AliasRecord {
                        vessel_id: id.clone(),
                        alias,
                        source: AliasSource::Manual,
                        confidence: 100,
                    },
                );
            }
        }

        Some(id)
    }

    /// Re-run the tier chain and replace the index.
    pub async fn reload(&self) -> ResolverMode {
        for (mode, store) in [
            (ResolverMode::Primary, &self.primary),
            (ResolverMode::Secondary, &self.secondary),
        ] {
            let Some(store) = store else { continue };
            match load_remote(store.as_ref(), self.timeout).await {
                Ok(index) => {
                    info!(tier = %mode, vessels = index.vessels.len(), aliases = index.aliases.len(), "Loaded vessel index");
                    self.install(index, mode, Some(store.clone()));
                    return mode;
                }
                Err(e) => warn!(tier = %mode, error = %e, "Vessel tier unavailable"),
            }
        }

        let (index, mode) = self.load_local();
        self.install(index, mode, None);
        mode
    }

    /// Load from one tier only. Returns whether it succeeded; on failure
    /// the current index is kept.
    pub async fn switch_mode(&self, mode: ResolverMode) -> bool {
        match mode {
            ResolverMode::Primary | ResolverMode::Secondary => {
                let store = match mode {
                    ResolverMode::Primary => &self.primary,
                    _ => &self.secondary,
                };
                let Some(store) = store else {
                    warn!(tier = %mode, "Tier not configured");
                    return false;
                };
                match load_remote(store.as_ref(), self.timeout).await {
                    Ok(index) => {
                        self.ensure_writer();
                        self.install(index, mode, Some(store.clone()));
                        true
                    }
                    Err(e) => {
                        warn!(tier = %mode, error = %e, "Could not switch vessel tier");
                        false
                    }
                }
            }
            ResolverMode::Cache => match self.cache.as_ref().and_then(VesselCache::load) {
                Some(document) => {
                    self.install(VesselIndex::from_document(document), mode, None);
                    true
                }
                None => false,
            },
            ResolverMode::Seed => {
                self.install(VesselIndex::seed(), mode, None);
                true
            }
        }
    }

    /// Copy vessels then aliases from one remote store to the other, then reload.
    pub async fn sync(&self, direction: SyncDirection) -> SyncStats {
        let mut stats = SyncStats::default();
        let (from, to) = match direction {
            SyncDirection::PrimaryToSecondary => (&self.primary, &self.secondary),
            SyncDirection::SecondaryToPrimary => (&self.secondary, &self.primary),
        };
        let (Some(from), Some(to)) = (from, to) else {
            stats
                .errors
                .push("sync needs both remote tiers configured".to_string());
            return stats;
        };

        let source = async {
            let vessels = timed(self.timeout, from.list_vessels()).await?;
            let aliases = timed(self.timeout, from.list_aliases()).await?;
            Ok::<_, StoreError>((vessels, aliases))
        };
        let (vessels, aliases) = match source.await {
            Ok(rows) => rows,
            Err(e) => {
                stats.errors.push(format!("{}: {e}", from.label()));
                return stats;
            }
        };

        let upserts: Vec<VesselUpsert> = vessels
            .iter()
            .map(|v| VesselUpsert {
                name: v.name.clone(),
                carrier: v.carrier.clone(),
                is_active: v.is_active,
            })
            .collect();
        let results = join_all(
            upserts
                .iter()
                .map(|row| timed(self.timeout, to.upsert_vessel(row))),
        )
        .await;
        for (row, result) in upserts.iter().zip(results) {
            match result {
                Ok(()) => stats.vessels_synced += 1,
                Err(e) => stats.errors.push(format!("vessel {}: {e}", row.name)),
            }
        }

        // Ids differ between stores; aliases are re-pointed by vessel name.
        let target_ids: BTreeMap<String, String> = match timed(self.timeout, to.list_vessels()).await {
            Ok(rows) => rows.into_iter().map(|v| (v.name, v.id)).collect(),
            Err(e) => {
                stats.errors.push(format!("{}: {e}", to.label()));
                return stats;
            }
        };
        let source_names: BTreeMap<&str, &str> = vessels
            .iter()
            .map(|v| (v.id.as_str(), v.name.as_str()))
            .collect();

        let mut rows = Vec::new();
        for alias in aliases {
            let target = source_names
                .get(alias.vessel_id.as_str())
                .and_then(|name| target_ids.get(*name));
            match target {
                Some(vessel_id) => rows.push(AliasRecord {
                    vessel_id: vessel_id.clone(),
                    ..alias
                }),
                None => stats
                    .errors
                    .push(format!("alias {}: vessel not in target", alias.alias)),
            }
        }
        let results = join_all(rows.iter().map(|row| timed(self.timeout, to.upsert_alias(row)))).await;
        for (row, result) in rows.iter().zip(results) {
            match result {
                Ok(()) => stats.aliases_synced += 1,
                Err(e) => stats.errors.push(format!("alias {}: {e}", row.alias)),
            }
        }

        info!(
            from = from.label(),
            to = to.label(),
            vessels = stats.vessels_synced,
            aliases = stats.aliases_synced,
            errors = stats.errors.len(),
            "Vessel sync finished"
        );
        self.reload().await;
        stats
    }

    /// Canonical names, sorted.
    pub fn all_vessels(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.read().index.vessels.values().cloned().collect();
        names.sort();
        names.dedup();
        names
    }

    pub fn stats(&self) -> ResolverStats {
        let state = self.state.read();
        ResolverStats {
            total_vessels: state.index.vessels.len(),
            total_aliases: state.index.aliases.len(),
            mode: state.mode,
            primary_configured: self.primary.is_some(),
            secondary_configured: self.secondary.is_some(),
            fuzzy_threshold: self.fuzzy_threshold,
            fuzzy_enabled: self.fuzzy_enabled,
        }
    }

    /// Wait for queued remote alias writes to finish.
    pub async fn flush(&self) {
        let writer = self.writer.lock().clone();
        if let Some(writer) = writer {
            writer.flush().await;
        }
    }

    fn ensure_writer(&self) {
        let mut writer = self.writer.lock();
        if writer.is_none() {
            *writer = Some(AliasWriter::spawn(self.timeout));
        }
    }

    fn load_local(&self) -> (VesselIndex, ResolverMode) {
        if let Some(document) = self.cache.as_ref().and_then(VesselCache::load) {
            info!(source = %document.source, vessels = document.vessels.len(), "Loaded vessel index from cache");
            return (VesselIndex::from_document(document), ResolverMode::Cache);
        }
        info!("Using built-in vessel table");
        (VesselIndex::seed(), ResolverMode::Seed)
    }

    fn install(&self, index: VesselIndex, mode: ResolverMode, active: Option<Arc<dyn VesselStore>>) {
        {
            let mut state = self.state.write();
            *state = ResolverState {
                index,
                mode,
                active,
            };
            if mode.is_remote() {
                self.persist(&state);
            }
            self.misses.invalidate_all();
        }
    }

    /// Write the index to the cache file. Failure is logged only.
    fn persist(&self, state: &ResolverState) {
        let Some(cache) = &self.cache else { return };
        if let Err(e) = cache.save(&state.index.to_document(state.mode)) {
            warn!(path = %cache.path().display(), error = %e, "Could not write vessel cache");
        }
    }
}

fn build_store(
    config: Option<StoreConfig>,
    mode: ResolverMode,
) -> Option<Arc<dyn VesselStore>> {
    let config = config?;
    match RestVesselStore::new(config, mode.as_str()) {
        Ok(store) => Some(Arc::new(store)),
        Err(e) => {
            warn!(tier = %mode, error = %e, "Could not create vessel store client");
            None
        }
    }
}

async fn timed<T>(
    timeout: Duration,
    call: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout {
            secs: timeout.as_secs(),
        }),
    }
}

/// Load one remote tier. An empty vessel list counts as a failure.
async fn load_remote(store: &dyn VesselStore, timeout: Duration) -> Result<VesselIndex, StoreError> {
    let vessels = timed(timeout, store.list_vessels()).await?;
    if vessels.is_empty() {
        return Err(StoreError::Empty);
    }
    let aliases = timed(timeout, store.list_aliases()).await?;
    Ok(VesselIndex::from_store(vessels, aliases))
}
