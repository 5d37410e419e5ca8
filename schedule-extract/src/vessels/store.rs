//! Remote vessel store contract.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

use super::error::StoreError;

/// A canonical vessel as held by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VesselEntry {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

fn default_confidence() -> u8 {
    100
}

/// Stores key rows by text or integer ids; both become strings here.
fn id_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(d)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

/// Where an alias came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AliasSource {
    Seed,
    Learned,
    Manual,
    Sync,
    #[serde(other)]
    Other,
}

/// An alias row: a raw or OCR-corrupted spelling pointing at one vessel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasRecord {
    #[serde(deserialize_with = "id_string")]
    pub vessel_id: String,
    pub alias: String,
    #[serde(default = "default_source")]
    pub source: AliasSource,
    #[serde(default = "default_confidence")]
    pub confidence: u8,
}

fn default_source() -> AliasSource {
    AliasSource::Sync
}

/// Store-agnostic vessel upsert payload. Stores match on `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VesselUpsert {
    pub name: String,
    pub carrier: Option<String>,
    pub is_active: bool,
}

/// Query/insert contract the resolver needs from a remote vessel registry.
///
/// Implementations must be duplicate-tolerant on `insert_alias`: inserting an
/// alias that already exists is a success.
#[async_trait]
pub trait VesselStore: Send + Sync {
    /// Short label for logs ("primary", "memory", a host name, ...).
    fn label(&self) -> &str;

    /// List active vessels.
    async fn list_vessels(&self) -> Result<Vec<VesselEntry>, StoreError>;

    /// List all aliases.
    async fn list_aliases(&self) -> Result<Vec<AliasRecord>, StoreError>;

    /// Insert an alias, treating duplicates as success.
    async fn insert_alias(&self, alias: &AliasRecord) -> Result<(), StoreError>;

    /// Insert a vessel and return it with its store-assigned id.
    async fn insert_vessel(
        &self,
        name: &str,
        carrier: Option<&str>,
    ) -> Result<VesselEntry, StoreError>;

    /// Insert or update a vessel keyed by name.
    async fn upsert_vessel(&self, vessel: &VesselUpsert) -> Result<(), StoreError>;

    /// Insert or update an alias keyed by alias text.
    async fn upsert_alias(&self, alias: &AliasRecord) -> Result<(), StoreError>;
}
