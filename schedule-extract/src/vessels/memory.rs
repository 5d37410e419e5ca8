//! In-memory vessel store.
//!
//! Serves the same contract as the REST store without a network. Useful for
//! tests and for tooling that seeds a registry before syncing it elsewhere.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::error::StoreError;
use super::store::{AliasRecord, AliasSource, VesselEntry, VesselStore, VesselUpsert};

#[derive(Debug, Default)]
struct Tables {
    vessels: Vec<VesselEntry>,
    aliases: Vec<AliasRecord>,
    next_id: u64,
}

impl Tables {
    fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }
}

/// Vessel store backed by in-process tables.
///
/// Clones share the same tables.
#[derive(Debug, Clone)]
pub struct MemoryVesselStore {
    label: String,
    tables: Arc<Mutex<Tables>>,
    available: Arc<Mutex<bool>>,
}

impl MemoryVesselStore {
    /// Create an empty store.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            tables: Arc::new(Mutex::new(Tables::default())),
            available: Arc::new(Mutex::new(true)),
        }
    }

    /// Add a vessel with the given aliases. Returns the new vessel id.
    pub fn add(&self, name: &str, aliases: &[&str]) -> String {
        let mut tables = self.tables.lock();
        let id = tables.allocate_id();
        tables.vessels.push(VesselEntry {
            id: id.clone(),
            name: name.to_string(),
            carrier: None,
            is_active: true,
        });
        for alias in aliases {
            tables.aliases.push(AliasRecord {
                vessel_id: id.clone(),
                alias: alias.to_string(),
                source: AliasSource::Manual,
                confidence: 100,
            });
        }
        id
    }

    /// Make every call fail as if the store were unreachable.
    pub fn set_available(&self, available: bool) {
        *self.available.lock() = available;
    }

    /// Snapshot of the alias table.
    pub fn aliases(&self) -> Vec<AliasRecord> {
        self.tables.lock().aliases.clone()
    }

    /// Snapshot of the vessel table.
    pub fn vessels(&self) -> Vec<VesselEntry> {
        self.tables.lock().vessels.clone()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if *self.available.lock() {
            Ok(())
        } else {
            Err(StoreError::Api {
                status: 503,
                message: format!("{} unavailable", self.label),
            })
        }
    }
}

#[async_trait]
impl VesselStore for MemoryVesselStore {
    fn label(&self) -> &str {
        &self.label
    }

    async fn list_vessels(&self) -> Result<Vec<VesselEntry>, StoreError> {
        self.check_available()?;
        let tables = self.tables.lock();
        Ok(tables.vessels.iter().filter(|v| v.is_active).cloned().collect())
    }

    async fn list_aliases(&self) -> Result<Vec<AliasRecord>, StoreError> {
        self.check_available()?;
        Ok(self.tables.lock().aliases.clone())
    }

    async fn insert_alias(&self, alias: &AliasRecord) -> Result<(), StoreError> {
        self.check_available()?;
        let mut tables = self.tables.lock();
        if !tables.aliases.iter().any(|a| a.alias == alias.alias) {
            tables.aliases.push(alias.clone());
        }
        Ok(())
    }

    async fn insert_vessel(
        &self,
        name: &str,
        carrier: Option<&str>,
    ) -> Result<VesselEntry, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.lock();
        if tables.vessels.iter().any(|v| v.name == name) {
            return Err(StoreError::Api {
                status: 409,
                message: format!("duplicate vessel {name}"),
            });
        }
        let entry = VesselEntry {
            id: tables.allocate_id(),
            name: name.to_string(),
            carrier: carrier.map(str::to_string),
            is_active: true,
        };
        tables.vessels.push(entry.clone());
        Ok(entry)
    }

    async fn upsert_vessel(&self, vessel: &VesselUpsert) -> Result<(), StoreError> {
        self.check_available()?;
        let mut tables = self.tables.lock();
        if let Some(existing) = tables.vessels.iter_mut().find(|v| v.name == vessel.name) {
            existing.carrier = vessel.carrier.clone();
            existing.is_active = vessel.is_active;
        } else {
            let id = tables.allocate_id();
            tables.vessels.push(VesselEntry {
                id,
                name: vessel.name.clone(),
                carrier: vessel.carrier.clone(),
                is_active: vessel.is_active,
            });
        }
        Ok(())
    }

    async fn upsert_alias(&self, alias: &AliasRecord) -> Result<(), StoreError> {
        self.check_available()?;
        let mut tables = self.tables.lock();
        if let Some(existing) = tables.aliases.iter_mut().find(|a| a.alias == alias.alias) {
            *existing = alias.clone();
        } else {
            tables.aliases.push(alias.clone());
        }
        Ok(())
    }
}
