//! Disk cache for the vessel index.
//!
//! The last known-good index is written here after every remote load and
//! every learned alias, so a process without connectivity can resume from it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::CacheError;

/// On-disk form of the vessel index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheDocument {
    /// Vessel id → canonical name.
    pub vessels: BTreeMap<String, String>,
    /// Upper-cased alias → canonical name.
    pub aliases: BTreeMap<String, String>,
    /// Canonical name → vessel id.
    pub vessel_ids: BTreeMap<String, String>,
    pub updated_at: DateTime<Utc>,
    /// Tier the data was loaded from.
    pub source: String,
}

/// Disk cache for the vessel index.
#[derive(Debug, Clone)]
pub struct VesselCache {
    path: PathBuf,
}

impl VesselCache {
    /// Create a cache backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Try to load the cached index.
    ///
    /// Returns `None` if the file doesn't exist, is invalid, or holds no vessels.
    pub fn load(&self) -> Option<CacheDocument> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        let document: CacheDocument = match serde_json::from_str(&contents) {
            Ok(doc) => doc,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Ignoring unreadable vessel cache");
                return None;
            }
        };

        if document.vessels.is_empty() {
            return None;
        }

        Some(document)
    }

    /// Write the index to disk.
    ///
    /// Creates parent directories if they don't exist and restricts the file
    /// to its owner where the platform supports it.
    pub fn save(&self, document: &CacheDocument) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(document)?;
        std::fs::write(&self.path, json)?;

        if let Err(e) = restrict_permissions(&self.path) {
            warn!(path = %self.path.display(), error = %e, "Could not restrict vessel cache permissions");
        }

        Ok(())
    }

    /// Get the cache file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn document() -> CacheDocument {
        let mut vessels = BTreeMap::new();
        vessels.insert("sky_peace".to_string(), "SKY PEACE".to_string());
        let mut aliases = BTreeMap::new();
        aliases.insert("SKYPEACE".to_string(), "SKY PEACE".to_string());
        let mut vessel_ids = BTreeMap::new();
        vessel_ids.insert("SKY PEACE".to_string(), "sky_peace".to_string());

        CacheDocument {
            vessels,
            aliases,
            vessel_ids,
            updated_at: Utc::now(),
            source: "primary".to_string(),
        }
    }

    #[test]
    fn save_and_load_cache() {
        let dir = tempdir().unwrap();
        let cache = VesselCache::new(dir.path().join("vessels.json"));

        let doc = document();
        cache.save(&doc).unwrap();

        let loaded = cache.load().unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn uses_camel_case_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vessels.json");
        VesselCache::new(&path).save(&document()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw.get("vesselIds").is_some());
        assert!(raw.get("updatedAt").is_some());
        assert_eq!(raw["source"], "primary");
    }

    #[test]
    fn missing_cache_returns_none() {
        let cache = VesselCache::new("/nonexistent/path/vessels.json");
        assert!(cache.load().is_none());
    }

    #[test]
    fn corrupt_cache_returns_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vessels.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(VesselCache::new(&path).load().is_none());
    }

    #[test]
    fn empty_cache_returns_none() {
        let dir = tempdir().unwrap();
        let cache = VesselCache::new(dir.path().join("vessels.json"));
        let mut doc = document();
        doc.vessels.clear();
        cache.save(&doc).unwrap();
        assert!(cache.load().is_none());
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("dir").join("vessels.json");
        VesselCache::new(&path).save(&document()).unwrap();
        assert!(path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("vessels.json");
        VesselCache::new(&path).save(&document()).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
