//! REST client for a PostgREST-style vessel registry.

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;

use super::error::StoreError;
use super::store::{AliasRecord, VesselEntry, VesselStore, VesselUpsert};

/// Default request timeout in seconds. Store calls sit on the startup path,
/// so this is kept short.
const DEFAULT_TIMEOUT_SECS: u64 = 5;

const VESSELS_TABLE: &str = "vessels";
const ALIASES_TABLE: &str = "vessel_aliases";

/// Configuration for one remote vessel store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Base URL of the store (the REST prefix `/rest/v1` is appended)
    pub base_url: String,
    /// API key sent as `apikey` and as a bearer token
    pub api_key: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl StoreConfig {
    /// Create a config for the store at `base_url`.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP client for a remote vessel store.
#[derive(Debug, Clone)]
pub struct RestVesselStore {
    http: reqwest::Client,
    rest_url: String,
    label: String,
}

impl RestVesselStore {
    /// Create a new client. `label` names the tier in logs.
    pub fn new(config: StoreConfig, label: impl Into<String>) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();

        let api_key = HeaderValue::from_str(&config.api_key).map_err(|_| StoreError::Api {
            status: 0,
            message: "Invalid API key format".to_string(),
        })?;
        let bearer =
            HeaderValue::from_str(&format!("Bearer {}", config.api_key)).map_err(|_| {
                StoreError::Api {
                    status: 0,
                    message: "Invalid API key format".to_string(),
                }
            })?;
        headers.insert(HeaderName::from_static("apikey"), api_key);
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            rest_url: format!("{}/rest/v1", config.base_url),
            label: label.into(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.rest_url, table)
    }

    async fn get_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, StoreError> {
        let response = self.http.get(self.table_url(table)).query(query).send().await?;
        let response = check_status(response).await?;
        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| StoreError::Json {
            message: e.to_string(),
        })
    }

    async fn upsert<T: serde::Serialize + ?Sized>(
        &self,
        table: &str,
        on_conflict: &str,
        row: &T,
    ) -> Result<(), StoreError> {
        let response = self
            .http
            .post(self.table_url(table))
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", "resolution=merge-duplicates")
            .json(row)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

/// Map error statuses to `StoreError`.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(StoreError::Unauthorized);
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(StoreError::Api {
            status: status.as_u16(),
            message: body,
        });
    }

    Ok(response)
}

/// Whether a failed insert was only a duplicate-key rejection.
fn is_duplicate(err: &StoreError) -> bool {
    match err {
        StoreError::Api { status, message } => {
            *status == StatusCode::CONFLICT.as_u16() || message.to_lowercase().contains("duplicate")
        }
        _ => false,
    }
}

#[async_trait]
impl VesselStore for RestVesselStore {
    fn label(&self) -> &str {
        &self.label
    }

    async fn list_vessels(&self) -> Result<Vec<VesselEntry>, StoreError> {
        self.get_rows(
            VESSELS_TABLE,
            &[
                ("select", "id,name,carrier,is_active"),
                ("is_active", "eq.true"),
            ],
        )
        .await
    }

    async fn list_aliases(&self) -> Result<Vec<AliasRecord>, StoreError> {
        self.get_rows(
            ALIASES_TABLE,
            &[("select", "vessel_id,alias,source,confidence")],
        )
        .await
    }

    async fn insert_alias(&self, alias: &AliasRecord) -> Result<(), StoreError> {
        let response = self
            .http
            .post(self.table_url(ALIASES_TABLE))
            .json(alias)
            .send()
            .await?;

        match check_status(response).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate(&e) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn insert_vessel(
        &self,
        name: &str,
        carrier: Option<&str>,
    ) -> Result<VesselEntry, StoreError> {
        let row = VesselUpsert {
            name: name.to_string(),
            carrier: carrier.map(str::to_string),
            is_active: true,
        };
        let response = self
            .http
            .post(self.table_url(VESSELS_TABLE))
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        let response = check_status(response).await?;
        let body = response.text().await?;

        let rows: Vec<VesselEntry> = serde_json::from_str(&body).map_err(|e| StoreError::Json {
            message: e.to_string(),
        })?;
        rows.into_iter().next().ok_or_else(|| StoreError::Json {
            message: "insert returned no rows".to_string(),
        })
    }

    async fn upsert_vessel(&self, vessel: &VesselUpsert) -> Result<(), StoreError> {
        self.upsert(VESSELS_TABLE, "name", vessel).await
    }

    async fn upsert_alias(&self, alias: &AliasRecord) -> Result<(), StoreError> {
        self.upsert(ALIASES_TABLE, "alias", alias).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = StoreConfig::new("http://localhost:8000/", "anon");
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn config_with_timeout() {
        let config = StoreConfig::new("http://localhost:8000", "anon").with_timeout(1);
        assert_eq!(config.timeout_secs, 1);
    }

    #[test]
    fn client_creation() {
        let store = RestVesselStore::new(StoreConfig::new("http://localhost:8000", "anon"), "primary")
            .unwrap();
        assert_eq!(store.label(), "primary");
        assert_eq!(
            store.table_url(ALIASES_TABLE),
            "http://localhost:8000/rest/v1/vessel_aliases"
        );
    }

    #[test]
    fn rejects_unprintable_key() {
        let result = RestVesselStore::new(StoreConfig::new("http://localhost", "bad\nkey"), "x");
        assert!(result.is_err());
    }

    #[test]
    fn duplicate_detection() {
        assert!(is_duplicate(&StoreError::Api {
            status: 409,
            message: String::new(),
        }));
        assert!(is_duplicate(&StoreError::Api {
            status: 400,
            message: "duplicate key value violates unique constraint".into(),
        }));
        assert!(!is_duplicate(&StoreError::Api {
            status: 500,
            message: "boom".into(),
        }));
        assert!(!is_duplicate(&StoreError::Unauthorized));
    }

    // Tests against a live store would need credentials and network access;
    // tier fallthrough is covered in the resolver tests with an unreachable URL.
}
