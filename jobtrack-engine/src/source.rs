//! Data source registry and the joint fetch
//!
//! Every registered source is fetched once per cycle. All fetches are issued
//! together and awaited as a barrier; any single failure fails the cycle.

use std::time::Duration;

use async_trait::async_trait;
use futures::future::try_join_all;
use serde_json::Value;
use tracing::{debug, info};

use jobtrack_common::config::{HttpConfig, SourceConfig};
use jobtrack_common::{Error, Result};

use crate::record::{display_value, is_present, RawSourceRecord};

/// Job identifier extracted from a source record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinKey {
    Known(String),
    /// Field missing, null or blank; never equals any identifier
    Unknown,
}

impl JoinKey {
    /// True when this key names exactly `job_id`
    pub fn matches(&self, job_id: &str) -> bool {
        matches!(self, JoinKey::Known(key) if key == job_id)
    }
}

/// Rule extracting the job identifier from one source's records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinKeySpec {
    field: String,
}

impl JoinKeySpec {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// Extract the key; total over every record
    pub fn extract(&self, record: &RawSourceRecord) -> JoinKey {
        match record.get(&self.field) {
            None | Some(Value::Null) => JoinKey::Unknown,
            Some(value) => {
                let text = display_value(Some(value));
                if is_present(&text) {
                    JoinKey::Known(text)
                } else {
                    JoinKey::Unknown
                }
            }
        }
    }
}

/// A registered source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub name: String,
    pub url: String,
    pub join_key: JoinKeySpec,
}

impl From<&SourceConfig> for SourceSpec {
    fn from(config: &SourceConfig) -> Self {
        Self {
            name: config.name.clone(),
            url: config.url.clone(),
            join_key: JoinKeySpec::new(config.join_key.clone()),
        }
    }
}

/// The primary source plus linked sources in registration order
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    primary: SourceSpec,
    linked: Vec<SourceSpec>,
}

impl SourceRegistry {
    pub fn new(primary: SourceSpec, linked: Vec<SourceSpec>) -> Self {
        Self { primary, linked }
    }

    /// Build from configuration; exactly one source must be primary
    pub fn from_config(sources: &[SourceConfig]) -> Result<Self> {
        let mut primaries = sources.iter().filter(|s| s.primary);
        let primary = match (primaries.next(), primaries.next()) {
            (Some(primary), None) => SourceSpec::from(primary),
            _ => {
                return Err(Error::Config(
                    "Exactly one primary source is required".to_string(),
                ))
            }
        };
        let linked = sources
            .iter()
            .filter(|s| !s.primary)
            .map(SourceSpec::from)
            .collect();
        Ok(Self::new(primary, linked))
    }

    pub fn primary(&self) -> &SourceSpec {
        &self.primary
    }

    pub fn linked(&self) -> &[SourceSpec] {
        &self.linked
    }

    /// All sources, primary first
    pub fn iter(&self) -> impl Iterator<Item = &SourceSpec> {
        std::iter::once(&self.primary).chain(self.linked.iter())
    }

    pub fn source_count(&self) -> usize {
        1 + self.linked.len()
    }
}

/// Records retrieved from one source
#[derive(Debug, Clone)]
pub struct SourceBatch {
    pub name: String,
    pub join_key: JoinKeySpec,
    pub records: Vec<RawSourceRecord>,
}

impl SourceBatch {
    pub fn new(spec: &SourceSpec, records: Vec<RawSourceRecord>) -> Self {
        Self {
            name: spec.name.clone(),
            join_key: spec.join_key.clone(),
            records,
        }
    }
}

/// Result of one complete fetch cycle
#[derive(Debug, Clone)]
pub struct FetchedSources {
    pub primary: SourceBatch,
    pub linked: Vec<SourceBatch>,
}

/// Turn a decoded payload into a record list.
///
/// A bare object is a one-element collection. Anything that is not an
/// object or an array of objects is a parse error for the named source.
pub fn normalize_payload(source_name: &str, payload: Value) -> Result<Vec<RawSourceRecord>> {
    match payload {
        Value::Object(record) => Ok(vec![record]),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(record) => Ok(record),
                other => Err(Error::parse(
                    source_name,
                    format!("item {} is {}, expected an object", index, kind_of(&other)),
                )),
            })
            .collect(),
        other => Err(Error::parse(
            source_name,
            format!("payload is {}, expected an object or array", kind_of(&other)),
        )),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Retrieval collaborator: one call per source per cycle
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Fetch and parse every record of `source`
    ///
    /// # Errors
    /// `Error::SourceFetch` on network failure or non-success status,
    /// `Error::SourceParse` when the payload is not a record list.
    async fn fetch(&self, source: &SourceSpec) -> Result<Vec<RawSourceRecord>>;
}

/// HTTP implementation backed by a shared `reqwest` client
pub struct HttpSourceFetcher {
    http_client: reqwest::Client,
}

impl HttpSourceFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl SourceFetcher for HttpSourceFetcher {
    async fn fetch(&self, source: &SourceSpec) -> Result<Vec<RawSourceRecord>> {
        debug!(source = %source.name, url = %source.url, "Fetching source");

        let response = self
            .http_client
            .get(&source.url)
            .send()
            .await
            .map_err(|e| Error::fetch(&source.name, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch(&source.name, format!("HTTP {}", status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::fetch(&source.name, e))?;

        let payload: Value =
            serde_json::from_slice(&body).map_err(|e| Error::parse(&source.name, e))?;

        normalize_payload(&source.name, payload)
    }
}

/// Fetch every registered source concurrently and wait for all of them.
///
/// Fails with the first source error; no partial result is returned.
pub async fn fetch_all<F>(fetcher: &F, registry: &SourceRegistry) -> Result<FetchedSources>
where
    F: SourceFetcher + ?Sized,
{
    info!(sources = registry.source_count(), "Starting fetch cycle");

    let fetches = registry.iter().map(|spec| async move {
        let records = fetcher.fetch(spec).await?;
        debug!(source = %spec.name, records = records.len(), "Source fetched");
        Ok::<_, Error>(SourceBatch::new(spec, records))
    });

    let mut batches = try_join_all(fetches).await?;
    let primary = batches.remove(0);

    Ok(FetchedSources {
        primary,
        linked: batches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> RawSourceRecord {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be an object"),
        }
    }

    #[test]
    fn test_join_key_extraction() {
        let spec = JoinKeySpec::new("orderno");
        assert_eq!(
            spec.extract(&record(json!({"orderno": "H100"}))),
            JoinKey::Known("H100".to_string())
        );
        assert_eq!(
            spec.extract(&record(json!({"orderno": 4512}))),
            JoinKey::Known("4512".to_string())
        );
        assert_eq!(spec.extract(&record(json!({"orderno": null}))), JoinKey::Unknown);
        assert_eq!(spec.extract(&record(json!({"orderno": ""}))), JoinKey::Unknown);
        assert_eq!(spec.extract(&record(json!({"jobno": "H100"}))), JoinKey::Unknown);
    }

    #[test]
    fn test_unknown_never_matches() {
        assert!(!JoinKey::Unknown.matches("N/A"));
        assert!(!JoinKey::Unknown.matches(""));
        assert!(JoinKey::Known("J050".to_string()).matches("J050"));
        assert!(!JoinKey::Known("J050".to_string()).matches("j050"));
    }

    #[test]
    fn test_bare_object_becomes_single_record() {
        let records = normalize_payload("Fabst", json!({"jobno_fabric_status": "H1"})).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["jobno_fabric_status"], json!("H1"));
    }

    #[test]
    fn test_array_payload_preserves_order() {
        let records =
            normalize_payload("knitst", json!([{"orderno": "A"}, {"orderno": "B"}])).unwrap();
        let keys: Vec<_> = records.iter().map(|r| r["orderno"].clone()).collect();
        assert_eq!(keys, vec![json!("A"), json!("B")]);
    }

    #[test]
    fn test_non_record_payloads_are_parse_errors() {
        let err = normalize_payload("knitst", json!("oops")).unwrap_err();
        assert!(matches!(err, Error::SourceParse { ref source_name, .. } if source_name == "knitst"));

        let err = normalize_payload("knitst", json!([{"orderno": "A"}, 7])).unwrap_err();
        assert!(err.to_string().contains("item 1 is a number"));
    }

    #[test]
    fn test_registry_from_config_orders_primary_first() {
        let config = jobtrack_common::config::TomlConfig::default();
        let registry = SourceRegistry::from_config(&config.sources).unwrap();
        let names: Vec<_> = registry.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names[0], "order_panda");
        assert_eq!(names.len(), 7);
        assert_eq!(registry.linked()[4].join_key.field(), "jobno_fabric_status");
    }

    #[test]
    fn test_registry_requires_single_primary() {
        let mut sources = jobtrack_common::config::TomlConfig::default().sources;
        sources[1].primary = true;
        assert!(matches!(
            SourceRegistry::from_config(&sources),
            Err(Error::Config(_))
        ));
    }
}
