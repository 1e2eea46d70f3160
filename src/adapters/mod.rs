//! Registry adapters: per-repository strategies for resolving staleness.

pub mod http_metadata;
pub mod local;
pub mod solr;

pub use http_metadata::{HttpMetadataAdapter, MavenLayout, RepositoryLayout};
pub use local::LocalAdapter;
pub use solr::{SolrSearchAdapter, MAVEN_CENTRAL_SEARCH};

use crate::error::Result;
use crate::transport::{RetryPolicy, RetryingClient};
use crate::types::{Coordinate, Repository, StalenessFact};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The closed set of adapter strategies.
///
/// Which variant serves which repository is decided by the oracle's
/// name-to-adapter mapping; the variants themselves are stateless apart
/// from their HTTP client (and the local stub's warn-once flag).
#[derive(Debug)]
pub enum VersionAdapter {
    SearchApi(SolrSearchAdapter),
    RawMetadata(HttpMetadataAdapter),
    Local(LocalAdapter),
}

impl VersionAdapter {
    /// Identity used in adapter-selection debug logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SearchApi(_) => "SolrSearchAdapter",
            Self::RawMetadata(_) => "HttpMetadataAdapter",
            Self::Local(_) => "LocalAdapter",
        }
    }

    /// Creation time of the given coordinate in the given repository.
    pub fn artifact_created(
        &self,
        coordinate: &Coordinate,
        repository: &Repository,
    ) -> Result<DateTime<Utc>> {
        match self {
            Self::SearchApi(a) => a.artifact_created(coordinate, repository),
            Self::RawMetadata(a) => a.artifact_created(coordinate, repository),
            Self::Local(a) => a.artifact_created(coordinate, repository),
        }
    }

    /// Lag of the given coordinate behind the latest published version.
    pub fn latest_update(
        &self,
        coordinate: &Coordinate,
        repository: &Repository,
    ) -> Result<StalenessFact> {
        match self {
            Self::SearchApi(a) => a.latest_update(coordinate, repository),
            Self::RawMetadata(a) => a.latest_update(coordinate, repository),
            Self::Local(a) => a.latest_update(coordinate, repository),
        }
    }
}

/// Configuration-surface name for an adapter variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdapterKind {
    /// Solr-style search endpoint (Maven Central).
    SearchApi,
    /// Metadata document plus `Last-Modified` headers.
    RawMetadata,
    /// Local, non-reproducible source; lookups are unsupported.
    Local,
}

impl AdapterKind {
    /// Build the adapter, wiring in a retrying transport where needed.
    pub fn build(self, retry: RetryPolicy, timeout: Duration) -> Result<VersionAdapter> {
        Ok(match self {
            Self::SearchApi => {
                VersionAdapter::SearchApi(SolrSearchAdapter::new(RetryingClient::new(retry, timeout)?))
            }
            Self::RawMetadata => VersionAdapter::RawMetadata(HttpMetadataAdapter::new(
                RetryingClient::new(retry, timeout)?,
            )),
            Self::Local => VersionAdapter::Local(LocalAdapter::new()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_builds_the_matching_variant() {
        let retry = RetryPolicy::default();
        let timeout = Duration::from_secs(5);

        let search = AdapterKind::SearchApi.build(retry.clone(), timeout).unwrap();
        let raw = AdapterKind::RawMetadata.build(retry.clone(), timeout).unwrap();
        let local = AdapterKind::Local.build(retry, timeout).unwrap();

        assert_eq!(search.name(), "SolrSearchAdapter");
        assert_eq!(raw.name(), "HttpMetadataAdapter");
        assert_eq!(local.name(), "LocalAdapter");
    }

    #[test]
    fn kind_names_round_trip_through_serde() {
        let kind: AdapterKind = serde_json::from_str("\"search-api\"").unwrap();
        assert_eq!(kind, AdapterKind::SearchApi);
        let kind: AdapterKind = serde_json::from_str("\"raw-metadata\"").unwrap();
        assert_eq!(kind, AdapterKind::RawMetadata);
        let kind: AdapterKind = serde_json::from_str("\"local\"").unwrap();
        assert_eq!(kind, AdapterKind::Local);
    }
}
