//! Search-API registry adapter (Solr-style query endpoint).
//!
//! Works against repositories exposing a Solr search endpoint, most
//! notably Maven Central. The strategy assumes all artifacts of one
//! `group:artifact:version` coordinate (POM, classes, sources, ...) share
//! a single logical creation date, so the timestamp of the first search
//! document is taken as the coordinate's creation time.
//!
//! Equivalent lookup with command line tools:
//!
//! ```text
//! http "https://search.maven.org/solrsearch/select" \
//!     q=='g:"org.apache.commons" AND a:"commons-text" AND v:"1.9"' \
//!     | jq ".response.docs[].timestamp"
//! ```

use crate::error::{AuditError, Result};
use crate::transport::RetryingClient;
use crate::types::{Coordinate, DependencyUpdate, Repository, StalenessFact};
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

/// Search endpoint of Maven Central, the best-known repository offering
/// this kind of API.
pub const MAVEN_CENTRAL_SEARCH: &str = "https://search.maven.org/solrsearch/select";

#[derive(Debug, Deserialize)]
struct SolrResponse {
    response: SolrResult,
}

#[derive(Debug, Deserialize)]
struct SolrResult {
    #[serde(default)]
    docs: Vec<SolrDoc>,
}

#[derive(Debug, Deserialize)]
struct SolrDoc {
    /// Creation time in epoch milliseconds.
    timestamp: Option<i64>,
    #[serde(rename = "latestVersion")]
    latest_version: Option<String>,
}

/// Retrieve creation dates and update lag via Solr search queries.
#[derive(Debug)]
pub struct SolrSearchAdapter {
    http: RetryingClient,
}

impl SolrSearchAdapter {
    pub fn new(http: RetryingClient) -> Self {
        Self { http }
    }

    /// Creation time of the given coordinate.
    pub fn artifact_created(
        &self,
        coordinate: &Coordinate,
        repository: &Repository,
    ) -> Result<DateTime<Utc>> {
        self.created(self.endpoint(repository)?, coordinate)
    }

    /// Lag of `coordinate` behind the latest published version.
    pub fn latest_update(
        &self,
        coordinate: &Coordinate,
        repository: &Repository,
    ) -> Result<StalenessFact> {
        let endpoint = self.endpoint(repository)?;
        let latest = self.latest_version(endpoint, coordinate)?;
        if latest == coordinate.version {
            return Ok(StalenessFact::NoUpdate);
        }

        let current_created = self.created(endpoint, coordinate)?;
        let latest_created = self.created(endpoint, &coordinate.with_version(&latest))?;

        // Two release series can be maintained concurrently (Tomcat 9.x and
        // 10.x): the "latest" version may predate a patch release of the
        // older line. A negative lag is reported as "no update" instead.
        let lag = latest_created.signed_duration_since(current_created);
        if lag < chrono::Duration::zero() {
            return Ok(StalenessFact::NoUpdate);
        }

        Ok(StalenessFact::Update(DependencyUpdate {
            next_version: latest,
            lag,
        }))
    }

    fn endpoint<'a>(&self, repository: &'a Repository) -> Result<&'a str> {
        repository.url.as_deref().ok_or_else(|| {
            AuditError::config(format!(
                "Repository \"{}\" has no search endpoint URL",
                repository.name
            ))
        })
    }

    fn latest_version(&self, endpoint: &str, coordinate: &Coordinate) -> Result<String> {
        let query = format!(r#"g:"{}" AND a:"{}""#, coordinate.group, coordinate.artifact);
        let doc = self.first_doc(endpoint, &query, coordinate)?;
        doc.latest_version.ok_or_else(|| {
            AuditError::not_found(format!(
                "No latest version for {} in search response",
                coordinate.module()
            ))
        })
    }

    fn created(&self, endpoint: &str, coordinate: &Coordinate) -> Result<DateTime<Utc>> {
        let query = format!(
            r#"g:"{}" AND a:"{}" AND v:"{}""#,
            coordinate.group, coordinate.artifact, coordinate.version
        );
        let doc = self.first_doc(endpoint, &query, coordinate)?;
        let millis = doc
            .timestamp
            .ok_or_else(|| AuditError::not_found(format!("No timestamp for {coordinate}")))?;
        Utc.timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| AuditError::parse(format!("Invalid timestamp {millis} for {coordinate}")))
    }

    fn first_doc(&self, endpoint: &str, query: &str, coordinate: &Coordinate) -> Result<SolrDoc> {
        let response = self.http.get_with_query(endpoint, &[("q", query)])?;
        let body = response.text()?;
        let parsed: SolrResponse = serde_json::from_str(&body)
            .map_err(|e| AuditError::parse(format!("Invalid search response from {endpoint}: {e}")))?;
        parsed
            .response
            .docs
            .into_iter()
            .next()
            .ok_or_else(|| AuditError::not_found(coordinate.to_string()))
    }
}
