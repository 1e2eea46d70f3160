//! Raw-metadata registry adapter for plain HTTP repositories.
//!
//! Works with any repository served over HTTP that follows a conventional
//! layout: a per-module metadata document names the latest release, and the
//! `Last-Modified` header of a header-only request against the artifact URL
//! stands in for the artifact's creation date.
//!
//! Caveats: the `Last-Modified` header may not correlate with the actual
//! publication date, and the artifact qualifier is assumed to be `jar`.
//! Repositories with a different path convention can inject their own
//! [`RepositoryLayout`].

use crate::error::{AuditError, Result};
use crate::transport::RetryingClient;
use crate::types::{Coordinate, DependencyUpdate, Repository, StalenessFact};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// How to turn a base URL and a coordinate into absolute URLs.
pub trait RepositoryLayout: std::fmt::Debug + Send + Sync {
    fn metadata_url(&self, base_url: &str, coordinate: &Coordinate) -> String;
    fn artifact_url(&self, base_url: &str, coordinate: &Coordinate) -> String;
}

/// Most common layout: every dot-separated part of the group (and artifact)
/// becomes a path segment.
///
/// ```text
/// input  = "org.apache.commons:commons-text:1.8"
/// output = base + "/org/apache/commons/commons-text/1.8/commons-text-1.8.jar"
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct MavenLayout;

impl MavenLayout {
    fn module_path(coordinate: &Coordinate) -> String {
        let mut segments: Vec<&str> = coordinate.group.split('.').collect();
        segments.extend(coordinate.artifact.split('.'));
        segments.join("/")
    }
}

impl RepositoryLayout for MavenLayout {
    fn metadata_url(&self, base_url: &str, coordinate: &Coordinate) -> String {
        format!(
            "{}/{}/maven-metadata.xml",
            base_url.trim_end_matches('/'),
            Self::module_path(coordinate)
        )
    }

    fn artifact_url(&self, base_url: &str, coordinate: &Coordinate) -> String {
        format!(
            "{}/{}/{}/{}-{}.jar",
            base_url.trim_end_matches('/'),
            Self::module_path(coordinate),
            coordinate.version,
            coordinate.artifact,
            coordinate.version
        )
    }
}

#[derive(Debug, Deserialize)]
struct MavenMetadata {
    versioning: Option<Versioning>,
}

#[derive(Debug, Deserialize)]
struct Versioning {
    release: Option<String>,
    latest: Option<String>,
}

/// Retrieve creation dates and update lag from a conventional HTTP
/// repository layout.
#[derive(Debug)]
pub struct HttpMetadataAdapter {
    http: RetryingClient,
    layout: Box<dyn RepositoryLayout>,
}

impl HttpMetadataAdapter {
    pub fn new(http: RetryingClient) -> Self {
        Self::with_layout(http, Box::new(MavenLayout))
    }

    pub fn with_layout(http: RetryingClient, layout: Box<dyn RepositoryLayout>) -> Self {
        Self { http, layout }
    }

    /// Creation time of the given coordinate, read from `Last-Modified`.
    pub fn artifact_created(
        &self,
        coordinate: &Coordinate,
        repository: &Repository,
    ) -> Result<DateTime<Utc>> {
        self.created(self.base_url(repository)?, coordinate)
    }

    /// Lag of `coordinate` behind the repository's release version.
    pub fn latest_update(
        &self,
        coordinate: &Coordinate,
        repository: &Repository,
    ) -> Result<StalenessFact> {
        let base = self.base_url(repository)?;
        let latest = self.latest_version(base, coordinate)?;
        if latest == coordinate.version {
            return Ok(StalenessFact::NoUpdate);
        }

        let current_created = self.created(base, coordinate)?;
        let latest_created = self.created(base, &coordinate.with_version(&latest))?;

        // Same floor as the search adapter: concurrent release series can
        // make the release version older than the resolved one.
        let lag = latest_created.signed_duration_since(current_created);
        if lag < chrono::Duration::zero() {
            return Ok(StalenessFact::NoUpdate);
        }

        Ok(StalenessFact::Update(DependencyUpdate {
            next_version: latest,
            lag,
        }))
    }

    fn base_url<'a>(&self, repository: &'a Repository) -> Result<&'a str> {
        repository.url.as_deref().ok_or_else(|| {
            AuditError::config(format!(
                "Repository \"{}\" has no base URL",
                repository.name
            ))
        })
    }

    fn latest_version(&self, base_url: &str, coordinate: &Coordinate) -> Result<String> {
        let url = self.layout.metadata_url(base_url, coordinate);
        let body = self.http.get(&url)?.text()?;
        let metadata: MavenMetadata = quick_xml::de::from_str(&body)
            .map_err(|e| AuditError::parse(format!("Invalid metadata document at {url}: {e}")))?;
        metadata
            .versioning
            .and_then(|v| v.release.or(v.latest))
            .ok_or_else(|| {
                AuditError::not_found(format!("No release version in metadata at {url}"))
            })
    }

    fn created(&self, base_url: &str, coordinate: &Coordinate) -> Result<DateTime<Utc>> {
        let url = self.layout.artifact_url(base_url, coordinate);
        let response = self.http.head(&url)?;
        let header = response
            .headers()
            .get(reqwest::header::LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AuditError::not_found(format!("Response for {url} has no Last-Modified header"))
            })?;
        DateTime::parse_from_rfc2822(header)
            .map(|d| d.with_timezone(&Utc))
            .map_err(|e| AuditError::parse(format!("Invalid Last-Modified \"{header}\": {e}")))
    }
}
