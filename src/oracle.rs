//! Staleness oracle: uniform lookup with per-repository adapter selection.

use crate::adapters::VersionAdapter;
use crate::error::{AuditError, Result};
use crate::types::{Coordinate, Repository, StalenessFact};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;

/// One staleness fact for one coordinate in one named repository.
///
/// `age` answers "how old is the resolved version", `update` answers "how
/// far behind the latest version is it". Visitors pick the flavor they
/// need; both share adapter selection and failure semantics.
pub trait StalenessOracle {
    fn age(&self, coordinate: &Coordinate, repository_name: &str) -> Result<StalenessFact>;

    fn update(&self, coordinate: &Coordinate, repository_name: &str) -> Result<StalenessFact>;
}

/// Oracle backed by registry adapters.
///
/// Adapter selection prefers an explicit entry in the name-to-adapter map;
/// absent that, the default adapter serves the repository. The selection is
/// logged at debug level, which is the primary diagnostic for why two
/// repositories yield different staleness numbers.
pub struct RegistryOracle {
    now: DateTime<Utc>,
    default_adapter: VersionAdapter,
    adapters: HashMap<String, VersionAdapter>,
    repositories: HashMap<String, Repository>,
}

impl RegistryOracle {
    pub fn new(
        now: DateTime<Utc>,
        default_adapter: VersionAdapter,
        adapters: HashMap<String, VersionAdapter>,
        repositories: impl IntoIterator<Item = Repository>,
    ) -> Self {
        Self {
            now,
            default_adapter,
            adapters,
            repositories: repositories
                .into_iter()
                .map(|r| (r.name.clone(), r))
                .collect(),
        }
    }

    fn select_adapter(&self, repository_name: &str) -> &VersionAdapter {
        if let Some(adapter) = self.adapters.get(repository_name) {
            debug!(
                "Using adapter {} for repository {}",
                adapter.name(),
                repository_name
            );
            return adapter;
        }
        debug!(
            "Falling back to default adapter {} for repository {}",
            self.default_adapter.name(),
            repository_name
        );
        &self.default_adapter
    }

    /// An unknown repository name is a configuration error: the host handed
    /// us a graph node sourced from a repository it never described.
    fn repository(&self, repository_name: &str) -> Result<&Repository> {
        self.repositories
            .get(repository_name)
            .ok_or_else(|| AuditError::config(format!("Cannot find repository {repository_name}")))
    }
}

impl StalenessOracle for RegistryOracle {
    fn age(&self, coordinate: &Coordinate, repository_name: &str) -> Result<StalenessFact> {
        let repository = self.repository(repository_name)?;
        let adapter = self.select_adapter(repository_name);
        match adapter.artifact_created(coordinate, repository) {
            Ok(created) => Ok(StalenessFact::Age(self.now.signed_duration_since(created))),
            Err(AuditError::NotFound(_)) => Ok(StalenessFact::NotFound),
            Err(e) => Err(e),
        }
    }

    fn update(&self, coordinate: &Coordinate, repository_name: &str) -> Result<StalenessFact> {
        let repository = self.repository(repository_name)?;
        let adapter = self.select_adapter(repository_name);
        match adapter.latest_update(coordinate, repository) {
            Err(AuditError::NotFound(_)) => Ok(StalenessFact::NotFound),
            other => other,
        }
    }
}
