//! Core data types for dependency staleness measurement

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Identity of a published library release: `group:artifact:version`.
///
/// Coordinates are plain values; two coordinates are the same dependency
/// release iff all three fields are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    pub group: String,
    pub artifact: String,
    pub version: String,
}

impl Coordinate {
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
        }
    }

    /// The same module at a different version.
    pub fn with_version(&self, version: impl Into<String>) -> Self {
        Self {
            group: self.group.clone(),
            artifact: self.artifact.clone(),
            version: version.into(),
        }
    }

    /// Module rendering without the version, `group:artifact`.
    ///
    /// Include/exclude patterns match against this form.
    pub fn module(&self) -> String {
        format!("{}:{}", self.group, self.artifact)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}

/// A node of the host-resolved dependency graph.
///
/// The host build tool owns the graph; the audit only reads it. Unresolved
/// nodes carry no repository and no outgoing edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyNode {
    Resolved {
        coordinate: Coordinate,
        /// Name of the repository the artifact was sourced from. The graph
        /// root (the project itself) carries none.
        repository: Option<String>,
        dependencies: Vec<DependencyNode>,
    },
    Unresolved {
        coordinate: Coordinate,
    },
}

impl DependencyNode {
    pub fn resolved(
        coordinate: Coordinate,
        repository: impl Into<String>,
        dependencies: Vec<DependencyNode>,
    ) -> Self {
        Self::Resolved {
            coordinate,
            repository: Some(repository.into()),
            dependencies,
        }
    }

    /// A resolved node without a source repository, typically the root.
    pub fn root(coordinate: Coordinate, dependencies: Vec<DependencyNode>) -> Self {
        Self::Resolved {
            coordinate,
            repository: None,
            dependencies,
        }
    }

    pub fn unresolved(coordinate: Coordinate) -> Self {
        Self::Unresolved { coordinate }
    }

    pub fn coordinate(&self) -> &Coordinate {
        match self {
            Self::Resolved { coordinate, .. } | Self::Unresolved { coordinate } => coordinate,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }
}

/// Host-supplied identity and connection info for an artifact source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    /// Base URL or search endpoint. `None` for local, non-URL sources.
    pub url: Option<String>,
}

impl Repository {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: Some(url.into()),
        }
    }

    pub fn local(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: None,
        }
    }
}

/// A newer version exists for a module, together with how far behind the
/// currently resolved version is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyUpdate {
    pub next_version: String,
    pub lag: Duration,
}

/// Outcome of asking the oracle about one coordinate.
///
/// Lookup failures are the `Err` side of `Result<StalenessFact>`; the
/// variants here are the answers a registry can actually give.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StalenessFact {
    /// Elapsed time since the resolved version was published.
    Age(Duration),
    /// A newer version exists; see [`DependencyUpdate`].
    Update(DependencyUpdate),
    /// The resolved version is the latest known one, or the only newer
    /// release line predates it (negative lag is floored to "no update").
    NoUpdate,
    /// The registry has no record of the module or the record lacks the
    /// required fields. Expected steady state, not an error.
    NotFound,
}
