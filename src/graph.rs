//! Loader for the host-exported resolved dependency graph.
//!
//! The audit does not resolve dependencies itself: the host build tool
//! exports its resolution result as a JSON document, one node per resolved
//! coordinate. Unresolved nodes carry `"resolved": false` and are reported
//! but never expanded.
//!
//! ```json
//! {
//!   "group": "com.example", "artifact": "app", "version": "1.0.0",
//!   "dependencies": [
//!     {
//!       "group": "org.apache.commons", "artifact": "commons-text",
//!       "version": "1.9", "repository": "mavenCentral",
//!       "dependencies": []
//!     }
//!   ]
//! }
//! ```

use crate::error::{AuditError, Result};
use crate::types::{Coordinate, DependencyNode};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RawNode {
    group: String,
    artifact: String,
    version: String,
    #[serde(default)]
    repository: Option<String>,
    #[serde(default = "default_resolved")]
    resolved: bool,
    #[serde(default)]
    dependencies: Vec<RawNode>,
}

fn default_resolved() -> bool {
    true
}

/// Parse a graph document from a JSON string.
pub fn parse_graph(json: &str) -> Result<DependencyNode> {
    let raw: RawNode = serde_json::from_str(json)
        .map_err(|e| AuditError::parse(format!("Invalid dependency graph: {e}")))?;
    Ok(convert(raw))
}

/// Load a graph document from a file.
pub fn load_graph(path: &Path) -> Result<DependencyNode> {
    if !path.exists() {
        return Err(AuditError::parse(format!(
            "Dependency graph not found at {}",
            path.display()
        )));
    }
    let content = std::fs::read_to_string(path)?;
    parse_graph(&content)
}

fn convert(raw: RawNode) -> DependencyNode {
    let coordinate = Coordinate::new(raw.group, raw.artifact, raw.version);
    if !raw.resolved {
        return DependencyNode::unresolved(coordinate);
    }
    DependencyNode::Resolved {
        coordinate,
        repository: raw.repository,
        dependencies: raw.dependencies.into_iter().map(convert).collect(),
    }
}
