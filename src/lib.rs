//! # libyear-audit
//!
//! Measures how stale, in aggregate, a project's resolved dependencies are:
//! - **Ages and update lag**: each dependency's age (or its lag behind the
//!   latest published version) is sourced from a package registry
//! - **Pluggable registry adapters**: search-API repositories, plain HTTP
//!   repositories with conventional layouts, and local sources
//! - **Policies**: fail when a single dependency is too old, or when all
//!   ages combined exceed a budget of libyears
//! - **Filtering**: wildcard include/exclude patterns, transitive depth
//!   limits
//!
//! ## Quick Start
//!
//! ```no_run
//! use libyear_audit::{check_dependencies, load_graph, LibyearConfig};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let graph = load_graph(Path::new("dependency-graph.json"))?;
//! let config = LibyearConfig::default();
//! let outcome = check_dependencies(&graph, &config)?;
//!
//! if let Some(summary) = outcome.failure_summary() {
//!     eprintln!("{summary}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The host build tool resolves the dependency graph and exports it as
//! JSON; this crate never performs dependency resolution itself.

pub mod adapters;
pub mod audit;
pub mod config;
pub mod error;
pub mod format;
pub mod graph;
pub mod matcher;
pub mod oracle;
pub mod report;
pub mod transport;
pub mod traversal;
pub mod types;
pub mod validator;
pub mod visitors;

// Re-export public API
pub use audit::{check_dependencies, report_dependencies, AuditOutcome, ReportOutcome};
pub use config::{LibyearConfig, NetworkConfig, ValidatorKind, ValidatorSpec};
pub use error::{AuditError, Result};
pub use graph::{load_graph, parse_graph};
pub use report::{LibyearReport, ReportEntry};
pub use types::{Coordinate, DependencyNode, Repository, StalenessFact};
