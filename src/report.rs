//! Structured libyear report document.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One dependency with an available update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Full coordinate, `group:artifact:version`.
    pub module: String,
    /// Lag behind the latest version, in whole days.
    pub lag_days: i64,
    pub next_version: String,
}

/// The report document written by the `report` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibyearReport {
    /// Dependencies with an available update, worst lag first.
    pub collected: Vec<ReportEntry>,
    /// Coordinates with no update information available.
    pub missing_info: Vec<String>,
    /// Coordinates that errored during lookup.
    pub errors: Vec<String>,
}

impl LibyearReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
