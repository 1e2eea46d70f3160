//! Stub adapter for local, non-reproducible artifact sources.
//!
//! A local repository is specific to one development machine, so creation
//! dates sourced from it would not be reproducible across machines. The
//! adapter refuses every lookup and warns a single time per instance.

use crate::error::{AuditError, Result};
use crate::types::{Coordinate, Repository, StalenessFact};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

#[derive(Debug, Default)]
pub struct LocalAdapter {
    warned: AtomicBool,
}

impl LocalAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artifact_created(
        &self,
        _coordinate: &Coordinate,
        repository: &Repository,
    ) -> Result<DateTime<Utc>> {
        Err(self.unsupported(repository))
    }

    pub fn latest_update(
        &self,
        _coordinate: &Coordinate,
        repository: &Repository,
    ) -> Result<StalenessFact> {
        Err(self.unsupported(repository))
    }

    fn unsupported(&self, repository: &Repository) -> AuditError {
        if self
            .warned
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            warn!(
                "Extracting artifact creation dates from a local repository is unreliable and therefore not supported."
            );
        }
        AuditError::Unsupported(format!("Local repository \"{}\"", repository.name))
    }
}
