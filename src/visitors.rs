//! Visitors connecting the traversal to the oracle.

use crate::error::AuditError;
use crate::format::format_approximate;
use crate::oracle::StalenessOracle;
use crate::report::{LibyearReport, ReportEntry};
use crate::traversal::DependencyVisitor;
use crate::types::{Coordinate, DependencyUpdate, StalenessFact};
use crate::validator::{DependencyAge, DependencyValidator};
use chrono::Duration;
use tracing::{debug, error, warn};

/// How lookup failures are handled during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationConfig {
    /// Abort the run on the first lookup failure. When `false`, failing
    /// nodes are logged and excluded from the aggregate.
    pub fail_on_error: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self { fail_on_error: true }
    }
}

/// Feeds every resolved node's age into a validator.
///
/// The traversal is only stopped for errors: configuration errors always,
/// lookup errors when `fail_on_error` is set. Validation itself runs over
/// the whole graph so the violator list is complete.
pub struct ValidatingVisitor<'a, O: StalenessOracle> {
    oracle: &'a O,
    validator: &'a mut dyn DependencyValidator,
    config: ValidationConfig,
    fatal: Option<AuditError>,
}

impl<'a, O: StalenessOracle> ValidatingVisitor<'a, O> {
    pub fn new(
        oracle: &'a O,
        validator: &'a mut dyn DependencyValidator,
        config: ValidationConfig,
    ) -> Self {
        Self {
            oracle,
            validator,
            config,
            fatal: None,
        }
    }

    /// The error that aborted the traversal, if any.
    pub fn take_failure(&mut self) -> Option<AuditError> {
        self.fatal.take()
    }

    fn handle_failure(&mut self, coordinate: &Coordinate, repository: &str, failure: AuditError) {
        if failure.is_fatal() {
            self.fatal = Some(failure);
            return;
        }

        let base_message = format!(
            "Cannot determine dependency age for \"{coordinate}\" and repository \"{repository}\" (reason: {})",
            failure.reason()
        );
        if self.config.fail_on_error {
            self.fatal = Some(AuditError::LookupError {
                coordinate: coordinate.to_string(),
                repository: repository.to_string(),
                reason: failure.to_string(),
            });
            return;
        }

        // The offending node is excluded from the aggregate; details stay at
        // warn level to keep tolerant runs readable.
        warn!("{base_message}.");
    }
}

impl<O: StalenessOracle> DependencyVisitor for ValidatingVisitor<'_, O> {
    fn can_continue(&self) -> bool {
        self.fatal.is_none()
    }

    fn visit_resolved_component(&mut self, coordinate: &Coordinate, repository: Option<&str>) {
        // The graph root (the project itself) carries no source repository.
        let Some(repository) = repository else {
            return;
        };

        match self.oracle.age(coordinate, repository) {
            Ok(StalenessFact::Age(age)) => {
                self.validator
                    .add(DependencyAge::new(coordinate.clone(), age));
            }
            Ok(StalenessFact::NotFound) => {
                debug!("No age information for {coordinate} in {repository}");
            }
            Ok(_) => {}
            Err(e) => self.handle_failure(coordinate, repository, e),
        }
    }
}

struct CollectedUpdate {
    coordinate: Coordinate,
    update: DependencyUpdate,
}

/// Accumulates update lag for every resolved node, without any pass/fail
/// concept, and renders the summary.
pub struct ReportingVisitor<'a, O: StalenessOracle> {
    oracle: &'a O,
    collected: Vec<CollectedUpdate>,
    missing_info: Vec<Coordinate>,
    errors: Vec<Coordinate>,
}

impl<'a, O: StalenessOracle> ReportingVisitor<'a, O> {
    pub fn new(oracle: &'a O) -> Self {
        Self {
            oracle,
            collected: Vec::new(),
            missing_info: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn total_lag(&self) -> Duration {
        self.collected
            .iter()
            .fold(Duration::zero(), |acc, c| acc + c.update.lag)
    }

    fn sorted(&self) -> Vec<&CollectedUpdate> {
        let mut sorted: Vec<&CollectedUpdate> = self.collected.iter().collect();
        sorted.sort_by(|a, b| {
            b.update
                .lag
                .cmp(&a.update.lag)
                .then_with(|| a.coordinate.cmp(&b.coordinate))
        });
        sorted
    }

    /// Text summary, worst lag first.
    pub fn render(&self) -> String {
        let mut out = String::new();

        if !self.missing_info.is_empty() {
            out.push_str("Dependencies with no update information available:\n");
            for coordinate in &self.missing_info {
                out.push_str(&format!(" -> {coordinate}\n"));
            }
        }

        if !self.errors.is_empty() {
            out.push_str("Dependencies with errors during age determination:\n");
            for coordinate in &self.errors {
                out.push_str(&format!(" -> {coordinate}\n"));
            }
        }

        if !self.missing_info.is_empty() || !self.errors.is_empty() {
            out.push('\n');
        }

        out.push_str(&format!(
            "Collected {} worth of libyears from {} dependencies:\n",
            format_approximate(self.total_lag()),
            self.collected.len()
        ));
        for dep in self.sorted() {
            out.push_str(&format!(
                " -> {:<10} from {} ({} => {})\n",
                format_approximate(dep.update.lag),
                dep.coordinate.module(),
                dep.coordinate.version,
                dep.update.next_version
            ));
        }

        out
    }

    /// Structured report document.
    pub fn into_report(self) -> LibyearReport {
        let collected = self
            .sorted()
            .into_iter()
            .map(|dep| ReportEntry {
                module: dep.coordinate.to_string(),
                lag_days: dep.update.lag.num_days(),
                next_version: dep.update.next_version.clone(),
            })
            .collect();
        LibyearReport {
            collected,
            missing_info: self.missing_info.iter().map(|c| c.to_string()).collect(),
            errors: self.errors.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl<O: StalenessOracle> DependencyVisitor for ReportingVisitor<'_, O> {
    fn visit_resolved_component(&mut self, coordinate: &Coordinate, repository: Option<&str>) {
        let Some(repository) = repository else {
            return;
        };

        match self.oracle.update(coordinate, repository) {
            Ok(StalenessFact::Update(update)) => {
                self.collected.push(CollectedUpdate {
                    coordinate: coordinate.clone(),
                    update,
                });
            }
            Ok(StalenessFact::NoUpdate) | Ok(StalenessFact::NotFound) => {
                self.missing_info.push(coordinate.clone());
            }
            Ok(_) => {}
            Err(e) => {
                self.errors.push(coordinate.clone());
                error!(
                    "Cannot determine dependency age for \"{coordinate}\" and repository \"{repository}\" (reason: {}: {e}).",
                    e.reason()
                );
            }
        }
    }
}
