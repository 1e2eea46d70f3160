//! Audit orchestration: wire configuration, oracle, traversal and policy.

use crate::adapters::VersionAdapter;
use crate::config::LibyearConfig;
use crate::error::Result;
use crate::format::format_approximate;
use crate::oracle::RegistryOracle;
use crate::report::LibyearReport;
use crate::traversal::DependencyTraversal;
use crate::types::DependencyNode;
use crate::validator::{DependencyAge, DependencyValidator, LoggingValidator};
use crate::visitors::{ReportingVisitor, ValidatingVisitor, ValidationConfig};
use chrono::{Duration, Utc};
use std::collections::HashMap;
use tracing::info;

/// Verdict of a validation run.
#[derive(Debug)]
pub struct AuditOutcome {
    pub valid: bool,
    pub threshold: Duration,
    /// Violating dependencies, worst first.
    pub violators: Vec<DependencyAge>,
    /// Total excess over the threshold; `None` when the run is valid.
    pub exceeded_by: Option<Duration>,
}

impl AuditOutcome {
    /// Human-readable failure summary; `None` when the run is valid.
    pub fn failure_summary(&self) -> Option<String> {
        if self.valid {
            return None;
        }

        let mut out = String::from("Too many libyears encountered! These are the main culprits:\n");
        for dep in &self.violators {
            out.push_str(&format!(
                " -> {:<10} from {}\n",
                format_approximate(dep.age),
                dep.coordinate
            ));
        }
        if let Some(exceeded_by) = self.exceeded_by {
            out.push_str(&format!(
                "Libyears threshold of {} exceeded by {}",
                format_approximate(self.threshold),
                format_approximate(exceeded_by)
            ));
        }
        Some(out)
    }
}

/// Result of a reporting run.
#[derive(Debug)]
pub struct ReportOutcome {
    /// Rendered text summary, worst lag first.
    pub summary: String,
    /// Structured report document.
    pub report: LibyearReport,
}

fn build_oracle(config: &LibyearConfig) -> Result<RegistryOracle> {
    let retry = config.network.retry_policy();
    let timeout = config.network.timeout();

    let default_adapter = config.default_adapter.build(retry.clone(), timeout)?;
    let mut adapters: HashMap<String, VersionAdapter> = HashMap::new();
    for (name, kind) in &config.adapters {
        adapters.insert(name.clone(), kind.build(retry.clone(), timeout)?);
    }

    let now = config.now.unwrap_or_else(Utc::now);
    Ok(RegistryOracle::new(
        now,
        default_adapter,
        adapters,
        config.repositories.clone(),
    ))
}

/// Walk the graph, measure every dependency's age and apply the configured
/// validator.
pub fn check_dependencies(root: &DependencyNode, config: &LibyearConfig) -> Result<AuditOutcome> {
    config.validate()?;
    info!("Checking dependency ages for {}", root.coordinate());

    let oracle = build_oracle(config)?;
    let mut validator = LoggingValidator::new(config.validator.build());
    let mut visitor = ValidatingVisitor::new(
        &oracle,
        &mut validator,
        ValidationConfig {
            fail_on_error: config.fail_on_error,
        },
    );

    DependencyTraversal::visit(root, &mut visitor, &config.traversal_options())?;
    if let Some(failure) = visitor.take_failure() {
        return Err(failure);
    }
    drop(visitor);

    let valid = validator.is_valid();
    let threshold = validator.threshold();
    let violators = validator.violators();
    let exceeded_by = if valid {
        None
    } else {
        let total = violators
            .iter()
            .fold(Duration::zero(), |acc, d| acc + d.age);
        Some(total - threshold)
    };

    info!(
        "Check complete: valid={}, {} violator(s)",
        valid,
        violators.len()
    );

    Ok(AuditOutcome {
        valid,
        threshold,
        violators,
        exceeded_by,
    })
}

/// Walk the graph and collect update lag for every dependency, without any
/// pass/fail policy.
pub fn report_dependencies(root: &DependencyNode, config: &LibyearConfig) -> Result<ReportOutcome> {
    config.validate()?;
    info!("Collecting libyear report for {}", root.coordinate());

    let oracle = build_oracle(config)?;
    let mut visitor = ReportingVisitor::new(&oracle);
    DependencyTraversal::visit(root, &mut visitor, &config.traversal_options())?;

    let summary = visitor.render();
    let report = visitor.into_report();
    Ok(ReportOutcome { summary, report })
}
