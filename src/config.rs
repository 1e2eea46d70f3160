//! Configuration for the audit run: thresholds, filters, repositories.

use crate::adapters::{AdapterKind, MAVEN_CENTRAL_SEARCH};
use crate::error::{AuditError, Result};
use crate::format::parse_duration;
use crate::transport::RetryPolicy;
use crate::traversal::TraversalOptions;
use crate::types::Repository;
use crate::validator::{AgeValidator, CumulativeAgeValidator, DependencyValidator};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::path::Path;

/// Main configuration for an audit run
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibyearConfig {
    /// Abort on the first lookup failure instead of tolerating it.
    pub fail_on_error: bool,
    /// Which validator decides the verdict, and its threshold.
    pub validator: ValidatorSpec,
    /// Wildcard patterns selecting modules to audit. Empty = all modules.
    pub include_modules: Vec<String>,
    /// Wildcard patterns selecting modules to skip.
    pub exclude_modules: Vec<String>,
    /// Children deeper than this are not recursed into.
    pub max_transitive_depth: Option<usize>,
    /// Recurse only into direct dependencies; their children are visited as
    /// leaves but not expanded further.
    pub ignore_transitive: bool,
    /// Known artifact sources, by the names the graph refers to them by.
    pub repositories: Vec<Repository>,
    /// Per-repository adapter overrides. Unlisted repositories use
    /// [`LibyearConfig::default_adapter`].
    pub adapters: HashMap<String, AdapterKind>,
    pub default_adapter: AdapterKind,
    pub network: NetworkConfig,
    /// Fixed "now" reference for age computation. Useful for reproducible
    /// runs and tests; defaults to the wall clock.
    pub now: Option<DateTime<Utc>>,
}

impl Default for LibyearConfig {
    fn default() -> Self {
        Self {
            fail_on_error: true,
            validator: ValidatorSpec::default(),
            include_modules: Vec::new(),
            exclude_modules: Vec::new(),
            max_transitive_depth: None,
            ignore_transitive: false,
            repositories: vec![Repository::new("mavenCentral", MAVEN_CENTRAL_SEARCH)],
            adapters: HashMap::new(),
            default_adapter: AdapterKind::SearchApi,
            network: NetworkConfig::default(),
            now: None,
        }
    }
}

/// Validator selection
#[derive(Debug, Clone, Deserialize)]
pub struct ValidatorSpec {
    #[serde(default)]
    pub kind: ValidatorKind,
    /// Threshold, as a human-readable duration ("10 years", "5y", "30d").
    #[serde(default = "default_max_age", deserialize_with = "duration_from_str")]
    pub max_age: Duration,
}

impl Default for ValidatorSpec {
    fn default() -> Self {
        Self {
            kind: ValidatorKind::default(),
            max_age: default_max_age(),
        }
    }
}

impl ValidatorSpec {
    pub fn build(&self) -> Box<dyn DependencyValidator> {
        match self.kind {
            ValidatorKind::SingleAge => Box::new(AgeValidator::new(self.max_age)),
            ValidatorKind::Cumulative => Box::new(CumulativeAgeValidator::new(self.max_age)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidatorKind {
    /// No single dependency may be older than the threshold.
    SingleAge,
    /// All dependencies' ages combined may not exceed the threshold.
    #[default]
    Cumulative,
}

impl std::str::FromStr for ValidatorKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single-age" | "single" => Ok(Self::SingleAge),
            "cumulative" => Ok(Self::Cumulative),
            _ => Err(format!("Unknown validator: {s}")),
        }
    }
}

/// Network configuration for registry lookups
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Retries after the first failed attempt
    pub max_retries: u32,
    /// Delay before the first retry (milliseconds)
    pub initial_retry_delay_ms: u64,
    /// Multiplier applied to the delay after every retry
    pub retry_backoff_multiplier: u32,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
            initial_retry_delay_ms: 2000,
            retry_backoff_multiplier: 2,
        }
    }
}

impl NetworkConfig {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_delay: std::time::Duration::from_millis(self.initial_retry_delay_ms),
            backoff_multiplier: self.retry_backoff_multiplier,
        }
    }
}

fn default_max_age() -> Duration {
    // 10 libyears
    Duration::seconds(31_556_952 * 10)
}

fn duration_from_str<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_duration(&s).map_err(serde::de::Error::custom)
}

impl LibyearConfig {
    /// Load and validate a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AuditError::config(format!(
                "Configuration file not found at {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would only fail later, mid-traversal.
    pub fn validate(&self) -> Result<()> {
        if self.validator.max_age <= Duration::zero() {
            return Err(AuditError::config("validator.max_age must be positive"));
        }

        let mut names = std::collections::HashSet::new();
        for repository in &self.repositories {
            if !names.insert(repository.name.as_str()) {
                return Err(AuditError::config(format!(
                    "Repository \"{}\" is declared twice",
                    repository.name
                )));
            }
        }
        for name in self.adapters.keys() {
            if !names.contains(name.as_str()) {
                return Err(AuditError::config(format!(
                    "Adapter override refers to unknown repository \"{name}\""
                )));
            }
        }
        Ok(())
    }

    pub fn traversal_options(&self) -> TraversalOptions {
        TraversalOptions {
            max_depth: self.max_transitive_depth,
            ignore_transitive: self.ignore_transitive,
            include_modules: self.include_modules.clone(),
            exclude_modules: self.exclude_modules.clone(),
        }
    }

    /// Create a new builder for LibyearConfig
    pub fn builder() -> LibyearConfigBuilder {
        LibyearConfigBuilder::default()
    }
}

/// Builder for LibyearConfig
#[derive(Default)]
pub struct LibyearConfigBuilder {
    config: LibyearConfig,
    repositories: Option<Vec<Repository>>,
}

impl LibyearConfigBuilder {
    pub fn fail_on_error(mut self, fail_on_error: bool) -> Self {
        self.config.fail_on_error = fail_on_error;
        self
    }

    pub fn validator(mut self, kind: ValidatorKind, max_age: Duration) -> Self {
        self.config.validator = ValidatorSpec { kind, max_age };
        self
    }

    pub fn include_module(mut self, pattern: impl Into<String>) -> Self {
        self.config.include_modules.push(pattern.into());
        self
    }

    pub fn exclude_module(mut self, pattern: impl Into<String>) -> Self {
        self.config.exclude_modules.push(pattern.into());
        self
    }

    pub fn max_transitive_depth(mut self, depth: usize) -> Self {
        self.config.max_transitive_depth = Some(depth);
        self
    }

    pub fn ignore_transitive(mut self, ignore: bool) -> Self {
        self.config.ignore_transitive = ignore;
        self
    }

    /// Replaces the default repository set on first use.
    pub fn repository(mut self, repository: Repository) -> Self {
        self.repositories.get_or_insert_with(Vec::new).push(repository);
        self
    }

    pub fn adapter(mut self, repository_name: impl Into<String>, kind: AdapterKind) -> Self {
        self.config.adapters.insert(repository_name.into(), kind);
        self
    }

    pub fn default_adapter(mut self, kind: AdapterKind) -> Self {
        self.config.default_adapter = kind;
        self
    }

    pub fn network(mut self, network: NetworkConfig) -> Self {
        self.config.network = network;
        self
    }

    pub fn now(mut self, now: DateTime<Utc>) -> Self {
        self.config.now = Some(now);
        self
    }

    pub fn build(self) -> Result<LibyearConfig> {
        let mut config = self.config;
        if let Some(repositories) = self.repositories {
            config.repositories = repositories;
        }
        config.validate()?;
        Ok(config)
    }
}
