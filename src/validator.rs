//! Validator strategies turning per-dependency ages into a verdict.

use crate::format::format_approximate;
use crate::types::Coordinate;
use chrono::Duration;
use tracing::debug;

/// One accepted age fact: a coordinate and how old it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyAge {
    pub coordinate: Coordinate,
    pub age: Duration,
}

impl DependencyAge {
    pub fn new(coordinate: Coordinate, age: Duration) -> Self {
        Self { coordinate, age }
    }
}

/// A policy deciding whether a stream of age facts is acceptable.
///
/// Validators are oblivious to where an age came from; they consume
/// `(coordinate, age)` pairs and nothing else. Once invalid, a validator
/// never becomes valid again within the same run.
pub trait DependencyValidator {
    fn add(&mut self, dep: DependencyAge);

    fn is_valid(&self) -> bool;

    fn threshold(&self) -> Duration;

    /// Violating facts, worst first.
    fn violators(&self) -> Vec<DependencyAge>;

    /// Identity used in logging.
    fn name(&self) -> &'static str;
}

/// No single dependency may be older than the threshold.
///
/// The first breach invalidates the run permanently; the single worst
/// offender seen so far is kept for reporting.
pub struct AgeValidator {
    max_age: Duration,
    violator: Option<DependencyAge>,
}

impl AgeValidator {
    pub fn new(max_age: Duration) -> Self {
        Self {
            max_age,
            violator: None,
        }
    }
}

impl DependencyValidator for AgeValidator {
    fn add(&mut self, dep: DependencyAge) {
        if dep.age <= self.max_age {
            return;
        }
        let worse = self.violator.as_ref().map_or(true, |v| dep.age > v.age);
        if worse {
            self.violator = Some(dep);
        }
    }

    fn is_valid(&self) -> bool {
        self.violator.is_none()
    }

    fn threshold(&self) -> Duration {
        self.max_age
    }

    fn violators(&self) -> Vec<DependencyAge> {
        self.violator.iter().cloned().collect()
    }

    fn name(&self) -> &'static str {
        "AgeValidator"
    }
}

/// The ages of all dependencies combined may not exceed the threshold.
///
/// Only strictly positive ages count; the running sum never shrinks.
pub struct CumulativeAgeValidator {
    max_age: Duration,
    collected: Vec<DependencyAge>,
}

impl CumulativeAgeValidator {
    pub fn new(max_age: Duration) -> Self {
        Self {
            max_age,
            collected: Vec::new(),
        }
    }

    pub fn cumulative_age(&self) -> Duration {
        self.collected
            .iter()
            .fold(Duration::zero(), |acc, d| acc + d.age)
    }
}

impl DependencyValidator for CumulativeAgeValidator {
    fn add(&mut self, dep: DependencyAge) {
        if dep.age > Duration::zero() {
            self.collected.push(dep);
        }
    }

    fn is_valid(&self) -> bool {
        self.cumulative_age() <= self.max_age
    }

    fn threshold(&self) -> Duration {
        self.max_age
    }

    fn violators(&self) -> Vec<DependencyAge> {
        let mut sorted = self.collected.clone();
        sorted.sort_by(|a, b| b.age.cmp(&a.age).then_with(|| a.coordinate.cmp(&b.coordinate)));
        sorted
    }

    fn name(&self) -> &'static str {
        "CumulativeAgeValidator"
    }
}

/// Pure decorator: logs every accepted fact and every validity check at
/// debug level, forwards everything unchanged.
pub struct LoggingValidator {
    inner: Box<dyn DependencyValidator>,
}

impl LoggingValidator {
    pub fn new(inner: Box<dyn DependencyValidator>) -> Self {
        Self { inner }
    }
}

impl DependencyValidator for LoggingValidator {
    fn add(&mut self, dep: DependencyAge) {
        debug!(
            "Adding {} of age {}",
            dep.coordinate,
            format_approximate(dep.age)
        );
        self.inner.add(dep);
    }

    fn is_valid(&self) -> bool {
        let valid = self.inner.is_valid();
        debug!("Validator [{}] valid: {}", self.inner.name(), valid);
        valid
    }

    fn threshold(&self) -> Duration {
        self.inner.threshold()
    }

    fn violators(&self) -> Vec<DependencyAge> {
        self.inner.violators()
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commons_text() -> Coordinate {
        Coordinate::new("org.apache.commons", "commons-text", "1.8")
    }

    fn commons_collections() -> Coordinate {
        Coordinate::new("org.apache.commons", "commons-collections4", "4.4")
    }

    mod age_validator {
        use super::*;

        #[test]
        fn within_threshold_is_valid() {
            let mut validator = AgeValidator::new(Duration::seconds(5));
            validator.add(DependencyAge::new(commons_text(), Duration::seconds(1)));
            assert!(validator.is_valid());
            assert!(validator.violators().is_empty());
        }

        #[test]
        fn single_breach_invalidates() {
            let mut validator = AgeValidator::new(Duration::seconds(1));
            validator.add(DependencyAge::new(commons_text(), Duration::seconds(5)));
            assert!(!validator.is_valid());
            assert_eq!(
                validator.violators(),
                vec![DependencyAge::new(commons_text(), Duration::seconds(5))]
            );
        }

        #[test]
        fn invalidity_is_permanent() {
            let mut validator = AgeValidator::new(Duration::seconds(1));
            validator.add(DependencyAge::new(commons_text(), Duration::seconds(5)));
            validator.add(DependencyAge::new(commons_collections(), Duration::zero()));
            assert!(!validator.is_valid());
        }

        #[test]
        fn keeps_the_worst_offender() {
            let mut validator = AgeValidator::new(Duration::seconds(1));
            validator.add(DependencyAge::new(commons_text(), Duration::seconds(5)));
            validator.add(DependencyAge::new(commons_collections(), Duration::seconds(3)));
            assert_eq!(
                validator.violators(),
                vec![DependencyAge::new(commons_text(), Duration::seconds(5))]
            );
        }

        #[test]
        fn exposes_threshold() {
            let validator = AgeValidator::new(Duration::seconds(1));
            assert_eq!(validator.threshold(), Duration::seconds(1));
        }
    }

    mod cumulative_age_validator {
        use super::*;

        #[test]
        fn sum_within_threshold_is_valid() {
            let mut validator = CumulativeAgeValidator::new(Duration::seconds(5));
            validator.add(DependencyAge::new(commons_text(), Duration::seconds(1)));
            validator.add(DependencyAge::new(commons_collections(), Duration::seconds(3)));
            assert!(validator.is_valid());
        }

        #[test]
        fn sum_over_threshold_is_invalid() {
            let mut validator = CumulativeAgeValidator::new(Duration::seconds(3));
            validator.add(DependencyAge::new(commons_text(), Duration::seconds(2)));
            validator.add(DependencyAge::new(commons_collections(), Duration::seconds(3)));
            assert!(!validator.is_valid());
        }

        #[test]
        fn sum_exactly_at_threshold_is_still_valid() {
            let mut validator = CumulativeAgeValidator::new(Duration::seconds(5));
            validator.add(DependencyAge::new(commons_text(), Duration::seconds(5)));
            assert!(validator.is_valid());
        }

        #[test]
        fn zero_and_negative_ages_never_change_validity() {
            let mut validator = CumulativeAgeValidator::new(Duration::seconds(1));
            validator.add(DependencyAge::new(commons_text(), Duration::zero()));
            validator.add(DependencyAge::new(commons_collections(), Duration::seconds(-5)));
            assert!(validator.is_valid());
            assert!(validator.violators().is_empty());
        }

        #[test]
        fn violators_are_sorted_by_descending_age() {
            let mut validator = CumulativeAgeValidator::new(Duration::seconds(1));
            validator.add(DependencyAge::new(commons_text(), Duration::seconds(5)));
            validator.add(DependencyAge::new(commons_collections(), Duration::seconds(42)));
            assert_eq!(
                validator.violators(),
                vec![
                    DependencyAge::new(commons_collections(), Duration::seconds(42)),
                    DependencyAge::new(commons_text(), Duration::seconds(5)),
                ]
            );
        }

        #[test]
        fn age_ties_break_by_coordinate() {
            let mut validator = CumulativeAgeValidator::new(Duration::seconds(1));
            validator.add(DependencyAge::new(commons_text(), Duration::seconds(5)));
            validator.add(DependencyAge::new(commons_collections(), Duration::seconds(5)));
            let violators = validator.violators();
            // commons-collections4 sorts before commons-text.
            assert_eq!(violators[0].coordinate, commons_collections());
            assert_eq!(violators[1].coordinate, commons_text());
        }

        #[test]
        fn exposes_threshold() {
            let validator = CumulativeAgeValidator::new(Duration::seconds(1));
            assert_eq!(validator.threshold(), Duration::seconds(1));
        }
    }

    mod logging_validator {
        use super::*;

        #[test]
        fn forwards_everything_unchanged() {
            let mut validator =
                LoggingValidator::new(Box::new(CumulativeAgeValidator::new(Duration::seconds(3))));
            validator.add(DependencyAge::new(commons_text(), Duration::seconds(5)));
            assert!(!validator.is_valid());
            assert_eq!(validator.threshold(), Duration::seconds(3));
            assert_eq!(
                validator.violators(),
                vec![DependencyAge::new(commons_text(), Duration::seconds(5))]
            );
            assert_eq!(validator.name(), "CumulativeAgeValidator");
        }
    }
}
