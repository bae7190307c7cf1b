//! The recovery pipeline.
//!
//! Orchestrates validate -> recover -> re-validate across the two
//! registry tiers:
//!
//! 1. collect-all validation; a clean record returns immediately with
//!    zero results, which makes the pipeline idempotent
//! 2. tier-spec recovery over the leaf violations
//! 3. fail-fast re-validation; clean means done
//! 4. otherwise, collect-all again to get the NEW violation set (spec
//!    fixes may have shifted what fails) and run tier-proto recovery
//! 5. final collect-all validation, purely for the report
//!
//! The record is mutated IN PLACE and ownership stays with the caller;
//! the pipeline never errors on partial failure — the report carries the
//! final outcome either way.

use tracing::{info, warn};

use balprof_core::{Mode, Value, ValidatorConfig, Violation};

use crate::recover::{RecoverResult, Registry};
use crate::schema::ProfileValidator;

/// The full story of one recovery run.
#[derive(Debug, Clone)]
pub struct RecoveryReport {
    /// Top-level violations found before any fix ran.
    pub initial: Vec<Violation>,
    /// Substitutions attempted by the schema-shape tier.
    pub spec_results: Vec<RecoverResult>,
    /// Substitutions attempted by the record-shape tier.
    pub proto_results: Vec<RecoverResult>,
    /// Violations still present after both tiers; empty means the
    /// record re-validates clean.
    pub residual: Vec<Violation>,
}

impl RecoveryReport {
    fn clean() -> Self {
        Self {
            initial: Vec::new(),
            spec_results: Vec::new(),
            proto_results: Vec::new(),
            residual: Vec::new(),
        }
    }

    /// True when the final validation passed.
    pub fn recovered(&self) -> bool {
        self.residual.is_empty()
    }

    /// Results from both tiers, in application order.
    pub fn results(&self) -> impl Iterator<Item = &RecoverResult> {
        self.spec_results.iter().chain(self.proto_results.iter())
    }

    pub fn recovered_count(&self) -> usize {
        self.results().filter(|r| r.recovered).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.results().filter(|r| !r.recovered).count()
    }
}

/// Two-tier recovery over invalid profile records.
#[derive(Debug, Clone)]
pub struct RecoveryPipeline {
    validator: ProfileValidator,
    spec: Registry,
    proto: Registry,
}

impl Default for RecoveryPipeline {
    fn default() -> Self {
        Self::new(ValidatorConfig::default())
    }
}

impl RecoveryPipeline {
    pub fn new(config: ValidatorConfig) -> Self {
        Self {
            validator: ProfileValidator::new(config),
            spec: Registry::spec(),
            proto: Registry::proto(),
        }
    }

    /// Validate `record` and, if it fails, repair what the registries
    /// know how to repair. The record is mutated in place.
    pub fn run(&self, record: &mut Value) -> RecoveryReport {
        let initial = match self.validator.validate(record, Mode::CollectAll) {
            Ok(()) => return RecoveryReport::clean(),
            Err(failure) => failure.violations,
        };

        info!(
            violations = count_leaves(&initial),
            "attempting to recover record"
        );

        let leaves: Vec<&Violation> = initial.iter().flat_map(Violation::leaves).collect();
        let spec_results = self.spec.recover(record, &leaves);

        if self.validator.validate(record, Mode::FailFast).is_ok() {
            info!("record recovered by the spec tier");
            return RecoveryReport {
                initial,
                spec_results,
                proto_results: Vec::new(),
                residual: Vec::new(),
            };
        }

        // The spec tier moved the record; recover against the fresh
        // violation set, not the stale one.
        let remaining = match self.validator.validate(record, Mode::CollectAll) {
            Ok(()) => Vec::new(),
            Err(failure) => failure.violations,
        };
        let leaves: Vec<&Violation> = remaining.iter().flat_map(Violation::leaves).collect();
        let proto_results = self.proto.recover(record, &leaves);

        let residual = match self.validator.validate(record, Mode::CollectAll) {
            Ok(()) => Vec::new(),
            Err(failure) => failure.violations,
        };

        if residual.is_empty() {
            info!("record completely recovered");
        } else {
            warn!(
                violations = count_leaves(&residual),
                "violations remain after recovery"
            );
        }

        RecoveryReport { initial, spec_results, proto_results, residual }
    }
}

fn count_leaves(violations: &[Violation]) -> usize {
    violations.iter().map(|v| v.leaves().len()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ProfileBuilder;

    #[test]
    fn clean_record_short_circuits() {
        let pipeline = RecoveryPipeline::default();
        let mut record = ProfileBuilder::default().build().unwrap().to_generic();
        let report = pipeline.run(&mut record);

        assert!(report.recovered());
        assert!(report.initial.is_empty());
        assert_eq!(report.results().count(), 0);
    }
}
