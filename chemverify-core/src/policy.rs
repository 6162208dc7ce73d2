//! Policy-driven validator inclusion/exclusion and weight overrides.
//!
//! The core never reads policy *files* — that is the CLI's job
//! (`SPEC_FULL.md` "Configuration"). This module only defines the parsed
//! shape and the two built-in profiles referenced by the spec's testable
//! scenarios.

use std::collections::BTreeMap;

/// Resolved policy for one audit invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicySettings {
    /// If non-empty, only these validator names run.
    pub included_validators: Vec<String>,
    /// Skipped unless already excluded by a non-empty `included_validators`.
    pub excluded_validators: Vec<String>,
    /// Per-validator-name Fail-weight override for `RiskScorer`'s base
    /// score formula (replaces the default `1.0`).
    pub weight_overrides: BTreeMap<String, f64>,
    /// When set, a Fail from `DoiFormatValidator` counts as `0.15` instead
    /// of `1.0` in the base score.
    pub dampen_doi_fail_severity: bool,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            included_validators: Vec::new(),
            excluded_validators: Vec::new(),
            weight_overrides: BTreeMap::new(),
            dampen_doi_fail_severity: false,
        }
    }
}

impl PolicySettings {
    pub fn is_validator_enabled(&self, name: &str) -> bool {
        if !self.included_validators.is_empty() && !self.included_validators.iter().any(|n| n == name) {
            return false;
        }
        !self.excluded_validators.iter().any(|n| n == name)
    }

    pub fn weight_for(&self, validator_name: &str, default: f64) -> f64 {
        self.weight_overrides
            .get(validator_name)
            .copied()
            .unwrap_or(default)
    }
}

/// Returns the two named profiles the spec's scenario 6 relies on.
///
/// `StrictChemistryV0` runs every validator at full severity.
/// `ScientificTextV0` dampens DOI-format and citation-style noise so
/// manuscript-style prose (which legitimately cites in author-year style
/// alongside the occasional malformed DOI) doesn't get flagged Critical.
pub fn default_profiles() -> BTreeMap<String, PolicySettings> {
    let mut profiles = BTreeMap::new();

    profiles.insert(
        "StrictChemistryV0".to_string(),
        PolicySettings::default(),
    );

    profiles.insert(
        "ScientificTextV0".to_string(),
        PolicySettings {
            included_validators: Vec::new(),
            excluded_validators: Vec::new(),
            weight_overrides: BTreeMap::new(),
            dampen_doi_fail_severity: true,
        },
    );

    profiles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profiles_contains_both_names() {
        let profiles = default_profiles();
        assert!(profiles.contains_key("StrictChemistryV0"));
        assert!(profiles.contains_key("ScientificTextV0"));
        assert!(profiles["ScientificTextV0"].dampen_doi_fail_severity);
        assert!(!profiles["StrictChemistryV0"].dampen_doi_fail_severity);
    }

    #[test]
    fn include_exclude_gating() {
        let mut policy = PolicySettings::default();
        assert!(policy.is_validator_enabled("Anything"));

        policy.excluded_validators.push("Foo".to_string());
        assert!(!policy.is_validator_enabled("Foo"));
        assert!(policy.is_validator_enabled("Bar"));

        policy.included_validators.push("Bar".to_string());
        assert!(policy.is_validator_enabled("Bar"));
        assert!(!policy.is_validator_enabled("Baz"));
    }
}
