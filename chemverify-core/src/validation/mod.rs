//! Validator pipeline: a uniform plug-in surface over claims + analyzed
//! text, with policy gating, fault isolation, and evidence enrichment.

pub mod concentration_sanity;
pub mod doi_format;
pub mod dry_inert_mismatch;
pub mod enrichment;
pub mod equivalents;
pub mod incompatible_reagent_solvent;
pub mod incomplete_claim;
pub mod malformed_token;
pub mod missing_quench;
pub mod missing_solvent;
pub mod missing_temperature;
pub mod mixed_citation;
pub mod mw_consistency;
pub mod numeric_contradiction;
pub mod placeholder_token;
pub mod yield_mass;

use crate::ids::IdGenerator;
use crate::model::{ExtractedClaim, FindingKind, Run, Severity, StepRole, TextStep, ValidationFinding};
use std::panic::{catch_unwind, AssertUnwindSafe};
use uuid::Uuid;

/// Static metadata attached to a validator's stable id.
#[derive(Debug, Clone, Copy)]
pub struct ValidatorMetadata {
    pub id: &'static str,
    pub kind: Option<FindingKind>,
    pub default_weight: f64,
    pub default_severity: Severity,
    pub description: &'static str,
}

/// Segmentation context every validator receives alongside claims + run.
pub struct ValidationContext<'a> {
    pub steps: &'a [TextStep],
    pub roles: &'a [StepRole],
    pub is_procedural: bool,
    pub references_offset: Option<usize>,
}

impl<'a> ValidationContext<'a> {
    pub fn role_of(&self, step_index: usize) -> Option<StepRole> {
        self.roles.get(step_index).copied()
    }
}

pub trait Validator {
    fn name(&self) -> &'static str;
    fn metadata(&self) -> ValidatorMetadata;
    fn validate(
        &self,
        run_id: Uuid,
        claims: &[ExtractedClaim],
        run: &Run,
        context: &ValidationContext,
        ids: &dyn IdGenerator,
    ) -> Vec<ValidationFinding>;
}

/// Registration-order roster. Order is load-bearing: it is the order
/// findings for a given input are produced in.
pub fn default_validators() -> Vec<Box<dyn Validator>> {
    vec![
        Box::new(numeric_contradiction::NumericContradictionValidator),
        Box::new(doi_format::DoiFormatValidator),
        Box::new(incompatible_reagent_solvent::IncompatibleReagentSolventValidator),
        Box::new(missing_solvent::MissingSolventValidator),
        Box::new(missing_temperature::MissingTemperatureWhenImpliedValidator),
        Box::new(missing_quench::QuenchWhenReactiveReagentValidator),
        Box::new(dry_inert_mismatch::DryInertMismatchValidator),
        Box::new(equivalents::EquivalentsConsistencyValidator),
        Box::new(mw_consistency::MwConsistencyValidator),
        Box::new(yield_mass::YieldMassConsistencyValidator),
        Box::new(malformed_token::MalformedChemicalTokenValidator),
        Box::new(incomplete_claim::IncompleteScientificClaimValidator),
        Box::new(placeholder_token::PlaceholderTokenValidator),
        Box::new(mixed_citation::MixedCitationStyleValidator),
        Box::new(concentration_sanity::ConcentrationSanityValidator),
    ]
}

/// Builds a finding with every evidence field left `None` for
/// `enrichment::enrich` to fill in later.
pub(crate) fn new_finding(
    ids: &dyn IdGenerator,
    run_id: Uuid,
    claim_id: Option<Uuid>,
    validator_name: &'static str,
    metadata: Option<&ValidatorMetadata>,
    status: crate::model::Status,
    message: String,
    confidence: f64,
    kind: Option<FindingKind>,
    payload: Option<serde_json::Value>,
    evidence_ref: Option<String>,
) -> ValidationFinding {
    let rule_id = metadata.map(|m| m.id.to_string());
    ValidationFinding {
        id: ids.next_id(),
        run_id,
        claim_id,
        validator_name: validator_name.to_string(),
        rule_id: rule_id.or_else(|| Some(validator_name.to_string())),
        rule_version: Some("1.0.0".to_string()),
        status,
        message,
        confidence,
        kind,
        payload,
        evidence_ref,
        evidence_start_offset: None,
        evidence_end_offset: None,
        evidence_step_index: None,
        evidence_entity_key: None,
        evidence_snippet: None,
    }
}

/// One diagnostic record produced when a validator panics.
#[derive(Debug, Clone)]
pub struct ValidationDiagnostic {
    pub source_name: &'static str,
    pub message: String,
}

/// Runs every registered validator, in order, honoring `policy`'s
/// include/exclude gating, isolating panics into diagnostic Unverified
/// findings, then enriches every finding's evidence fields.
pub struct ValidatorPipeline {
    validators: Vec<Box<dyn Validator>>,
}

impl ValidatorPipeline {
    pub fn new(validators: Vec<Box<dyn Validator>>) -> Self {
        Self { validators }
    }

    pub fn run(
        &self,
        run_id: Uuid,
        claims: &[ExtractedClaim],
        run: &Run,
        context: &ValidationContext,
        policy: &crate::policy::PolicySettings,
        ids: &dyn IdGenerator,
    ) -> Vec<ValidationFinding> {
        let mut findings = Vec::new();

        for validator in &self.validators {
            if !policy.is_validator_enabled(validator.name()) {
                continue;
            }

            let result = catch_unwind(AssertUnwindSafe(|| {
                validator.validate(run_id, claims, run, context, ids)
            }));

            match result {
                Ok(mut found) => findings.append(&mut found),
                Err(panic) => {
                    let message = crate::util::panic_message(&panic);
                    tracing::warn!(validator = validator.name(), %message, "validator failed");
                    findings.push(new_finding(
                        ids,
                        run_id,
                        None,
                        validator.name(),
                        None,
                        crate::model::Status::Unverified,
                        format!("Validator failed: {message}"),
                        0.0,
                        None,
                        None,
                        None,
                    ));
                }
            }
        }

        enrichment::enrich(&mut findings, claims, run.analyzed_text());
        findings
    }
}
