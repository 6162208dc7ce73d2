//! The public analysis API (§6): `verify_text` / `create_run_and_audit`,
//! the run hash chain, and `AuditArtifact` composition.
//!
//! Everything below this module is pure with respect to `(text, policy)`;
//! the only non-pure inputs accepted here are the wall-clock timestamp and
//! the id generator, both of which are either caller-supplied or resolved
//! to their production defaults at the edges of these two functions.

use crate::canonical::{canonicalize, to_stable_json};
use crate::connector::ModelConnector;
use crate::diagnostics::Diagnostics;
use crate::error::{ChemVerifyError, Result};
use crate::extraction::{default_extractors, CompositeClaimExtractor};
use crate::ids::{IdGenerator, UuidV4Generator};
use crate::model::{ExtractedClaim, Run, RunMode, RunStatus, Status, ValidationFinding};
use crate::policy::{default_profiles, PolicySettings};
use crate::report::{self, AuditReport};
use crate::scoring;
use crate::segmentation;
use crate::validation::{default_validators, ValidationContext, ValidatorPipeline};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Bumped whenever a change to extraction/validation/scoring semantics
/// would change the emitted claims/findings for existing text — this is
/// the `engineVersion` link in the run hash chain, not the crate's own
/// `Cargo.toml` version (which tracks packaging, not engine semantics).
pub const ENGINE_VERSION: &str = "1.0.0";

/// Everything `createRunAndAudit` needs that isn't already resolvable
/// inside this crate (§6).
#[derive(Debug, Clone, Default)]
pub struct RunCommand {
    pub prompt: String,
    pub model_name: String,
    pub user_id: Option<String>,
    pub policy_profile: Option<String>,
    pub output_contract: Option<String>,
    pub connector_name: Option<String>,
    pub model_version: Option<String>,
    pub parameters_json: Option<serde_json::Value>,
}

/// The full result of one audit invocation.
#[derive(Debug, Clone, Serialize)]
pub struct AuditArtifact {
    pub run: Run,
    pub claims: Vec<ExtractedClaim>,
    pub findings: Vec<ValidationFinding>,
    pub report: AuditReport,
    pub diagnostics: Diagnostics,
    pub artifact_hash: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ArtifactHashInput<'a> {
    engine_version: &'a str,
    mode: &'static str,
    run_id: String,
    current_hash: Option<&'a str>,
    created_utc: String,
    model_name: Option<&'a str>,
    risk_score: Option<f64>,
    claim_count: usize,
    finding_count: usize,
}

fn mode_str(mode: RunMode) -> &'static str {
    match mode {
        RunMode::GenerateAndVerify => "GenerateAndVerify",
        RunMode::VerifyOnly => "VerifyOnly",
    }
}

/// `ISO-8601(createdUtc)` with millisecond precision and a literal `Z`
/// offset, matching what every other ISO-8601 timestamp in this crate's
/// test fixtures uses.
pub fn iso8601(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// `SHA256(previousHash || engineVersion || mode || policyProfile ||
/// canonicalPrompt || canonicalAnalyzedText || ISO-8601(createdUtc) ||
/// modelName)`, lowercase hex (§6).
#[allow(clippy::too_many_arguments)]
pub fn compute_run_hash(
    previous_hash: Option<&str>,
    engine_version: &str,
    mode: RunMode,
    policy_profile: &str,
    prompt: &str,
    analyzed_text: &str,
    created_utc: DateTime<Utc>,
    model_name: &str,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(previous_hash.unwrap_or(""));
    hasher.update(engine_version);
    hasher.update(mode_str(mode));
    hasher.update(policy_profile);
    hasher.update(canonicalize(prompt));
    hasher.update(canonicalize(analyzed_text));
    hasher.update(iso8601(created_utc));
    hasher.update(model_name);
    hex::encode(hasher.finalize())
}

fn compute_artifact_hash(run: &Run, claim_count: usize, finding_count: usize) -> String {
    let input = ArtifactHashInput {
        engine_version: ENGINE_VERSION,
        mode: mode_str(run.mode),
        run_id: run.id.to_string(),
        current_hash: run.current_hash.as_deref(),
        created_utc: iso8601(run.created_utc),
        model_name: run.model_name.as_deref(),
        risk_score: run.risk_score,
        claim_count,
        finding_count,
    };
    let json = to_stable_json(&input);
    let mut hasher = Sha256::new();
    hasher.update(json);
    hex::encode(hasher.finalize())
}

fn resolve_policy(policy_profile_name: Option<&str>) -> Result<(String, PolicySettings)> {
    let profiles = default_profiles();
    match policy_profile_name {
        None => Ok(("Default".to_string(), PolicySettings::default())),
        Some(name) => profiles
            .get(name)
            .cloned()
            .map(|p| (name.to_string(), p))
            .ok_or_else(|| ChemVerifyError::UnknownPolicyProfile(name.to_string())),
    }
}

/// Runs the full pipeline (segmentation -> extraction -> validation ->
/// enrichment -> scoring -> report) over an already-populated `Run` whose
/// `analyzed_text()` is ready, then finishes composing `run` in place.
fn audit(
    mut run: Run,
    policy_profile_name: &str,
    policy: &PolicySettings,
    ids: &dyn IdGenerator,
) -> AuditArtifact {
    let analyzed_text = run.analyzed_text().to_string();
    let segmented = segmentation::analyze(&analyzed_text);

    let composite = CompositeClaimExtractor::new(default_extractors());
    let (claims, extractor_diagnostics) =
        composite.extract(run.id, &analyzed_text, &segmented.steps, ids);

    let context = ValidationContext {
        steps: &segmented.steps,
        roles: &segmented.roles,
        is_procedural: segmented.context.is_procedural,
        references_offset: segmented.context.references_start_offset,
    };

    let pipeline = ValidatorPipeline::new(default_validators());
    let mut findings = pipeline.run(run.id, &claims, &run, &context, policy, ids);

    let mut diagnostics = Diagnostics::default();
    for diag in &extractor_diagnostics {
        diagnostics.failed_extractors.push(diag.source_name.to_string());
        findings.push(crate::validation::new_finding(
            ids,
            run.id,
            None,
            diag.source_name,
            None,
            Status::Unverified,
            diag.message.clone(),
            0.0,
            None,
            None,
            None,
        ));
    }
    // Validator-panic diagnostics are already folded into `findings` by
    // `ValidatorPipeline::run`; recover their names for the summary here
    // without re-running anything.
    for finding in &findings {
        if finding.status == Status::Unverified
            && finding.message.starts_with("Validator failed: ")
            && finding.kind.is_none()
        {
            diagnostics.failed_validators.push(finding.validator_name.clone());
        }
    }

    let risk_score = scoring::score(&findings, policy);
    run.risk_score = Some(risk_score);

    run.current_hash = Some(compute_run_hash(
        run.previous_hash.as_deref(),
        ENGINE_VERSION,
        run.mode,
        policy_profile_name,
        run.prompt.as_deref().unwrap_or(""),
        &analyzed_text,
        run.created_utc,
        run.model_name.as_deref().unwrap_or(""),
    ));

    let report = report::build(risk_score, &claims, &mut findings, Some(policy_profile_name));
    let artifact_hash = compute_artifact_hash(&run, claims.len(), findings.len());

    AuditArtifact {
        run,
        claims,
        findings,
        report,
        diagnostics,
        artifact_hash,
    }
}

/// `verifyText` (§6): analyzes supplied text directly, `VerifyOnly` mode.
pub fn verify_text(text: &str, policy_profile_name: Option<&str>) -> AuditArtifact {
    verify_text_with(text, policy_profile_name, &UuidV4Generator, None, Utc::now())
}

/// Analyzes `text` under a caller-supplied `policy`, bypassing the
/// built-in profile-name lookup entirely. This is the seam a front end
/// that loads `PolicySettings` from its own configuration source (e.g. a
/// TOML file) uses: the core never reads policy files itself, but it does
/// accept an already-parsed policy directly.
pub fn verify_text_with_policy(text: &str, profile_name: &str, policy: &PolicySettings) -> AuditArtifact {
    let run = Run {
        id: UuidV4Generator.next_id(),
        created_utc: Utc::now(),
        mode: RunMode::VerifyOnly,
        prompt: None,
        generated_output: None,
        input_text: Some(canonicalize(text)),
        policy_profile: profile_name.to_string(),
        previous_hash: None,
        current_hash: None,
        risk_score: None,
        model_name: None,
        status: RunStatus::Completed,
    };
    audit(run, profile_name, policy, &UuidV4Generator)
}

/// Same as [`verify_text`] but with an injected id generator, previous
/// hash, and timestamp — the seam golden/determinism tests use.
pub fn verify_text_with(
    text: &str,
    policy_profile_name: Option<&str>,
    ids: &dyn IdGenerator,
    previous_hash: Option<String>,
    created_utc: DateTime<Utc>,
) -> AuditArtifact {
    let (profile_name, policy) = match resolve_policy(policy_profile_name) {
        Ok(resolved) => resolved,
        Err(_) => (
            policy_profile_name.unwrap_or("Default").to_string(),
            PolicySettings::default(),
        ),
    };

    let run = Run {
        id: ids.next_id(),
        created_utc,
        mode: RunMode::VerifyOnly,
        prompt: None,
        generated_output: None,
        input_text: Some(canonicalize(text)),
        policy_profile: profile_name.clone(),
        previous_hash,
        current_hash: None,
        risk_score: None,
        model_name: None,
        status: RunStatus::Completed,
    };

    audit(run, &profile_name, &policy, ids)
}

/// `createRunAndAudit` (§6): generate-and-verify mode. On connector
/// failure, forces risk to 1.0 and emits a single Pipeline Fail finding
/// per §7; on success, analyzes the generated text exactly as
/// `verify_text` would.
pub fn create_run_and_audit(
    cmd: RunCommand,
    connector: &dyn ModelConnector,
) -> AuditArtifact {
    create_run_and_audit_with(cmd, connector, &UuidV4Generator, None, Utc::now())
}

pub fn create_run_and_audit_with(
    cmd: RunCommand,
    connector: &dyn ModelConnector,
    ids: &dyn IdGenerator,
    previous_hash: Option<String>,
    created_utc: DateTime<Utc>,
) -> AuditArtifact {
    let (profile_name, policy) = match resolve_policy(cmd.policy_profile.as_deref()) {
        Ok(resolved) => resolved,
        Err(_) => (
            cmd.policy_profile.clone().unwrap_or_else(|| "Default".to_string()),
            PolicySettings::default(),
        ),
    };

    let run_id: Uuid = ids.next_id();

    match connector.generate(&cmd.prompt, &cmd.model_name) {
        Ok(generated) => {
            let run = Run {
                id: run_id,
                created_utc,
                mode: RunMode::GenerateAndVerify,
                prompt: Some(canonicalize(&cmd.prompt)),
                generated_output: Some(canonicalize(&generated)),
                input_text: None,
                policy_profile: profile_name.clone(),
                previous_hash,
                current_hash: None,
                risk_score: None,
                model_name: Some(cmd.model_name.clone()),
                status: RunStatus::Completed,
            };
            audit(run, &profile_name, &policy, ids)
        }
        Err(message) => failed_pipeline_artifact(
            cmd, profile_name, run_id, previous_hash, created_utc, ids, message,
        ),
    }
}

/// Builds the forced-failure artifact the generate-and-verify contract
/// requires (§7): status `Failed`, risk score `1.0`, exactly one Pipeline
/// Fail finding, persistence still succeeds (the artifact is always
/// returned, never an `Err`).
fn failed_pipeline_artifact(
    cmd: RunCommand,
    profile_name: String,
    run_id: Uuid,
    previous_hash: Option<String>,
    created_utc: DateTime<Utc>,
    ids: &dyn IdGenerator,
    message: String,
) -> AuditArtifact {
    let mut run = Run {
        id: run_id,
        created_utc,
        mode: RunMode::GenerateAndVerify,
        prompt: Some(canonicalize(&cmd.prompt)),
        generated_output: None,
        input_text: None,
        policy_profile: profile_name.clone(),
        previous_hash,
        current_hash: None,
        risk_score: Some(1.0),
        model_name: Some(cmd.model_name.clone()),
        status: RunStatus::Failed,
    };

    run.current_hash = Some(compute_run_hash(
        run.previous_hash.as_deref(),
        ENGINE_VERSION,
        run.mode,
        &profile_name,
        run.prompt.as_deref().unwrap_or(""),
        "",
        run.created_utc,
        run.model_name.as_deref().unwrap_or(""),
    ));

    let finding = crate::validation::new_finding(
        ids,
        run.id,
        None,
        "Pipeline",
        None,
        Status::Fail,
        format!("Generation failed: {message}"),
        1.0,
        None,
        None,
        None,
    );
    let mut findings = vec![finding];

    let report = report::build(1.0, &[], &mut findings, Some(profile_name.as_str()));
    let artifact_hash = compute_artifact_hash(&run, 0, findings.len());

    AuditArtifact {
        run,
        claims: Vec::new(),
        findings,
        report,
        diagnostics: Diagnostics::default(),
        artifact_hash,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::EchoConnector;
    use crate::ids::SequentialIdGenerator;

    #[test]
    fn verify_text_is_deterministic_modulo_ids() {
        let text = "Benzaldehyde (1.06 g, 10 mmol) was dissolved in 10 mL of MeOH. NaBH4 (0.38 g, 10 mmol) was added in portions.";
        let ids_a = SequentialIdGenerator::new();
        let ids_b = SequentialIdGenerator::new();
        let created = DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc);

        let a = verify_text_with(text, None, &ids_a, None, created);
        let b = verify_text_with(text, None, &ids_b, None, created);

        assert_eq!(a.run.risk_score, b.run.risk_score);
        assert_eq!(a.claims.len(), b.claims.len());
        assert_eq!(a.findings.len(), b.findings.len());
        assert_eq!(a.report.summary, b.report.summary);
        assert_eq!(a.run.current_hash, b.run.current_hash);
    }

    #[test]
    fn verify_text_with_policy_honors_supplied_settings() {
        let mut policy = PolicySettings::default();
        policy.excluded_validators.push("DoiFormatValidator".to_string());
        let artifact = verify_text_with_policy("See DOI: 10.1038/NOT#A#DOI.", "Custom", &policy);
        assert!(!artifact
            .findings
            .iter()
            .any(|f| f.validator_name == "DoiFormatValidator"));
        assert_eq!(artifact.run.policy_profile, "Custom");
    }

    #[test]
    fn unknown_policy_profile_falls_back_to_default() {
        let artifact = verify_text("Add water.", Some("NoSuchProfile"));
        assert_eq!(artifact.run.policy_profile, "NoSuchProfile");
    }

    #[test]
    fn connector_failure_forces_risk_to_one() {
        let cmd = RunCommand {
            prompt: "Synthesize aspirin.".to_string(),
            model_name: "test-model".to_string(),
            ..Default::default()
        };
        let artifact = create_run_and_audit(cmd, &EchoConnector::failing());
        assert_eq!(artifact.run.risk_score, Some(1.0));
        assert_eq!(artifact.run.status, RunStatus::Failed);
        assert_eq!(artifact.findings.len(), 1);
        assert_eq!(artifact.findings[0].validator_name, "Pipeline");
    }

    #[test]
    fn connector_success_analyzes_generated_text() {
        let cmd = RunCommand {
            prompt: "The mixture was stirred for 2 h at room temperature.".to_string(),
            model_name: "test-model".to_string(),
            ..Default::default()
        };
        let artifact = create_run_and_audit(cmd, &EchoConnector::new());
        assert_eq!(artifact.run.status, RunStatus::Completed);
        assert!(!artifact.claims.is_empty());
    }
}
