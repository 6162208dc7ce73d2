//! Core data model: `Run`, `ExtractedClaim`, `ValidationFinding`, `TextStep`
//! and the closed vocabularies they draw on.
//!
//! Findings and claims reference each other by id (`Uuid`), never by
//! pointer or reference — this keeps the types trivially `Send + Sync`
//! and serializable, and mirrors how the persistence layer (out of scope
//! here) is expected to store them verbatim.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a run's analyzed text came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunMode {
    GenerateAndVerify,
    VerifyOnly,
}

/// Outcome of one audit invocation. `Failed` is reserved for the
/// generate-and-verify pipeline-failure contract (§7): a `ModelConnector`
/// error forces risk to 1.0 and a single Pipeline Fail finding, but
/// persistence must still succeed, so the run itself is never an `Err`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Completed,
    Failed,
}

/// Closed set of claim kinds the extractor pipeline can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimKind {
    NumericWithUnit,
    CitationDoi,
    ReagentMention,
    SolventMention,
    AtmosphereCondition,
    DrynessCondition,
    SymbolicTemperature,
}

/// Finding status. Pass/Fail are definite verdicts; Unverified covers both
/// "not comparable" situations and diagnostic extractor/validator failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Pass,
    Fail,
    Unverified,
}

/// Closed vocabulary for a finding's semantic category (see GLOSSARY).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FindingKind {
    NotCheckable,
    MissingEvidence,
    MultiScenario,
    Contradiction,
    IncompatibleReagentSolvent,
    MissingSolvent,
    MissingTemperature,
    NotComparable,
    MalformedChemicalToken,
    UnsupportedOrIncompleteClaim,
    CitationTraceabilityWeak,
    MissingQuench,
    AmbiguousWorkupTransition,
    EquivInconsistent,
    CrossStepConditionVariation,
    PlaceholderOrMissingToken,
    MwConsistent,
    MwImplausible,
    YieldMassInconsistent,
}

/// Report/SARIF severity classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Step role assigned by `StepRoleClassifier`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepRole {
    Procedure,
    Narrative,
    QuestionOrPrompt,
    Reference,
    Header,
}

/// A half-open `[start_offset, end_offset)` character span produced by the
/// segmenter, covering the analyzed text gap-free modulo segmentation
/// boundaries. `index` values form a dense zero-based prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStep {
    pub index: usize,
    pub start_offset: usize,
    pub end_offset: usize,
}

impl TextStep {
    pub fn contains(&self, offset: usize) -> bool {
        self.start_offset <= offset && offset < self.end_offset
    }

    pub fn text<'a>(&self, analyzed_text: &'a str) -> &'a str {
        &analyzed_text[self.start_offset..self.end_offset]
    }
}

/// A typed, position-anchored interpretation of a token span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedClaim {
    pub id: Uuid,
    pub run_id: Uuid,
    pub kind: ClaimKind,
    pub raw_text: String,
    pub normalized_value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    /// `AnalyzedText:START-END`, half-open, chars of the analyzed text.
    pub source_locator: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_index: Option<usize>,
}

impl ExtractedClaim {
    /// Parses `start`/`end` out of `source_locator`. Returns `None` if the
    /// locator isn't in `AnalyzedText:START-END` form (never expected for
    /// claims produced by this crate's extractors, but parsed defensively
    /// since persistence round-trips the field as an opaque string).
    pub fn locator_span(&self) -> Option<(usize, usize)> {
        parse_analyzed_text_locator(&self.source_locator)
    }
}

/// Parses an `AnalyzedText:START-END` token. Malformed tokens yield `None`
/// rather than panicking (see §7: malformed payloads fall back to neutral
/// defaults, never produce a finding by themselves).
pub fn parse_analyzed_text_locator(locator: &str) -> Option<(usize, usize)> {
    let rest = locator.strip_prefix("AnalyzedText:")?;
    let (start, end) = rest.split_once('-')?;
    let start: usize = start.parse().ok()?;
    let end: usize = end.parse().ok()?;
    Some((start, end))
}

pub fn analyzed_text_locator(start: usize, end: usize) -> String {
    format!("AnalyzedText:{start}-{end}")
}

/// A validator's verdict about one or more claims, or about the raw text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationFinding {
    pub id: Uuid,
    pub run_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_id: Option<Uuid>,
    pub validator_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_version: Option<String>,
    pub status: Status,
    pub message: String,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<FindingKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    /// Raw `AnalyzedText:START-END` reference used by `EvidenceEnricher`
    /// when the finding lacks a `claim_id` to follow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_start_offset: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_end_offset: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_step_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_entity_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_snippet: Option<String>,
}

impl ValidationFinding {
    pub fn has_evidence_offsets(&self) -> bool {
        self.evidence_start_offset.is_some()
    }
}

/// A single audit invocation: mode, inputs, resolved policy, hash chain
/// links, and the final risk score once scoring completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub id: Uuid,
    pub created_utc: chrono::DateTime<chrono::Utc>,
    pub mode: RunMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_text: Option<String>,
    pub policy_profile: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    pub status: RunStatus,
}

impl Run {
    /// The text the pipeline actually analyzes: `generated_output` in
    /// `GenerateAndVerify` mode, otherwise `input_text`.
    pub fn analyzed_text(&self) -> &str {
        match self.mode {
            RunMode::GenerateAndVerify => self.generated_output.as_deref().unwrap_or(""),
            RunMode::VerifyOnly => self.input_text.as_deref().unwrap_or(""),
        }
    }
}
