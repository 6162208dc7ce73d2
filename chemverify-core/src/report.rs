//! ReportBuilder: a pure function from `(riskScore, claims, findings,
//! profileName?)` to a structured, human/machine-readable report.

use crate::model::{ExtractedClaim, FindingKind, Severity, Status, ValidationFinding};
use serde::{Deserialize, Serialize};

const TEXT_INTEGRITY_ONLY_KINDS: &[FindingKind] = &[
    FindingKind::MalformedChemicalToken,
    FindingKind::UnsupportedOrIncompleteClaim,
    FindingKind::CitationTraceabilityWeak,
    FindingKind::NotCheckable,
    FindingKind::NotComparable,
    FindingKind::CrossStepConditionVariation,
];

/// One driver line contributing to the final risk score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskDriver {
    pub delta: f64,
    pub label: String,
}

/// A single rendered line in a report section; `indent` mirrors the
/// spec's three-space evidence-snippet sub-line convention.
fn is_false(v: &bool) -> bool {
    !*v
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportLine {
    pub text: String,
    #[serde(skip_serializing_if = "is_false")]
    pub indented: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub confirmed: Vec<ReportLine>,
    pub not_verifiable: Vec<ReportLine>,
    pub attention: Vec<ReportLine>,
    pub next_questions: Vec<ReportLine>,
    pub risk_drivers: Vec<RiskDriver>,
    pub summary: String,
    pub verdict: String,
    pub severity: Severity,
}

fn finding_line(finding: &ValidationFinding) -> ReportLine {
    ReportLine {
        text: format!("{}: {}", finding.validator_name, finding.message),
        indented: false,
    }
}

fn snippet_line(finding: &ValidationFinding) -> Option<ReportLine> {
    finding.evidence_snippet.as_ref().map(|snippet| ReportLine {
        text: snippet.clone(),
        indented: true,
    })
}

fn is_text_integrity_only_kind(kind: Option<FindingKind>) -> bool {
    kind.map(|k| TEXT_INTEGRITY_ONLY_KINDS.contains(&k)).unwrap_or(false)
}

fn severity_for(score: f64, fail_findings: &[&ValidationFinding]) -> Severity {
    let all_text_integrity = !fail_findings.is_empty()
        && fail_findings.iter().all(|f| is_text_integrity_only_kind(f.kind));

    if all_text_integrity {
        return Severity::Low;
    }

    if score <= 0.10 {
        Severity::Low
    } else if score <= 0.35 {
        Severity::Medium
    } else if score <= 0.65 {
        Severity::High
    } else {
        Severity::Critical
    }
}

fn verdict_for(
    attention: &[&ValidationFinding],
    next_questions: &[&ValidationFinding],
    confirmed_count: usize,
) -> String {
    let has_contradiction = attention.iter().any(|f| f.kind == Some(FindingKind::Contradiction));
    if has_contradiction {
        return "Internal inconsistencies detected. Manual review recommended.".to_string();
    }

    let has_multi_scenario = next_questions.iter().any(|f| f.kind == Some(FindingKind::MultiScenario));
    if has_multi_scenario {
        return "Internally consistent; multiple distinct experimental regimes detected.".to_string();
    }

    if !attention.is_empty() && attention.iter().all(|f| is_text_integrity_only_kind(f.kind)) {
        return "Scientific writing/format issues detected. Manual cleanup recommended.".to_string();
    }

    if confirmed_count >= 1 && attention.is_empty() {
        return "No internal inconsistencies detected in the analyzed text.".to_string();
    }

    "Verification complete. See findings for details.".to_string()
}

/// Builds the full report for a completed audit. `claims` is accepted for
/// symmetry with the original contract (summary line counts) even though
/// every field used here is derived from `findings` and `risk_score`.
pub fn build(
    risk_score: f64,
    claims: &[ExtractedClaim],
    findings: &mut [ValidationFinding],
    profile_name: Option<&str>,
) -> AuditReport {
    for finding in findings.iter_mut() {
        if finding.rule_id.is_none() {
            finding.rule_id = Some(finding.validator_name.clone());
        }
        if finding.rule_version.is_none() {
            finding.rule_version = Some("1.0.0".to_string());
        }
    }

    let confirmed: Vec<&ValidationFinding> = findings.iter().filter(|f| f.status == Status::Pass).collect();
    let next_questions: Vec<&ValidationFinding> = findings
        .iter()
        .filter(|f| f.status == Status::Unverified && f.kind == Some(FindingKind::MultiScenario))
        .collect();
    let not_verifiable: Vec<&ValidationFinding> = findings
        .iter()
        .filter(|f| f.status == Status::Unverified && f.kind != Some(FindingKind::MultiScenario))
        .collect();
    let attention: Vec<&ValidationFinding> = findings.iter().filter(|f| f.status == Status::Fail).collect();

    let mut confirmed_lines = Vec::new();
    for f in &confirmed {
        confirmed_lines.push(finding_line(f));
    }

    let mut not_verifiable_lines = Vec::new();
    for f in &not_verifiable {
        not_verifiable_lines.push(finding_line(f));
    }

    let mut attention_lines = Vec::new();
    for f in &attention {
        attention_lines.push(finding_line(f));
        if let Some(snippet) = snippet_line(f) {
            attention_lines.push(snippet);
        }
    }

    let mut next_question_lines = Vec::new();
    for f in &next_questions {
        next_question_lines.push(finding_line(f));
    }

    let mut risk_drivers = Vec::new();
    for f in findings.iter().filter(|f| f.status != Status::Pass) {
        risk_drivers.push(RiskDriver {
            delta: f.confidence,
            label: f.validator_name.clone(),
        });
    }

    let severity = severity_for(risk_score, &attention);
    let verdict = verdict_for(&attention, &next_questions, confirmed.len());

    let summary = format!(
        "{} claim(s) analyzed: {} confirmed, {} attention item(s), {} not verifiable, {} open question(s). Profile: {}.",
        claims.len(),
        confirmed.len(),
        attention.len(),
        not_verifiable.len(),
        next_questions.len(),
        profile_name.unwrap_or("Default"),
    );

    AuditReport {
        confirmed: confirmed_lines,
        not_verifiable: not_verifiable_lines,
        attention: attention_lines,
        next_questions: next_question_lines,
        risk_drivers,
        summary,
        verdict,
        severity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn finding(status: Status, kind: Option<FindingKind>) -> ValidationFinding {
        ValidationFinding {
            id: Uuid::nil(),
            run_id: Uuid::nil(),
            claim_id: None,
            validator_name: "Test".to_string(),
            rule_id: None,
            rule_version: None,
            status,
            message: "example".to_string(),
            confidence: 1.0,
            kind,
            payload: None,
            evidence_ref: None,
            evidence_start_offset: None,
            evidence_end_offset: None,
            evidence_step_index: None,
            evidence_entity_key: None,
            evidence_snippet: None,
        }
    }

    #[test]
    fn contradiction_drives_verdict() {
        let mut findings = vec![finding(Status::Fail, Some(FindingKind::Contradiction))];
        let report = report_for(&mut findings);
        assert!(report.verdict.starts_with("Internal inconsistencies"));
        assert_eq!(report.severity, Severity::Critical);
    }

    #[test]
    fn no_attention_with_confirmed_is_clean_verdict() {
        let mut findings = vec![finding(Status::Pass, None)];
        let report = report_for(&mut findings);
        assert!(report.verdict.starts_with("No internal inconsistencies"));
    }

    fn report_for(findings: &mut [ValidationFinding]) -> AuditReport {
        build(0.8, &[], findings, Some("StrictChemistryV0"))
    }
}
