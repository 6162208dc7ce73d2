//! End-to-end coverage of the seven literal-input scenarios (spec §8) plus
//! the universal testable properties, exercised entirely through
//! `chemverify_core::verify_text`.

use chemverify_core::model::{FindingKind, Severity, Status};
use chemverify_core::verify_text;

#[test]
fn scenario_1_time_unit_equivalence_passes_with_approx_symbol() {
    let text = "The reaction was stirred for 2 h at room temperature. After 120 min, \
                the mixture was quenched with water.";
    let artifact = verify_text(text, None);
    assert!(artifact
        .findings
        .iter()
        .any(|f| f.status == Status::Pass && f.message.contains('\u{2248}')));
}

#[test]
fn scenario_2_alternative_route_is_multi_scenario_not_contradiction() {
    let text = "The reaction was heated to 78 \u{00B0}C for 4 h. In an alternative route, the \
                mixture was cooled to -78 \u{00B0}C before addition of the organolithium reagent.";
    let artifact = verify_text(text, None);
    assert!(artifact
        .findings
        .iter()
        .any(|f| f.kind == Some(FindingKind::MultiScenario)));
    assert!(!artifact
        .findings
        .iter()
        .any(|f| f.kind == Some(FindingKind::Contradiction)));
}

#[test]
fn scenario_3_yield_contradiction_elevates_risk() {
    let text = "The product was isolated in 82% yield after column chromatography. The \
                overall yield of the process was 15%.";
    let artifact = verify_text(text, None);
    assert!(artifact
        .findings
        .iter()
        .any(|f| f.kind == Some(FindingKind::Contradiction)));
    assert!(artifact.run.risk_score.unwrap_or(0.0) > 0.0);
}

#[test]
fn scenario_4_nah_in_water_fails_incompatible_reagent_solvent() {
    let text = "NaH (60% dispersion) was added portionwise to water at 0 \u{00B0}C.";
    let artifact = verify_text(text, None);
    assert!(artifact.findings.iter().any(|f| f.kind
        == Some(FindingKind::IncompatibleReagentSolvent)
        && f.status == Status::Fail));
    assert!(artifact.run.risk_score.unwrap_or(0.0) > 0.0);
}

#[test]
fn scenario_5_bare_mass_and_volume_are_not_comparable_not_contradictory() {
    let text = "Benzaldehyde (1.06 g, 10 mmol) was dissolved in 10 mL of MeOH. NaBH4 (0.38 g, \
                10 mmol) was added in portions.";
    let artifact = verify_text(text, None);
    assert!(!artifact
        .findings
        .iter()
        .any(|f| f.kind == Some(FindingKind::Contradiction)));
    assert!(artifact
        .findings
        .iter()
        .any(|f| f.kind == Some(FindingKind::NotComparable)));
}

#[test]
fn scenario_6_malformed_doi_fails_strict_but_is_dampened_under_scientific_text() {
    let text = "See DOI: 10.1038/NOT#A#DOI.";

    let strict = verify_text(text, Some("StrictChemistryV0"));
    assert_eq!(
        strict
            .claims
            .iter()
            .filter(|c| c.kind == chemverify_core::model::ClaimKind::CitationDoi)
            .count(),
        1
    );
    assert!(strict
        .findings
        .iter()
        .any(|f| f.validator_name == "DoiFormatValidator" && f.status == Status::Fail));

    let lenient = verify_text(text, Some("ScientificTextV0"));
    assert!(lenient.run.risk_score.unwrap_or(1.0) < 1.0);
    assert_ne!(lenient.report.severity, Severity::Critical);
}

#[test]
fn scenario_7_bare_degree_c_is_malformed_with_expected_payload() {
    let text = "The mixture was heated at \u{00B0}C for 1 h in THF.";
    let artifact = verify_text(text, None);
    let finding = artifact
        .findings
        .iter()
        .find(|f| f.kind == Some(FindingKind::MalformedChemicalToken) && f.payload.is_some())
        .expect("expected a malformed-token finding with an expectation payload");
    let payload = finding.payload.as_ref().unwrap();
    assert_eq!(payload["expected"], "temperature numeric value");
    assert!(payload["examples"].is_array());
}

#[test]
fn locator_well_formedness_holds_across_claims_and_findings() {
    let text = "Benzaldehyde (1.06 g, 10 mmol) was dissolved in 10 mL of MeOH at 0 \u{00B0}C \
                for 2 h, then quenched with water. See DOI: 10.1038/s41586-020-1234-5.";
    let artifact = verify_text(text, None);

    for claim in &artifact.claims {
        let (start, end) = claim.locator_span().expect("well-formed locator");
        assert!(start <= end);
        assert!(end <= text.len());
    }
    for finding in &artifact.findings {
        if let (Some(start), Some(end)) = (finding.evidence_start_offset, finding.evidence_end_offset) {
            assert!(start <= end);
            assert!(end <= text.len());
        }
    }
}

#[test]
fn doi_dedup_is_case_insensitive_first_occurrence_wins() {
    let text = "10.1038/ABC123 appears, and later 10.1038/abc123 repeats.";
    let artifact = verify_text(text, None);
    let dois: Vec<_> = artifact
        .claims
        .iter()
        .filter(|c| c.kind == chemverify_core::model::ClaimKind::CitationDoi)
        .collect();
    assert_eq!(dois.len(), 1);
    assert_eq!(dois[0].normalized_value, "10.1038/ABC123");
}
