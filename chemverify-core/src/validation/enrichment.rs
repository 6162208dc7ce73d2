//! EvidenceEnricher: fills in offset/step/entity/snippet evidence on
//! findings that only carry a claim or evidence-ref reference.

use crate::model::{parse_analyzed_text_locator, ExtractedClaim, ValidationFinding};
use crate::util::char_window;

const SNIPPET_RADIUS: usize = 48;

fn snippet(text: &str, start: usize, end: usize) -> String {
    let (win_start, win_end) = char_window(text, start, end, SNIPPET_RADIUS);
    let mut out = String::new();
    if win_start > 0 {
        out.push_str("...");
    }
    out.push_str(&text[win_start..win_end]);
    if win_end < text.len() {
        out.push_str("...");
    }
    out
}

/// Enriches every finding in `findings` that lacks `evidence_start_offset`,
/// following `claim_id` first and falling back to a parsed `evidence_ref`.
pub fn enrich(findings: &mut [ValidationFinding], claims: &[ExtractedClaim], analyzed_text: &str) {
    for finding in findings.iter_mut() {
        if finding.has_evidence_offsets() {
            continue;
        }

        let located = finding
            .claim_id
            .and_then(|id| claims.iter().find(|c| c.id == id))
            .map(|claim| (claim.locator_span(), claim.step_index, claim.entity_key.clone()))
            .or_else(|| {
                finding
                    .evidence_ref
                    .as_deref()
                    .and_then(parse_analyzed_text_locator)
                    .map(|span| (Some(span), None, None))
            });

        let Some((span, step_index, entity_key)) = located else {
            continue;
        };
        let Some((start, end)) = span else { continue };

        finding.evidence_start_offset = Some(start);
        finding.evidence_end_offset = Some(end);
        finding.evidence_step_index = step_index;
        finding.evidence_entity_key = entity_key;
        if start <= analyzed_text.len() && end <= analyzed_text.len() {
            finding.evidence_snippet = Some(snippet(analyzed_text, start, end));
        }
    }
}
