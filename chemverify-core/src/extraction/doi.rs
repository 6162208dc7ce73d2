//! DoiClaimExtractor: permissive DOI matching with trailing-punctuation
//! cleanup and case-insensitive first-occurrence deduplication.

use super::{step_index_for, ClaimExtractor};
use crate::ids::IdGenerator;
use crate::model::{analyzed_text_locator, ClaimKind, ExtractedClaim, TextStep};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use uuid::Uuid;

fn doi_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"10\.\d{4,9}/\S+").unwrap())
}

/// Truncates at the first of `] ) " ' < >`, then trims trailing `.,;:`.
fn clean_doi(raw: &str) -> (String, usize) {
    let cut = raw
        .char_indices()
        .find(|(_, c)| matches!(c, ']' | ')' | '"' | '\'' | '<' | '>'))
        .map(|(idx, _)| idx)
        .unwrap_or(raw.len());
    let truncated = &raw[..cut];
    let trimmed = truncated.trim_end_matches(['.', ',', ';', ':']);
    (trimmed.to_string(), trimmed.len())
}

pub struct DoiClaimExtractor {
    _private: (),
}

impl DoiClaimExtractor {
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl Default for DoiClaimExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimExtractor for DoiClaimExtractor {
    fn name(&self) -> &'static str {
        "DoiClaimExtractor"
    }

    fn extract(
        &self,
        run_id: Uuid,
        analyzed_text: &str,
        steps: &[TextStep],
        ids: &dyn IdGenerator,
    ) -> Vec<ExtractedClaim> {
        let mut claims = Vec::new();
        let mut seen = HashSet::new();

        for m in doi_re().find_iter(analyzed_text) {
            let (cleaned, cleaned_len) = clean_doi(m.as_str());
            if cleaned.is_empty() {
                continue;
            }
            let key = cleaned.to_ascii_lowercase();
            if !seen.insert(key) {
                continue;
            }

            let start = m.start();
            let end = start + cleaned_len;
            let step_index = step_index_for(steps, start);

            claims.push(ExtractedClaim {
                id: ids.next_id(),
                run_id,
                kind: ClaimKind::CitationDoi,
                raw_text: cleaned.clone(),
                normalized_value: cleaned,
                unit: None,
                payload: None,
                source_locator: analyzed_text_locator(start, end),
                entity_key: None,
                step_index,
            });
        }

        claims
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIdGenerator;
    use crate::segmentation::step_segmenter::segment;

    fn extract(text: &str) -> Vec<ExtractedClaim> {
        let steps = segment(text);
        let ids = SequentialIdGenerator::new();
        DoiClaimExtractor::new().extract(Uuid::nil(), text, &steps, &ids)
    }

    #[test]
    fn extracts_and_trims_doi() {
        let claims = extract("See DOI: 10.1038/s41586-020-1234-5.");
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].normalized_value, "10.1038/s41586-020-1234-5");
    }

    #[test]
    fn truncates_at_bracket() {
        let claims = extract("Reference [10.1021/jacs.0c01234] describes this.");
        assert_eq!(claims[0].normalized_value, "10.1021/jacs.0c01234");
    }

    #[test]
    fn case_insensitive_dedup_first_occurrence_wins() {
        let claims = extract("10.1038/ABC123 appears, and later 10.1038/abc123 repeats.");
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].normalized_value, "10.1038/ABC123");
    }
}
