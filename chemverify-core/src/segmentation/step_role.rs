//! Per-step role classification: Procedure, Narrative, QuestionOrPrompt,
//! Reference, Header.

use super::procedural_context::{has_lab_verbs, has_numeric_quantity};
use crate::model::StepRole;
use regex::Regex;
use std::sync::OnceLock;

fn url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https?://\S+").unwrap())
}

fn suggestive_phrase_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(?:would you|perhaps|should i|could you|do you want|shall we|may i|how about|why not)\b",
        )
        .unwrap()
    })
}

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(?:#{1,6}\s|step\s*\d+\s*:|procedure\s*:)").unwrap())
}

/// Classifies a single step. `step_start_offset` and `references_offset`
/// are both offsets into the same analyzed text as `step_text` came from.
pub fn classify(
    step_text: &str,
    step_start_offset: usize,
    references_offset: Option<usize>,
) -> StepRole {
    let stripped = url_re().replace_all(step_text, "");
    let has_question_mark = stripped.contains('?');
    let lab_verbs = has_lab_verbs(step_text);
    let numeric_qty = has_numeric_quantity(step_text);

    let trimmed = step_text.trim();
    if trimmed.chars().count() < 80 && header_re().is_match(trimmed) {
        return StepRole::Header;
    }

    let is_strong_question =
        has_question_mark && suggestive_phrase_re().is_match(&stripped) && !lab_verbs;
    if is_strong_question {
        return StepRole::QuestionOrPrompt;
    }

    if let Some(ref_offset) = references_offset {
        if step_start_offset >= ref_offset {
            return StepRole::Reference;
        }
    }

    let is_weak_question = has_question_mark && !lab_verbs && !numeric_qty;
    if is_weak_question {
        return StepRole::QuestionOrPrompt;
    }

    if lab_verbs || numeric_qty {
        return StepRole::Procedure;
    }

    StepRole::Narrative
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_short_markdown() {
        assert_eq!(classify("## Procedure", 0, None), StepRole::Header);
    }

    #[test]
    fn search_url_question_mark_ignored() {
        let text = "See https://example.com/search?q=synthesis for background";
        assert_ne!(classify(text, 0, None), StepRole::QuestionOrPrompt);
    }

    #[test]
    fn strong_question_wins_inside_references() {
        let text = "Would you like me to continue with the synthesis?";
        assert_eq!(classify(text, 500, Some(100)), StepRole::QuestionOrPrompt);
    }

    #[test]
    fn reference_step_past_offset() {
        let text = "Smith, J. et al. Chem Rev 2020, 120, 1-50.";
        assert_eq!(classify(text, 500, Some(100)), StepRole::Reference);
    }

    #[test]
    fn procedure_step_has_lab_verb() {
        let text = "The mixture was stirred for 2 h at 0 degC.";
        assert_eq!(classify(text, 0, None), StepRole::Procedure);
    }

    #[test]
    fn weak_question_no_verbs_no_quantity() {
        let text = "What is the mechanism here?";
        assert_eq!(classify(text, 0, None), StepRole::QuestionOrPrompt);
    }

    #[test]
    fn narrative_fallback() {
        let text = "The authors discuss possible mechanisms in general terms.";
        assert_eq!(classify(text, 0, None), StepRole::Narrative);
    }
}
