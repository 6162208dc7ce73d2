//! Splits canonical text into an ordered sequence of half-open steps.
//!
//! Rust's `regex` crate has no look-around, so the "transition word stays
//! in the following step" rule (spec'd as a zero-width look-behind) is
//! implemented by hand: the matched gap is the leading whitespace only,
//! never the word itself, so the word offset becomes the next step's
//! start.

use crate::model::TextStep;
use regex::Regex;
use std::sync::OnceLock;

fn punct_ws_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.;][ \t\r\n]+").unwrap())
}

fn lf_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n+").unwrap())
}

fn bullet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^(?:\d+[.)] |- |\u{2022} )").unwrap())
}

fn transition_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)[ \t]+(then|after|afterward|afterwards|subsequently|next|finally)\b")
            .unwrap()
    })
}

/// A half-open `[start, end)` span of the analyzed text that segmentation
/// treats as a separator: it contributes to no step's text.
#[derive(Debug, Clone, Copy)]
struct Gap {
    start: usize,
    end: usize,
}

fn collect_gaps(text: &str) -> Vec<Gap> {
    let mut gaps = Vec::new();

    for m in punct_ws_re().find_iter(text) {
        gaps.push(Gap {
            start: m.start() + 1,
            end: m.end(),
        });
    }
    for m in lf_run_re().find_iter(text) {
        gaps.push(Gap {
            start: m.start(),
            end: m.end(),
        });
    }
    for m in bullet_re().find_iter(text) {
        gaps.push(Gap {
            start: m.start(),
            end: m.start(),
        });
    }
    for caps in transition_re().captures_iter(text) {
        let whole = caps.get(0).unwrap();
        let word = caps.get(1).unwrap();
        gaps.push(Gap {
            start: whole.start(),
            end: word.start(),
        });
    }

    gaps.sort_by_key(|g| (g.start, g.end));
    merge_gaps(gaps)
}

fn merge_gaps(gaps: Vec<Gap>) -> Vec<Gap> {
    let mut merged: Vec<Gap> = Vec::with_capacity(gaps.len());
    for gap in gaps {
        if let Some(last) = merged.last_mut() {
            if gap.start <= last.end {
                last.end = last.end.max(gap.end);
                continue;
            }
        }
        merged.push(gap);
    }
    merged
}

/// Splits `text` into ordered, half-open, non-overlapping steps. The union
/// of step spans equals `text` minus the boundary gaps; step indices form
/// a dense zero-based prefix.
pub fn segment(text: &str) -> Vec<TextStep> {
    let gaps = collect_gaps(text);
    let mut steps = Vec::new();
    let mut cursor = 0usize;

    for gap in gaps {
        if gap.start > cursor {
            steps.push(make_step(steps.len(), cursor, gap.start));
        }
        cursor = cursor.max(gap.end);
    }
    if cursor < text.len() {
        steps.push(make_step(steps.len(), cursor, text.len()));
    }
    steps
}

fn make_step(index: usize, start_offset: usize, end_offset: usize) -> TextStep {
    TextStep {
        index,
        start_offset,
        end_offset,
    }
}

/// Returns the index of the step whose half-open span contains `offset`,
/// or `None` if `offset` falls in a boundary gap or past the end of text.
pub fn get_step_index(steps: &[TextStep], offset: usize) -> Option<usize> {
    steps.iter().find(|s| s.contains(offset)).map(|s| s.index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(text: &str) -> Vec<(usize, usize)> {
        segment(text)
            .into_iter()
            .map(|s| (s.start_offset, s.end_offset))
            .collect()
    }

    #[test]
    fn splits_on_period_space() {
        let steps = spans("Add water. Stir well.");
        assert_eq!(steps, vec![(0, 10), (11, 21)]);
    }

    #[test]
    fn splits_on_lf_runs() {
        let steps = spans("Step one\n\nStep two");
        assert_eq!(steps, vec![(0, 8), (10, 19)]);
    }

    #[test]
    fn bullet_starts_new_step_without_consuming_it() {
        let steps = spans("Intro text\n- First item\n- Second item");
        let text = "Intro text\n- First item\n- Second item";
        let texts: Vec<&str> = steps.iter().map(|(s, e)| &text[*s..*e]).collect();
        assert!(texts.iter().any(|t| t.starts_with("- First item")));
        assert!(texts.iter().any(|t| t.starts_with("- Second item")));
    }

    #[test]
    fn transition_word_stays_with_following_step() {
        let text = "The mixture was stirred then the solvent was removed";
        let steps = segment(text);
        let texts: Vec<&str> = steps.iter().map(|s| s.text(text)).collect();
        assert!(texts.iter().any(|t| t.starts_with("then")));
        assert!(texts[0].ends_with("stirred"));
    }

    #[test]
    fn dense_zero_based_indices() {
        let steps = segment("One. Two. Three.");
        for (i, s) in steps.iter().enumerate() {
            assert_eq!(s.index, i);
        }
    }

    #[test]
    fn step_coverage_no_overlap() {
        let text = "Add NaH (60%) to the flask.\nThen stir for 2 h at 0 degC.\n- Workup: quench.";
        let steps = segment(text);
        for w in steps.windows(2) {
            assert!(w[0].end_offset <= w[1].start_offset);
        }
        for s in &steps {
            assert!(s.start_offset <= s.end_offset);
            assert!(s.end_offset <= text.len());
        }
    }

    #[test]
    fn get_step_index_finds_containing_step() {
        let text = "Add water. Stir well.";
        let steps = segment(text);
        assert_eq!(get_step_index(&steps, 0), Some(0));
        assert_eq!(get_step_index(&steps, 15), Some(1));
        // offset 10 falls in the gap (the space after the period)
        assert_eq!(get_step_index(&steps, 10), None);
    }
}
