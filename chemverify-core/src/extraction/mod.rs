//! Claim extraction: pattern-based extractors producing typed,
//! position-anchored claims, composed with per-extractor fault isolation.

pub mod doi;
pub mod numeric_unit;
pub mod reagent;

use crate::ids::IdGenerator;
use crate::model::{ExtractedClaim, TextStep};
use crate::util::panic_message;
use std::panic::{catch_unwind, AssertUnwindSafe};
use uuid::Uuid;

/// A single claim extractor. Implementations are pure with respect to the
/// inputs of one call: no shared mutable state across invocations.
pub trait ClaimExtractor {
    /// Stable name, used both for self-exclusion in `CompositeClaimExtractor`
    /// and as the default diagnostic-finding source label.
    fn name(&self) -> &'static str;

    fn extract(
        &self,
        run_id: Uuid,
        analyzed_text: &str,
        steps: &[TextStep],
        ids: &dyn IdGenerator,
    ) -> Vec<ExtractedClaim>;
}

/// One diagnostic record produced when an extractor (or, later, a
/// validator) fails. Kept separate from `ValidationFinding` construction
/// here; the pipeline converts these into Unverified findings.
#[derive(Debug, Clone)]
pub struct ExtractionDiagnostic {
    pub source_name: &'static str,
    pub message: String,
}

/// Returns the built-in extractor roster in registration order. Order
/// matters: the composite preserves it, and downstream byte-stability
/// depends on it.
pub fn default_extractors() -> Vec<Box<dyn ClaimExtractor>> {
    vec![
        Box::new(numeric_unit::NumericUnitExtractor::new()),
        Box::new(doi::DoiClaimExtractor::new()),
        Box::new(reagent::ReagentRoleExtractor::new()),
    ]
}

/// Invokes each registered extractor in order, isolating failures into
/// diagnostics rather than propagating them.
pub struct CompositeClaimExtractor {
    extractors: Vec<Box<dyn ClaimExtractor>>,
}

const SELF_NAME: &str = "CompositeClaimExtractor";

impl CompositeClaimExtractor {
    pub fn new(extractors: Vec<Box<dyn ClaimExtractor>>) -> Self {
        // Guard against DI recursion: never invoke an instance of ourselves.
        let extractors = extractors
            .into_iter()
            .filter(|e| e.name() != SELF_NAME)
            .collect();
        Self { extractors }
    }

    /// Runs every registered extractor, in order, against `analyzed_text`.
    /// Returns the merged claim list plus one diagnostic per extractor
    /// that panicked. The diagnostic buffer is always freshly built on the
    /// stack for this call; there is no cross-call state to reset.
    pub fn extract(
        &self,
        run_id: Uuid,
        analyzed_text: &str,
        steps: &[TextStep],
        ids: &dyn IdGenerator,
    ) -> (Vec<ExtractedClaim>, Vec<ExtractionDiagnostic>) {
        let mut claims = Vec::new();
        let mut diagnostics = Vec::new();

        for extractor in &self.extractors {
            let result = catch_unwind(AssertUnwindSafe(|| {
                extractor.extract(run_id, analyzed_text, steps, ids)
            }));
            match result {
                Ok(mut found) => claims.append(&mut found),
                Err(panic) => {
                    let message = panic_message(&panic);
                    tracing::warn!(extractor = extractor.name(), %message, "extractor failed");
                    diagnostics.push(ExtractionDiagnostic {
                        source_name: extractor.name(),
                        message: format!("Extractor failed: {message}"),
                    });
                }
            }
        }

        (claims, diagnostics)
    }
}

/// Looks up the step index whose span contains `offset`, used by every
/// extractor to stamp `step_index` on emitted claims.
pub(crate) fn step_index_for(steps: &[TextStep], offset: usize) -> Option<usize> {
    steps.iter().find(|s| s.contains(offset)).map(|s| s.index)
}
