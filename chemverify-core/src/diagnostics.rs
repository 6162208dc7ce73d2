//! Per-invocation extractor/validator failure summary.
//!
//! Not scored (§4.9's `RiskScorer` never sees this struct) and not part of
//! any report section — this exists purely so a CLI `--format json` caller
//! can see "2 extractors failed" without grepping Unverified findings for
//! the `"Extractor failed: "` / `"Validator failed: "` message prefixes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    pub failed_extractors: Vec<String>,
    pub failed_validators: Vec<String>,
}

impl Diagnostics {
    pub fn is_empty(&self) -> bool {
        self.failed_extractors.is_empty() && self.failed_validators.is_empty()
    }
}
