//! Error types for the verification engine's public API boundary.
//!
//! The pipeline itself never throws for well-formed string input (see
//! `SPEC_FULL.md` §7): extractor and validator failures are captured as
//! diagnostic findings, not propagated as `Err`. `ChemVerifyError` exists
//! only for the handful of boundary conditions a caller can get wrong
//! before the pipeline ever runs (an unknown policy profile name, a
//! malformed `RunCommand`).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChemVerifyError>;

#[derive(Debug, Error)]
pub enum ChemVerifyError {
    #[error("unknown policy profile: {0}")]
    UnknownPolicyProfile(String),

    #[error("run command missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid policy profile source: {0}")]
    InvalidPolicy(String),
}
