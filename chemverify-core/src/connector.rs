//! `ModelConnector`: the trait-only seam for "generate-and-verify" mode.
//!
//! The spec treats the thing that actually talks to a model as an external
//! collaborator (§1, §6) — this crate never performs network I/O. What it
//! does own is the *seam*: a trait `create_run_and_audit` can call to turn
//! a prompt into text, so the rest of the pipeline can treat generated and
//! supplied text identically once present.

/// A prompt-to-text generator. Implementations live outside this crate in
/// production (an HTTP client to a hosted model); `NullConnector` below and
/// test doubles are the only implementations this crate ships.
pub trait ModelConnector {
    /// Attempts to produce text for `prompt`. `Err` messages are opaque to
    /// the pipeline: they become the message of the single Pipeline Fail
    /// finding emitted on connector failure (§7).
    fn generate(&self, prompt: &str, model_name: &str) -> Result<String, String>;
}

/// A connector that always fails. Useful as a default when no real
/// connector is wired up, and in tests that exercise the generate-and-
/// verify failure contract.
#[derive(Debug, Default)]
pub struct NullConnector;

impl ModelConnector for NullConnector {
    fn generate(&self, _prompt: &str, _model_name: &str) -> Result<String, String> {
        Err("no ModelConnector configured".to_string())
    }
}

/// Deterministic test double: echoes the prompt back as the "generated"
/// text, optionally forcing failure.
pub struct EchoConnector {
    pub fail: bool,
}

impl EchoConnector {
    pub fn new() -> Self {
        Self { fail: false }
    }

    pub fn failing() -> Self {
        Self { fail: true }
    }
}

impl Default for EchoConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelConnector for EchoConnector {
    fn generate(&self, prompt: &str, _model_name: &str) -> Result<String, String> {
        if self.fail {
            Err("EchoConnector configured to fail".to_string())
        } else {
            Ok(prompt.to_string())
        }
    }
}
