use crate::llm::Provider;
use std::fmt;

/// A narrative-service failure: HTTP error status, transport failure,
/// undecodable body, or an empty completion. Carried inside `anyhow::Error`
/// and downcast by callers that need the raw payload.
#[derive(Debug, Clone)]
pub struct NarrativeServiceError {
    pub provider: Provider,
    pub stage: &'static str,
    pub detail: String,
    pub raw_output: Option<String>,
}

impl fmt::Display for NarrativeServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "narrative generation failed (provider={:?}, stage={}): {}",
            self.provider, self.stage, self.detail
        )
    }
}

impl std::error::Error for NarrativeServiceError {}
