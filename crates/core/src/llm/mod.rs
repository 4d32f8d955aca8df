pub mod anthropic;
pub mod error;
pub mod prompt;

use crate::metrics::DerivedMetrics;

#[derive(Debug, Clone, Copy)]
pub enum Provider {
    Anthropic,
}

/// Narrow seam around the text-generation service: metrics in, narrative out.
/// Lets the calculator and pipeline be tested without network access.
#[async_trait::async_trait]
pub trait NarrativeClient: Send + Sync {
    fn provider(&self) -> Provider;

    async fn request_recommendations(&self, metrics: &DerivedMetrics) -> anyhow::Result<String>;
}
