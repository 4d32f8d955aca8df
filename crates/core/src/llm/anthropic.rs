use crate::config::Settings;
use crate::llm::error::NarrativeServiceError;
use crate::llm::{prompt, NarrativeClient, Provider};
use crate::metrics::DerivedMetrics;
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-3-5-sonnet-latest";
const DEFAULT_MAX_TOKENS: u32 = 1024;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

// Low temperature: the same figures should read roughly the same each day.
const SAMPLING_TEMPERATURE: f64 = 0.2;

const SYSTEM_PROMPT: &str = "You are a pragmatic business analyst advising a small-business \
owner. Reply with 2-3 short bullet points only; no preamble, no closing remarks.";

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicClient {
    /// Fails fast when the API key is missing, before any pipeline work.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_anthropic_api_key()?.to_string();
        let base_url =
            std::env::var("ANTHROPIC_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let max_tokens = std::env::var("ANTHROPIC_MAX_TOKENS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_MAX_TOKENS);

        let timeout_secs = std::env::var("ANTHROPIC_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            http,
            api_key,
            base_url,
            model,
            max_tokens,
        })
    }

    async fn create_message(
        &self,
        req: CreateMessageRequest,
    ) -> anyhow::Result<CreateMessageResponse> {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_str(&self.api_key)?);
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));
        let res = self
            .http
            .post(url)
            .headers(headers)
            .json(&req)
            .send()
            .await
            .map_err(|err| {
                anyhow::Error::new(NarrativeServiceError {
                    provider: Provider::Anthropic,
                    stage: "request",
                    detail: err.to_string(),
                    raw_output: None,
                })
            })?;

        let status = res.status();
        let text = res.text().await.map_err(|err| {
            anyhow::Error::new(NarrativeServiceError {
                provider: Provider::Anthropic,
                stage: "read_body",
                detail: err.to_string(),
                raw_output: None,
            })
        })?;

        if !status.is_success() {
            return Err(NarrativeServiceError {
                provider: Provider::Anthropic,
                stage: "http",
                detail: format!("status={status}"),
                raw_output: Some(text),
            }
            .into());
        }

        serde_json::from_str::<CreateMessageResponse>(&text).map_err(|err| {
            NarrativeServiceError {
                provider: Provider::Anthropic,
                stage: "decode",
                detail: err.to_string(),
                raw_output: Some(text),
            }
            .into()
        })
    }

    fn response_text(res: &CreateMessageResponse) -> String {
        let mut out = String::new();
        for block in &res.content {
            match block {
                ContentBlock::Text { text } => {
                    if !out.is_empty() {
                        out.push('\n');
                    }
                    out.push_str(text);
                }
                ContentBlock::Unknown => {
                    // Ignore non-text blocks.
                }
            }
        }
        out
    }
}

#[async_trait::async_trait]
impl NarrativeClient for AnthropicClient {
    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    async fn request_recommendations(&self, metrics: &DerivedMetrics) -> anyhow::Result<String> {
        let req = CreateMessageRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: SAMPLING_TEMPERATURE,
            system: Some(SYSTEM_PROMPT.to_string()),
            messages: vec![Message {
                role: "user",
                content: prompt::render_prompt(metrics),
            }],
        };

        let res = self.create_message(req).await?;

        if matches!(res.stop_reason.as_deref(), Some("max_tokens")) {
            tracing::warn!(
                max_tokens = self.max_tokens,
                "Anthropic stop_reason=max_tokens; narrative may be truncated"
            );
        }

        let text = Self::response_text(&res);
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(NarrativeServiceError {
                provider: Provider::Anthropic,
                stage: "empty_output",
                detail: "service returned no text content".to_string(),
                raw_output: None,
            }
            .into());
        }

        Ok(trimmed.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
struct CreateMessageRequest {
    model: String,
    max_tokens: u32,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CreateMessageResponse {
    content: Vec<ContentBlock>,

    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },

    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_text_joins_text_blocks_and_skips_others() {
        let raw = json!({
            "content": [
                {"type": "text", "text": "- Cut spend"},
                {"type": "thinking", "thinking": "..."},
                {"type": "text", "text": "- Raise prices"}
            ],
            "stop_reason": "end_turn"
        });

        let res: CreateMessageResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(
            AnthropicClient::response_text(&res),
            "- Cut spend\n- Raise prices"
        );
    }

    #[test]
    fn response_without_stop_reason_still_decodes() {
        let raw = json!({
            "content": [{"type": "text", "text": "ok"}]
        });

        let res: CreateMessageResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(res.stop_reason, None);
        assert_eq!(AnthropicClient::response_text(&res), "ok");
    }

    #[test]
    fn request_serializes_temperature_and_system() {
        let req = CreateMessageRequest {
            model: "m".to_string(),
            max_tokens: 16,
            temperature: SAMPLING_TEMPERATURE,
            system: Some("sys".to_string()),
            messages: vec![Message {
                role: "user",
                content: "hi".to_string(),
            }],
        };

        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["temperature"], json!(0.2));
        assert_eq!(v["system"], json!("sys"));
        assert_eq!(v["messages"][0]["role"], json!("user"));
    }

    #[test]
    fn service_error_display_names_the_failure() {
        let err = NarrativeServiceError {
            provider: Provider::Anthropic,
            stage: "http",
            detail: "status=529".to_string(),
            raw_output: Some("{\"type\":\"error\"}".to_string()),
        };
        let msg = err.to_string();
        assert!(msg.contains("narrative generation failed"));
        assert!(msg.contains("stage=http"));
        assert!(msg.contains("status=529"));
    }
}
