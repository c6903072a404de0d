use anyhow::{Context, Result};
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

// Typed view of the generateContent response. Every level is optional so a
// structurally valid but reply-less response degrades to `Ok(None)` instead
// of a parse error.
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

// The `ChatBackend` trait defines the contract for any service that can turn
// a prompt into a reply. The `ConversationController` never talks to a
// backend directly; the runtime delivers accepted prompts to whichever
// implementation is configured. In unit tests `mockall`'s `MockChatBackend`
// simulates replies and failures without network calls.
//
// The two non-success outcomes are deliberately distinct: `Ok(None)` means
// the backend answered but carried no usable text, `Err` means the call
// itself failed. The controller maps each to its own fallback turn.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<Option<String>>;
}

/// Configuration for [`GeminiChat`], passed in explicitly at construction.
/// Core code never reads credentials from ambient process state.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
}

/// Chat backend over the Gemini generateContent REST API.
pub struct GeminiChat {
    client: Client,
    config: ChatConfig,
}

impl GeminiChat {
    pub fn new(config: ChatConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client for chat backend")?;
        Ok(Self { client, config })
    }

    fn request_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model,
            self.config.api_key
        )
    }
}

#[async_trait]
impl ChatBackend for GeminiChat {
    async fn complete(&self, prompt: &str) -> Result<Option<String>> {
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let resp = self
            .client
            .post(self.request_url())
            .json(&body)
            .send()
            .await
            .context("Chat backend request failed")?
            .error_for_status()
            .context("Chat backend returned an error status")?
            .json::<GenerateContentResponse>()
            .await
            .context("Failed to parse chat backend response")?;

        Ok(extract_reply(resp))
    }
}

/// Pulls `candidates[0].content.parts[0].text` out of a response, yielding
/// `None` whenever any level of the path is absent or empty.
fn extract_reply(resp: GenerateContentResponse) -> Option<String> {
    let text = resp
        .candidates?
        .into_iter()
        .next()?
        .content?
        .parts?
        .into_iter()
        .next()?
        .text?;
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}
