//! Text generation backend.
//!
//! OpenAI-compatible chat-completions client. Two entry points: free text,
//! and structured output constrained to a strict JSON schema.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

/// Generates text from a system/user message pair.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Free-text generation.
    async fn generate(&self, system: &str, user: &str) -> Result<String>;

    /// Generation constrained to a strict JSON schema; returns the raw JSON
    /// text of the response for the caller to deserialize.
    async fn generate_json(
        &self,
        system: &str,
        user: &str,
        schema_name: &str,
        schema: serde_json::Value,
    ) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

/// Chat-completions client.
pub struct ChatClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ChatClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    async fn complete(&self, body: serde_json::Value) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Generation request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            anyhow::bail!("Generation backend returned {}: {}", status, detail.trim());
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .context("Failed to parse generation response")?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            anyhow::bail!("Generation backend returned no content");
        }

        Ok(content)
    }
}

#[async_trait]
impl TextGenerator for ChatClient {
    async fn generate(&self, system: &str, user: &str) -> Result<String> {
        self.complete(json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
        }))
        .await
    }

    async fn generate_json(
        &self,
        system: &str,
        user: &str,
        schema_name: &str,
        schema: serde_json::Value,
    ) -> Result<String> {
        self.complete(json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": schema_name,
                    "strict": true,
                    "schema": schema,
                },
            },
        }))
        .await
    }
}
