use crate::error::{LensError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-3-opus-20240229";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1000;
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maps free-text user input to a column token. The empty token means "no
/// filter". Implemented by [`LlmClient`] in production and by stubs in tests.
#[async_trait]
pub trait ColumnResolver {
    async fn resolve_column(&self, user_text: &str) -> Result<String>;
}

/// Trimmed, lowercased first line of a model reply; the "none" sentinel
/// (any letter case) maps to the empty token. The token is not validated
/// against the schema here - matching is the column filter's job.
pub fn normalize_token(raw: &str) -> String {
    let token = raw.lines().next().unwrap_or("").trim().to_lowercase();
    if token == "none" {
        String::new()
    } else {
        token
    }
}

pub struct LlmClient {
    api_key: String,
    base_url: String,
    model: String,
    fields: Vec<String>,
    client: reqwest::Client,
}

impl LlmClient {
    /// Build a client for the given queryable schema fields. The credential
    /// may be empty; it is checked at call time so a missing key fails
    /// before any request is issued. `ANTHROPIC_MODEL` and
    /// `ANTHROPIC_BASE_URL` override the defaults.
    pub fn new(api_key: String, fields: &[&str]) -> Self {
        let base_url = std::env::var("ANTHROPIC_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::with_base_url(api_key, fields, &base_url)
    }

    /// Build a client against a specific endpoint (test servers use this).
    pub fn with_base_url(api_key: String, fields: &[&str], base_url: &str) -> Self {
        let model =
            std::env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            fields: fields.iter().map(|field| field.to_string()).collect(),
            client: reqwest::Client::new(),
        }
    }

    fn build_prompt(&self, user_text: &str) -> String {
        format!(
            "Given the following columns in a table: {}.\n\
             The user has entered the following search query: \"{}\"\n\
             Please respond with only a single word that best represents the column \
             the user is likely trying to filter by. If no column seems relevant, \
             respond with \"none\".",
            self.fields.join(", "),
            user_text
        )
    }

    async fn call_messages(&self, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "messages": [
                {"role": "user", "content": prompt}
            ]
        });

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .json(&body)
            .send()
            .await
            .map_err(|e| LensError::Resolution(format!("LLM API call failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LensError::Resolution(format!(
                "LLM API error {}: {}",
                status, body
            )));
        }

        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LensError::Resolution(format!("Failed to parse LLM response: {}", e)))?;

        let text = response_json["content"][0]["text"]
            .as_str()
            .ok_or_else(|| LensError::Resolution("No content in LLM response".to_string()))?;

        Ok(text.to_string())
    }
}

#[async_trait]
impl ColumnResolver for LlmClient {
    async fn resolve_column(&self, user_text: &str) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(LensError::Config(
                "Anthropic API key is not set".to_string(),
            ));
        }

        debug!("Resolving column for query: {:?}", user_text);
        let reply = self.call_messages(&self.build_prompt(user_text)).await?;
        let token = normalize_token(&reply);
        info!("Resolved column token: {:?}", token);

        Ok(token)
    }
}
