//! OpenAI chat-completions oracle
//!
//! Sends the instructions as the system message and the CSV table as the user
//! message. Transport and API failures are oracle errors; the content of a
//! successful reply is returned untouched for the contract to judge.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::error::{ReimburseError, ReimburseResult};

use super::{MatchOracle, MatchRequest};

/// Chat completions client (blocking)
pub struct OpenAiOracle {
    http: Client,
    api_base: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl OpenAiOracle {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        api_base: impl Into<String>,
    ) -> ReimburseResult<Self> {
        // Matching a long table can take a while
        let http = Client::builder()
            .timeout(Duration::from_secs(180))
            .build()
            .map_err(|e| ReimburseError::Oracle(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    fn chat_request<'a>(&'a self, request: &'a MatchRequest) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.table_csv,
                },
            ],
            temperature: 0.0,
        }
    }
}

impl MatchOracle for OpenAiOracle {
    fn propose(&self, request: &MatchRequest) -> ReimburseResult<String> {
        tracing::debug!(
            model = %self.model,
            table_bytes = request.table_csv.len(),
            "sending match request"
        );

        let response = self
            .http
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&self.chat_request(request))
            .send()
            .map_err(|e| ReimburseError::Oracle(format!("Network error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(ReimburseError::Oracle(format!(
                "API error ({}): {}",
                status.as_u16(),
                message
            )));
        }

        let body: ChatResponse = response
            .json()
            .map_err(|e| ReimburseError::Oracle(format!("Failed to parse response: {}", e)))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ReimburseError::Oracle("No choices in response".to_string()))?;

        tracing::debug!(response_bytes = content.len(), "received match response");
        Ok(content)
    }
}
