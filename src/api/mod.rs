//! Wire types for the Mistral chat completions API.

use serde::{Deserialize, Serialize};

use crate::core::message::ConversationMessage;
use crate::core::model::{ModelDescriptor, TransportError};

pub mod client;
pub mod models;

pub use client::MistralClient;

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl From<&ConversationMessage> for ChatMessage {
    fn from(message: &ConversationMessage) -> Self {
        Self {
            role: message.role.as_str().to_string(),
            content: message.content.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

#[derive(Deserialize)]
pub struct ChatResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Deserialize)]
pub struct ChatResponseChoice {
    pub message: ChatResponseMessage,
}

#[derive(Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatResponseChoice>,
}

impl ChatResponse {
    /// Text of the first choice.
    pub fn into_text(self) -> Result<String, TransportError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or(TransportError::NoChoices)?;
        choice
            .message
            .content
            .filter(|text| !text.is_empty())
            .ok_or(TransportError::EmptyReply)
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct ModelInfo {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default_model_temperature: Option<f64>,
    #[serde(default)]
    pub max_context_length: Option<u64>,
    #[serde(default)]
    pub created: Option<i64>,
}

impl From<ModelInfo> for ModelDescriptor {
    fn from(info: ModelInfo) -> Self {
        ModelDescriptor {
            id: info.id,
            description: info.description.unwrap_or_default(),
            default_temperature: info.default_model_temperature,
            max_context_length: info.max_context_length,
            created: info.created,
        }
    }
}

#[derive(Deserialize)]
pub struct ModelsResponse {
    pub data: Vec<ModelInfo>,
}

/// Joins `endpoint` onto `base_url` without doubling slashes.
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

/// One-line description of an API error body: the JSON `error.message`,
/// `error` or `message` field when present, otherwise the raw text.
pub fn summarize_error_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty response body>".to_string();
    }
    let summary = serde_json::from_str::<serde_json::Value>(trimmed)
        .ok()
        .and_then(|value| extract_error_summary(&value));
    let text = summary.as_deref().unwrap_or(trimmed);
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .or_else(|| value.get("error").and_then(|v| v.as_str()))
        .or_else(|| value.get("message").and_then(|v| v.as_str()))
        .or_else(|| value.get("detail").and_then(|v| v.as_str()))
        .map(str::to_owned)
        .filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_urls_never_double_slashes() {
        assert_eq!(
            construct_api_url("https://api.mistral.ai/v1/", "/models"),
            "https://api.mistral.ai/v1/models"
        );
        assert_eq!(
            construct_api_url("https://api.mistral.ai/v1", "chat/completions"),
            "https://api.mistral.ai/v1/chat/completions"
        );
    }

    #[test]
    fn error_summary_prefers_json_message() {
        assert_eq!(
            summarize_error_body(r#"{"error":{"message":"Unauthorized  key"}}"#),
            "Unauthorized key"
        );
        assert_eq!(
            summarize_error_body(r#"{"message":"Requests rate limit exceeded","object":"error"}"#),
            "Requests rate limit exceeded"
        );
        assert_eq!(summarize_error_body(r#"{"error":"bad"}"#), "bad");
    }

    #[test]
    fn error_summary_falls_back_to_raw_text() {
        assert_eq!(
            summarize_error_body("  upstream\nconnect error "),
            "upstream connect error"
        );
        assert_eq!(summarize_error_body(""), "<empty response body>");
        assert_eq!(summarize_error_body(r#"{"object":"error"}"#), r#"{"object":"error"}"#);
    }

    #[test]
    fn chat_response_takes_first_choice() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"world"}}]}"#,
        )
        .expect("parse");
        assert_eq!(response.into_text().expect("text"), "world");

        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).expect("parse");
        assert!(matches!(empty.into_text(), Err(TransportError::NoChoices)));
    }

    #[test]
    fn blank_first_choice_is_an_empty_reply() {
        for body in [
            r#"{"choices":[{"message":{"role":"assistant","content":""}}]}"#,
            r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#,
        ] {
            let response: ChatResponse = serde_json::from_str(body).expect("parse");
            let err = response.into_text().expect_err("empty reply");
            assert!(matches!(err, TransportError::EmptyReply));
            assert_eq!(err.to_string(), "the API returned an empty reply");
        }
    }

    #[test]
    fn model_info_converts_to_descriptor() {
        let response: ModelsResponse = serde_json::from_str(
            r#"{"object":"list","data":[
                {"id":"mistral-tiny","description":"Small","default_model_temperature":0.7,
                 "max_context_length":32768,"created":1700000000},
                {"id":"bare"}
            ]}"#,
        )
        .expect("parse");
        let descriptors: Vec<ModelDescriptor> =
            response.data.into_iter().map(ModelDescriptor::from).collect();

        assert_eq!(descriptors[0].id, "mistral-tiny");
        assert_eq!(descriptors[0].default_temperature, Some(0.7));
        assert_eq!(descriptors[0].max_context_length, Some(32768));
        assert_eq!(descriptors[1].description, "");
        assert_eq!(descriptors[1].created, None);
    }
}
