//! The remote model collaborator as the core sees it.
//!
//! [`ModelClient`] is the seam between the dispatch pipeline and the hosted
//! API. The concrete reqwest-backed implementation lives in
//! [`crate::api::client`]; tests substitute a scripted fake.

use async_trait::async_trait;
use chrono::DateTime;

use crate::core::message::ConversationMessage;

/// Read-only metadata about one model offered by the remote API.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDescriptor {
    pub id: String,
    pub description: String,
    pub default_temperature: Option<f64>,
    pub max_context_length: Option<u64>,
    /// Unix timestamp in seconds.
    pub created: Option<i64>,
}

impl ModelDescriptor {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            default_temperature: None,
            max_context_length: None,
            created: None,
        }
    }

    /// Multi-line summary shown when the model becomes active.
    pub fn summary(&self) -> String {
        let mut lines = vec![format!("Now using {}", self.id)];
        if !self.description.trim().is_empty() {
            lines.push(self.description.trim().to_string());
        }
        if let Some(temperature) = self.default_temperature {
            lines.push(format!("Temperature: {temperature}"));
        }
        if let Some(length) = self.max_context_length {
            lines.push(format!("Max Context Length: {length}"));
        }
        if let Some(date) = self.created.and_then(|secs| DateTime::from_timestamp(secs, 0)) {
            lines.push(format!("Model creation date: {}", date.format("%Y-%m-%d")));
        }
        lines.join("\n- ")
    }
}

/// Failure talking to the remote model API.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("{0}")]
    Request(#[from] reqwest::Error),
    #[error("API request failed with status {status}: {summary}")]
    Status { status: u16, summary: String },
    #[error("the API returned no choices")]
    NoChoices,
    #[error("the API returned an empty reply")]
    EmptyReply,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelSwitchError {
    #[error("Unknown model: {0}")]
    UnknownModel(String),
}

#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Model ids in the order the API reported them.
    fn list_models(&self) -> Vec<String>;

    fn model_id(&self) -> String;

    fn descriptors(&self) -> Vec<ModelDescriptor>;

    fn descriptor(&self, id: &str) -> Option<ModelDescriptor> {
        self.descriptors().into_iter().find(|d| d.id == id)
    }

    /// Best effort: callers validate `id` against [`list_models`] first.
    ///
    /// [`list_models`]: ModelClient::list_models
    fn set_model(&self, id: &str);

    async fn send_chat_message(
        &self,
        history: &[ConversationMessage],
    ) -> Result<String, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_lists_known_fields() {
        let descriptor = ModelDescriptor {
            id: "mistral-tiny".into(),
            description: "Small and fast".into(),
            default_temperature: Some(0.7),
            max_context_length: Some(32000),
            created: Some(1_700_000_000),
        };
        assert_eq!(
            descriptor.summary(),
            "Now using mistral-tiny\n- Small and fast\n- Temperature: 0.7\n- Max Context Length: 32000\n- Model creation date: 2023-11-14"
        );
    }

    #[test]
    fn summary_skips_missing_fields() {
        let descriptor = ModelDescriptor::new("open-mistral-7b", "");
        assert_eq!(descriptor.summary(), "Now using open-mistral-7b");
    }
}
