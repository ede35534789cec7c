use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::api::models::fetch_models;
use crate::api::{construct_api_url, summarize_error_body, ChatMessage, ChatRequest, ChatResponse};
use crate::core::message::ConversationMessage;
use crate::core::model::{ModelClient, ModelDescriptor, TransportError};

/// [`ModelClient`] backed by the hosted Mistral API.
///
/// The model list is cached so the main task can validate a switch without
/// touching the network; call [`MistralClient::refresh_models`] to fill it.
pub struct MistralClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    active: RwLock<String>,
    models: RwLock<Vec<ModelDescriptor>>,
}

impl MistralClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            active: RwLock::new(model.into()),
            models: RwLock::new(Vec::new()),
        }
    }

    pub async fn refresh_models(&self) -> Result<usize, TransportError> {
        let models = fetch_models(&self.http, &self.base_url, &self.api_key).await?;
        let count = models.len();
        info!(count, "fetched model list");
        self.replace_models(models);
        Ok(count)
    }

    /// Replaces the cached list, e.g. with the configured model when the
    /// list could not be fetched.
    pub fn replace_models(&self, models: Vec<ModelDescriptor>) {
        *self.models.write().unwrap_or_else(PoisonError::into_inner) = models;
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ModelClient for MistralClient {
    fn list_models(&self) -> Vec<String> {
        self.models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|model| model.id.clone())
            .collect()
    }

    fn model_id(&self) -> String {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn descriptors(&self) -> Vec<ModelDescriptor> {
        self.models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_model(&self, id: &str) {
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = id.to_string();
    }

    async fn send_chat_message(
        &self,
        history: &[ConversationMessage],
    ) -> Result<String, TransportError> {
        let request = ChatRequest {
            model: self.model_id(),
            messages: history.iter().map(ChatMessage::from).collect(),
            stream: false,
        };
        debug!(model = %request.model, messages = request.messages.len(), "posting chat completion");

        let response = self
            .http
            .post(construct_api_url(&self.base_url, "chat/completions"))
            .header("Content-Type", "application/json")
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status,
                summary: summarize_error_body(&body),
            });
        }

        response.json::<ChatResponse>().await?.into_text()
    }
}
