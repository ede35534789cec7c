use std::sync::Arc;

use tracing::info;

use crate::core::message::ConversationMessage;
use crate::core::model::{ModelClient, ModelDescriptor, ModelSwitchError};

/// Conversation state for one chat window: the ordered history and the
/// active model binding. Only the main task touches it.
pub struct Session {
    history: Vec<ConversationMessage>,
    system_prompt: String,
    client: Arc<dyn ModelClient>,
    active: Option<ModelDescriptor>,
}

impl Session {
    pub fn new(system_prompt: impl Into<String>, client: Arc<dyn ModelClient>) -> Self {
        let system_prompt = system_prompt.into();
        let active = client.descriptor(&client.model_id());
        Self {
            history: vec![ConversationMessage::system(system_prompt.clone())],
            system_prompt,
            client,
            active,
        }
    }

    pub fn append_user(&mut self, text: impl Into<String>) {
        self.history.push(ConversationMessage::user(text));
    }

    pub fn append_assistant(&mut self, text: impl Into<String>) {
        self.history.push(ConversationMessage::assistant(text));
    }

    pub fn reset_conversation(&mut self) {
        self.history.clear();
        self.history
            .push(ConversationMessage::system(self.system_prompt.clone()));
    }

    /// Activates `id` if the client offers it. On failure nothing changes.
    pub fn switch_model(&mut self, id: &str) -> Result<&ModelDescriptor, ModelSwitchError> {
        if !self.client.list_models().iter().any(|known| known == id) {
            return Err(ModelSwitchError::UnknownModel(id.to_string()));
        }
        self.client.set_model(id);
        info!(model = id, "switched model");
        let descriptor = self
            .client
            .descriptor(id)
            .unwrap_or_else(|| ModelDescriptor::new(id, ""));
        Ok(self.active.insert(descriptor))
    }

    pub fn history(&self) -> &[ConversationMessage] {
        &self.history
    }

    /// Owned copy handed to a background worker.
    pub fn snapshot(&self) -> Vec<ConversationMessage> {
        self.history.clone()
    }

    pub fn active_model_id(&self) -> String {
        self.client.model_id()
    }

    pub fn active_descriptor(&self) -> Option<&ModelDescriptor> {
        self.active.as_ref()
    }

    pub fn client(&self) -> &Arc<dyn ModelClient> {
        &self.client
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }
}
