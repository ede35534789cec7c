//! One request/response round trip, run off the main task.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::commands::{CommandInterceptor, Interception};
use crate::core::message::ConversationMessage;
use crate::core::model::ModelClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchSource {
    Command,
    Model,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResult {
    pub text: String,
    pub source: DispatchSource,
}

impl DispatchResult {
    pub fn command(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: DispatchSource::Command,
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: DispatchSource::Model,
        }
    }

    pub fn error(detail: impl std::fmt::Display) -> Self {
        Self {
            text: format!("Error: {detail}"),
            source: DispatchSource::Error,
        }
    }
}

/// Asks the interceptor first and falls back to the model. Never fails: a
/// transport fault becomes an `Error: ...` result.
#[derive(Clone)]
pub struct DispatchWorker {
    interceptor: Arc<CommandInterceptor>,
    client: Arc<dyn ModelClient>,
}

impl DispatchWorker {
    pub fn new(interceptor: Arc<CommandInterceptor>, client: Arc<dyn ModelClient>) -> Self {
        Self {
            interceptor,
            client,
        }
    }

    /// Returns `None` only when `cancel` fired before a result existed.
    pub async fn run(
        self,
        history: Vec<ConversationMessage>,
        cancel: CancellationToken,
    ) -> Option<DispatchResult> {
        let interception = tokio::select! {
            interception = self.interceptor.intercept(&history) => interception,
            _ = cancel.cancelled() => return None,
        };
        if let Interception::Handled(text) = interception {
            return Some(DispatchResult::command(text));
        }

        if cancel.is_cancelled() {
            return None;
        }
        debug!(messages = history.len(), "sending history to model");
        let reply = tokio::select! {
            reply = self.client.send_chat_message(&history) => reply,
            _ = cancel.cancelled() => return None,
        };
        Some(match reply {
            Ok(text) => DispatchResult::model(text),
            Err(err) => DispatchResult::error(err),
        })
    }
}
