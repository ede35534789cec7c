//! Local handling of slash commands.
//!
//! The interceptor looks at the newest message of the conversation. When it
//! names a registered command, the command runs here and its output becomes
//! the assistant's reply; anything else goes to the model untouched.

mod handlers;
mod registry;

pub use handlers::{HIDDEN_END, HIDDEN_START};
pub use registry::{all_commands, find_command, Command, CommandInvocation, CommandKind};

use tracing::{debug, info};

use crate::core::message::ConversationMessage;
use crate::services::Services;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interception {
    NotHandled,
    Handled(String),
}

/// Splits `/name rest of line` into its parts. Returns `None` when the text
/// is not a slash command.
pub fn parse_invocation(content: &str) -> Option<CommandInvocation<'_>> {
    let trimmed = content.trim();
    if !trimmed.starts_with('/') {
        return None;
    }
    let (name, args) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (trimmed, ""),
    };
    Some(CommandInvocation { name, args })
}

pub struct CommandInterceptor {
    services: Services,
}

impl CommandInterceptor {
    pub fn new(services: Services) -> Self {
        Self { services }
    }

    pub async fn intercept(&self, history: &[ConversationMessage]) -> Interception {
        let Some(last) = history.last() else {
            return Interception::NotHandled;
        };
        let Some(invocation) = parse_invocation(&last.content) else {
            return Interception::NotHandled;
        };
        let Some(command) = find_command(invocation.name) else {
            debug!(name = invocation.name, "unknown command passed through");
            return Interception::NotHandled;
        };

        info!(command = command.name, "handling command locally");
        if !invocation.has_args() && command.kind != CommandKind::Help {
            return Interception::Handled(format!("Usage: {}", command.usage));
        }

        let reply = match command.kind {
            CommandKind::Help => handlers::core::help(),
            CommandKind::Read => handlers::io::read(&self.services, invocation.args).await,
            CommandKind::WikiId => handlers::wiki::page(&self.services, invocation.args).await,
            CommandKind::WikiSearch => {
                handlers::wiki::search(&self.services, invocation.args).await
            }
            CommandKind::Git => handlers::git::repository(&self.services, invocation.args).await,
        };
        Interception::Handled(reply)
    }
}
