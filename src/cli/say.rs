//! TUI-less "say" command

use std::error::Error;
use std::io::{self, Write};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::commands::CommandInterceptor;
use crate::core::app::{App, AppOptions};
use crate::core::model::ModelClient;
use crate::ui::transcript::elide_hidden_sections;
use crate::ui::{ChatView, ColorTag};

/// Prints replies to a writer; the user's own text and system lines are
/// only traced.
pub struct PlainView<W: Write> {
    out: W,
}

impl<W: Write> PlainView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ChatView for PlainView<W> {
    fn append_user(&mut self, _sender: &str, text: &str, _color: ColorTag) {
        debug!(text, "sending");
    }

    fn append_assistant(&mut self, _sender: &str, text: &str, _color: ColorTag) {
        let shown = elide_hidden_sections(text);
        if let Err(err) = writeln!(self.out, "{shown}").and_then(|_| self.out.flush()) {
            warn!(error = %err, "failed to write reply");
        }
    }

    fn append_system(&mut self, _sender: &str, text: &str, _color: ColorTag) {
        debug!(text, "system");
    }

    fn set_input_enabled(&mut self, _enabled: bool) {}

    fn clear(&mut self) {}
}

pub async fn run_say(
    prompt: &[String],
    client: Arc<dyn ModelClient>,
    interceptor: Arc<CommandInterceptor>,
    options: AppOptions,
) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    if prompt.trim().is_empty() {
        return Err("Usage: desktop4mistral say <prompt>".into());
    }

    let (mut app, mut rx) = App::new(client, interceptor, PlainView::new(io::stdout()), options);
    app.submit(&prompt).await?;
    while let Some(delivery) = rx.recv().await {
        if app.deliver(delivery) {
            break;
        }
    }
    app.teardown().await;
    Ok(())
}
