//! Controller behind the chat front ends.
//!
//! [`App`] is owned by the main task. It mutates the [`Session`], starts and
//! cancels dispatch workers through the [`WorkerLifecycle`], and mirrors every
//! history change to the [`ChatView`]. Worker results arrive on the receiver
//! returned by [`App::new`] and must be handed back through [`App::deliver`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::commands::CommandInterceptor;
use crate::core::config::Config;
use crate::core::dispatch::DispatchWorker;
use crate::core::lifecycle::{CancelOutcome, Delivery, LifecycleError, WorkerLifecycle};
use crate::core::message::Role;
use crate::core::model::{ModelClient, ModelDescriptor};
use crate::core::session::Session;
use crate::ui::{ChatView, ColorTag};
use crate::utils::logging::TranscriptLog;

pub const USER_SENDER: &str = "You";
pub const SYSTEM_SENDER: &str = "System";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputState {
    Idle,
    AwaitingResponse,
    /// Terminal. Nothing is accepted once here.
    Closing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("still waiting for the previous response")]
    Busy,
    #[error("the session is closing")]
    Closing,
}

pub struct AppOptions {
    pub system_prompt: String,
    /// Activated on startup; `None` keeps whatever the client starts with.
    pub default_model: Option<String>,
    pub cancel_grace: Duration,
    pub transcript: Option<TranscriptLog>,
}

impl AppOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            system_prompt: config.system_prompt().to_string(),
            default_model: Some(config.default_model().to_string()),
            cancel_grace: config.cancel_grace(),
            transcript: None,
        }
    }
}

pub struct App<V: ChatView> {
    session: Session,
    lifecycle: WorkerLifecycle,
    interceptor: Arc<CommandInterceptor>,
    view: V,
    state: InputState,
    transcript: Option<TranscriptLog>,
}

impl<V: ChatView> App<V> {
    pub fn new(
        client: Arc<dyn ModelClient>,
        interceptor: Arc<CommandInterceptor>,
        view: V,
        options: AppOptions,
    ) -> (Self, mpsc::UnboundedReceiver<Delivery>) {
        let (lifecycle, rx) = WorkerLifecycle::new(options.cancel_grace);
        let mut app = Self {
            session: Session::new(options.system_prompt, client),
            lifecycle,
            interceptor,
            view,
            state: InputState::Idle,
            transcript: options.transcript,
        };

        match options.default_model {
            Some(id) => app.switch_model(&id),
            None => {
                if let Some(summary) = app.session.active_descriptor().map(ModelDescriptor::summary)
                {
                    app.system_line(&summary);
                }
            }
        }
        app.view.set_input_enabled(true);
        (app, rx)
    }

    /// Appends the user's message and starts a worker for it. Returns
    /// `Ok(false)` for blank input, which is ignored.
    pub async fn submit(&mut self, text: &str) -> Result<bool, SubmitError> {
        match self.state {
            InputState::Closing => return Err(SubmitError::Closing),
            InputState::AwaitingResponse => return Err(SubmitError::Busy),
            InputState::Idle => {}
        }
        let text = text.trim();
        if text.is_empty() {
            return Ok(false);
        }

        self.session.append_user(text);
        self.view.append_user(USER_SENDER, text, ColorTag::User);
        self.log(Role::User, text);

        let worker = DispatchWorker::new(self.interceptor.clone(), self.session.client().clone());
        let snapshot = self.session.snapshot();
        let worker_id = self
            .lifecycle
            .start(move |cancel| worker.run(snapshot, cancel))
            .await
            .map_err(|_: LifecycleError| SubmitError::Closing)?;
        debug!(worker_id, "submitted message");

        self.state = InputState::AwaitingResponse;
        self.view.set_input_enabled(false);
        Ok(true)
    }

    /// Applies a worker result. Stale results and anything arriving after
    /// teardown are dropped and `false` is returned.
    pub fn deliver(&mut self, delivery: Delivery) -> bool {
        let Some(result) = self.lifecycle.accept(delivery) else {
            return false;
        };

        self.session.append_assistant(result.text.clone());
        let sender = self.session.active_model_id();
        self.view
            .append_assistant(&sender, &result.text, ColorTag::Assistant);
        self.log(Role::Assistant, &result.text);

        self.state = InputState::Idle;
        self.view.set_input_enabled(true);
        true
    }

    /// Reports the outcome as a system line either way.
    pub fn switch_model(&mut self, id: &str) {
        let line = match self.session.switch_model(id) {
            Ok(descriptor) => descriptor.summary(),
            Err(err) => {
                warn!(model = id, "model switch rejected");
                err.to_string()
            }
        };
        self.system_line(&line);
    }

    /// Drops any in-flight request, then starts over with only the system
    /// prompt in the history.
    pub async fn new_chat(&mut self) {
        if self.state == InputState::Closing {
            return;
        }
        let outcome = self.lifecycle.cancel_current().await;
        debug!(?outcome, "starting new chat");

        self.session.reset_conversation();
        self.view.clear();
        if let Some(log) = &self.transcript {
            if let Err(err) = log.log_marker("New chat") {
                warn!(error = %err, "failed to write transcript");
            }
        }
        info!("conversation reset");

        self.state = InputState::Idle;
        self.view.set_input_enabled(true);
    }

    /// Cancels the in-flight request, if any. The user message stays in the
    /// history without a reply.
    pub async fn cancel(&mut self) -> CancelOutcome {
        if self.state != InputState::AwaitingResponse {
            return CancelOutcome::Idle;
        }
        let outcome = self.lifecycle.cancel_current().await;
        self.system_line("Request cancelled.");
        self.state = InputState::Idle;
        self.view.set_input_enabled(true);
        outcome
    }

    /// Enters `Closing` before draining the worker.
    pub async fn teardown(&mut self) -> CancelOutcome {
        if self.state == InputState::Closing && self.lifecycle.is_closing() {
            return CancelOutcome::Idle;
        }
        self.state = InputState::Closing;
        self.view.set_input_enabled(false);
        let outcome = self.lifecycle.teardown().await;
        info!(?outcome, "session closed");
        outcome
    }

    pub fn state(&self) -> InputState {
        self.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn model_id(&self) -> String {
        self.session.active_model_id()
    }

    pub fn descriptors(&self) -> Vec<ModelDescriptor> {
        self.session.client().descriptors()
    }

    pub fn worker_id(&self) -> Option<u64> {
        self.lifecycle.current_id()
    }

    pub fn transcript_path(&self) -> Option<&std::path::Path> {
        self.transcript.as_ref().map(TranscriptLog::path)
    }

    fn system_line(&mut self, text: &str) {
        self.view.append_system(SYSTEM_SENDER, text, ColorTag::System);
    }

    fn log(&self, role: Role, text: &str) {
        if let Some(log) = &self.transcript {
            if let Err(err) = log.log_message(role, text) {
                warn!(error = %err, "failed to write transcript");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dispatch::DispatchResult;
    use crate::core::message::ConversationMessage;
    use crate::utils::test_utils::{FakeModelClient, FakeServices, RecordingView, ViewEvent};

    fn options() -> AppOptions {
        AppOptions {
            system_prompt: "P".into(),
            default_model: None,
            cancel_grace: Duration::from_millis(50),
            transcript: None,
        }
    }

    fn app(
        client: &Arc<FakeModelClient>,
        fakes: &FakeServices,
    ) -> (App<RecordingView>, mpsc::UnboundedReceiver<Delivery>) {
        App::new(
            client.clone(),
            fakes.interceptor(),
            RecordingView::default(),
            options(),
        )
    }

    #[tokio::test]
    async fn reply_is_appended_and_input_reenabled() {
        let client = Arc::new(FakeModelClient::new(&["mistral-tiny"]));
        client.push_reply(Ok("world".into()));
        let fakes = FakeServices::default();
        let (mut app, mut rx) = app(&client, &fakes);

        assert_eq!(app.submit("hello").await, Ok(true));
        assert_eq!(app.state(), InputState::AwaitingResponse);
        assert_eq!(app.view().input_enabled(), Some(false));

        let delivery = rx.recv().await.expect("delivery");
        assert!(app.deliver(delivery));

        assert_eq!(
            app.session().history(),
            &[
                ConversationMessage::system("P"),
                ConversationMessage::user("hello"),
                ConversationMessage::assistant("world"),
            ]
        );
        assert_eq!(app.state(), InputState::Idle);
        assert_eq!(app.view().input_enabled(), Some(true));
        assert!(app.view().events.contains(&ViewEvent::User(
            USER_SENDER.into(),
            "hello".into()
        )));
        assert!(app.view().events.contains(&ViewEvent::Assistant(
            "mistral-tiny".into(),
            "world".into()
        )));
    }

    #[tokio::test]
    async fn intercepted_command_never_reaches_client() {
        let client = Arc::new(FakeModelClient::new(&["mistral-tiny"]));
        let fakes = FakeServices::default();
        let (mut app, mut rx) = app(&client, &fakes);

        app.submit("/read /nonexistent/file").await.expect("submit");
        let delivery = rx.recv().await.expect("delivery");
        app.deliver(delivery);

        let history = app.session().history();
        assert_eq!(history.len(), 3);
        assert_eq!(
            history[1],
            ConversationMessage::user("/read /nonexistent/file")
        );
        assert_eq!(
            history[2],
            ConversationMessage::assistant("I couldn't find that file.")
        );
        assert_eq!(client.send_count(), 0);
    }

    #[tokio::test]
    async fn submit_while_waiting_is_rejected() {
        let client = Arc::new(FakeModelClient::new(&["mistral-tiny"]));
        client.set_delay(Duration::from_secs(30));
        let fakes = FakeServices::default();
        let (mut app, _rx) = app(&client, &fakes);

        app.submit("first").await.expect("submit");
        assert_eq!(app.submit("second").await, Err(SubmitError::Busy));
        assert_eq!(app.session().history().len(), 2);
        app.teardown().await;
    }

    #[tokio::test]
    async fn blank_submit_is_ignored() {
        let client = Arc::new(FakeModelClient::new(&["mistral-tiny"]));
        let fakes = FakeServices::default();
        let (mut app, _rx) = app(&client, &fakes);

        assert_eq!(app.submit("   \n").await, Ok(false));
        assert_eq!(app.state(), InputState::Idle);
        assert_eq!(app.session().history().len(), 1);
        assert_eq!(app.worker_id(), None);
    }

    #[tokio::test]
    async fn nothing_is_appended_after_teardown() {
        let client = Arc::new(FakeModelClient::new(&["mistral-tiny"]));
        client.set_delay(Duration::from_secs(30));
        let fakes = FakeServices::default();
        let (mut app, mut rx) = app(&client, &fakes);

        app.submit("hello").await.expect("submit");
        let worker_id = app.worker_id().expect("live worker");
        app.teardown().await;

        assert_eq!(app.state(), InputState::Closing);
        assert!(rx.try_recv().is_err());
        // Even a result carrying the right id is refused once closing.
        assert!(!app.deliver(Delivery {
            worker_id,
            result: DispatchResult::model("late"),
        }));
        assert!(app.view().assistant_texts().is_empty());
        assert_eq!(app.session().history().len(), 2);
        assert_eq!(app.submit("again").await, Err(SubmitError::Closing));
    }

    #[tokio::test]
    async fn new_chat_discards_in_flight_reply() {
        let client = Arc::new(FakeModelClient::new(&["mistral-tiny"]));
        client.set_delay(Duration::from_secs(30));
        let fakes = FakeServices::default();
        let (mut app, mut rx) = app(&client, &fakes);

        app.submit("hello").await.expect("submit");
        let stale_id = app.worker_id().expect("live worker");
        app.new_chat().await;

        assert_eq!(app.state(), InputState::Idle);
        assert_eq!(app.session().history(), &[ConversationMessage::system("P")]);
        assert!(app.view().events.contains(&ViewEvent::Cleared));
        assert!(rx.try_recv().is_err());
        assert!(!app.deliver(Delivery {
            worker_id: stale_id,
            result: DispatchResult::model("late"),
        }));
        assert_eq!(app.session().history().len(), 1);
    }

    #[tokio::test]
    async fn cancel_returns_to_idle() {
        let client = Arc::new(FakeModelClient::new(&["mistral-tiny"]));
        client.set_delay(Duration::from_secs(30));
        let fakes = FakeServices::default();
        let (mut app, mut rx) = app(&client, &fakes);

        assert_eq!(app.cancel().await, CancelOutcome::Idle);
        app.submit("hello").await.expect("submit");
        assert_eq!(app.cancel().await, CancelOutcome::Cooperative);

        assert_eq!(app.state(), InputState::Idle);
        assert_eq!(app.view().input_enabled(), Some(true));
        assert!(app.view().system_texts().contains(&"Request cancelled."));
        assert!(rx.try_recv().is_err());

        client.set_delay(Duration::ZERO);
        client.push_reply(Ok("again".into()));
        app.submit("retry").await.expect("submit");
        let delivery = rx.recv().await.expect("delivery");
        assert!(app.deliver(delivery));
        assert_eq!(app.view().assistant_texts(), vec!["again"]);
    }

    #[tokio::test]
    async fn switch_model_reports_outcome_as_system_line() {
        let client = Arc::new(FakeModelClient::new(&["mistral-tiny", "mistral-large"]));
        let fakes = FakeServices::default();
        let (mut app, _rx) = app(&client, &fakes);

        app.switch_model("mistral-large");
        app.switch_model("gpt-4");

        assert_eq!(app.model_id(), "mistral-large");
        let lines = app.view().system_texts();
        assert!(lines
            .iter()
            .any(|line| line.starts_with("Now using mistral-large")));
        assert_eq!(lines.last(), Some(&"Unknown model: gpt-4"));
        assert_eq!(app.session().history().len(), 1);
    }

    #[tokio::test]
    async fn default_model_is_activated_on_startup() {
        let client = Arc::new(FakeModelClient::new(&["mistral-tiny", "mistral-large"]));
        let fakes = FakeServices::default();
        let (app, _rx) = App::new(
            client.clone(),
            fakes.interceptor(),
            RecordingView::default(),
            AppOptions {
                default_model: Some("mistral-large".into()),
                ..options()
            },
        );

        assert_eq!(app.model_id(), "mistral-large");
        assert!(app.view().system_texts()[0].starts_with("Now using mistral-large"));
    }

    #[tokio::test]
    async fn transcript_records_both_sides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("chat.log");
        let client = Arc::new(FakeModelClient::new(&["mistral-tiny"]));
        client.push_reply(Ok("world".into()));
        let fakes = FakeServices::default();
        let (mut app, mut rx) = App::new(
            client.clone(),
            fakes.interceptor(),
            RecordingView::default(),
            AppOptions {
                transcript: Some(TranscriptLog::new(&path).expect("log")),
                ..options()
            },
        );

        app.submit("hello").await.expect("submit");
        let delivery = rx.recv().await.expect("delivery");
        app.deliver(delivery);

        let written = std::fs::read_to_string(&path).expect("read");
        assert_eq!(written, "You: hello\n\nworld\n\n");
    }
}
