//! Event loop for the interactive chat.
//!
//! The loop owns the [`App`] and is the only place it is touched. Terminal
//! events come from a reader task over a channel, worker results over the
//! delivery channel returned by [`App::new`], and a slow tick keeps the
//! activity indicator moving.

pub mod keybindings;
pub mod lifecycle;

use std::{error::Error, sync::Arc, time::Duration};

use ratatui::crossterm::event::{self, Event, KeyEvent};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use tui_textarea::{Input, TextArea};

use crate::commands::CommandInterceptor;
use crate::core::app::{App, AppOptions, SubmitError};
use crate::core::lifecycle::CancelOutcome;
use crate::core::model::ModelClient;
use crate::ui::picker::ModelPicker;
use crate::ui::renderer::ui;
use crate::ui::theme::Theme;
use crate::ui::transcript::TranscriptView;

use self::keybindings::{resolve_key, KeyAction};
use self::lifecycle::{restore_terminal, setup_terminal};

const TICK: Duration = Duration::from_millis(250);

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
}

pub struct ChatSetup {
    pub client: Arc<dyn ModelClient>,
    pub interceptor: Arc<CommandInterceptor>,
    pub options: AppOptions,
    pub theme: Theme,
}

/// The app plus everything only the terminal front end cares about.
pub struct ChatScreen {
    pub app: App<TranscriptView>,
    pub textarea: TextArea<'static>,
    pub picker: Option<ModelPicker>,
    pub status: Option<String>,
    pub theme: Theme,
    /// Transcript rows visible in the last frame; one PageUp scrolls this far.
    pub page_height: u16,
    pub ticks: u64,
    pub exit_requested: bool,
}

impl ChatScreen {
    pub fn new(app: App<TranscriptView>, theme: Theme) -> Self {
        Self {
            app,
            textarea: TextArea::default(),
            picker: None,
            status: None,
            theme,
            page_height: 10,
            ticks: 0,
            exit_requested: false,
        }
    }

    pub async fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key).await,
            Event::Paste(text) => {
                if self.app.view().input_enabled() && self.picker.is_none() {
                    self.textarea.insert_str(text);
                }
            }
            _ => {}
        }
    }

    pub async fn handle_key(&mut self, key: KeyEvent) {
        let action = resolve_key(&key, self.picker.is_some());
        if action != KeyAction::Edit && action != KeyAction::Ignore {
            debug!(?action, "key action");
        }

        match action {
            KeyAction::Quit => self.exit_requested = true,
            KeyAction::Submit => self.submit().await,
            KeyAction::CancelRequest => {
                if self.app.cancel().await == CancelOutcome::Idle {
                    self.status = None;
                }
            }
            KeyAction::NewChat => {
                self.app.new_chat().await;
                self.status = Some("Started a new chat".to_string());
            }
            KeyAction::OpenPicker => {
                let models = self.app.descriptors();
                if models.is_empty() {
                    self.status = Some("No models available".to_string());
                } else {
                    self.picker = Some(ModelPicker::new(models, &self.app.model_id()));
                }
            }
            KeyAction::ClosePicker => self.picker = None,
            KeyAction::PickerUp => {
                if let Some(picker) = self.picker.as_mut() {
                    picker.move_up();
                }
            }
            KeyAction::PickerDown => {
                if let Some(picker) = self.picker.as_mut() {
                    picker.move_down();
                }
            }
            KeyAction::PickerSelect => {
                let selected = self
                    .picker
                    .take()
                    .and_then(|picker| picker.selected_id().map(str::to_owned));
                if let Some(id) = selected {
                    self.app.switch_model(&id);
                }
            }
            KeyAction::PageUp => self.app.view_mut().scroll_up(self.page_height),
            KeyAction::PageDown => self.app.view_mut().scroll_down(self.page_height),
            KeyAction::Edit => {
                if self.app.view().input_enabled() {
                    self.textarea.input(Input::from(key));
                }
            }
            KeyAction::Ignore => {}
        }
    }

    async fn submit(&mut self) {
        let text = self.textarea.lines().join("\n");
        match self.app.submit(&text).await {
            Ok(true) => {
                self.textarea = TextArea::default();
                self.status = None;
            }
            Ok(false) => {}
            Err(SubmitError::Busy) => {
                self.status = Some(SubmitError::Busy.to_string());
            }
            Err(SubmitError::Closing) => {}
        }
    }
}

fn spawn_event_reader(event_tx: mpsc::UnboundedSender<UiEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => {
                        continue;
                    }
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

pub async fn run_chat(setup: ChatSetup) -> Result<(), Box<dyn Error>> {
    let (app, mut deliveries) = App::new(
        setup.client,
        setup.interceptor,
        TranscriptView::default(),
        setup.options,
    );
    let mut screen = ChatScreen::new(app, setup.theme);

    let mut terminal = setup_terminal()?;
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let event_reader_handle = spawn_event_reader(event_tx);
    let mut ticker = tokio::time::interval(TICK);

    let result: Result<(), Box<dyn Error>> = 'main_loop: loop {
        if let Err(err) = terminal.draw(|f| ui(f, &mut screen)) {
            break 'main_loop Err(err.into());
        }

        tokio::select! {
            Some(UiEvent::Crossterm(event)) = event_rx.recv() => {
                screen.handle_event(event).await;
            }
            Some(delivery) = deliveries.recv() => {
                if !screen.app.deliver(delivery) {
                    debug!("ignored stale delivery");
                }
            }
            _ = ticker.tick() => {
                screen.ticks = screen.ticks.wrapping_add(1);
            }
        }

        if screen.exit_requested {
            break 'main_loop Ok(());
        }
    };

    screen.app.teardown().await;
    event_reader_handle.abort();

    if let Err(err) = restore_terminal(&mut terminal) {
        warn!(error = %err, "failed to restore terminal");
    }

    result
}
