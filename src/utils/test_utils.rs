//! Scripted stand-ins for every collaborator the core talks to.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use crate::commands::CommandInterceptor;
use crate::core::message::ConversationMessage;
use crate::core::model::{ModelClient, ModelDescriptor, TransportError};
use crate::services::{
    FetchError, FileReader, ReadError, RepoError, RepoStringifier, Services, WebFetcher,
    WikiError, WikiHit, WikiService,
};
use crate::ui::{ChatView, ColorTag};

#[derive(Default)]
pub struct FakeFiles {
    pub files: Mutex<HashMap<String, Result<String, ReadError>>>,
    pub reads: Mutex<Vec<String>>,
}

impl FakeFiles {
    pub fn insert(&self, path: &str, result: Result<String, ReadError>) {
        self.files.lock().unwrap().insert(path.to_string(), result);
    }

    pub fn read_count(&self) -> usize {
        self.reads.lock().unwrap().len()
    }
}

#[async_trait]
impl FileReader for FakeFiles {
    async fn read(&self, path: &str) -> Result<String, ReadError> {
        self.reads.lock().unwrap().push(path.to_string());
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or(Err(ReadError::NotFound))
    }
}

#[derive(Default)]
pub struct FakeWeb {
    pub pages: Mutex<HashMap<String, String>>,
    pub fetches: Mutex<Vec<String>>,
}

impl FakeWeb {
    pub fn insert(&self, url: &str, body: &str) {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), body.to_string());
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }
}

#[async_trait]
impl WebFetcher for FakeWeb {
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        self.fetches.lock().unwrap().push(url.to_string());
        self.pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

#[derive(Default)]
pub struct FakeWiki {
    pub pages: Mutex<HashMap<String, String>>,
    pub hits: Mutex<Vec<WikiHit>>,
    pub search_fails: Mutex<bool>,
}

#[async_trait]
impl WikiService for FakeWiki {
    async fn convert_page(&self, id: &str) -> Result<String, WikiError> {
        self.pages
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or(WikiError::PageNotFound)
    }

    async fn search(&self, _query: &str) -> Result<Vec<WikiHit>, WikiError> {
        if *self.search_fails.lock().unwrap() {
            return Err(WikiError::Malformed("boom".into()));
        }
        Ok(self.hits.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct FakeGit {
    pub dump: Mutex<Option<String>>,
}

#[async_trait]
impl RepoStringifier for FakeGit {
    async fn stringify(&self, _path_or_url: &str) -> Result<String, RepoError> {
        self.dump.lock().unwrap().clone().ok_or(RepoError::Empty)
    }
}

#[derive(Default, Clone)]
pub struct FakeServices {
    pub files: Arc<FakeFiles>,
    pub web: Arc<FakeWeb>,
    pub wiki: Arc<FakeWiki>,
    pub git: Arc<FakeGit>,
}

impl FakeServices {
    pub fn services(&self) -> Services {
        Services {
            files: self.files.clone(),
            web: self.web.clone(),
            wiki: self.wiki.clone(),
            git: self.git.clone(),
        }
    }

    pub fn interceptor(&self) -> Arc<CommandInterceptor> {
        Arc::new(CommandInterceptor::new(self.services()))
    }
}

/// Replies from a queue; an empty queue answers "ok".
pub struct FakeModelClient {
    pub models: Vec<ModelDescriptor>,
    pub active: RwLock<String>,
    pub replies: Mutex<VecDeque<Result<String, TransportError>>>,
    pub sent: Mutex<Vec<Vec<ConversationMessage>>>,
    pub delay: Mutex<Option<Duration>>,
    sends: AtomicUsize,
}

impl FakeModelClient {
    pub fn new(ids: &[&str]) -> Self {
        Self {
            models: ids
                .iter()
                .map(|id| ModelDescriptor::new(*id, format!("{id} description")))
                .collect(),
            active: RwLock::new(ids.first().copied().unwrap_or_default().to_string()),
            replies: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            delay: Mutex::new(None),
            sends: AtomicUsize::new(0),
        }
    }

    pub fn push_reply(&self, reply: Result<String, TransportError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn send_count(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelClient for FakeModelClient {
    fn list_models(&self) -> Vec<String> {
        self.models.iter().map(|m| m.id.clone()).collect()
    }

    fn model_id(&self) -> String {
        self.active.read().unwrap().clone()
    }

    fn descriptors(&self) -> Vec<ModelDescriptor> {
        self.models.clone()
    }

    fn set_model(&self, id: &str) {
        *self.active.write().unwrap() = id.to_string();
    }

    async fn send_chat_message(
        &self,
        history: &[ConversationMessage],
    ) -> Result<String, TransportError> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(history.to_vec());
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let reply = self.replies.lock().unwrap().pop_front();
        reply.unwrap_or_else(|| Ok("ok".to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    User(String, String),
    Assistant(String, String),
    System(String, String),
    InputEnabled(bool),
    Cleared,
}

#[derive(Default)]
pub struct RecordingView {
    pub events: Vec<ViewEvent>,
}

impl RecordingView {
    pub fn assistant_texts(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ViewEvent::Assistant(_, text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn system_texts(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ViewEvent::System(_, text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn input_enabled(&self) -> Option<bool> {
        self.events.iter().rev().find_map(|event| match event {
            ViewEvent::InputEnabled(enabled) => Some(*enabled),
            _ => None,
        })
    }
}

impl ChatView for RecordingView {
    fn append_user(&mut self, sender: &str, text: &str, _color: ColorTag) {
        self.events
            .push(ViewEvent::User(sender.to_string(), text.to_string()));
    }

    fn append_assistant(&mut self, sender: &str, text: &str, _color: ColorTag) {
        self.events
            .push(ViewEvent::Assistant(sender.to_string(), text.to_string()));
    }

    fn append_system(&mut self, sender: &str, text: &str, _color: ColorTag) {
        self.events
            .push(ViewEvent::System(sender.to_string(), text.to_string()));
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.events.push(ViewEvent::InputEnabled(enabled));
    }

    fn clear(&mut self) {
        self.events.push(ViewEvent::Cleared);
    }
}
