//! Collaborators the command interceptor reaches out to.
//!
//! Each service is a trait so the interceptor can be exercised with fakes;
//! the default implementations talk to the local filesystem, the web, the
//! MediaWiki API and the `git` binary.

pub mod fs;
pub mod git;
pub mod web;
pub mod wiki;

use std::sync::Arc;

use crate::core::config::Config;

pub use fs::{FileReader, LocalFiles, ReadError};
pub use git::{GitCli, RepoError, RepoStringifier};
pub use web::{FetchError, HttpFetcher, WebFetcher};
pub use wiki::{MediaWiki, WikiError, WikiHit, WikiService};

/// The full set of collaborators handed to the interceptor.
#[derive(Clone)]
pub struct Services {
    pub files: Arc<dyn FileReader>,
    pub web: Arc<dyn WebFetcher>,
    pub wiki: Arc<dyn WikiService>,
    pub git: Arc<dyn RepoStringifier>,
}

impl Services {
    pub fn from_config(config: &Config, client: reqwest::Client) -> Self {
        Self {
            files: Arc::new(LocalFiles),
            web: Arc::new(HttpFetcher::new(client.clone())),
            wiki: Arc::new(MediaWiki::new(client, config.wiki_base_url())),
            git: Arc::new(GitCli::default()),
        }
    }
}
