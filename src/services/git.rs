//! Flattens a git repository into one text dump.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

const DEFAULT_MAX_FILE_BYTES: usize = 256 * 1024;
const BINARY_SNIFF_BYTES: usize = 8000;

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("git {command} failed: {stderr}")]
    Git { command: &'static str, stderr: String },
    #[error("{0} is not a directory")]
    NotADirectory(String),
    #[error("the repository has no readable text files")]
    Empty,
}

#[async_trait]
pub trait RepoStringifier: Send + Sync {
    async fn stringify(&self, path_or_url: &str) -> Result<String, RepoError>;
}

/// Uses the `git` binary: remote repositories are shallow-cloned into a
/// temporary directory, tracked files are listed with `git ls-files`.
pub struct GitCli {
    max_file_bytes: usize,
}

impl Default for GitCli {
    fn default() -> Self {
        Self {
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

pub fn is_remote(target: &str) -> bool {
    target.starts_with("http://")
        || target.starts_with("https://")
        || target.starts_with("ssh://")
        || target.starts_with("git@")
}

impl GitCli {
    pub fn with_max_file_bytes(max_file_bytes: usize) -> Self {
        Self { max_file_bytes }
    }

    async fn clone_shallow(&self, url: &str, dest: &Path) -> Result<(), RepoError> {
        debug!(url, "cloning repository");
        let output = Command::new("git")
            .args(["clone", "--depth", "1", "--quiet", url])
            .arg(dest)
            .kill_on_drop(true)
            .output()
            .await?;
        if !output.status.success() {
            return Err(RepoError::Git {
                command: "clone",
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }

    async fn tracked_files(&self, root: &Path) -> Result<Vec<PathBuf>, RepoError> {
        let output = Command::new("git")
            .arg("-C")
            .arg(root)
            .args(["ls-files", "-z"])
            .kill_on_drop(true)
            .output()
            .await?;
        if !output.status.success() {
            return Err(RepoError::Git {
                command: "ls-files",
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output
            .stdout
            .split(|&b| b == 0)
            .filter(|entry| !entry.is_empty())
            .map(|entry| PathBuf::from(String::from_utf8_lossy(entry).into_owned()))
            .collect())
    }

    async fn dump(&self, root: &Path) -> Result<String, RepoError> {
        let mut sections = Vec::new();
        for relative in self.tracked_files(root).await? {
            let bytes = match tokio::fs::read(root.join(&relative)).await {
                Ok(bytes) => bytes,
                Err(err) => {
                    debug!(path = %relative.display(), %err, "skipping unreadable file");
                    continue;
                }
            };
            if let Some(text) = self.text_contents(bytes) {
                sections.push(format_section(&relative, &text));
            }
        }
        if sections.is_empty() {
            return Err(RepoError::Empty);
        }
        Ok(sections.join("\n"))
    }

    fn text_contents(&self, bytes: Vec<u8>) -> Option<String> {
        if bytes.len() > self.max_file_bytes {
            return None;
        }
        let sniff = &bytes[..bytes.len().min(BINARY_SNIFF_BYTES)];
        if sniff.contains(&0) {
            return None;
        }
        String::from_utf8(bytes).ok()
    }
}

fn format_section(path: &Path, text: &str) -> String {
    let mut section = format!("--- {} ---\n{}", path.display(), text);
    if !section.ends_with('\n') {
        section.push('\n');
    }
    section
}

#[async_trait]
impl RepoStringifier for GitCli {
    async fn stringify(&self, path_or_url: &str) -> Result<String, RepoError> {
        let target = path_or_url.trim();
        if is_remote(target) {
            let checkout = tempfile::tempdir()?;
            let dest = checkout.path().join("repo");
            self.clone_shallow(target, &dest).await?;
            return self.dump(&dest).await;
        }

        let root = Path::new(target);
        if !root.is_dir() {
            return Err(RepoError::NotADirectory(target.to_string()));
        }
        self.dump(root).await
    }
}
