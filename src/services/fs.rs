use std::io;

use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadError {
    #[error("file not found")]
    NotFound,
    #[error("permission denied")]
    PermissionDenied,
    #[error("{0}")]
    Other(String),
}

impl From<io::Error> for ReadError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => ReadError::NotFound,
            io::ErrorKind::PermissionDenied => ReadError::PermissionDenied,
            _ => ReadError::Other(err.to_string()),
        }
    }
}

#[async_trait]
pub trait FileReader: Send + Sync {
    async fn read(&self, path: &str) -> Result<String, ReadError>;
}

/// Reads UTF-8 text from the local filesystem.
pub struct LocalFiles;

#[async_trait]
impl FileReader for LocalFiles {
    async fn read(&self, path: &str) -> Result<String, ReadError> {
        Ok(tokio::fs::read_to_string(path).await?)
    }
}
