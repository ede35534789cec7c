//! API key storage.
//!
//! The key comes from `MISTRAL_API_KEY` when set, otherwise from the system
//! keyring where `desktop4mistral auth` stored it.

use std::io::{self, BufRead, Write};

use keyring::Entry;
use tracing::debug;

pub const API_KEY_ENV: &str = "MISTRAL_API_KEY";
const KEYRING_SERVICE: &str = "desktop4mistral";
const KEYRING_USER: &str = "mistral";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Environment,
    Keyring,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("no API key found; set {API_KEY_ENV} or run `desktop4mistral auth`")]
    Missing,
    #[error("no API key entered")]
    Empty,
    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),
    #[error("failed to read the key: {0}")]
    Io(#[from] io::Error),
}

pub fn resolve_api_key() -> Result<(String, KeySource), AuthError> {
    if let Some(key) = non_empty(std::env::var(API_KEY_ENV).ok()) {
        debug!("using API key from environment");
        return Ok((key, KeySource::Environment));
    }

    let entry = Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
    match entry.get_password() {
        Ok(key) => non_empty(Some(key))
            .map(|key| (key, KeySource::Keyring))
            .ok_or(AuthError::Missing),
        Err(keyring::Error::NoEntry) => Err(AuthError::Missing),
        Err(err) => Err(err.into()),
    }
}

pub fn store_api_key(key: &str) -> Result<(), AuthError> {
    let key = non_empty(Some(key.to_string())).ok_or(AuthError::Empty)?;
    Entry::new(KEYRING_SERVICE, KEYRING_USER)?.set_password(&key)?;
    Ok(())
}

/// Returns `false` when there was nothing to remove.
pub fn delete_api_key() -> Result<bool, AuthError> {
    match Entry::new(KEYRING_SERVICE, KEYRING_USER)?.delete_credential() {
        Ok(()) => Ok(true),
        Err(keyring::Error::NoEntry) => Ok(false),
        Err(err) => Err(err.into()),
    }
}

/// Prompts on stdout and reads one line of input as the key.
pub fn prompt_api_key<R: BufRead>(input: &mut R) -> Result<String, AuthError> {
    print!("Enter your Mistral API key: ");
    io::stdout().flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    non_empty(Some(line)).ok_or(AuthError::Empty)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
