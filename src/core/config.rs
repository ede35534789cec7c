use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.mistral.ai/v1";
pub const DEFAULT_MODEL: &str = "mistral-tiny";
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant running inside a desktop chat client. \
Messages may include file, web page, Wikipedia or repository contents the user loaded with a command.";
pub const DEFAULT_WIKI_BASE_URL: &str = "https://en.wikipedia.org/w/api.php";
const DEFAULT_CANCEL_GRACE_MS: u64 = 2000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Colours for the transcript, as `#rrggbb` strings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ThemeConfig {
    pub user: String,
    pub system: String,
    pub assistant: String,
    pub text: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            user: "#b0b0ff".to_string(),
            system: "#ffb0b0".to_string(),
            assistant: "#ffb080".to_string(),
            text: "#e0e0e0".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// API endpoint, e.g. "https://api.mistral.ai/v1"
    pub base_url: Option<String>,
    /// Model activated when a chat opens
    pub default_model: Option<String>,
    /// First message of every conversation
    pub system_prompt: Option<String>,
    /// How long a superseded request may take to wind down before it is aborted
    pub cancel_grace_ms: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    /// MediaWiki action API used by /wiki_id and /wiki_search
    pub wiki_base_url: Option<String>,
    #[serde(default)]
    pub theme: ThemeConfig,
}

impl Config {
    pub fn load() -> Result<Config, Box<dyn std::error::Error>> {
        let config_path = Self::get_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn load_from_path(config_path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save_to_path(&self, config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        let proj_dirs = ProjectDirs::from("", "", "desktop4mistral")
            .ok_or("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn default_model(&self) -> &str {
        self.default_model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn system_prompt(&self) -> &str {
        self.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }

    pub fn wiki_base_url(&self) -> &str {
        self.wiki_base_url.as_deref().unwrap_or(DEFAULT_WIKI_BASE_URL)
    }

    pub fn cancel_grace(&self) -> Duration {
        Duration::from_millis(self.cancel_grace_ms.unwrap_or(DEFAULT_CANCEL_GRACE_MS))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }
}
