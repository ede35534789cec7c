use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::core::message::Role;

/// Appends the conversation to a plain-text file as it happens.
pub struct TranscriptLog {
    file_path: PathBuf,
    user_prefix: String,
}

impl TranscriptLog {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let file_path = path.as_ref().to_path_buf();
        // Fail at startup rather than on the first message.
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)?;

        Ok(Self {
            file_path,
            user_prefix: "You".to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    pub fn log_message(&self, role: Role, content: &str) -> Result<(), Box<dyn std::error::Error>> {
        let text = match role {
            Role::User => format!("{}: {}", self.user_prefix, content),
            Role::Assistant if !content.is_empty() => content.to_string(),
            _ => return Ok(()),
        };
        self.write_to_log(&text)
    }

    /// Marks a conversation boundary, e.g. when a new chat starts.
    pub fn log_marker(&self, marker: &str) -> Result<(), Box<dyn std::error::Error>> {
        self.write_to_log(&format!("## {marker}"))
    }

    fn write_to_log(&self, content: &str) -> Result<(), Box<dyn std::error::Error>> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;
        let mut writer = BufWriter::with_capacity(64 * 1024, file);

        for line in content.lines() {
            writeln!(writer, "{line}")?;
        }
        // Blank line between messages, matching the screen.
        writeln!(writer)?;

        writer.flush()?;
        Ok(())
    }
}
