use super::conversation::{Conversation, SessionMetadata, Turn};
use crate::error::SessionError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted shape of a finished (or aborted) session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub conversation: Vec<Turn>,
    pub metadata: SessionMetadata,
}

impl SessionRecord {
    pub fn from_conversation(conversation: &Conversation) -> Self {
        Self {
            conversation: conversation.turns().to_vec(),
            metadata: conversation.metadata().clone(),
        }
    }

    pub fn into_conversation(self) -> Conversation {
        Conversation::restore(self.conversation, self.metadata)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// File name used inside the log directory.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.metadata.timestamp)
    }

    /// Write the record into `dir`, creating the directory if needed.
    ///
    /// Two sessions started in the same second get distinct files.
    pub fn save_in(&self, dir: &Path) -> Result<PathBuf, SessionError> {
        let write_error = |path: &Path, message: String| SessionError::Write {
            path: path.display().to_string(),
            message,
        };

        fs::create_dir_all(dir).map_err(|e| write_error(dir, e.to_string()))?;

        let mut path = dir.join(self.file_name());
        let mut suffix = 1;
        while path.exists() {
            path = dir.join(format!("{}-{suffix}.json", self.metadata.timestamp));
            suffix += 1;
        }

        let json = self.to_json().map_err(|e| write_error(&path, e.to_string()))?;
        fs::write(&path, json).map_err(|e| write_error(&path, e.to_string()))?;
        Ok(path)
    }

    pub fn load(path: &Path) -> Result<Self, SessionError> {
        let read_error = |message: String| SessionError::Read {
            path: path.display().to_string(),
            message,
        };
        let text = fs::read_to_string(path).map_err(|e| read_error(e.to_string()))?;
        Self::from_json(&text).map_err(|e| read_error(e.to_string()))
    }
}
