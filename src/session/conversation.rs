use crate::usage::Cost;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Version tag written into every persisted session record.
pub const PROTOCOL_VERSION: &str = "0.2";

/// Timestamp layout shared by session metadata and log file names.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Who authored a turn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
    /// Synthesized by the loop to report an outcome back into history.
    Observation,
}

/// One role-tagged message in the conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn observation(content: impl Into<String>) -> Self {
        Self::new(Role::Observation, content)
    }
}

/// Run metadata carried alongside the turn log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub timestamp: String,
    #[serde(alias = "log_version")]
    pub protocol_version: String,
    #[serde(alias = "model")]
    pub generator_identity: String,
    #[serde(alias = "cost", default)]
    pub cumulative_cost: Cost,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl SessionMetadata {
    pub fn new(generator_identity: impl Into<String>, started_at: DateTime<Local>) -> Self {
        Self {
            timestamp: started_at.format(TIMESTAMP_FORMAT).to_string(),
            protocol_version: PROTOCOL_VERSION.to_string(),
            generator_identity: generator_identity.into(),
            cumulative_cost: Cost::ZERO,
            session_id: Some(uuid::Uuid::new_v4().to_string()),
        }
    }
}

/// Append-only conversation store for one user session.
///
/// Turns can only be added at the end; there is no API that edits, removes
/// or reorders an existing turn. Metadata changes only through
/// [`Conversation::add_cost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    turns: Vec<Turn>,
    metadata: SessionMetadata,
}

impl Conversation {
    pub fn new(generator_identity: impl Into<String>) -> Self {
        Self::with_metadata(SessionMetadata::new(generator_identity, Local::now()))
    }

    pub fn with_metadata(metadata: SessionMetadata) -> Self {
        Self {
            turns: Vec::new(),
            metadata,
        }
    }

    /// Rebuild a conversation from a persisted turn log.
    pub fn restore(turns: Vec<Turn>, metadata: SessionMetadata) -> Self {
        Self { turns, metadata }
    }

    /// Append a turn and return its position in the log.
    pub fn append(&mut self, turn: Turn) -> usize {
        tracing::debug!(
            role = turn.role.as_ref(),
            index = self.turns.len(),
            chars = turn.content.len(),
            "turn appended"
        );
        self.turns.push(turn);
        self.turns.len() - 1
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Most recent turn with the given role.
    pub fn last_of(&self, role: Role) -> Option<&Turn> {
        self.turns.iter().rev().find(|turn| turn.role == role)
    }

    pub fn metadata(&self) -> &SessionMetadata {
        &self.metadata
    }

    /// Accumulate generator spend. Turns are not touched.
    pub fn add_cost(&mut self, delta: Cost) {
        self.metadata.cumulative_cost = self.metadata.cumulative_cost.saturating_add(delta);
    }
}
