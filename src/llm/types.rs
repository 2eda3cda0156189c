use crate::session::{Role, Turn};
use crate::usage::TokenUsage;
use serde::{Deserialize, Serialize};

/// Wire roles understood by chat-completion endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl From<Role> for MessageRole {
    fn from(role: Role) -> Self {
        match role {
            Role::System => Self::System,
            // Observations are reported back as if the user pasted them.
            Role::User | Role::Observation => Self::User,
            Role::Assistant => Self::Assistant,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ProviderMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

impl From<&Turn> for ProviderMessage {
    fn from(turn: &Turn) -> Self {
        Self::new(turn.role.into(), turn.content.clone())
    }
}

/// Full ordered history in wire form.
pub fn messages_from_turns(turns: &[Turn]) -> Vec<ProviderMessage> {
    turns.iter().map(ProviderMessage::from).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderResponse {
    pub text: String,
    pub usage: Option<TokenUsage>,
    pub model: Option<String>,
}

impl ProviderResponse {
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: None,
            model: None,
        }
    }

    pub fn with_usage(text: impl Into<String>, input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            text: text.into(),
            usage: Some(TokenUsage {
                input_tokens,
                output_tokens,
            }),
            model: None,
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}
