//! Chat-completion response shape returned by the vision API.
//!
//! Only the fields the adapter reads are modelled, all of them optional so a
//! drifted payload deserializes and then fails in [`ChatCompletion::first_content`].

use serde::{Deserialize, Serialize};

use crate::error::GuardError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatCompletion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<CompletionUsage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionChoice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<CompletionMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

impl ChatCompletion {
    /// Completion carrying a single assistant message. Handy for mock analyzers.
    pub fn from_text(content: impl Into<String>) -> Self {
        Self {
            choices: vec![CompletionChoice {
                message: Some(CompletionMessage {
                    role: Some("assistant".to_string()),
                    content: Some(content.into()),
                }),
                finish_reason: Some("stop".to_string()),
            }],
            ..Default::default()
        }
    }

    /// Text of the first choice's message.
    pub fn first_content(&self) -> Result<&str, GuardError> {
        let choice = self.choices.first().ok_or_else(|| {
            GuardError::MalformedModelResponse("response has no choices".to_string())
        })?;
        choice
            .message
            .as_ref()
            .and_then(|m| m.content.as_deref())
            .ok_or_else(|| {
                GuardError::MalformedModelResponse("first choice has no message content".to_string())
            })
    }
}
