use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandId(pub Uuid);

impl CommandId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CommandId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CommandId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One incoming phrase. Immutable; lives for a single dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub id: CommandId,
    /// Exactly as received. Echoed back in failure feedback.
    pub raw_text: String,
    pub normalized: String,
}

impl Command {
    pub fn new(raw_text: impl Into<String>) -> Self {
        let raw_text = raw_text.into();
        let normalized = normalize(&raw_text);
        Self {
            id: CommandId::new(),
            raw_text,
            normalized,
        }
    }
}

/// Lower-case and trim. Total and idempotent.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}
