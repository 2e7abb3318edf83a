//! Session transcript types.
//!
//! The transcript is a pure recorder used for rendering, export, and
//! telemetry. It never feeds back into decision logic.

use serde::{Deserialize, Serialize};

/// Represents the role of a turn in the session transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Turn authored by the user.
    User,
    /// Turn authored by the assistant.
    Assistant,
    /// System-generated turn (accepted mode transitions, etc.).
    System,
}

/// A single exchange unit. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    /// Creation time (ISO 8601 format).
    pub timestamp: String,
}

impl Turn {
    /// Creates a turn stamped with the current UTC time.
    pub fn now(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Append-only ordered log of turns for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one turn. Turns are never edited or removed individually.
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// All turns, in append order.
    pub fn all(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Clears the log. Only an explicit session reset calls this.
    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut transcript = Transcript::new();
        transcript.append(Turn::now(Role::User, "first"));
        transcript.append(Turn::now(Role::Assistant, "second"));
        transcript.append(Turn::now(Role::System, "third"));

        let turns = transcript.all();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].text, "first");
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[2].role, Role::System);
    }

    #[test]
    fn test_clear_empties_log() {
        let mut transcript = Transcript::new();
        transcript.append(Turn::now(Role::User, "idea"));
        assert!(!transcript.is_empty());

        transcript.clear();
        assert!(transcript.is_empty());
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
    }
}
