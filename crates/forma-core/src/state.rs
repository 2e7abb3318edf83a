//! Conversation state for a guided session.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{FormaError, Result};
use crate::mode::Mode;

/// Hint shown to the user before the first turn.
pub const INITIAL_USER_PROMPT: &str = "Share your idea in plain words.";

/// The single mutable entity driving session behavior.
///
/// The gateway is the transition oracle: after each turn it reports a full
/// replacement state. Locally the state machine only enforces that the mode
/// never moves backward. The `confidence` map is opaque diagnostic metadata;
/// nothing in the system reads it for decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub convergence_ready: bool,
    #[serde(default)]
    pub confidence: HashMap<String, i64>,
    #[serde(default)]
    pub direction_thesis: String,
    #[serde(default = "default_user_prompt")]
    pub next_user_prompt: String,
}

fn default_user_prompt() -> String {
    INITIAL_USER_PROMPT.to_string()
}

impl Default for ConversationState {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            convergence_ready: false,
            confidence: HashMap::new(),
            direction_thesis: String::new(),
            next_user_prompt: default_user_prompt(),
        }
    }
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces this state with a gateway-reported one.
    ///
    /// The reported confidence map, thesis, and next-prompt hint are stored
    /// verbatim. A report whose mode would move backward is rejected with
    /// `InvalidTransition` and `self` is left untouched.
    ///
    /// Returns the `(from, to)` pair when the accepted report changed the
    /// mode, so callers can record the transition.
    pub fn advance_to(&mut self, reported: ConversationState) -> Result<Option<(Mode, Mode)>> {
        if self.mode.would_regress(reported.mode) {
            return Err(FormaError::InvalidTransition {
                from: self.mode,
                to: reported.mode,
            });
        }

        let transition = (self.mode != reported.mode).then_some((self.mode, reported.mode));
        *self = reported;
        Ok(transition)
    }

    /// Restores the documented initial values.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
