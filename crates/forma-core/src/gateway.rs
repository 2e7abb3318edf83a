//! Provider boundary port.
//!
//! The language-model provider is treated as an opaque oracle behind this
//! trait. Implementations live in `forma-interaction`; the application layer
//! and tests depend only on the trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::state::ConversationState;

/// Opaque continuation identifier for an established provider thread.
///
/// When present it lets a new request resume the upstream conversation
/// without resending full history; callers keep it for the lifetime of one
/// session and drop it on reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadHandle(String);

impl ThreadHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One validated gateway reply for a conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnReply {
    /// The message to show the user.
    pub assistant_message: String,
    /// The full replacement state reported by the oracle.
    pub state: ConversationState,
    /// Blueprint Markdown, present only when the oracle synthesized one.
    pub blueprint_md: Option<String>,
    /// Continuation handle for the next turn in this session.
    pub thread: ThreadHandle,
}

/// Boundary abstraction over the language-model provider.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Continues the session conversation with one user turn.
    ///
    /// When `thread` is present it MUST be preferred over resending history;
    /// reconstructing exact upstream context any other way is undefined.
    ///
    /// # Errors
    ///
    /// Fails with `FormaError::Provider` on network failure, authentication
    /// failure, or a reply that does not match the expected schema. Callers
    /// surface the error for that turn only and leave session state
    /// unchanged.
    async fn continue_conversation(
        &self,
        thread: Option<&ThreadHandle>,
        user_text: &str,
    ) -> Result<TurnReply>;

    /// Asks the provider to enumerate internal contradictions in a
    /// completed blueprint.
    ///
    /// # Errors
    ///
    /// Fails with `FormaError::CritiqueUnavailable`; callers downgrade that
    /// to the empty-issues outcome so blueprint delivery is never blocked.
    async fn critique(&self, blueprint_md: &str) -> Result<Vec<String>>;
}
