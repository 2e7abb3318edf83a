//! Session engine: runs the turn pipeline for one guided session.
//!
//! A turn is fully resolved (gateway call, state update, optional synthesis,
//! optional consistency check, transcript append) before the next user input
//! is accepted. The engine owns all session state; nothing here is shared
//! across sessions.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use forma_core::blueprint::BlueprintDocument;
use forma_core::error::Result;
use forma_core::gateway::{ModelGateway, ThreadHandle};
use forma_core::mode::Mode;
use forma_core::state::ConversationState;
use forma_core::transcript::{Role, Transcript, Turn};
use forma_interaction::telemetry::{TurnRecord, WebhookSink};

use crate::consistency::ConsistencyChecker;

/// What a resolved turn hands back to the front-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutput {
    /// The message to display for this turn.
    pub assistant_message: String,
    /// The mode the session is in after the turn.
    pub mode: Mode,
    /// True when this turn regenerated the blueprint document.
    pub blueprint_updated: bool,
}

/// Outcome of processing one user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnResult {
    /// The turn resolved normally.
    Replied(TurnOutput),
    /// The session was reset while the provider call was in flight; the
    /// stale result was discarded and nothing was applied.
    Superseded,
}

/// Per-session orchestrator for the guided conversation.
pub struct SessionEngine {
    /// Unique session identifier (UUID format)
    session_id: String,
    gateway: Arc<dyn ModelGateway>,
    checker: ConsistencyChecker,
    /// Optional best-effort telemetry sink
    telemetry: Option<WebhookSink>,
    state: RwLock<ConversationState>,
    transcript: RwLock<Transcript>,
    blueprint: RwLock<Option<BlueprintDocument>>,
    /// Continuation handle for the established provider thread
    thread: RwLock<Option<ThreadHandle>>,
    /// Bumped by reset; in-flight results from an older epoch are discarded
    epoch: AtomicU64,
}

impl SessionEngine {
    /// Creates a fresh session around the given gateway.
    pub fn new(gateway: Arc<dyn ModelGateway>, telemetry: Option<WebhookSink>) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            checker: ConsistencyChecker::new(gateway.clone()),
            gateway,
            telemetry,
            state: RwLock::new(ConversationState::new()),
            transcript: RwLock::new(Transcript::new()),
            blueprint: RwLock::new(None),
            thread: RwLock::new(None),
            epoch: AtomicU64::new(0),
        }
    }

    /// Returns the session ID.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Resolves one user turn end to end.
    ///
    /// # Errors
    ///
    /// Returns `FormaError::Provider` when the gateway call fails; the
    /// conversation state, blueprint, and continuation handle are left
    /// exactly as they were, and the user may retry.
    pub async fn process_turn(&self, user_text: &str) -> Result<TurnResult> {
        let epoch = self.epoch.load(Ordering::SeqCst);

        self.record_turn(Role::User, user_text).await;

        let thread = self.thread.read().await.clone();
        let reply = self
            .gateway
            .continue_conversation(thread.as_ref(), user_text)
            .await?;

        if self.epoch_changed(epoch) {
            tracing::warn!("Discarding provider reply that raced a session reset");
            return Ok(TurnResult::Superseded);
        }

        *self.thread.write().await = Some(reply.thread.clone());

        // The gateway is the transition oracle; locally we only refuse
        // backward movement. A rejected report keeps the previous valid
        // state and the turn still resolves.
        let transition = {
            let mut state = self.state.write().await;
            match state.advance_to(reply.state) {
                Ok(transition) => transition,
                Err(err) => {
                    tracing::warn!("Rejected gateway state report: {err}");
                    None
                }
            }
        };
        if let Some((from, to)) = transition {
            self.transcript
                .write()
                .await
                .append(Turn::now(Role::System, format!("Mode advanced: {from} -> {to}")));
        }

        let mode = self.state.read().await.mode;
        let mut blueprint_updated = false;
        if mode == Mode::Builder {
            if let Some(markdown) = reply.blueprint_md {
                let mut document = BlueprintDocument::new(markdown);
                if !document.is_complete() {
                    // Fail soft: accept the document and let the scan
                    // surface the gap.
                    tracing::warn!(
                        missing = ?document.missing_sections(),
                        "Accepting blueprint without the full section layout"
                    );
                }

                self.checker.annotate(&mut document).await;

                if self.epoch_changed(epoch) {
                    tracing::warn!("Discarding blueprint that raced a session reset");
                    return Ok(TurnResult::Superseded);
                }
                *self.blueprint.write().await = Some(document);
                blueprint_updated = true;
            }
        }

        self.record_turn(Role::Assistant, &reply.assistant_message)
            .await;

        Ok(TurnResult::Replied(TurnOutput {
            assistant_message: reply.assistant_message,
            mode,
            blueprint_updated,
        }))
    }

    /// Reinitializes the whole session: state, transcript, blueprint, and
    /// continuation handle. Any in-flight turn result is invalidated.
    pub async fn reset(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.state.write().await.reset();
        self.transcript.write().await.clear();
        *self.blueprint.write().await = None;
        *self.thread.write().await = None;
    }

    /// Snapshot of the current conversation state.
    pub async fn state(&self) -> ConversationState {
        self.state.read().await.clone()
    }

    /// All transcript turns, in append order.
    pub async fn transcript_turns(&self) -> Vec<Turn> {
        self.transcript.read().await.all().to_vec()
    }

    /// The hint to show next to the input prompt.
    pub async fn next_user_prompt(&self) -> String {
        self.state.read().await.next_user_prompt.clone()
    }

    /// Full blueprint Markdown (body plus consistency section), if a
    /// blueprint has been synthesized.
    pub async fn blueprint_markdown(&self) -> Option<String> {
        self.blueprint
            .read()
            .await
            .as_ref()
            .map(BlueprintDocument::to_markdown)
    }

    /// Writes the blueprint Markdown verbatim to `path`. Returns false when
    /// no blueprint exists yet.
    pub async fn export_blueprint(&self, path: &Path) -> Result<bool> {
        let Some(markdown) = self.blueprint_markdown().await else {
            return Ok(false);
        };
        tokio::fs::write(path, markdown).await?;
        Ok(true)
    }

    fn epoch_changed(&self, observed: u64) -> bool {
        self.epoch.load(Ordering::SeqCst) != observed
    }

    /// Appends a turn and mirrors it to the telemetry sink.
    async fn record_turn(&self, role: Role, text: &str) {
        self.transcript.write().await.append(Turn::now(role, text));
        if let Some(sink) = &self.telemetry {
            sink.record(TurnRecord::now(&self.session_id, role, text));
        }
    }
}
