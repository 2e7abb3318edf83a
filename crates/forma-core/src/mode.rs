//! Conversation mode types for the guided session.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Discrete stage of the guided conversation.
///
/// Modes are totally ordered and only ever advance within a session:
/// `Discovery -> IntentLock -> Builder`. The only way back is an explicit
/// full reset. Wire names use the provider-facing spelling (`DISCOVERY`,
/// `INTENT_LOCK`, `BUILDER`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    /// Open-ended exploration: propose interpretations, invite rejection.
    #[default]
    Discovery,
    /// Direction has stabilized; the locked thesis awaits user confirmation.
    IntentLock,
    /// Terminal synthesis stage; the blueprint is produced here.
    Builder,
}

impl Mode {
    /// True when moving from `self` to `next` would go backward in the
    /// fixed ordering.
    pub fn would_regress(self, next: Mode) -> bool {
        next < self
    }
}
