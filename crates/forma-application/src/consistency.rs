//! Secondary contradiction pass over a completed blueprint.

use std::sync::Arc;

use forma_core::blueprint::{BlueprintDocument, ConsistencyReport};
use forma_core::gateway::ModelGateway;

/// Runs the gateway critique call over a synthesized blueprint and attaches
/// the outcome to the document.
pub struct ConsistencyChecker {
    gateway: Arc<dyn ModelGateway>,
}

impl ConsistencyChecker {
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self { gateway }
    }

    /// Scans `document` for internal contradictions and attaches the report.
    ///
    /// A gateway failure is downgraded to the unavailable outcome; the
    /// document is always delivered with a consistency section, and this
    /// method never returns an error to the turn pipeline.
    pub async fn annotate(&self, document: &mut BlueprintDocument) {
        let report = match self.gateway.critique(document.body()).await {
            Ok(issues) => ConsistencyReport::from_issues(issues),
            Err(err) => {
                tracing::warn!("Consistency check unavailable: {err}");
                ConsistencyReport::Unavailable
            }
        };
        document.attach_consistency(report);
    }
}
