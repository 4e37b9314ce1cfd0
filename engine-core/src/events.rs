//! Best-effort observability events emitted by the engine.
//!
//! Delivery is best-effort by design: a missing or slow [`EventSink`] must
//! never affect correctness, so `Engine` never awaits a sink and never
//! fails an operation because emission failed.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// One observability event, matching the external-interfaces event types.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A project's tick advanced.
    TickAdvance { project_id: Uuid, tick: u64 },
    /// A chunk was created by ingestion.
    ChunkCreated { chunk_id: Uuid, tick: u64 },
    /// A chunk was returned by a retrieval.
    ChunkAccessed { chunk_id: Uuid, tick: u64 },
    /// A chunk's strength changed during a decay pass.
    ChunkDecayed { chunk_id: Uuid, old: f32, new: f32 },
    /// A chunk's tier changed, from decay or reinforcement.
    ChunkStatusChanged {
        chunk_id: Uuid,
        old: crate::types::ChunkStatus,
        new: crate::types::ChunkStatus,
    },
    /// A relationship edge was created.
    RelationshipCreated {
        relationship_id: Uuid,
        from: Uuid,
        to: Uuid,
    },
    /// A query ran to completion.
    SearchExecuted {
        project_id: Uuid,
        result_count: usize,
        time_ms: u64,
    },
    /// A contradiction was detected between two chunks.
    ContradictionDetected {
        chunk_a: Uuid,
        chunk_b: Uuid,
        confidence: f32,
    },
}

impl EngineEvent {
    /// The event's wire type string, matching the external-interfaces
    /// event type names (`tick:advance`, `chunk:created`, ...).
    #[must_use]
    pub fn type_str(&self) -> &'static str {
        match self {
            EngineEvent::TickAdvance { .. } => "tick:advance",
            EngineEvent::ChunkCreated { .. } => "chunk:created",
            EngineEvent::ChunkAccessed { .. } => "chunk:accessed",
            EngineEvent::ChunkDecayed { .. } => "chunk:decayed",
            EngineEvent::ChunkStatusChanged { .. } => "chunk:status_changed",
            EngineEvent::RelationshipCreated { .. } => "relationship:created",
            EngineEvent::SearchExecuted { .. } => "search:executed",
            EngineEvent::ContradictionDetected { .. } => "contradiction:detected",
        }
    }
}

/// An injected observer for engine events. Implementations must not block
/// the caller for long; emission is fire-and-forget from the engine's
/// perspective.
pub trait EventSink: Send + Sync {
    /// Record one event. Must not panic; errors should be swallowed and
    /// logged internally by the implementation.
    fn emit(&self, event: EngineEvent, at: DateTime<Utc>);
}

/// Default [`EventSink`] that logs every event via `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: EngineEvent, at: DateTime<Utc>) {
        tracing::debug!(event_type = event.type_str(), at = %at, "engine event");
    }
}

/// Emit `event` to `sink` if present, otherwise fall back to logging via
/// [`TracingEventSink`]. Never returns an error: loss of an event must not
/// affect correctness.
pub fn emit_best_effort(sink: Option<&Arc<dyn EventSink>>, event: EngineEvent) {
    let now = Utc::now();
    match sink {
        Some(sink) => sink.emit(event, now),
        None => TracingEventSink.emit(event, now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct CollectingSink(Mutex<Vec<&'static str>>);

    impl EventSink for CollectingSink {
        fn emit(&self, event: EngineEvent, _at: DateTime<Utc>) {
            self.0.lock().unwrap().push(event.type_str());
        }
    }

    #[test]
    fn event_type_strings_match_external_interface_names() {
        assert_eq!(
            EngineEvent::TickAdvance {
                project_id: Uuid::nil(),
                tick: 0
            }
            .type_str(),
            "tick:advance"
        );
        assert_eq!(
            EngineEvent::SearchExecuted {
                project_id: Uuid::nil(),
                result_count: 0,
                time_ms: 0
            }
            .type_str(),
            "search:executed"
        );
    }

    #[test]
    fn emit_best_effort_reaches_injected_sink() {
        let sink: Arc<dyn EventSink> = Arc::new(CollectingSink(Mutex::new(Vec::new())));
        emit_best_effort(
            Some(&sink),
            EngineEvent::ChunkCreated {
                chunk_id: Uuid::nil(),
                tick: 0,
            },
        );
    }

    #[test]
    fn emit_best_effort_without_a_sink_does_not_panic() {
        emit_best_effort(
            None,
            EngineEvent::TickAdvance {
                project_id: Uuid::nil(),
                tick: 1,
            },
        );
    }
}
