//! Persistent semantic memory engine for a long-running autonomous agent.
//!
//! The engine ingests knowledge fragments ([`Chunk`]s) tied to the agent's
//! current situation, retains them in a tiered store governed by
//! strength-and-decay dynamics, stitches them into a typed relationship
//! graph, and serves context-aware retrieval queries that fuse semantic
//! similarity, graph traversal, and situational boosts.
//!
//! # Quick Start
//!
//! ```
//! use engine_core::{Engine, EngineConfig};
//! use engine_core::store::MemoryStore;
//! use engine_core::types::{ChunkClass, ChunkKind, Confidence, Source, IngestOptions};
//! use engine_core::retrieval::RetrievalContext;
//! use std::sync::Arc;
//! use uuid::Uuid;
//!
//! # async fn run() -> engine_core::Result<()> {
//! let store = Arc::new(MemoryStore::new());
//! let engine = Engine::new(store, EngineConfig::default(), None);
//! let project = Uuid::new_v4();
//!
//! let tick = engine.advance_tick(project).await?;
//! let class = ChunkClass {
//!     kind: ChunkKind::Insight,
//!     confidence: Confidence::Verified,
//!     source: Source::Research,
//! };
//! let embedding = vec![1.0_f32, 0.0, 0.0];
//! let ctx = RetrievalContext::new(tick);
//! let chunk_id = engine
//!     .ingest(project, "first insight".into(), embedding, class, Default::default(), IngestOptions::default(), &ctx)
//!     .await?
//!     .chunk_id;
//! # let _ = chunk_id;
//! # Ok(())
//! # }
//! ```
//!
//! # Feature Flags
//!
//! - `proptest-arbitrary`: enables [`proptest::arbitrary::Arbitrary`] impls on
//!   the core domain enums, used by this crate's own property tests and
//!   available to downstream crates that want to generate [`Chunk`]s and
//!   [`Relationship`]s for their own tests.

#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]

pub mod clock;
pub mod config;
pub mod constants;
pub mod decay;
pub mod engine;
pub mod error;
pub mod events;
pub mod graph;
pub mod ingestion;
pub mod lifecycle;
pub mod planner;
pub mod retrieval;
pub mod store;
pub mod types;
pub mod vector_index;

pub use clock::Clock;
pub use config::EngineConfig;
pub use engine::{Engine, ScanFilter};
pub use error::{Error, Result};
pub use events::{EngineEvent, EventSink, TracingEventSink};
pub use types::{Chunk, ChunkStatus, Relationship, RelationshipType};
