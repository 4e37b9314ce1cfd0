//! Core domain types: chunks, their classification, and the relationship
//! graph's typed edges.

mod chunk;
mod enums;
mod relationship;

pub use chunk::{Chunk, ChunkClass, DecayFunction, IngestOptions, LearningContext};
pub use enums::{ChunkKind, ChunkStatus, Confidence, RelationshipOrigin, Source};
pub use relationship::{Relationship, RelationshipType, RelationshipTypeMeta};
