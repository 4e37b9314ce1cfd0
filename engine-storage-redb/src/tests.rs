//! Tests for the redb-backed store.

use super::*;
use engine_core::store::{ArchiveRecord, CoRetrievalCounter, Store, WriteOp};
use engine_core::types::{
    Chunk, ChunkClass, ChunkKind, ChunkStatus, Confidence, DecayFunction, LearningContext,
    RelationshipOrigin, RelationshipType, Source,
};
use std::collections::HashSet;
use tempfile::tempdir;
use uuid::Uuid;

async fn open_test_store() -> RedbStore {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.redb");
    // Keep the tempdir alive for the duration of the test by leaking it;
    // the file is cleaned up by the OS's tmp reaper either way.
    std::mem::forget(dir);
    RedbStore::open(&path).await.unwrap()
}

fn sample_chunk(project_id: Uuid) -> Chunk {
    Chunk {
        id: Uuid::new_v4(),
        project_id,
        payload: "payload".into(),
        embedding: vec![1.0, 0.0],
        class: ChunkClass {
            kind: ChunkKind::Insight,
            confidence: Confidence::Verified,
            source: Source::Research,
        },
        tags: HashSet::new(),
        tick_created: 0,
        tick_last_accessed: None,
        tick_last_useful: None,
        initial_strength: 1.0,
        current_strength: 1.0,
        decay_function: DecayFunction::Exponential,
        decay_rate: 0.05,
        persistence_score: 0.0,
        access_count: 0,
        successful_uses: 0,
        status: ChunkStatus::Active,
        pinned: false,
        superseded_by: None,
        valid_until_tick: None,
        tick_tombstoned: None,
        learning_context: LearningContext::default(),
    }
}

#[tokio::test]
async fn put_and_get_chunk_round_trips() {
    let store = open_test_store().await;
    let project = Uuid::new_v4();
    let chunk = sample_chunk(project);
    let id = chunk.id;

    store
        .apply_batch(project, vec![WriteOp::PutChunk(Box::new(chunk))])
        .await
        .unwrap();

    let fetched = store.get_chunk(id).await.unwrap().unwrap();
    assert_eq!(fetched.id, id);
    assert_eq!(store.scan_project(project).await.unwrap().len(), 1);
}

#[tokio::test]
async fn self_loop_relationship_is_rejected_without_partial_write() {
    let store = open_test_store().await;
    let project = Uuid::new_v4();
    let chunk = sample_chunk(project);
    let id = chunk.id;
    let bad_rel = engine_core::types::Relationship::new(
        id,
        id,
        RelationshipType::RelatedTo,
        RelationshipOrigin::Explicit,
        1.0,
    );

    let result = store
        .apply_batch(
            project,
            vec![
                WriteOp::PutChunk(Box::new(chunk)),
                WriteOp::PutRelationship(Box::new(bad_rel)),
            ],
        )
        .await;

    assert!(result.is_err());
    assert!(store.get_chunk(id).await.unwrap().is_none());
}

#[tokio::test]
async fn tick_bookkeeping_is_per_project() {
    let store = open_test_store().await;
    let p1 = Uuid::new_v4();
    let p2 = Uuid::new_v4();
    store.advance_tick(p1).await.unwrap();
    store.advance_tick(p1).await.unwrap();
    store.advance_tick(p2).await.unwrap();
    assert_eq!(store.current_tick(p1).await.unwrap(), 2);
    assert_eq!(store.current_tick(p2).await.unwrap(), 1);
}

#[tokio::test]
async fn coretrieval_counter_round_trips_regardless_of_argument_order() {
    let store = open_test_store().await;
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let counter = CoRetrievalCounter {
        a: a.min(b),
        b: a.max(b),
        hits: 3,
        last_tick: 7,
    };

    store
        .apply_batch(Uuid::new_v4(), vec![WriteOp::PutCoRetrieval(counter.clone())])
        .await
        .unwrap();

    let fetched = store.get_coretrieval(a, b).await.unwrap().unwrap();
    assert_eq!(fetched.hits, 3);
    let fetched_swapped = store.get_coretrieval(b, a).await.unwrap().unwrap();
    assert_eq!(fetched_swapped.hits, 3);
}

#[tokio::test]
async fn archive_records_list_most_recent_first() {
    let store = open_test_store().await;
    let project = Uuid::new_v4();
    let record_at = |tick: u64| ArchiveRecord {
        chunk_id: Uuid::new_v4(),
        project_id: project,
        summary: "s".into(),
        content_hash: "h".into(),
        kind: ChunkKind::Insight,
        tags: HashSet::new(),
        learning_context: LearningContext::default(),
        tick_created: 0,
        tick_archived: tick,
        final_strength: 0.1,
        archived_at: chrono::Utc::now(),
    };

    store
        .apply_batch(
            project,
            vec![
                WriteOp::PutArchiveRecord(Box::new(record_at(5))),
                WriteOp::PutArchiveRecord(Box::new(record_at(12))),
            ],
        )
        .await
        .unwrap();

    let records = store.list_archive(project).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].tick_archived, 12);
    assert_eq!(records[1].tick_archived, 5);
}

#[tokio::test]
async fn data_survives_reopening_the_same_database_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("restart.redb");
    let project = Uuid::new_v4();
    let chunk_id;

    {
        let store = RedbStore::open(&path).await.unwrap();
        let chunk = sample_chunk(project);
        chunk_id = chunk.id;
        store.advance_tick(project).await.unwrap();
        store
            .apply_batch(project, vec![WriteOp::PutChunk(Box::new(chunk))])
            .await
            .unwrap();
    }

    let reopened = RedbStore::open(&path).await.unwrap();
    assert_eq!(reopened.current_tick(project).await.unwrap(), 1);
    assert!(reopened.get_chunk(chunk_id).await.unwrap().is_some());
}
