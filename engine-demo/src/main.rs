//! A thin runnable walkthrough of the engine against a redb-backed store.
//!
//! Ingests a few chunks for one project, advances a handful of ticks
//! running decay and maintenance along the way, then runs a hybrid query
//! and prints what came back. Not a CLI in the argument-parsing sense —
//! just a fixed scenario, run with `cargo run -p engine-demo [DB_PATH]`.

use anyhow::{Context, Result};
use engine_core::retrieval::RetrievalContext;
use engine_core::types::{ChunkClass, ChunkKind, Confidence, IngestOptions, Source};
use engine_core::{Engine, EngineConfig};
use engine_storage_redb::RedbStore;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

fn toy_embedding(seed: u64) -> Vec<f32> {
    let mut v = vec![0.0_f32; 8];
    for (i, slot) in v.iter_mut().enumerate() {
        *slot = ((seed.wrapping_mul(31).wrapping_add(i as u64) % 97) as f32) / 97.0;
    }
    v
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let db_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("engine-demo.redb"));

    let store = RedbStore::open(&db_path)
        .await
        .context("opening redb store")?;
    let engine = Engine::new(Arc::new(store), EngineConfig::default(), None);
    let project = Uuid::new_v4();

    let tick = engine.advance_tick(project).await?;
    let ctx = RetrievalContext::new(tick);

    let research = engine
        .ingest(
            project,
            "redb transactions roll back automatically if the write guard is dropped \
             without calling commit()"
                .into(),
            toy_embedding(1),
            ChunkClass {
                kind: ChunkKind::Research,
                confidence: Confidence::Verified,
                source: Source::Research,
            },
            ["redb", "transactions"].into_iter().map(String::from).collect(),
            IngestOptions::default(),
            &ctx,
        )
        .await?;
    tracing::info!(chunk_id = %research.chunk_id, "ingested research chunk");

    let decision = engine
        .ingest(
            project,
            "decided to fold every WriteOp into one redb transaction per apply_batch call".into(),
            toy_embedding(2),
            ChunkClass {
                kind: ChunkKind::Decision,
                confidence: Confidence::Verified,
                source: Source::Deduction,
            },
            ["redb", "design"].into_iter().map(String::from).collect(),
            IngestOptions::default(),
            &ctx,
        )
        .await?;
    tracing::info!(chunk_id = %decision.chunk_id, "ingested decision chunk");

    engine
        .assert_relationship(
            project,
            decision.chunk_id,
            research.chunk_id,
            engine_core::types::RelationshipType::DerivedFrom,
            None,
            None,
            None,
        )
        .await?;

    for _ in 0..3 {
        let tick = engine.advance_tick(project).await?;
        engine.decay_tick(project).await?;
        if tick % 2 == 0 {
            engine.maintenance_tick(project).await?;
        }
    }

    let current_tick = engine.advance_tick(project).await?;
    let query_ctx = RetrievalContext::new(current_tick);
    let result = engine
        .query(
            project,
            "how does redb transaction rollback work",
            Some(toy_embedding(1)),
            &query_ctx,
            5,
            0.0,
            None,
        )
        .await?;

    println!("query returned {} chunk(s):", result.chunks.len());
    for scored in &result.chunks {
        println!("  {} (score {:.3})", scored.chunk_id, scored.score);
    }

    let archive = engine.export_archive(project).await?;
    println!("archive holds {} record(s)", archive.len());

    Ok(())
}
