//! Per-project tick bookkeeping: current tick, last decay tick, last
//! consolidation tick, all stored as one small record per project.

use crate::codec::{decode, encode};
use crate::RedbStore;
use crate::{with_db_timeout, PROJECT_STATE_TABLE};
use engine_core::error::{Error, Result};
use redb::{ReadTransaction, ReadableTable};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub(crate) struct ProjectState {
    pub(crate) current_tick: u64,
    pub(crate) last_decay_tick: u64,
    pub(crate) last_consolidation_tick: u64,
}

fn read_state_in(read_txn: &ReadTransaction, project_id: Uuid) -> Result<ProjectState> {
    let table = read_txn
        .open_table(PROJECT_STATE_TABLE)
        .map_err(|e| Error::IoFailed(format!("open project_state table failed: {e}")))?;
    let key = project_id.to_string();
    match table
        .get(key.as_str())
        .map_err(|e| Error::IoFailed(format!("get project state failed: {e}")))?
    {
        Some(guard) => decode(guard.value()),
        None => Ok(ProjectState::default()),
    }
}

impl RedbStore {
    pub(crate) async fn project_state(&self, project_id: Uuid) -> Result<ProjectState> {
        let db = Arc::clone(&self.db);
        with_db_timeout(move || {
            let read_txn = db
                .begin_read()
                .map_err(|e| Error::IoFailed(format!("begin read failed: {e}")))?;
            read_state_in(&read_txn, project_id)
        })
        .await
    }

    pub(crate) async fn advance_project_tick(&self, project_id: Uuid) -> Result<u64> {
        let db = Arc::clone(&self.db);
        with_db_timeout(move || {
            let write_txn = db
                .begin_write()
                .map_err(|e| Error::IoFailed(format!("begin write failed: {e}")))?;
            let mut state = {
                let table = write_txn
                    .open_table(PROJECT_STATE_TABLE)
                    .map_err(|e| Error::IoFailed(format!("open project_state table failed: {e}")))?;
                let key = project_id.to_string();
                match table
                    .get(key.as_str())
                    .map_err(|e| Error::IoFailed(format!("get project state failed: {e}")))?
                {
                    Some(guard) => decode::<ProjectState>(guard.value())?,
                    None => ProjectState::default(),
                }
            };
            state.current_tick += 1;
            {
                let mut table = write_txn
                    .open_table(PROJECT_STATE_TABLE)
                    .map_err(|e| Error::IoFailed(format!("open project_state table failed: {e}")))?;
                let key = project_id.to_string();
                table
                    .insert(key.as_str(), encode(&state)?.as_slice())
                    .map_err(|e| Error::IoFailed(format!("insert project state failed: {e}")))?;
            }
            write_txn
                .commit()
                .map_err(|e| Error::IoFailed(format!("commit failed: {e}")))?;
            Ok(state.current_tick)
        })
        .await
    }
}
