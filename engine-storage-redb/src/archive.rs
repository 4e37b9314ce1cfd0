//! Archive record reads. Records are keyed by the archived chunk's UUID —
//! a chunk is archived at most once before compaction removes it.

use crate::codec::decode;
use crate::{with_db_timeout, RedbStore, ARCHIVE_TABLE};
use engine_core::error::{Error, Result};
use engine_core::store::ArchiveRecord;
use redb::ReadableTable;
use std::sync::Arc;
use uuid::Uuid;

impl RedbStore {
    pub(crate) async fn list_archive_impl(&self, project_id: Uuid) -> Result<Vec<ArchiveRecord>> {
        let db = Arc::clone(&self.db);
        let mut records = with_db_timeout(move || {
            let read_txn = db
                .begin_read()
                .map_err(|e| Error::IoFailed(format!("begin read failed: {e}")))?;
            let table = read_txn
                .open_table(ARCHIVE_TABLE)
                .map_err(|e| Error::IoFailed(format!("open archive table failed: {e}")))?;
            let mut out = Vec::new();
            let iter = table
                .iter()
                .map_err(|e| Error::IoFailed(format!("iterate archive failed: {e}")))?;
            for entry in iter {
                let (_, guard) = entry.map_err(|e| Error::IoFailed(format!("archive entry failed: {e}")))?;
                let record: ArchiveRecord = decode(guard.value())?;
                if record.project_id == project_id {
                    out.push(record);
                }
            }
            Ok(out)
        })
        .await?;
        records.sort_by(|a: &ArchiveRecord, b: &ArchiveRecord| b.tick_archived.cmp(&a.tick_archived));
        Ok(records)
    }
}
