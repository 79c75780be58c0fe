use qbank_core::model::{AreaKey, FileId, ItemId, QUESTION_COMPONENT, StoredFile};
use tracing::debug;

use super::{SqliteRepository, mapping};
use crate::repository::{FileRepository, StorageError};

#[async_trait::async_trait]
impl FileRepository for SqliteRepository {
    async fn delete_area_files(&self, key: &AreaKey) -> Result<u64, StorageError> {
        let result = sqlx::query(
            r"
            DELETE FROM files
             WHERE contextid = ?1
               AND component = ?2
               AND filearea = ?3
               AND itemid = ?4
            ",
        )
        .bind(mapping::u64_to_i64("context_id", key.context.value())?)
        .bind(QUESTION_COMPONENT)
        .bind(key.area.as_str())
        .bind(mapping::u64_to_i64("item_id", key.item.value())?)
        .execute(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        debug!(area = %key, removed = result.rows_affected(), "cleared file area");
        Ok(result.rows_affected())
    }

    async fn list_area_files(&self, key: &AreaKey) -> Result<Vec<StoredFile>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, contextid, filearea, itemid, filename, mimetype,
                   filesize, sortorder, timecreated
              FROM files
             WHERE contextid = ?1
               AND component = ?2
               AND filearea = ?3
               AND itemid = ?4
               AND filename <> '.'
             ORDER BY id ASC
            ",
        )
        .bind(mapping::u64_to_i64("context_id", key.context.value())?)
        .bind(QUESTION_COMPONENT)
        .bind(key.area.as_str())
        .bind(mapping::u64_to_i64("item_id", key.item.value())?)
        .fetch_all(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut files = Vec::with_capacity(rows.len());
        for row in rows {
            files.push(mapping::map_stored_file_row(&row)?);
        }
        Ok(files)
    }

    async fn copy_stored_file(&self, id: FileId, item: ItemId) -> Result<FileId, StorageError> {
        // Single INSERT ... SELECT so the blob never round-trips through the
        // application; only the owning item id changes.
        let result = sqlx::query(
            r"
            INSERT INTO files (
                contextid, component, filearea, itemid, filename, mimetype,
                filesize, sortorder, timecreated, content
            )
            SELECT contextid, component, filearea, ?2, filename, mimetype,
                   filesize, sortorder, timecreated, content
              FROM files
             WHERE id = ?1
            ",
        )
        .bind(mapping::u64_to_i64("file_id", id.value())?)
        .bind(mapping::u64_to_i64("item_id", item.value())?)
        .execute(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        let new_id = mapping::file_id_from_i64(result.last_insert_rowid())?;
        debug!(source = %id, copy = %new_id, item = %item, "copied stored file");
        Ok(new_id)
    }
}
