use qbank_core::model::CourseId;

use super::{SqliteRepository, mapping};
use crate::repository::{CourseRecord, CourseRepository, StorageError};

#[async_trait::async_trait]
impl CourseRepository for SqliteRepository {
    async fn get_course(&self, id: CourseId) -> Result<Option<CourseRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, shortname, fullname
              FROM course
             WHERE id = ?1
            ",
        )
        .bind(mapping::u64_to_i64("course_id", id.value())?)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(mapping::map_course_row).transpose()
    }
}
