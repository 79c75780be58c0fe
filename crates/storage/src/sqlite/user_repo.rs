use qbank_core::model::UserId;
use sqlx::Row;

use super::{SqliteRepository, mapping};
use crate::repository::{StorageError, UserRepository};

#[async_trait::async_trait]
impl UserRepository for SqliteRepository {
    async fn first_admin(&self) -> Result<Option<UserId>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id
              FROM users
             WHERE is_admin = 1
               AND deleted = 0
             ORDER BY id ASC
             LIMIT 1
            ",
        )
        .fetch_optional(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.map(|row| {
            let id: i64 = row
                .try_get("id")
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            mapping::user_id_from_i64(id)
        })
        .transpose()
    }
}
