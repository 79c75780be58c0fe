use qbank_core::model::{AnswerId, CourseId, QuestionId, QuestionType};
use sqlx::Row;

use super::{SqliteRepository, mapping};
use crate::repository::{QuestionRepository, StorageError};

#[async_trait::async_trait]
impl QuestionRepository for SqliteRepository {
    async fn question_ids(
        &self,
        course: CourseId,
        qtype: QuestionType,
    ) -> Result<Vec<QuestionId>, StorageError> {
        // Slot order drives the positional matching between the two courses.
        let rows = sqlx::query(
            r"
            SELECT qs.questionid
              FROM quiz_slots qs
              JOIN quiz q ON q.id = qs.quizid
              JOIN question qu ON qu.id = qs.questionid
             WHERE q.course = ?1
               AND qu.qtype = ?2
             ORDER BY qs.quizid ASC, qs.slot ASC
            ",
        )
        .bind(mapping::u64_to_i64("course_id", course.value())?)
        .bind(qtype.as_str())
        .fetch_all(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            let raw: i64 = row
                .try_get("questionid")
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            ids.push(mapping::question_id_from_i64(raw)?);
        }
        Ok(ids)
    }

    async fn answer_ids(&self, question: QuestionId) -> Result<Vec<AnswerId>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id
              FROM question_answers
             WHERE question = ?1
             ORDER BY id ASC
            ",
        )
        .bind(mapping::u64_to_i64("question_id", question.value())?)
        .fetch_all(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            let raw: i64 = row
                .try_get("id")
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            ids.push(mapping::answer_id_from_i64(raw)?);
        }
        Ok(ids)
    }
}
