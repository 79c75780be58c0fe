use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs a single, consolidated migration for the current schema.
///
/// Creates the host-shaped tables the transfer reads (users, course, quiz,
/// quiz slots, questions, answers) and the file store it rewrites.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: full schema.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS users (
                    id INTEGER PRIMARY KEY,
                    username TEXT NOT NULL,
                    is_admin INTEGER NOT NULL DEFAULT 0 CHECK (is_admin IN (0, 1)),
                    deleted INTEGER NOT NULL DEFAULT 0 CHECK (deleted IN (0, 1))
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS course (
                    id INTEGER PRIMARY KEY,
                    shortname TEXT NOT NULL,
                    fullname TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS quiz (
                    id INTEGER PRIMARY KEY,
                    course INTEGER NOT NULL,
                    name TEXT NOT NULL,
                    FOREIGN KEY (course) REFERENCES course(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS question (
                    id INTEGER PRIMARY KEY,
                    qtype TEXT NOT NULL,
                    name TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS quiz_slots (
                    id INTEGER PRIMARY KEY,
                    quizid INTEGER NOT NULL,
                    slot INTEGER NOT NULL CHECK (slot >= 0),
                    questionid INTEGER NOT NULL,
                    FOREIGN KEY (quizid) REFERENCES quiz(id) ON DELETE CASCADE,
                    FOREIGN KEY (questionid) REFERENCES question(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS question_answers (
                    id INTEGER PRIMARY KEY,
                    question INTEGER NOT NULL,
                    answer TEXT NOT NULL,
                    FOREIGN KEY (question) REFERENCES question(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS files (
                    id INTEGER PRIMARY KEY,
                    contextid INTEGER NOT NULL,
                    component TEXT NOT NULL,
                    filearea TEXT NOT NULL,
                    itemid INTEGER NOT NULL,
                    filename TEXT NOT NULL,
                    mimetype TEXT,
                    filesize INTEGER NOT NULL CHECK (filesize >= 0),
                    sortorder INTEGER NOT NULL DEFAULT 0,
                    timecreated TEXT NOT NULL,
                    content BLOB NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_files_area
                    ON files (contextid, component, filearea, itemid);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_quiz_slots_quiz_slot
                    ON quiz_slots (quizid, slot);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_quiz_course
                    ON quiz (course);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_question_answers_question
                    ON question_answers (question);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}
