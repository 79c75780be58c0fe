use qbank_core::model::{
    AnswerId, AreaKey, ContextId, CourseId, FileArea, FileId, ItemId, QuestionId, StoredFile,
    UserId,
};
use sqlx::Row;

use crate::repository::{CourseRecord, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn u64_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn question_id_from_i64(v: i64) -> Result<QuestionId, StorageError> {
    Ok(QuestionId::new(i64_to_u64("question_id", v)?))
}

pub(crate) fn answer_id_from_i64(v: i64) -> Result<AnswerId, StorageError> {
    Ok(AnswerId::new(i64_to_u64("answer_id", v)?))
}

pub(crate) fn file_id_from_i64(v: i64) -> Result<FileId, StorageError> {
    Ok(FileId::new(i64_to_u64("file_id", v)?))
}

pub(crate) fn user_id_from_i64(v: i64) -> Result<UserId, StorageError> {
    Ok(UserId::new(i64_to_u64("user_id", v)?))
}

pub(crate) fn map_course_row(row: &sqlx::sqlite::SqliteRow) -> Result<CourseRecord, StorageError> {
    Ok(CourseRecord {
        id: CourseId::new(i64_to_u64(
            "course_id",
            row.try_get::<i64, _>("id").map_err(ser)?,
        )?),
        shortname: row.try_get("shortname").map_err(ser)?,
        fullname: row.try_get("fullname").map_err(ser)?,
    })
}

pub(crate) fn map_stored_file_row(row: &sqlx::sqlite::SqliteRow) -> Result<StoredFile, StorageError> {
    let area_str: String = row.try_get("filearea").map_err(ser)?;
    let area: FileArea = area_str.parse().map_err(ser)?;

    let filesize_i64: i64 = row.try_get("filesize").map_err(ser)?;
    let sortorder_i64: i64 = row.try_get("sortorder").map_err(ser)?;
    let sort_order = u32::try_from(sortorder_i64)
        .map_err(|_| StorageError::Serialization(format!("invalid sortorder: {sortorder_i64}")))?;

    Ok(StoredFile {
        id: file_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        key: AreaKey {
            context: ContextId::new(i64_to_u64(
                "context_id",
                row.try_get::<i64, _>("contextid").map_err(ser)?,
            )?),
            area,
            item: ItemId::new(i64_to_u64(
                "item_id",
                row.try_get::<i64, _>("itemid").map_err(ser)?,
            )?),
        },
        filename: row.try_get("filename").map_err(ser)?,
        mimetype: row.try_get("mimetype").map_err(ser)?,
        filesize: i64_to_u64("filesize", filesize_i64)?,
        sort_order,
        created_at: row.try_get("timecreated").map_err(ser)?,
    })
}
