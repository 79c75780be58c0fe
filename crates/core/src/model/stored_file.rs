use chrono::{DateTime, Utc};

use crate::model::file_area::AreaKey;
use crate::model::ids::FileId;

/// Filename of the directory placeholder rows the host file store keeps in
/// every non-empty area. Listings exclude them.
pub const DIRECTORY_FILENAME: &str = ".";

/// Persisted metadata for one stored file.
///
/// This mirrors a row of the host `files` table so repositories can hand
/// listings to the transfer logic without loading blob content; copies happen
/// inside the file repository, keyed by [`FileId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub id: FileId,
    pub key: AreaKey,
    pub filename: String,
    pub mimetype: Option<String>,
    pub filesize: u64,
    pub sort_order: u32,
    pub created_at: DateTime<Utc>,
}

impl StoredFile {
    /// True for the `"."` placeholder rows that represent the area itself.
    #[must_use]
    pub fn is_directory(&self) -> bool {
        self.filename == DIRECTORY_FILENAME
    }
}
