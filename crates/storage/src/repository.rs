use async_trait::async_trait;
use qbank_core::model::{
    AnswerId, AreaKey, CourseId, FileId, ItemId, QuestionId, QuestionType, StoredFile, UserId,
};
use qbank_core::time::fixed_now;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape for a course row.
///
/// Only the fields the transfer gate needs; the host owns the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseRecord {
    pub id: CourseId,
    pub shortname: String,
    pub fullname: String,
}

/// Lookup of courses in the host record store.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Fetch a course by ID.
    ///
    /// Returns `Ok(None)` when the course does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the lookup fails.
    async fn get_course(&self, id: CourseId) -> Result<Option<CourseRecord>, StorageError>;
}

/// Lookup of host user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Returns the lowest-id, non-deleted admin account, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the lookup fails.
    async fn first_admin(&self) -> Result<Option<UserId>, StorageError>;
}

/// Lookup of question and answer ids in the host question bank.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// All questions of the given type whose quiz slot belongs to a quiz in
    /// the course, ordered by quiz id then slot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn question_ids(
        &self,
        course: CourseId,
        qtype: QuestionType,
    ) -> Result<Vec<QuestionId>, StorageError>;

    /// Answer ids belonging to a question, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn answer_ids(&self, question: QuestionId) -> Result<Vec<AnswerId>, StorageError>;
}

/// Repository contract for the host file store.
#[async_trait]
pub trait FileRepository: Send + Sync {
    /// Delete every file in the bucket, directory placeholders included.
    /// Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if deletion fails.
    async fn delete_area_files(&self, key: &AreaKey) -> Result<u64, StorageError>;

    /// List the bucket's files ordered by id, directory placeholders
    /// excluded.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the listing fails.
    async fn list_area_files(&self, key: &AreaKey) -> Result<Vec<StoredFile>, StorageError>;

    /// Clone a stored file (content and metadata preserved) into the same
    /// context, component, and area under the new owning item.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the source file is missing, or
    /// other storage errors.
    async fn copy_stored_file(&self, id: FileId, item: ItemId) -> Result<FileId, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<InMemoryState>>,
}

#[derive(Default)]
struct InMemoryState {
    courses: HashMap<CourseId, CourseRecord>,
    admins: Vec<UserId>,
    // (course, qtype, question) triples in slot order.
    questions: Vec<(CourseId, QuestionType, QuestionId)>,
    answers: HashMap<QuestionId, Vec<AnswerId>>,
    files: HashMap<FileId, (StoredFile, Vec<u8>)>,
    next_file_id: u64,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, InMemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }

    // ── Fixture helpers (not part of the repository contracts) ──

    pub fn add_course(&self, id: CourseId, shortname: &str) {
        let record = CourseRecord {
            id,
            shortname: shortname.to_string(),
            fullname: shortname.to_string(),
        };
        self.lock().expect("poisoned").courses.insert(id, record);
    }

    pub fn add_admin(&self, id: UserId) {
        self.lock().expect("poisoned").admins.push(id);
    }

    /// Registers a question in slot order for its course.
    pub fn add_question(&self, course: CourseId, qtype: QuestionType, id: QuestionId) {
        self.lock()
            .expect("poisoned")
            .questions
            .push((course, qtype, id));
    }

    pub fn add_answer(&self, question: QuestionId, id: AnswerId) {
        self.lock()
            .expect("poisoned")
            .answers
            .entry(question)
            .or_default()
            .push(id);
    }

    /// Stores a file in the bucket and returns its id.
    pub fn add_file(&self, key: AreaKey, filename: &str, content: &[u8]) -> FileId {
        let mut state = self.lock().expect("poisoned");
        state.next_file_id += 1;
        let id = FileId::new(state.next_file_id);
        let file = StoredFile {
            id,
            key,
            filename: filename.to_string(),
            mimetype: None,
            filesize: content.len() as u64,
            sort_order: 0,
            created_at: fixed_now(),
        };
        state.files.insert(id, (file, content.to_vec()));
        id
    }

    /// Content bytes for a stored file, for asserting copies in tests.
    #[must_use]
    pub fn file_content(&self, id: FileId) -> Option<Vec<u8>> {
        self.lock()
            .expect("poisoned")
            .files
            .get(&id)
            .map(|(_, content)| content.clone())
    }

    /// Every row in the bucket, directory placeholders included.
    #[must_use]
    pub fn raw_area_rows(&self, key: &AreaKey) -> Vec<StoredFile> {
        let state = self.lock().expect("poisoned");
        let mut rows: Vec<StoredFile> = state
            .files
            .values()
            .filter(|(file, _)| file.key == *key)
            .map(|(file, _)| file.clone())
            .collect();
        rows.sort_by_key(|file| file.id);
        rows
    }
}

#[async_trait]
impl CourseRepository for InMemoryRepository {
    async fn get_course(&self, id: CourseId) -> Result<Option<CourseRecord>, StorageError> {
        Ok(self.lock()?.courses.get(&id).cloned())
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn first_admin(&self) -> Result<Option<UserId>, StorageError> {
        Ok(self.lock()?.admins.iter().min().copied())
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn question_ids(
        &self,
        course: CourseId,
        qtype: QuestionType,
    ) -> Result<Vec<QuestionId>, StorageError> {
        Ok(self
            .lock()?
            .questions
            .iter()
            .filter(|(c, t, _)| *c == course && *t == qtype)
            .map(|(_, _, id)| *id)
            .collect())
    }

    async fn answer_ids(&self, question: QuestionId) -> Result<Vec<AnswerId>, StorageError> {
        let mut ids = self
            .lock()?
            .answers
            .get(&question)
            .cloned()
            .unwrap_or_default();
        ids.sort();
        Ok(ids)
    }
}

#[async_trait]
impl FileRepository for InMemoryRepository {
    async fn delete_area_files(&self, key: &AreaKey) -> Result<u64, StorageError> {
        let mut state = self.lock()?;
        let doomed: Vec<FileId> = state
            .files
            .values()
            .filter(|(file, _)| file.key == *key)
            .map(|(file, _)| file.id)
            .collect();
        for id in &doomed {
            state.files.remove(id);
        }
        Ok(doomed.len() as u64)
    }

    async fn list_area_files(&self, key: &AreaKey) -> Result<Vec<StoredFile>, StorageError> {
        let state = self.lock()?;
        let mut files: Vec<StoredFile> = state
            .files
            .values()
            .filter(|(file, _)| file.key == *key && !file.is_directory())
            .map(|(file, _)| file.clone())
            .collect();
        files.sort_by_key(|file| file.id);
        Ok(files)
    }

    async fn copy_stored_file(&self, id: FileId, item: ItemId) -> Result<FileId, StorageError> {
        let mut state = self.lock()?;
        let (source, content) = state.files.get(&id).cloned().ok_or(StorageError::NotFound)?;
        state.next_file_id += 1;
        let new_id = FileId::new(state.next_file_id);
        let copy = StoredFile {
            id: new_id,
            key: source.key.retarget(item),
            ..source
        };
        state.files.insert(new_id, (copy, content));
        Ok(new_id)
    }
}

/// Aggregates the host-facing repositories behind trait objects for easy
/// backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub courses: Arc<dyn CourseRepository>,
    pub users: Arc<dyn UserRepository>,
    pub questions: Arc<dyn QuestionRepository>,
    pub files: Arc<dyn FileRepository>,
}

impl Storage {
    /// Wraps an existing in-memory repository, keeping a handle for fixtures.
    #[must_use]
    pub fn from_in_memory(repo: InMemoryRepository) -> Self {
        Self {
            courses: Arc::new(repo.clone()),
            users: Arc::new(repo.clone()),
            questions: Arc::new(repo.clone()),
            files: Arc::new(repo),
        }
    }
}
