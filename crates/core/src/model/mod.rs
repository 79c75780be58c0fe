pub mod file_area;
mod ids;
mod question;
mod stored_file;

pub use file_area::{AreaKey, FileArea, ParseFileAreaError, QUESTION_COMPONENT};
pub use ids::{AnswerId, ContextId, CourseId, FileId, ItemId, ParseIdError, QuestionId, UserId};
pub use question::{ParseQuestionTypeError, QuestionType};
pub use stored_file::{DIRECTORY_FILENAME, StoredFile};
