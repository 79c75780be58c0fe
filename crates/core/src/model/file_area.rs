use crate::model::ids::{ContextId, ItemId};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Component owning every file area this tool touches.
pub const QUESTION_COMPONENT: &str = "question";

//
// ─── FILE AREA TAXONOMY ────────────────────────────────────────────────────────
//

/// Named file-area bucket within the `question` component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileArea {
    QuestionImage,
    QuestionSound,
    AnswerSound,
    FeedbackSound,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown file area: {0}")]
pub struct ParseFileAreaError(String);

impl FileArea {
    /// Areas replicated per matched question pair.
    pub const QUESTION_AREAS: [FileArea; 4] = [
        FileArea::QuestionImage,
        FileArea::QuestionSound,
        FileArea::AnswerSound,
        FileArea::FeedbackSound,
    ];

    /// Areas replicated per matched answer pair.
    pub const ANSWER_AREAS: [FileArea; 2] = [FileArea::AnswerSound, FileArea::FeedbackSound];

    /// Returns the bucket name stored in the `files.filearea` column.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FileArea::QuestionImage => "questionimage",
            FileArea::QuestionSound => "questionsound",
            FileArea::AnswerSound => "answersound",
            FileArea::FeedbackSound => "feedbacksound",
        }
    }
}

impl fmt::Display for FileArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileArea {
    type Err = ParseFileAreaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "questionimage" => Ok(FileArea::QuestionImage),
            "questionsound" => Ok(FileArea::QuestionSound),
            "answersound" => Ok(FileArea::AnswerSound),
            "feedbacksound" => Ok(FileArea::FeedbackSound),
            other => Err(ParseFileAreaError(other.to_string())),
        }
    }
}

//
// ─── BUCKET ADDRESS ────────────────────────────────────────────────────────────
//

/// Address of one file-area bucket: (context, component, area, item id).
///
/// The component is always [`QUESTION_COMPONENT`]; the item id is the owning
/// question or answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AreaKey {
    pub context: ContextId,
    pub area: FileArea,
    pub item: ItemId,
}

impl AreaKey {
    /// Bucket in the system context, where the host keeps question media.
    #[must_use]
    pub fn system(area: FileArea, item: impl Into<ItemId>) -> Self {
        Self {
            context: ContextId::SYSTEM,
            area,
            item: item.into(),
        }
    }

    /// Same bucket under a different owning item.
    #[must_use]
    pub fn retarget(&self, item: impl Into<ItemId>) -> Self {
        Self {
            context: self.context,
            area: self.area,
            item: item.into(),
        }
    }
}

impl fmt::Display for AreaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.context, QUESTION_COMPONENT, self.area, self.item
        )
    }
}
