use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Discriminator identifying a custom question-type plugin in the host
/// question bank.
///
/// Only the two Turforlag types carry the media file areas this tool moves;
/// everything else in a course is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionType {
    TurMultipleChoice,
    TurProve,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown question type: {0}")]
pub struct ParseQuestionTypeError(String);

impl QuestionType {
    /// The question types whose media attachments are transferred, in the
    /// order their id lists are concatenated.
    pub const MEDIA_TYPES: [QuestionType; 2] =
        [QuestionType::TurMultipleChoice, QuestionType::TurProve];

    /// Returns the host plugin tag stored in the `question.qtype` column.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::TurMultipleChoice => "turmultiplechoice",
            QuestionType::TurProve => "turprove",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = ParseQuestionTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "turmultiplechoice" => Ok(QuestionType::TurMultipleChoice),
            "turprove" => Ok(QuestionType::TurProve),
            other => Err(ParseQuestionTypeError(other.to_string())),
        }
    }
}
