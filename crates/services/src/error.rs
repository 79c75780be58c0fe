//! Shared error types for the services crate.

use thiserror::Error;

use qbank_core::model::{CourseId, QuestionId};
use storage::repository::StorageError;

/// Errors emitted by `MediaTransferService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransferError {
    #[error("no admin account was found")]
    MissingAdminAccount,

    #[error("source course {0} was not found")]
    CourseNotFound(CourseId),

    #[error(
        "differing number of matchable questions in the two courses \
         (source: {source_count}, destination: {destination_count}); aborting"
    )]
    QuestionCountMismatch {
        source_count: usize,
        destination_count: usize,
    },

    #[error(
        "question {source_question} has {source_count} answers but its destination \
         counterpart {destination_question} has {destination_count}"
    )]
    AnswerCountMismatch {
        source_question: QuestionId,
        destination_question: QuestionId,
        source_count: usize,
        destination_count: usize,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}
