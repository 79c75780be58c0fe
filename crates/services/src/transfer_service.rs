use std::sync::Arc;

use qbank_core::model::{AreaKey, CourseId, FileArea, ItemId, QuestionId, QuestionType};
use storage::repository::{
    CourseRepository, FileRepository, QuestionRepository, UserRepository,
};
use tracing::info;

use crate::error::TransferError;

/// Per-area copy counters for one transfer run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferReport {
    pub questions_matched: usize,
    pub question_images: u64,
    pub question_sounds: u64,
    pub answer_sounds: u64,
    pub feedback_sounds: u64,
}

impl TransferReport {
    fn record(&mut self, area: FileArea, copied: u64) {
        match area {
            FileArea::QuestionImage => self.question_images += copied,
            FileArea::QuestionSound => self.question_sounds += copied,
            FileArea::AnswerSound => self.answer_sounds += copied,
            FileArea::FeedbackSound => self.feedback_sounds += copied,
        }
    }

    /// Total files copied across all buckets.
    #[must_use]
    pub fn total_files(&self) -> u64 {
        self.question_images + self.question_sounds + self.answer_sounds + self.feedback_sounds
    }
}

/// Copies question media attachments from one course's question set to
/// another's, matching questions positionally by type and slot order.
#[derive(Clone)]
pub struct MediaTransferService {
    courses: Arc<dyn CourseRepository>,
    users: Arc<dyn UserRepository>,
    questions: Arc<dyn QuestionRepository>,
    files: Arc<dyn FileRepository>,
}

impl MediaTransferService {
    #[must_use]
    pub fn new(
        courses: Arc<dyn CourseRepository>,
        users: Arc<dyn UserRepository>,
        questions: Arc<dyn QuestionRepository>,
        files: Arc<dyn FileRepository>,
    ) -> Self {
        Self {
            courses,
            users,
            questions,
            files,
        }
    }

    /// Run the transfer from `source` to `destination`.
    ///
    /// Destination buckets are cleared before being repopulated, so re-runs
    /// converge to the same bucket contents for an unchanged source. No file
    /// is touched before the question lists have been matched.
    ///
    /// # Errors
    ///
    /// Returns `TransferError::MissingAdminAccount` or
    /// `TransferError::CourseNotFound` if the preconditions fail,
    /// `TransferError::QuestionCountMismatch` /
    /// `TransferError::AnswerCountMismatch` if the two courses do not line
    /// up, and `TransferError::Storage` if the host record or file store
    /// fails.
    pub async fn transfer(
        &self,
        source: CourseId,
        destination: CourseId,
    ) -> Result<TransferReport, TransferError> {
        self.users
            .first_admin()
            .await?
            .ok_or(TransferError::MissingAdminAccount)?;
        self.courses
            .get_course(source)
            .await?
            .ok_or(TransferError::CourseNotFound(source))?;

        // Per-type lists concatenated in MEDIA_TYPES order on both sides, so
        // index k on one side matches index k on the other.
        let mut source_ids: Vec<QuestionId> = Vec::new();
        let mut destination_ids: Vec<QuestionId> = Vec::new();
        for qtype in QuestionType::MEDIA_TYPES {
            source_ids.extend(self.questions.question_ids(source, qtype).await?);
            destination_ids.extend(self.questions.question_ids(destination, qtype).await?);
        }

        if source_ids.len() != destination_ids.len() {
            return Err(TransferError::QuestionCountMismatch {
                source_count: source_ids.len(),
                destination_count: destination_ids.len(),
            });
        }

        info!(
            %source,
            %destination,
            questions = source_ids.len(),
            "matched question lists, starting media transfer"
        );

        let mut report = TransferReport {
            questions_matched: source_ids.len(),
            ..TransferReport::default()
        };

        for (source_question, destination_question) in
            source_ids.into_iter().zip(destination_ids)
        {
            for area in FileArea::QUESTION_AREAS {
                let copied = self
                    .replicate_area(area, source_question.into(), destination_question.into())
                    .await?;
                report.record(area, copied);
            }

            self.cascade_answers(source_question, destination_question, &mut report)
                .await?;
        }

        Ok(report)
    }

    /// Repeats the delete-then-copy replication for the answer-level buckets
    /// of one matched question pair.
    async fn cascade_answers(
        &self,
        source_question: QuestionId,
        destination_question: QuestionId,
        report: &mut TransferReport,
    ) -> Result<(), TransferError> {
        let source_answers = self.questions.answer_ids(source_question).await?;
        let destination_answers = self.questions.answer_ids(destination_question).await?;

        for (index, source_answer) in source_answers.iter().copied().enumerate() {
            // Positional correspondence is assumed, never verified; a missing
            // counterpart aborts, extra destination answers are left alone.
            let destination_answer = destination_answers.get(index).copied().ok_or(
                TransferError::AnswerCountMismatch {
                    source_question,
                    destination_question,
                    source_count: source_answers.len(),
                    destination_count: destination_answers.len(),
                },
            )?;

            for area in FileArea::ANSWER_AREAS {
                let copied = self
                    .replicate_area(area, source_answer.into(), destination_answer.into())
                    .await?;
                report.record(area, copied);
            }
        }

        Ok(())
    }

    /// Clears the destination bucket, then copies every source file into it
    /// under the destination item id.
    async fn replicate_area(
        &self,
        area: FileArea,
        source_item: ItemId,
        destination_item: ItemId,
    ) -> Result<u64, TransferError> {
        self.files
            .delete_area_files(&AreaKey::system(area, destination_item))
            .await?;

        let files = self
            .files
            .list_area_files(&AreaKey::system(area, source_item))
            .await?;
        for file in &files {
            self.files.copy_stored_file(file.id, destination_item).await?;
            info!(
                area = %area,
                file = %file.filename,
                source_item = %source_item,
                destination_item = %destination_item,
                "copied file"
            );
        }

        Ok(files.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbank_core::model::{AnswerId, UserId};
    use storage::repository::{InMemoryRepository, Storage};

    fn service(repo: &InMemoryRepository) -> MediaTransferService {
        let storage = Storage::from_in_memory(repo.clone());
        MediaTransferService::new(
            storage.courses,
            storage.users,
            storage.questions,
            storage.files,
        )
    }

    fn seed_gate(repo: &InMemoryRepository) {
        repo.add_admin(UserId::new(1));
        repo.add_course(CourseId::new(70), "source");
        repo.add_course(CourseId::new(71), "destination");
    }

    #[tokio::test]
    async fn missing_admin_account_aborts() {
        let repo = InMemoryRepository::new();
        repo.add_course(CourseId::new(70), "source");

        let err = service(&repo)
            .transfer(CourseId::new(70), CourseId::new(71))
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::MissingAdminAccount));
    }

    #[tokio::test]
    async fn missing_source_course_aborts() {
        let repo = InMemoryRepository::new();
        repo.add_admin(UserId::new(1));

        let err = service(&repo)
            .transfer(CourseId::new(70), CourseId::new(71))
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::CourseNotFound(id) if id == CourseId::new(70)));
    }

    #[tokio::test]
    async fn question_count_mismatch_copies_nothing() {
        let repo = InMemoryRepository::new();
        seed_gate(&repo);
        repo.add_question(
            CourseId::new(70),
            QuestionType::TurMultipleChoice,
            QuestionId::new(101),
        );
        repo.add_question(
            CourseId::new(70),
            QuestionType::TurMultipleChoice,
            QuestionId::new(102),
        );
        repo.add_question(
            CourseId::new(71),
            QuestionType::TurMultipleChoice,
            QuestionId::new(201),
        );

        // A stale destination file must survive the aborted run.
        let stale_key = AreaKey::system(FileArea::QuestionImage, QuestionId::new(201));
        repo.add_file(stale_key, "stale.png", b"stale");
        let source_key = AreaKey::system(FileArea::QuestionImage, QuestionId::new(101));
        repo.add_file(source_key, "map.png", b"png");

        let err = service(&repo)
            .transfer(CourseId::new(70), CourseId::new(71))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TransferError::QuestionCountMismatch {
                source_count: 2,
                destination_count: 1
            }
        ));
        assert_eq!(repo.raw_area_rows(&stale_key).len(), 1);
    }

    #[tokio::test]
    async fn type_lists_are_matched_independently() {
        // One type on each side: a turprove question must never be matched
        // against a turmultiplechoice question at the same overall index.
        let repo = InMemoryRepository::new();
        seed_gate(&repo);
        repo.add_question(
            CourseId::new(70),
            QuestionType::TurMultipleChoice,
            QuestionId::new(101),
        );
        repo.add_question(
            CourseId::new(70),
            QuestionType::TurProve,
            QuestionId::new(102),
        );
        repo.add_question(
            CourseId::new(71),
            QuestionType::TurMultipleChoice,
            QuestionId::new(201),
        );
        repo.add_question(
            CourseId::new(71),
            QuestionType::TurProve,
            QuestionId::new(202),
        );

        repo.add_file(
            AreaKey::system(FileArea::QuestionSound, QuestionId::new(102)),
            "prove.mp3",
            b"prove",
        );

        let report = service(&repo)
            .transfer(CourseId::new(70), CourseId::new(71))
            .await
            .unwrap();
        assert_eq!(report.questions_matched, 2);
        assert_eq!(report.question_sounds, 1);

        // The copy landed on the matching turprove question.
        let files = repo
            .list_area_files(&AreaKey::system(FileArea::QuestionSound, QuestionId::new(202)))
            .await
            .unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].filename, "prove.mp3");
    }

    #[tokio::test]
    async fn answer_count_mismatch_is_reported() {
        let repo = InMemoryRepository::new();
        seed_gate(&repo);
        repo.add_question(
            CourseId::new(70),
            QuestionType::TurMultipleChoice,
            QuestionId::new(101),
        );
        repo.add_question(
            CourseId::new(71),
            QuestionType::TurMultipleChoice,
            QuestionId::new(201),
        );
        repo.add_answer(QuestionId::new(101), AnswerId::new(1010));
        repo.add_answer(QuestionId::new(101), AnswerId::new(1011));
        repo.add_answer(QuestionId::new(201), AnswerId::new(2010));

        let err = service(&repo)
            .transfer(CourseId::new(70), CourseId::new(71))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TransferError::AnswerCountMismatch {
                source_count: 2,
                destination_count: 1,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn extra_destination_answers_are_left_untouched() {
        let repo = InMemoryRepository::new();
        seed_gate(&repo);
        repo.add_question(
            CourseId::new(70),
            QuestionType::TurMultipleChoice,
            QuestionId::new(101),
        );
        repo.add_question(
            CourseId::new(71),
            QuestionType::TurMultipleChoice,
            QuestionId::new(201),
        );
        repo.add_answer(QuestionId::new(101), AnswerId::new(1010));
        repo.add_answer(QuestionId::new(201), AnswerId::new(2010));
        repo.add_answer(QuestionId::new(201), AnswerId::new(2011));

        let extra_key = AreaKey::system(FileArea::AnswerSound, AnswerId::new(2011));
        repo.add_file(extra_key, "keep.mp3", b"keep");

        let report = service(&repo)
            .transfer(CourseId::new(70), CourseId::new(71))
            .await
            .unwrap();
        assert_eq!(report.total_files(), 0);
        assert_eq!(repo.raw_area_rows(&extra_key).len(), 1);
    }
}
