use qbank_core::model::{
    AnswerId, AreaKey, CourseId, FileArea, QuestionId, QuestionType, UserId,
};
use services::{MediaTransferService, TransferError};
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

/// Two courses with one turmultiplechoice and one turprove question each,
/// two answers per question, media in all six bucket kinds on the source
/// side, and stale junk in the destination buckets.
fn seed_matched_courses(repo: &InMemoryRepository) {
    repo.add_admin(UserId::new(1));
    repo.add_course(CourseId::new(70), "tur-source");
    repo.add_course(CourseId::new(71), "tur-restored");

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

    for (question, answers) in [(101, [1010, 1011]), (102, [1020, 1021])] {
        for answer in answers {
            repo.add_answer(QuestionId::new(question), AnswerId::new(answer));
        }
    }
    for (question, answers) in [(201, [2010, 2011]), (202, [2020, 2021])] {
        for answer in answers {
            repo.add_answer(QuestionId::new(question), AnswerId::new(answer));
        }
    }

    // Question-level media on the first source question.
    repo.add_file(
        AreaKey::system(FileArea::QuestionImage, QuestionId::new(101)),
        "map.png",
        b"png-bytes",
    );
    repo.add_file(
        AreaKey::system(FileArea::QuestionSound, QuestionId::new(101)),
        "stem.mp3",
        b"stem-bytes",
    );
    repo.add_file(
        AreaKey::system(FileArea::AnswerSound, QuestionId::new(101)),
        "qa.mp3",
        b"qa-bytes",
    );
    repo.add_file(
        AreaKey::system(FileArea::FeedbackSound, QuestionId::new(101)),
        "qf.mp3",
        b"qf-bytes",
    );

    // Answer-level media on both answers of the turprove question.
    repo.add_file(
        AreaKey::system(FileArea::AnswerSound, AnswerId::new(1020)),
        "a0.mp3",
        b"a0-bytes",
    );
    repo.add_file(
        AreaKey::system(FileArea::AnswerSound, AnswerId::new(1021)),
        "a1.mp3",
        b"a1-bytes",
    );
    repo.add_file(
        AreaKey::system(FileArea::FeedbackSound, AnswerId::new(1021)),
        "f1.mp3",
        b"f1-bytes",
    );

    // Stale destination files that must be replaced or cleared.
    repo.add_file(
        AreaKey::system(FileArea::QuestionImage, QuestionId::new(201)),
        "old.png",
        b"old-bytes",
    );
    repo.add_file(
        AreaKey::system(FileArea::AnswerSound, AnswerId::new(2020)),
        "leftover.mp3",
        b"leftover",
    );
}

fn bucket_snapshot(repo: &InMemoryRepository, key: &AreaKey) -> Vec<(String, Vec<u8>)> {
    repo.raw_area_rows(key)
        .into_iter()
        .map(|file| {
            let content = repo.file_content(file.id).expect("content");
            (file.filename, content)
        })
        .collect()
}

#[tokio::test]
async fn transfer_replicates_all_six_buckets_exactly() {
    let repo = InMemoryRepository::new();
    seed_matched_courses(&repo);

    let report = service(&repo)
        .transfer(CourseId::new(70), CourseId::new(71))
        .await
        .unwrap();

    assert_eq!(report.questions_matched, 2);
    assert_eq!(report.question_images, 1);
    assert_eq!(report.question_sounds, 1);
    // One question-level answersound plus two answer-level ones.
    assert_eq!(report.answer_sounds, 3);
    // One question-level feedbacksound plus one answer-level one.
    assert_eq!(report.feedback_sounds, 2);
    assert_eq!(report.total_files(), 7);

    // Destination question buckets hold exactly the source content.
    assert_eq!(
        bucket_snapshot(
            &repo,
            &AreaKey::system(FileArea::QuestionImage, QuestionId::new(201))
        ),
        vec![("map.png".to_string(), b"png-bytes".to_vec())]
    );
    assert_eq!(
        bucket_snapshot(
            &repo,
            &AreaKey::system(FileArea::QuestionSound, QuestionId::new(201))
        ),
        vec![("stem.mp3".to_string(), b"stem-bytes".to_vec())]
    );
    assert_eq!(
        bucket_snapshot(
            &repo,
            &AreaKey::system(FileArea::AnswerSound, QuestionId::new(201))
        ),
        vec![("qa.mp3".to_string(), b"qa-bytes".to_vec())]
    );
    assert_eq!(
        bucket_snapshot(
            &repo,
            &AreaKey::system(FileArea::FeedbackSound, QuestionId::new(201))
        ),
        vec![("qf.mp3".to_string(), b"qf-bytes".to_vec())]
    );

    // Answer-level buckets follow answer order: 1020 -> 2020, 1021 -> 2021.
    assert_eq!(
        bucket_snapshot(
            &repo,
            &AreaKey::system(FileArea::AnswerSound, AnswerId::new(2020))
        ),
        vec![("a0.mp3".to_string(), b"a0-bytes".to_vec())]
    );
    assert_eq!(
        bucket_snapshot(
            &repo,
            &AreaKey::system(FileArea::AnswerSound, AnswerId::new(2021))
        ),
        vec![("a1.mp3".to_string(), b"a1-bytes".to_vec())]
    );
    assert_eq!(
        bucket_snapshot(
            &repo,
            &AreaKey::system(FileArea::FeedbackSound, AnswerId::new(2021))
        ),
        vec![("f1.mp3".to_string(), b"f1-bytes".to_vec())]
    );

    // Buckets with no source media end up empty, stale content included.
    assert!(
        bucket_snapshot(
            &repo,
            &AreaKey::system(FileArea::FeedbackSound, AnswerId::new(2020))
        )
        .is_empty()
    );
    assert!(
        bucket_snapshot(
            &repo,
            &AreaKey::system(FileArea::QuestionImage, QuestionId::new(202))
        )
        .is_empty()
    );

    // Source buckets are untouched.
    assert_eq!(
        bucket_snapshot(
            &repo,
            &AreaKey::system(FileArea::QuestionImage, QuestionId::new(101))
        ),
        vec![("map.png".to_string(), b"png-bytes".to_vec())]
    );
}

#[tokio::test]
async fn rerun_is_idempotent_for_bucket_contents() {
    let repo = InMemoryRepository::new();
    seed_matched_courses(&repo);
    let svc = service(&repo);

    let first = svc
        .transfer(CourseId::new(70), CourseId::new(71))
        .await
        .unwrap();

    let key = AreaKey::system(FileArea::QuestionImage, QuestionId::new(201));
    let after_first = bucket_snapshot(&repo, &key);

    let second = svc
        .transfer(CourseId::new(70), CourseId::new(71))
        .await
        .unwrap();

    // Same copy counts and, after delete-then-copy, identical contents.
    assert_eq!(first, second);
    assert_eq!(bucket_snapshot(&repo, &key), after_first);
}

#[tokio::test]
async fn mismatched_question_lists_touch_no_files() {
    let repo = InMemoryRepository::new();
    seed_matched_courses(&repo);
    // Break the balance with an extra destination question.
    repo.add_question(
        CourseId::new(71),
        QuestionType::TurProve,
        QuestionId::new(204),
    );

    let stale_key = AreaKey::system(FileArea::QuestionImage, QuestionId::new(201));
    let before = bucket_snapshot(&repo, &stale_key);

    let err = service(&repo)
        .transfer(CourseId::new(70), CourseId::new(71))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TransferError::QuestionCountMismatch {
            source_count: 2,
            destination_count: 3
        }
    ));

    // The stale destination file is still there; nothing was deleted or
    // copied.
    assert_eq!(bucket_snapshot(&repo, &stale_key), before);
}
