// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end progression scenarios over SQLite storage.

use lectern_core::{AuthorizationGate, LecternError, ProgressStore, SessionStore};
use lectern_engine::outcome::View;
use lectern_engine::{Outcome, Payload, Target};
use lectern_test_utils::{StoryFixture, TestHarness, student};

fn pre_reading_answer(outcome: &Outcome) -> (bool, Target) {
    match outcome {
        Outcome::Json {
            payload: Payload::PreReadingAnswer { correct, next },
        } => (*correct, *next),
        other => panic!("expected pre-reading answer payload, got {other:?}"),
    }
}

#[tokio::test]
async fn moonlight_pre_reading_all_correct() {
    let harness = TestHarness::builder().build().await.unwrap();
    let seeded = harness.seed(StoryFixture::moonlight(1)).await.unwrap();
    let sam = student("sam");
    let engine = &harness.engine;

    let first = engine
        .submit_pre_reading(&sam, &seeded.story, seeded.exercises[0].id, "A")
        .await
        .unwrap();
    assert_eq!(pre_reading_answer(&first), (true, Target::PreReadingEntry));

    let second = engine
        .submit_pre_reading(&sam, &seeded.story, seeded.exercises[1].id, "D")
        .await
        .unwrap();
    assert_eq!(pre_reading_answer(&second), (true, Target::PreReadingSummary));

    let summary = engine.pre_reading_summary(&sam, &seeded.story).await.unwrap();
    let Outcome::Render {
        view: View::PreReadingSummary(summary),
        ..
    } = summary
    else {
        panic!("expected pre-reading summary");
    };
    assert_eq!((summary.correct_answers, summary.total_questions), (2, 2));
    assert_eq!(summary.questions[0].correct_answer, "A");
    assert_eq!(summary.questions[1].correct_answer, "D");

    // Pre-reading never touches the durable record.
    assert!(
        harness
            .storage
            .get_progress(&sam.user, seeded.story.id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn pre_reading_wrong_answers_are_counted_as_wrong() {
    let harness = TestHarness::builder().with_memory_sessions().build().await.unwrap();
    let seeded = harness.seed(StoryFixture::moonlight(0)).await.unwrap();
    let sam = student("sam");

    let outcome = harness
        .engine
        .submit_pre_reading(&sam, &seeded.story, seeded.exercises[0].id, "a")
        .await
        .unwrap();
    assert!(!pre_reading_answer(&outcome).0);
    harness
        .engine
        .submit_pre_reading(&sam, &seeded.story, seeded.exercises[1].id, "D")
        .await
        .unwrap();

    let Outcome::Render {
        view: View::PreReadingSummary(summary),
        ..
    } = harness.engine.pre_reading_summary(&sam, &seeded.story).await.unwrap()
    else {
        panic!("expected pre-reading summary");
    };
    assert_eq!((summary.correct_answers, summary.total_questions), (1, 2));
}

#[tokio::test]
async fn next_exercise_never_repeats_a_completed_one() {
    let harness = TestHarness::builder().build().await.unwrap();
    let seeded = harness.seed(StoryFixture::moonlight(0)).await.unwrap();
    let sam = student("sam");

    harness
        .engine
        .submit_pre_reading(&sam, &seeded.story, seeded.exercises[0].id, "B")
        .await
        .unwrap();
    let Outcome::Render {
        view: View::Exercise(view),
        ..
    } = harness.engine.next_exercise(&sam, &seeded.story).await.unwrap()
    else {
        panic!("expected exercise view");
    };
    assert_eq!(view.exercise_id, seeded.exercises[1].id);
    assert_eq!(view.position, 2);

    harness
        .engine
        .submit_pre_reading(&sam, &seeded.story, seeded.exercises[1].id, "D")
        .await
        .unwrap();
    let outcome = harness.engine.next_exercise(&sam, &seeded.story).await.unwrap();
    assert_eq!(outcome.target(), Some(Target::PreReadingSummary));
}

#[tokio::test]
async fn pre_reading_summary_is_gated_until_complete() {
    let harness = TestHarness::builder().build().await.unwrap();
    let seeded = harness.seed(StoryFixture::moonlight(0)).await.unwrap();
    let sam = student("sam");

    let outcome = harness.engine.pre_reading_summary(&sam, &seeded.story).await.unwrap();
    assert_eq!(outcome.target(), Some(Target::PreReadingEntry));

    // Replaying the first exercise twice does not unlock the summary.
    for answer in ["A", "B"] {
        harness
            .engine
            .submit_pre_reading(&sam, &seeded.story, seeded.exercises[0].id, answer)
            .await
            .unwrap();
    }
    let session = harness
        .sessions
        .load_session_progress(&sam.session, seeded.story.id)
        .await
        .unwrap();
    assert_eq!(session.completed.len(), 2);
    assert_eq!(session.answers[&seeded.exercises[0].id], "B");

    let outcome = harness.engine.pre_reading_summary(&sam, &seeded.story).await.unwrap();
    assert_eq!(outcome.target(), Some(Target::PreReadingEntry));
}

#[tokio::test]
async fn story_without_exercises_falls_back_to_reading() {
    let harness = TestHarness::builder().build().await.unwrap();
    let seeded = harness
        .seed(StoryFixture::new("Quiet Hill").question("P1", 3))
        .await
        .unwrap();
    let outcome = harness
        .engine
        .next_exercise(&student("sam"), &seeded.story)
        .await
        .unwrap();
    assert_eq!(
        outcome,
        Outcome::redirect_with_notice(
            Target::StoryRead,
            seeded.story.id,
            "No pre-reading exercises available for this story."
        )
    );

    let Outcome::Render {
        view: View::Reading(reading),
        ..
    } = harness.engine.read_story(&seeded.story).await.unwrap()
    else {
        panic!("expected reading view");
    };
    assert_eq!(reading.content, seeded.story.content);
}

#[tokio::test]
async fn single_question_correct_answer_reaches_summary() {
    let harness = TestHarness::builder().build().await.unwrap();
    let seeded = harness
        .seed(StoryFixture::new("One Question").question("P1", 2))
        .await
        .unwrap();
    let sam = student("sam");
    let question = &seeded.questions[0];

    let outcome = harness
        .engine
        .submit_post_reading(&sam, &seeded.story, question.id, Some("2"))
        .await
        .unwrap();
    assert_eq!(outcome.target(), Some(Target::PostReadingSummary));

    let record = harness
        .storage
        .get_progress(&sam.user, seeded.story.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.answers_given.get(&question.id.to_string()), Some(&true));

    let Outcome::Render {
        view: View::PostReadingSummary(summary),
        ..
    } = harness.engine.post_reading_summary(&sam, &seeded.story).await.unwrap()
    else {
        panic!("expected post-reading summary");
    };
    assert_eq!((summary.correct_answers, summary.total_questions), (1, 1));
    assert_eq!(summary.questions[0].answered_correctly, Some(true));
}

#[tokio::test]
async fn post_reading_resubmission_keeps_latest_answer() {
    let harness = TestHarness::builder().build().await.unwrap();
    let seeded = harness.seed(StoryFixture::moonlight(3)).await.unwrap();
    let sam = student("sam");
    let question = &seeded.questions[0];

    let outcome = harness
        .engine
        .submit_post_reading(&sam, &seeded.story, question.id, Some("2"))
        .await
        .unwrap();
    assert_eq!(outcome.target(), Some(Target::PostReadingRead { index: 1 }));
    harness
        .engine
        .submit_post_reading(&sam, &seeded.story, question.id, Some("3"))
        .await
        .unwrap();

    let record = harness
        .storage
        .get_progress(&sam.user, seeded.story.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.answers_given.len(), 1);
    assert_eq!(record.answer_for(question.id), Some(false));
}

#[tokio::test]
async fn entry_state_transitions() {
    let harness = TestHarness::builder().build().await.unwrap();
    let seeded = harness.seed(StoryFixture::moonlight(3)).await.unwrap();
    let sam = student("sam");
    let engine = &harness.engine;

    let outcome = engine.entry_state(&sam, &seeded.story).await.unwrap();
    assert_eq!(outcome.target(), Some(Target::PreReadingEntry));

    engine
        .submit_pre_reading(&sam, &seeded.story, seeded.exercises[0].id, "A")
        .await
        .unwrap();
    let Outcome::Render {
        view: View::Entry(entry),
        ..
    } = engine.entry_state(&sam, &seeded.story).await.unwrap()
    else {
        panic!("expected entry view");
    };
    assert_eq!((entry.pre_correct_answers, entry.pre_total_questions), (1, 2));
    assert_eq!((entry.post_correct_answers, entry.post_total_questions), (0, 3));

    for (question, answer) in seeded.questions.iter().zip(["2", "1", "1"]) {
        engine
            .submit_post_reading(&sam, &seeded.story, question.id, Some(answer))
            .await
            .unwrap();
    }
    let outcome = engine.entry_state(&sam, &seeded.story).await.unwrap();
    assert_eq!(outcome.target(), Some(Target::PostReadingSummary));
}

#[tokio::test]
async fn timing_alone_counts_as_started() {
    let harness = TestHarness::builder().build().await.unwrap();
    let seeded = harness.seed(StoryFixture::moonlight(2)).await.unwrap();
    let sam = student("sam");

    harness
        .engine
        .save_time(&sam, &seeded.story, lectern_core::TimedPhase::Reading, 30)
        .await
        .unwrap();
    let Outcome::Render {
        view: View::Entry(entry),
        ..
    } = harness.engine.entry_state(&sam, &seeded.story).await.unwrap()
    else {
        panic!("expected entry view");
    };
    assert_eq!(entry.stage, lectern_core::Stage::Reading);
}

#[tokio::test]
async fn lookup_budgets_follow_config() {
    let harness = TestHarness::builder()
        .with_lookup_budgets(vec![15, 20])
        .build()
        .await
        .unwrap();
    let seeded = harness.seed(StoryFixture::moonlight(1)).await.unwrap();
    let sam = student("sam");
    let question = seeded.questions[0].id;
    let raw = question.to_string();

    let mut limits = Vec::new();
    for _ in 0..2 {
        harness.engine.start_lookup(&sam, &seeded.story, question).await.unwrap();
        let Outcome::Render {
            view: View::Lookup(view),
            ..
        } = harness
            .engine
            .story_lookup(&sam, &seeded.story, Some(&raw))
            .await
            .unwrap()
        else {
            panic!("expected lookup view");
        };
        limits.push(view.time_limit_secs);
    }
    assert_eq!(limits, vec![15, 20]);

    let outcome = harness.engine.start_lookup(&sam, &seeded.story, question).await.unwrap();
    assert_eq!(outcome.target(), Some(Target::PostReadingRead { index: 0 }));
}

#[tokio::test]
async fn students_are_isolated_from_each_other() {
    let harness = TestHarness::builder().build().await.unwrap();
    let seeded = harness.seed(StoryFixture::moonlight(1)).await.unwrap();
    let (sam, ada) = (student("sam"), student("ada"));

    harness
        .engine
        .submit_post_reading(&sam, &seeded.story, seeded.questions[0].id, Some("2"))
        .await
        .unwrap();
    let outcome = harness.engine.entry_state(&sam, &seeded.story).await.unwrap();
    assert_eq!(outcome.target(), Some(Target::PostReadingSummary));
    let outcome = harness.engine.entry_state(&ada, &seeded.story).await.unwrap();
    assert_eq!(outcome.target(), Some(Target::PreReadingEntry));
}

#[tokio::test]
async fn gate_and_engine_agree_on_drafts() {
    let harness = TestHarness::builder().build().await.unwrap();
    let seeded = harness.seed(StoryFixture::moonlight(1).draft()).await.unwrap();
    let sam = student("sam");

    let err = harness
        .gate
        .student_story(&sam, seeded.story.id)
        .await
        .unwrap_err();
    assert!(matches!(err, LecternError::AccessDenied(_)));
    let err = harness
        .engine
        .next_exercise(&sam, &seeded.story)
        .await
        .unwrap_err();
    assert!(matches!(err, LecternError::AccessDenied(_)));
}
