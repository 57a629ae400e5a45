use prep_core::model::{
    AnswerEvaluation, Difficulty, EvaluationId, ExperienceLevel, GeneratedQuestion,
    InterviewMode, InterviewSession, QuestionType, SessionConfig, SessionId, SessionKind,
    SessionStatus, UserId, UserProgress,
};
use prep_core::time::fixed_now;
use storage::repository::Storage;

fn build_session(user_id: Option<UserId>) -> InterviewSession {
    let questions = vec![
        GeneratedQuestion {
            question: "Explain indexing strategies in relational databases.".into(),
            question_type: QuestionType::Technical,
            difficulty: Difficulty::Medium,
            category: "databases".into(),
            skills_tested: vec!["sql".into()],
            expected_duration_minutes: 6,
        },
        GeneratedQuestion {
            question: "Tell me about a conflict you resolved.".into(),
            question_type: QuestionType::Behavioral,
            difficulty: Difficulty::Medium,
            category: "collaboration".into(),
            skills_tested: vec!["communication".into()],
            expected_duration_minutes: 4,
        },
    ];
    InterviewSession::new(
        SessionId::random(),
        user_id,
        SessionConfig {
            candidate_name: "Ada".into(),
            candidate_email: "ada@example.com".into(),
            target_role: "Backend Engineer".into(),
            target_company: Some("Initech".into()),
            experience_level: ExperienceLevel::Mid,
            interview_mode: InterviewMode::Practice,
            session_kind: SessionKind::Mixed,
        },
        &questions,
        fixed_now(),
    )
}

#[tokio::test]
async fn session_document_round_trips() {
    let storage = Storage::sqlite("sqlite::memory:").await.unwrap();

    let mut session = build_session(None);
    session.start(fixed_now()).unwrap();
    let evaluation = AnswerEvaluation::minimal(
        EvaluationId::random(),
        0,
        QuestionType::Technical,
        74.0,
    );
    session
        .record_answer(0, "Use covering indexes for hot queries.".into(), 180, &evaluation, fixed_now())
        .unwrap();
    session.record_skip(1, 0, fixed_now()).unwrap();
    session.complete(fixed_now()).unwrap();

    storage.sessions.upsert_session(&session).await.unwrap();
    let fetched = storage
        .sessions
        .get_session(session.session_id())
        .await
        .unwrap()
        .expect("session persisted");

    assert_eq!(fetched, session);
    assert_eq!(fetched.status(), SessionStatus::Completed);
    assert_eq!(fetched.average_score(), Some(74.0));
    assert_eq!(fetched.questions_skipped(), 1);
}

#[tokio::test]
async fn upsert_replaces_the_document() {
    let storage = Storage::sqlite("sqlite::memory:").await.unwrap();

    let mut session = build_session(None);
    storage.sessions.upsert_session(&session).await.unwrap();

    session.start(fixed_now()).unwrap();
    storage.sessions.upsert_session(&session).await.unwrap();

    let fetched = storage
        .sessions
        .get_session(session.session_id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched.status(), SessionStatus::InProgress);
}

#[tokio::test]
async fn listing_filters_by_user_and_orders_by_creation() {
    let storage = Storage::sqlite("sqlite::memory:").await.unwrap();
    let user = UserId::random();

    let first = build_session(Some(user));
    let second = build_session(Some(user));
    let other = build_session(Some(UserId::random()));
    storage.sessions.upsert_session(&first).await.unwrap();
    storage.sessions.upsert_session(&second).await.unwrap();
    storage.sessions.upsert_session(&other).await.unwrap();

    let listed = storage.sessions.list_sessions_for_user(user).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|s| s.user_id() == Some(user)));
}

#[tokio::test]
async fn progress_round_trips() {
    let storage = Storage::sqlite("sqlite::memory:").await.unwrap();
    let user = UserId::random();

    assert!(storage.progress.get_progress(user).await.unwrap().is_none());

    let mut progress = UserProgress::empty(user, fixed_now());
    progress.completed_sessions = 3;
    progress.average_score = Some(71.5);
    storage.progress.upsert_progress(&progress).await.unwrap();

    let fetched = storage
        .progress
        .get_progress(user)
        .await
        .unwrap()
        .expect("progress persisted");
    assert_eq!(fetched, progress);
}
