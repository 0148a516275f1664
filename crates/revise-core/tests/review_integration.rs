//! End-to-end review tests against a mock chat completions endpoint.

use chrono::NaiveDate;
use revise_core::review::LlmReviewClient;
use revise_core::{
    Block, Exam, Preferences, ReviewBridge, ReviewStatus, SchedulerConfig, TimetableGenerator,
};

fn ymd(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

fn completion(content: &str) -> String {
    serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    })
    .to_string()
}

fn fixture() -> (Preferences, Vec<Exam>) {
    let mut prefs = Preferences {
        start_date: "2024-03-04".to_string(),
        ..Default::default()
    };
    for day in ["Monday", "Tuesday", "Wednesday"] {
        prefs.revision_times.insert(
            day.to_string(),
            vec!["Morning".to_string(), "Evening".to_string()],
        );
    }
    let exams = vec![
        Exam::new("Maths", ymd(8), Block::Morning),
        Exam::new("Chemistry", ymd(13), Block::Afternoon),
    ];
    (prefs, exams)
}

fn generate(prefs: &Preferences, exams: &[Exam]) -> Vec<revise_core::Session> {
    TimetableGenerator::with_config(SchedulerConfig {
        seed: Some(11),
        ..Default::default()
    })
    .generate(prefs, exams)
    .unwrap()
    .sessions
}

#[tokio::test]
async fn test_review_round_trip_merges_by_id() {
    let (prefs, exams) = fixture();
    let local = generate(&prefs, &exams);
    // 2024-03-04 is a Monday; s1 is its morning session
    assert_eq!(local[0].id, "s1");

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion(
            r#"{"updated_sessions": [{"id": "s1", "subject": "Chemistry"}], "feedback": "Balance Chemistry earlier."}"#,
        ))
        .create_async()
        .await;

    let client = LlmReviewClient::new(
        &format!("{}/v1/chat/completions", server.url()),
        "test-model",
        "test-key",
    );
    let outcome = ReviewBridge::new(client).review(local.clone(), &exams).await;

    mock.assert_async().await;
    assert_eq!(outcome.sessions.len(), local.len());
    assert_eq!(outcome.sessions[0].subject, "Chemistry");
    assert_eq!(outcome.sessions[0].start_time, local[0].start_time);
    assert_eq!(&outcome.sessions[1..], &local[1..]);
    assert!(matches!(
        outcome.status,
        ReviewStatus::Applied { applied: 1, rejected: 0, .. }
    ));
}

#[tokio::test]
async fn test_prose_reply_keeps_local_schedule() {
    let (prefs, exams) = fixture();
    let local = generate(&prefs, &exams);

    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion("not json"))
        .create_async()
        .await;

    let client = LlmReviewClient::new(&format!("{}/chat", server.url()), "m", "k");
    let outcome = ReviewBridge::new(client).review(local.clone(), &exams).await;

    assert_eq!(outcome.sessions, local);
    assert!(matches!(outcome.status, ReviewStatus::Failed { .. }));
}

#[tokio::test]
async fn test_server_error_keeps_local_schedule() {
    let (prefs, exams) = fixture();
    let local = generate(&prefs, &exams);

    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat")
        .with_status(503)
        .with_body("overloaded")
        .create_async()
        .await;

    let client = LlmReviewClient::new(&format!("{}/chat", server.url()), "m", "k");
    let outcome = ReviewBridge::new(client).review(local.clone(), &exams).await;

    assert_eq!(outcome.sessions, local);
    match outcome.status {
        ReviewStatus::Failed { reason } => assert!(reason.contains("503")),
        other => panic!("expected failure, got {other:?}"),
    }
}
