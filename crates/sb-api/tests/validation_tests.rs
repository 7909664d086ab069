//! Requests rejected before any database access.

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::common::{TestClient, TestStateBuilder};

fn client() -> TestClient {
    TestClient::new(TestStateBuilder::new().build_offline()).with_user(Uuid::new_v4())
}

#[tokio::test]
async fn test_invalid_bucket_key_is_bad_request() {
    let response = client()
        .post_json(
            "/flash-cards/review-session",
            &json!({ "bucket": "someday", "count": 5 }),
        )
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.error().contains("someday"), "{}", response.error());
}

#[tokio::test]
async fn test_review_count_out_of_range() {
    client()
        .post_json("/flash-cards/review-session", &json!({ "count": 0 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_difficulty_is_bad_request() {
    client()
        .post_json(
            &format!("/flash-cards/{}/review", Uuid::new_v4()),
            &json!({ "difficulty": "impossible" }),
        )
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_card_without_topic_is_rejected() {
    client()
        .post_json(
            "/flash-cards",
            &json!({ "topic": "   ", "front_text": "Front", "back_text": "Back" }),
        )
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_exam_question_rules_are_enforced() {
    let client = client();

    let no_correct = json!({
        "exam_type": "lab",
        "exam_number": 2,
        "question": "Which stain is used for bacteria?",
        "options": [
            { "text": "Gram", "correct": false },
            { "text": "Wright", "correct": false }
        ]
    });
    let response = client.post_json("/exam-questions", &no_correct).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.error().contains("correct"));

    let too_few = json!({
        "exam_type": "lab",
        "exam_number": 2,
        "question": "Which stain is used for bacteria?",
        "options": [{ "text": "Gram", "correct": true }]
    });
    client
        .post_json("/exam-questions", &too_few)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let bad_number = json!({
        "exam_type": "lecture",
        "exam_number": 4,
        "question": "Which stain is used for bacteria?",
        "options": [
            { "text": "Gram", "correct": true },
            { "text": "Wright", "correct": false }
        ]
    });
    client
        .post_json("/exam-questions", &bad_number)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let bad_type = json!({
        "exam_type": "quiz",
        "exam_number": 1,
        "question": "Which stain is used for bacteria?",
        "options": [
            { "text": "Gram", "correct": true },
            { "text": "Wright", "correct": false }
        ]
    });
    client
        .post_json("/exam-questions", &bad_type)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_exam_that_does_not_exist() {
    let client = client();

    client
        .post_json("/exams/lecture/4/sessions", &json!({}))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    client
        .post_json("/exams/quiz/1/sessions", &json!({}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bug_report_needs_message() {
    client()
        .post_json("/reports/bug", &json!({ "message": "   " }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let client = client();
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/flash-cards")
        .header("content-type", "application/json")
        .header("x-forwarded-for", "127.0.0.1")
        .header(
            "authorization",
            format!("Bearer {}", crate::common::token_for(Uuid::new_v4(), "Tester")),
        )
        .body(axum::body::Body::from("{ not json"))
        .unwrap();

    client
        .request(request)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
