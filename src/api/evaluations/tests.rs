use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::services::llm_client::ChatResponse;
use crate::test_support::{self, completion_body, StubLlm};

fn evaluation_body(question_mark: i64) -> serde_json::Value {
    json!({
        "question_mark": question_mark,
        "expected_answer": "Ownership, borrowing and lifetimes",
        "student_answer": "Rust tracks ownership and borrowing"
    })
}

#[tokio::test]
async fn returns_model_verdict_with_status() {
    let ctx = test_support::lazy_context(StubLlm::replying(completion_body(
        r#"{"score": 3, "missing": "Lifetimes", "incomplete": "None", "incorrect": "None", "feedback": "Mostly right"}"#,
    )))
    .await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/evaluations/descriptive",
            Some(evaluation_body(5)),
        ))
        .await
        .expect("evaluate");

    assert_eq!(response.status(), StatusCode::OK);
    let body = test_support::read_json(response).await;
    assert_eq!(body["status"], true);
    assert_eq!(body["score"], 3);
    assert_eq!(body["missing"], "Lifetimes");

    let (system, prompt) = ctx.llm.last_request().unwrap();
    assert!(system.is_some());
    assert!(prompt.contains("Rust tracks ownership and borrowing"));
    assert_eq!(ctx.llm.request_count(), 1);
}

#[tokio::test]
async fn non_positive_mark_is_rejected() {
    let ctx = test_support::lazy_context(StubLlm::replying(completion_body("{}"))).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/evaluations/descriptive",
            Some(evaluation_body(0)),
        ))
        .await
        .expect("evaluate");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = test_support::read_json(response).await;
    assert_eq!(body["status"], false);
    assert_eq!(ctx.llm.request_count(), 0);
}

#[tokio::test]
async fn upstream_failure_is_reported_in_body() {
    let ctx = test_support::lazy_context(StubLlm::responding(ChatResponse::synthetic(
        408,
        "timeout",
        "Request timed out",
    )))
    .await;

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/evaluations/descriptive",
            Some(evaluation_body(2)),
        ))
        .await
        .expect("evaluate");

    assert_eq!(response.status(), StatusCode::OK);
    let body = test_support::read_json(response).await;
    assert_eq!(body["status"], false);
    assert_eq!(body["error"]["type"], "timeout");
}

#[tokio::test]
async fn unparseable_verdict_scores_zero() {
    let ctx = test_support::lazy_context(StubLlm::replying(completion_body("great answer!"))).await;

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/evaluations/descriptive",
            Some(evaluation_body(2)),
        ))
        .await
        .expect("evaluate");

    assert_eq!(response.status(), StatusCode::OK);
    let body = test_support::read_json(response).await;
    assert_eq!(body["status"], false);
    assert_eq!(body["score"], 0);
}

#[tokio::test]
async fn missing_field_uses_error_envelope() {
    let ctx = test_support::lazy_context(StubLlm::replying(completion_body("{}"))).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/evaluations/descriptive",
            Some(json!({"question_mark": 5, "expected_answer": "Ownership"})),
        ))
        .await
        .expect("evaluate");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = test_support::read_json(response).await;
    assert_eq!(body["status"], false);
    assert!(body["statusMessage"].as_str().unwrap().contains("student_answer"));
    assert_eq!(ctx.llm.request_count(), 0);
}
