use axum::{extract::State, routing::post, Json, Router};
use serde_json::Value;

use crate::api::errors::ApiError;
use crate::api::extract::ApiJson;
use crate::api::validation::validate_payload;
use crate::core::state::AppState;
use crate::schemas::llm::EvaluationRequest;
use crate::services::evaluation::{self, EvaluationInput};

#[cfg(test)]
mod tests;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/descriptive", post(descriptive_evaluation))
}

/// Grades a free-text answer. Model failures are reported in the body with
/// `status: false`; only invalid input produces an HTTP error.
async fn descriptive_evaluation(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<EvaluationRequest>,
) -> Result<Json<Value>, ApiError> {
    validate_payload(&payload)?;

    let result = evaluation::descriptive_evaluation(
        state.llm(),
        EvaluationInput {
            question_mark: payload.question_mark,
            expected_answer: &payload.expected_answer,
            student_answer: &payload.student_answer,
        },
    )
    .await;

    Ok(Json(result))
}
