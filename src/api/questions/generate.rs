use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::Json;
use serde_json::{json, Map, Value};

use crate::api::errors::ApiError;
use crate::api::multipart::{read_form, FormData};
use crate::core::state::AppState;
use crate::services::llm_response::json_kind;
use crate::services::question_generation::{self, GenerationParams};

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.to_ascii_lowercase().starts_with("multipart/form-data"))
}

/// Scalar JSON values as the text a form field would carry.
pub(super) fn json_field_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Reads the body as a JSON object. Bodies that are empty, malformed or not
/// an object count as an empty object.
async fn read_json_object(request: Request, limit: usize) -> Result<Map<String, Value>, ApiError> {
    let bytes = axum::body::to_bytes(request.into_body(), limit)
        .await
        .map_err(|_| ApiError::PayloadTooLarge("Request body is too large".to_string()))?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(other) => {
            tracing::debug!(kind = json_kind(&other), "Ignoring non-object generation body");
            Ok(Map::new())
        }
        Err(err) => {
            tracing::debug!(error = %err, "Ignoring unparseable generation body");
            Ok(Map::new())
        }
    }
}

/// Accepts JSON or multipart form data. Form values take precedence over
/// JSON values; an uploaded `file` is appended to the source text. Answers
/// 200 with `status: false` when the parameters cannot be used.
pub(super) async fn generate_questions(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<Value>, ApiError> {
    let max_bytes = state.settings().storage().max_upload_bytes();

    let (json_body, form) = if is_multipart(&request) {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        (Map::new(), read_form(multipart, max_bytes).await?)
    } else {
        let limit = usize::try_from(max_bytes).unwrap_or(usize::MAX);
        (read_json_object(request, limit).await?, FormData::default())
    };

    let resolved = GenerationParams::resolve(|key| {
        form.field(key)
            .map(str::to_string)
            .or_else(|| json_body.get(key).and_then(json_field_text))
    });
    let mut params = match resolved {
        Ok(params) => params,
        Err(error) => {
            tracing::warn!(error = %error, "Rejected question generation parameters");
            return Ok(Json(json!({"status": false, "error": error})));
        }
    };

    if let Some(file) = &form.file {
        params.append_source_document(file.text()?);
    }

    tracing::info!(
        question_type = %params.question_type,
        number_of_questions = params.number_of_questions,
        question_mark = params.question_mark,
        source_chars = params.source_text.chars().count(),
        "Generating questions"
    );

    Ok(Json(question_generation::generate_questions(state.llm(), &params).await))
}
