use axum::extract::{Multipart, State};
use axum::Json;

use crate::api::errors::ApiError;
use crate::api::multipart::read_form;
use crate::api::validation::parse_optional_id;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::question::BulkUploadResponse;
use crate::services::question_drafts::{self, DEFAULT_AUTHOR};
use crate::services::question_import::{parse_question_csv, CsvImportError};

pub(super) async fn ensure_category_exists(
    state: &AppState,
    category_id: i64,
) -> Result<(), ApiError> {
    let exists = repositories::categories::exists(state.db(), category_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load category"))?;
    if exists {
        Ok(())
    } else {
        Err(ApiError::NotFound("Category not found".to_string()))
    }
}

pub(super) async fn bulk_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<BulkUploadResponse>, ApiError> {
    let form = read_form(multipart, state.settings().storage().max_upload_bytes()).await?;
    let file =
        form.file.as_ref().ok_or_else(|| ApiError::BadRequest("No file provided".to_string()))?;

    let category_id = parse_optional_id("category_id", form.field("category_id"))?
        .filter(|id| *id != 0)
        .ok_or_else(|| ApiError::BadRequest(super::handlers::CATEGORY_REQUIRED.to_string()))?;
    let institute_id = parse_optional_id("institute_id", form.field("institute_id"))?;
    let created_by = form
        .field("created_by")
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_AUTHOR);

    let drafts = parse_question_csv(&file.bytes, created_by).map_err(|err| match err {
        CsvImportError::Csv(inner) => ApiError::BadRequest(format!("Invalid CSV file: {inner}")),
        other => ApiError::BadRequest(other.to_string()),
    })?;

    ensure_category_exists(&state, category_id).await?;

    let question_ids = question_drafts::persist_drafts(state.db(), category_id, &drafts, "csv")
        .await
        .map_err(|e| ApiError::internal(e, "Error inserting question"))?;

    tracing::info!(
        filename = file.filename.as_deref().unwrap_or("-"),
        institute_id = ?institute_id,
        category_id,
        inserted = question_ids.len(),
        "Question sheet imported"
    );

    Ok(Json(BulkUploadResponse {
        status_message: "Question inserted successfully".to_string(),
        status: true,
        inserted: question_ids.len(),
    }))
}
