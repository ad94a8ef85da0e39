use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};

use crate::api::errors::ApiError;
use crate::api::extract::{ApiJson, ApiQuery};
use crate::api::validation::validate_payload;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::category::{
    CategoryEnvelope, CategoryListResponse, CategoryResponse, CreateCategoryRequest,
    ListCategoriesQuery,
};
use crate::services::question_drafts::DEFAULT_AUTHOR;


pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", get(list_categories).post(create_category))
}

async fn create_category(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryEnvelope>), ApiError> {
    validate_payload(&payload)?;
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("name must not be blank".to_string()));
    }
    let created_by = payload
        .created_by
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_AUTHOR);

    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let category = repositories::categories::create(
        &mut *tx,
        repositories::categories::CreateCategory {
            institute_id: payload.institute_id,
            name,
            description: payload.description.as_deref(),
            public_access: payload.public_access,
            created_by,
            created_date: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create category"))?;

    if !payload.department_ids.is_empty() {
        repositories::categories::link_departments(
            &mut *tx,
            category.category_id,
            &payload.department_ids,
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to link category departments"))?;
    }
    if !payload.team_ids.is_empty() {
        repositories::categories::link_teams(&mut *tx, category.category_id, &payload.team_ids)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to link category teams"))?;
    }

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to create category"))?;
    tracing::info!(category_id = category.category_id, "Category created");

    Ok((
        StatusCode::CREATED,
        Json(CategoryEnvelope { status: true, data: CategoryResponse::from(category) }),
    ))
}

async fn list_categories(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListCategoriesQuery>,
) -> Result<Json<CategoryListResponse>, ApiError> {
    let categories = repositories::categories::list(state.db(), query.institute_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list categories"))?;
    let data = categories.into_iter().map(CategoryResponse::from).collect::<Vec<_>>();

    Ok(Json(CategoryListResponse { status: true, total: data.len(), data }))
}
