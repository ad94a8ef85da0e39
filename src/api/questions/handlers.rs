use std::collections::{HashMap, HashSet};

use axum::extract::State;
use axum::Json;

use crate::api::errors::ApiError;
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::validation::{
    non_empty_string, parse_date_filter, parse_id_list, parse_optional_id, parse_public_access,
    validate_payload,
};
use crate::core::state::AppState;
use crate::core::time::{primitive_now_utc, DayEdge};
use crate::repositories;
use crate::repositories::questions::QuestionFilters;
use crate::schemas::question::{
    AddQuestionsRequest, AddQuestionsResponse, ListQuestionsQuery, NewQuestion, OptionDetail,
    QuestionDetail, QuestionListResponse, UpdateQuestionRequest,
};
use crate::schemas::StatusMessage;
use crate::services::question_drafts::{self, DraftError, QuestionDraft};

pub(super) const CATEGORY_REQUIRED: &str = "Category ID is required";

pub(super) async fn add_questions(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<AddQuestionsRequest>,
) -> Result<Json<AddQuestionsResponse>, ApiError> {
    let category_id = payload
        .category_id
        .filter(|id| *id != 0)
        .ok_or_else(|| ApiError::BadRequest(CATEGORY_REQUIRED.to_string()))?;
    validate_payload(&payload)?;

    let drafts = payload
        .questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            draft_from_request(question)
                .map_err(|err| ApiError::BadRequest(format!("question {}: {err}", index + 1)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    super::upload::ensure_category_exists(&state, category_id).await?;

    let question_ids =
        question_drafts::persist_drafts(state.db(), category_id, &drafts, "manual")
            .await
            .map_err(|e| ApiError::internal(e, "Error inserting question"))?;

    tracing::debug!(institute_id = ?payload.institute_id, category_id, "Manual questions stored");

    Ok(Json(AddQuestionsResponse {
        status_message: "Question inserted successfully".to_string(),
        status: true,
        question_ids,
    }))
}

pub(super) fn draft_from_request(question: &NewQuestion) -> Result<QuestionDraft, DraftError> {
    let created_by = question.created_by.as_deref().unwrap_or_default();
    if question.question_type.has_choices() {
        QuestionDraft::with_choices(
            question.question_type,
            &question.text,
            question.marks,
            created_by,
            question.options.clone(),
            &question.correct_indices,
        )
    } else {
        QuestionDraft::with_answer(
            &question.text,
            question.marks,
            created_by,
            question.answer_text.as_deref().unwrap_or_default(),
        )
    }
}

pub(super) fn build_filters(query: &ListQuestionsQuery) -> Result<QuestionFilters, ApiError> {
    Ok(QuestionFilters {
        institute_id: parse_optional_id("institute_id", query.institute_id.as_deref())?,
        category_name: non_empty_string(query.category_name.as_deref()),
        category_ids: parse_id_list("category_id", query.category_id.as_deref())?,
        department_ids: parse_id_list("departments", query.departments.as_deref())?,
        team_ids: parse_id_list("teams", query.teams.as_deref())?,
        created_by: non_empty_string(query.created_by.as_deref()),
        created_after: parse_date_filter(
            "created_after",
            query.created_after.as_deref(),
            DayEdge::Start,
        )?,
        created_before: parse_date_filter(
            "created_before",
            query.created_before.as_deref(),
            DayEdge::End,
        )?,
        public_access: parse_public_access(query.public_access.as_deref()),
    })
}

pub(super) async fn list_questions(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuestionsQuery>,
) -> Result<Json<QuestionListResponse>, ApiError> {
    let filters = build_filters(&query)?;
    let fetch_failed = |e: sqlx::Error| ApiError::internal(e, "Error fetching question details");

    let questions =
        repositories::questions::list_filtered(state.db(), filters).await.map_err(fetch_failed)?;
    let question_ids = questions.iter().map(|question| question.question_id).collect::<Vec<_>>();

    let options = repositories::options::list_active_by_question_ids(state.db(), &question_ids)
        .await
        .map_err(fetch_failed)?;
    let mut options_by_question = HashMap::<i64, Vec<OptionDetail>>::new();
    for option in options {
        options_by_question.entry(option.question_id).or_default().push(OptionDetail {
            id: option.options_id,
            text: option.option_text,
            is_correct: option.is_correct,
        });
    }

    let mut categories = repositories::mappings::list_primary_categories(state.db(), &question_ids)
        .await
        .map_err(fetch_failed)?
        .into_iter()
        .map(|row| (row.question_id, row))
        .collect::<HashMap<_, _>>();

    let data = questions
        .into_iter()
        .map(|question| {
            let category = categories.remove(&question.question_id);
            QuestionDetail {
                id: question.question_id,
                text: question.question_text,
                question_type: question.question_type,
                marks: question.marks,
                options: options_by_question.remove(&question.question_id).unwrap_or_default(),
                category_id: category.as_ref().map(|row| row.category_id),
                category: category.as_ref().and_then(|row| row.name.clone()),
                category_description: category.and_then(|row| row.description),
            }
        })
        .collect::<Vec<_>>();

    Ok(Json(QuestionListResponse { status: true, total: data.len(), data }))
}

fn update_failed(err: sqlx::Error) -> ApiError {
    tracing::error!(error = %err, "Failed to update question");
    ApiError::Internal(err.to_string())
}

pub(super) async fn update_question(
    ApiPath(question_id): ApiPath<i64>,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<UpdateQuestionRequest>,
) -> Result<Json<StatusMessage>, ApiError> {
    let mut tx = state.db().begin().await.map_err(update_failed)?;

    let question = repositories::questions::find_for_update(&mut *tx, question_id)
        .await
        .map_err(update_failed)?
        .ok_or_else(|| ApiError::NotFound("Question not found".to_string()))?;

    let category_id = payload.category_id.filter(|id| *id != 0);
    if let Some(category_id) = category_id {
        let exists = repositories::categories::exists(&mut *tx, category_id)
            .await
            .map_err(update_failed)?;
        if !exists {
            return Err(ApiError::NotFound("Category not found".to_string()));
        }
    }

    repositories::questions::update(
        &mut *tx,
        question.question_id,
        repositories::questions::UpdateQuestion {
            question_type: payload.question_type,
            question_text: payload.text.as_deref(),
            marks: payload.parsed_marks(),
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(update_failed)?;

    if let Some(texts) = payload.option_texts() {
        let correct =
            payload.correct_indices.iter().flatten().copied().collect::<HashSet<usize>>();
        let existing = repositories::options::list_for_question(&mut *tx, question.question_id)
            .await
            .map_err(update_failed)?;

        for (index, text) in texts.iter().enumerate() {
            let is_correct = correct.contains(&index);
            match existing.get(index) {
                Some(option) => {
                    repositories::options::overwrite(&mut *tx, option.options_id, text, is_correct)
                        .await
                        .map_err(update_failed)?;
                }
                None => {
                    repositories::options::create(
                        &mut *tx,
                        question.question_id,
                        text,
                        is_correct,
                    )
                    .await
                    .map_err(update_failed)?;
                }
            }
        }

        for surplus in existing.iter().skip(texts.len()) {
            repositories::options::deactivate(&mut *tx, surplus.options_id)
                .await
                .map_err(update_failed)?;
        }
    }

    if let Some(category_id) = category_id {
        match repositories::mappings::find_first_for_question(&mut *tx, question.question_id)
            .await
            .map_err(update_failed)?
        {
            Some(mapping) => {
                repositories::mappings::set_category(&mut *tx, mapping.id, category_id)
                    .await
                    .map_err(update_failed)?;
            }
            None => {
                repositories::mappings::create(&mut *tx, question.question_id, category_id)
                    .await
                    .map_err(update_failed)?;
            }
        }
    }

    tx.commit().await.map_err(update_failed)?;
    tracing::info!(question_id, "Question updated");

    Ok(Json(StatusMessage::ok("Question updated")))
}
