use sqlx::PgPool;

use crate::db::models::QuestionOption;

pub(crate) const OPTION_COLUMNS: &str =
    "options_id, question_id, option_text, is_correct, active_status";

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    question_id: i64,
    option_text: &str,
    is_correct: bool,
) -> Result<QuestionOption, sqlx::Error> {
    sqlx::query_as::<_, QuestionOption>(&format!(
        "INSERT INTO options (question_id, option_text, is_correct, active_status)
         VALUES ($1,$2,$3,TRUE)
         RETURNING {OPTION_COLUMNS}"
    ))
    .bind(question_id)
    .bind(option_text)
    .bind(is_correct)
    .fetch_one(executor)
    .await
}

/// Every option of a question, active or not, in insertion order.
pub(crate) async fn list_for_question(
    executor: impl sqlx::PgExecutor<'_>,
    question_id: i64,
) -> Result<Vec<QuestionOption>, sqlx::Error> {
    sqlx::query_as::<_, QuestionOption>(&format!(
        "SELECT {OPTION_COLUMNS} FROM options WHERE question_id = $1 ORDER BY options_id"
    ))
    .bind(question_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn list_active_by_question_ids(
    pool: &PgPool,
    question_ids: &[i64],
) -> Result<Vec<QuestionOption>, sqlx::Error> {
    if question_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, QuestionOption>(&format!(
        "SELECT {OPTION_COLUMNS}
         FROM options
         WHERE question_id = ANY($1) AND active_status = TRUE
         ORDER BY question_id, options_id"
    ))
    .bind(question_ids)
    .fetch_all(pool)
    .await
}

pub(crate) async fn overwrite(
    executor: impl sqlx::PgExecutor<'_>,
    options_id: i64,
    option_text: &str,
    is_correct: bool,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE options SET option_text = $1, is_correct = $2, active_status = TRUE
         WHERE options_id = $3",
    )
    .bind(option_text)
    .bind(is_correct)
    .bind(options_id)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn deactivate(
    executor: impl sqlx::PgExecutor<'_>,
    options_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE options SET active_status = FALSE WHERE options_id = $1")
        .bind(options_id)
        .execute(executor)
        .await?;
    Ok(())
}
