use sqlx::PgPool;

use crate::db::models::QuestionMapping;

const MAPPING_COLUMNS: &str = "id, question_id, category_id";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct QuestionCategoryRow {
    pub(crate) question_id: i64,
    pub(crate) category_id: i64,
    pub(crate) name: Option<String>,
    pub(crate) description: Option<String>,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    question_id: i64,
    category_id: i64,
) -> Result<QuestionMapping, sqlx::Error> {
    sqlx::query_as::<_, QuestionMapping>(&format!(
        "INSERT INTO question_mappings (question_id, category_id)
         VALUES ($1,$2)
         RETURNING {MAPPING_COLUMNS}"
    ))
    .bind(question_id)
    .bind(category_id)
    .fetch_one(executor)
    .await
}

pub(crate) async fn find_first_for_question(
    executor: impl sqlx::PgExecutor<'_>,
    question_id: i64,
) -> Result<Option<QuestionMapping>, sqlx::Error> {
    sqlx::query_as::<_, QuestionMapping>(&format!(
        "SELECT {MAPPING_COLUMNS} FROM question_mappings
         WHERE question_id = $1
         ORDER BY id
         LIMIT 1"
    ))
    .bind(question_id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn set_category(
    executor: impl sqlx::PgExecutor<'_>,
    mapping_id: i64,
    category_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE question_mappings SET category_id = $1 WHERE id = $2")
        .bind(category_id)
        .bind(mapping_id)
        .execute(executor)
        .await?;
    Ok(())
}

/// The first mapping of each question joined with its category.
pub(crate) async fn list_primary_categories(
    pool: &PgPool,
    question_ids: &[i64],
) -> Result<Vec<QuestionCategoryRow>, sqlx::Error> {
    if question_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, QuestionCategoryRow>(
        "SELECT DISTINCT ON (m.question_id)
                m.question_id,
                m.category_id,
                c.name,
                c.description
         FROM question_mappings m
         LEFT JOIN categories c ON c.category_id = m.category_id
         WHERE m.question_id = ANY($1)
         ORDER BY m.question_id, m.id",
    )
    .bind(question_ids)
    .fetch_all(pool)
    .await
}
