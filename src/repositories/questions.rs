use sqlx::{PgPool, Postgres, QueryBuilder};
use time::PrimitiveDateTime;

use crate::db::models::Question;
use crate::db::types::QuestionType;

pub(crate) const QUESTION_COLUMNS: &str =
    "question_id, question_type, question_text, marks, created_by, created_at, updated_at";

pub(crate) struct CreateQuestion<'a> {
    pub(crate) question_type: QuestionType,
    pub(crate) question_text: &'a str,
    pub(crate) marks: i32,
    pub(crate) created_by: &'a str,
    pub(crate) now: PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateQuestion<'_>,
) -> Result<Question, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "INSERT INTO questions (
            question_type, question_text, marks, created_by, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6)
         RETURNING {QUESTION_COLUMNS}"
    ))
    .bind(params.question_type)
    .bind(params.question_text)
    .bind(params.marks)
    .bind(params.created_by)
    .bind(params.now)
    .bind(params.now)
    .fetch_one(executor)
    .await
}

/// Loads a question and locks its row for the rest of the transaction.
pub(crate) async fn find_for_update(
    executor: impl sqlx::PgExecutor<'_>,
    question_id: i64,
) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM questions WHERE question_id = $1 FOR UPDATE"
    ))
    .bind(question_id)
    .fetch_optional(executor)
    .await
}

pub(crate) struct UpdateQuestion<'a> {
    pub(crate) question_type: Option<QuestionType>,
    pub(crate) question_text: Option<&'a str>,
    pub(crate) marks: Option<i32>,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) async fn update(
    executor: impl sqlx::PgExecutor<'_>,
    question_id: i64,
    params: UpdateQuestion<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE questions SET
            question_type = COALESCE($1, question_type),
            question_text = COALESCE($2, question_text),
            marks = COALESCE($3, marks),
            updated_at = $4
         WHERE question_id = $5",
    )
    .bind(params.question_type)
    .bind(params.question_text)
    .bind(params.marks)
    .bind(params.updated_at)
    .bind(question_id)
    .execute(executor)
    .await?;
    Ok(())
}

/// Category-level filters. Every populated field narrows the result to
/// questions mapped to at least one category satisfying it.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct QuestionFilters {
    pub(crate) institute_id: Option<i64>,
    pub(crate) category_name: Option<String>,
    pub(crate) category_ids: Option<Vec<i64>>,
    pub(crate) department_ids: Option<Vec<i64>>,
    pub(crate) team_ids: Option<Vec<i64>>,
    pub(crate) created_by: Option<String>,
    pub(crate) created_after: Option<PrimitiveDateTime>,
    pub(crate) created_before: Option<PrimitiveDateTime>,
    pub(crate) public_access: Option<bool>,
}

const MAPPED_CATEGORY: &str = " AND q.question_id IN (
    SELECT m.question_id FROM question_mappings m
    JOIN categories c ON c.category_id = m.category_id
    WHERE ";

pub(crate) async fn list_filtered(
    pool: &PgPool,
    filters: QuestionFilters,
) -> Result<Vec<Question>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(format!(
        "SELECT {}
         FROM questions q
         WHERE TRUE",
        qualified_columns()
    ));

    if let Some(institute_id) = filters.institute_id {
        builder.push(MAPPED_CATEGORY).push("c.institute_id = ");
        builder.push_bind(institute_id).push(")");
    }
    // Name matches are scoped to one visibility; private unless public_access is true.
    if let Some(name) = filters.category_name {
        builder.push(MAPPED_CATEGORY).push("c.name ILIKE ");
        builder.push_bind(format!("%{}%", escape_like(&name)));
        builder.push(" AND c.public_access = ");
        builder.push_bind(filters.public_access.unwrap_or(false)).push(")");
    }
    if let Some(category_ids) = filters.category_ids {
        builder.push(
            " AND q.question_id IN (
                SELECT m.question_id FROM question_mappings m
                WHERE m.category_id = ANY(",
        );
        builder.push_bind(category_ids).push("))");
    }
    if let Some(department_ids) = filters.department_ids {
        builder.push(
            " AND q.question_id IN (
                SELECT m.question_id FROM question_mappings m
                JOIN categories_departments d ON d.category_id = m.category_id
                WHERE d.department_id = ANY(",
        );
        builder.push_bind(department_ids).push("))");
    }
    if let Some(team_ids) = filters.team_ids {
        builder.push(
            " AND q.question_id IN (
                SELECT m.question_id FROM question_mappings m
                JOIN categories_teams t ON t.category_id = m.category_id
                WHERE t.team_id = ANY(",
        );
        builder.push_bind(team_ids).push("))");
    }
    if let Some(created_by) = filters.created_by {
        builder.push(MAPPED_CATEGORY).push("c.created_by = ");
        builder.push_bind(created_by).push(")");
    }
    if let Some(created_after) = filters.created_after {
        builder.push(MAPPED_CATEGORY).push("c.created_date >= ");
        builder.push_bind(created_after).push(")");
    }
    if let Some(created_before) = filters.created_before {
        builder.push(MAPPED_CATEGORY).push("c.created_date <= ");
        builder.push_bind(created_before).push(")");
    }
    if let Some(public_access) = filters.public_access {
        builder.push(MAPPED_CATEGORY).push("c.public_access = ");
        builder.push_bind(public_access).push(")");
    }

    builder.push(" ORDER BY q.question_id");

    builder.build_query_as::<Question>().fetch_all(pool).await
}

fn qualified_columns() -> String {
    QUESTION_COLUMNS.split(", ").map(|column| format!("q.{column}")).collect::<Vec<_>>().join(", ")
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
