use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Category;

const CATEGORY_COLUMNS: &str =
    "category_id, institute_id, name, description, public_access, created_by, created_date";

pub(crate) struct CreateCategory<'a> {
    pub(crate) institute_id: Option<i64>,
    pub(crate) name: &'a str,
    pub(crate) description: Option<&'a str>,
    pub(crate) public_access: bool,
    pub(crate) created_by: &'a str,
    pub(crate) created_date: PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateCategory<'_>,
) -> Result<Category, sqlx::Error> {
    sqlx::query_as::<_, Category>(&format!(
        "INSERT INTO categories (
            institute_id, name, description, public_access, created_by, created_date
         ) VALUES ($1,$2,$3,$4,$5,$6)
         RETURNING {CATEGORY_COLUMNS}"
    ))
    .bind(params.institute_id)
    .bind(params.name)
    .bind(params.description)
    .bind(params.public_access)
    .bind(params.created_by)
    .bind(params.created_date)
    .fetch_one(executor)
    .await
}

pub(crate) async fn link_departments(
    executor: impl sqlx::PgExecutor<'_>,
    category_id: i64,
    department_ids: &[i64],
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO categories_departments (category_id, department_id)
         SELECT $1, UNNEST($2::BIGINT[])
         ON CONFLICT (category_id, department_id) DO NOTHING",
    )
    .bind(category_id)
    .bind(department_ids)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn link_teams(
    executor: impl sqlx::PgExecutor<'_>,
    category_id: i64,
    team_ids: &[i64],
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO categories_teams (category_id, team_id)
         SELECT $1, UNNEST($2::BIGINT[])
         ON CONFLICT (category_id, team_id) DO NOTHING",
    )
    .bind(category_id)
    .bind(team_ids)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn exists(
    executor: impl sqlx::PgExecutor<'_>,
    category_id: i64,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM categories WHERE category_id = $1)",
    )
    .bind(category_id)
    .fetch_one(executor)
    .await
}

pub(crate) async fn list(
    pool: &PgPool,
    institute_id: Option<i64>,
) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(&format!(
        "SELECT {CATEGORY_COLUMNS}
         FROM categories
         WHERE ($1::BIGINT IS NULL OR institute_id = $1)
         ORDER BY category_id"
    ))
    .bind(institute_id)
    .fetch_all(pool)
    .await
}
