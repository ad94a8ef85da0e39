use serde::Serialize;
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::QuestionType;

#[derive(Debug, Clone, Serialize, FromRow)]
pub(crate) struct Question {
    pub(crate) question_id: i64,
    pub(crate) question_type: QuestionType,
    pub(crate) question_text: String,
    pub(crate) marks: i32,
    pub(crate) created_by: String,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub(crate) struct QuestionOption {
    pub(crate) options_id: i64,
    pub(crate) question_id: i64,
    pub(crate) option_text: String,
    pub(crate) is_correct: bool,
    pub(crate) active_status: bool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub(crate) struct QuestionMapping {
    pub(crate) id: i64,
    pub(crate) question_id: i64,
    pub(crate) category_id: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub(crate) struct Category {
    pub(crate) category_id: i64,
    pub(crate) institute_id: Option<i64>,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) public_access: bool,
    pub(crate) created_by: String,
    pub(crate) created_date: PrimitiveDateTime,
}
