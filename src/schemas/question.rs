use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::db::types::QuestionType;

fn default_marks() -> i32 {
    1
}

/// Keeps an explicit `null` as `Some(Value::Null)` so it differs from an absent key.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AddQuestionsRequest {
    #[serde(default)]
    pub(crate) institute_id: Option<i64>,
    #[serde(default)]
    pub(crate) category_id: Option<i64>,
    #[serde(default)]
    #[validate(length(min = 1, message = "questions must contain at least one question"))]
    pub(crate) questions: Vec<NewQuestion>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct NewQuestion {
    #[serde(rename = "type")]
    pub(crate) question_type: QuestionType,
    pub(crate) text: String,
    #[serde(default = "default_marks")]
    pub(crate) marks: i32,
    #[serde(default)]
    pub(crate) created_by: Option<String>,
    #[serde(default)]
    pub(crate) options: Vec<String>,
    #[serde(default, rename = "answerText")]
    pub(crate) answer_text: Option<String>,
    #[serde(default)]
    pub(crate) correct_indices: Vec<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddQuestionsResponse {
    pub(crate) status_message: String,
    pub(crate) status: bool,
    #[serde(rename = "question_ids")]
    pub(crate) question_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BulkUploadResponse {
    pub(crate) status_message: String,
    pub(crate) status: bool,
    pub(crate) inserted: usize,
}

/// Raw query string of `GET /questions`; values are parsed by the handler so
/// that malformed filters can be reported by name.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListQuestionsQuery {
    #[serde(default)]
    pub(crate) institute_id: Option<String>,
    #[serde(default)]
    pub(crate) category_name: Option<String>,
    #[serde(default)]
    pub(crate) category_id: Option<String>,
    #[serde(default)]
    pub(crate) departments: Option<String>,
    #[serde(default)]
    pub(crate) teams: Option<String>,
    #[serde(default)]
    pub(crate) created_by: Option<String>,
    #[serde(default)]
    pub(crate) created_after: Option<String>,
    #[serde(default)]
    pub(crate) created_before: Option<String>,
    #[serde(default)]
    pub(crate) public_access: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct OptionDetail {
    pub(crate) id: i64,
    pub(crate) text: String,
    pub(crate) is_correct: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionDetail {
    pub(crate) id: i64,
    pub(crate) text: String,
    #[serde(rename = "type")]
    pub(crate) question_type: QuestionType,
    pub(crate) marks: i32,
    pub(crate) options: Vec<OptionDetail>,
    pub(crate) category_id: Option<i64>,
    pub(crate) category: Option<String>,
    pub(crate) category_description: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionListResponse {
    pub(crate) status: bool,
    pub(crate) data: Vec<QuestionDetail>,
    pub(crate) total: usize,
}

/// Partial update; absent fields keep their stored values.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct UpdateQuestionRequest {
    #[serde(default, rename = "type")]
    pub(crate) question_type: Option<QuestionType>,
    #[serde(default)]
    pub(crate) text: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub(crate) marks: Option<Value>,
    #[serde(default)]
    pub(crate) options: Option<Vec<Value>>,
    #[serde(default)]
    pub(crate) correct_indices: Option<Vec<usize>>,
    #[serde(default)]
    pub(crate) category_id: Option<i64>,
}

impl UpdateQuestionRequest {
    /// Integer marks from a number or numeric string. A present but empty
    /// value (`null`, `""`, `false`) resets marks to 0; anything unparseable
    /// keeps the stored value.
    pub(crate) fn parsed_marks(&self) -> Option<i32> {
        match self.marks.as_ref()? {
            Value::Null => Some(0),
            Value::Bool(flag) => Some(i32::from(*flag)),
            Value::Number(number) => number
                .as_i64()
                .or_else(|| number.as_f64().map(|value| value.trunc() as i64))
                .and_then(|value| i32::try_from(value).ok()),
            Value::String(text) if text.is_empty() => Some(0),
            Value::String(text) => text.trim().parse::<i32>().ok(),
            _ => None,
        }
    }

    /// Option texts with non-string entries stringified.
    pub(crate) fn option_texts(&self) -> Option<Vec<String>> {
        self.options.as_ref().map(|options| {
            options
                .iter()
                .map(|option| match option {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                })
                .collect()
        })
    }
}
