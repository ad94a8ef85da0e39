use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct EvaluationRequest {
    #[validate(range(min = 1, message = "question_mark must be a positive number"))]
    pub(crate) question_mark: i32,
    pub(crate) expected_answer: String,
    pub(crate) student_answer: String,
}
