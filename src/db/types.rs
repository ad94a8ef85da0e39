use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "questiontype", rename_all = "lowercase")]
pub(crate) enum QuestionType {
    /// Free text answer; the single stored option is the canonical answer.
    Fill,
    /// Exactly one option is expected to be picked.
    Choose,
    /// Two or more options are correct.
    Multi,
}

impl QuestionType {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            QuestionType::Fill => "fill",
            QuestionType::Choose => "choose",
            QuestionType::Multi => "multi",
        }
    }

    pub(crate) fn has_choices(self) -> bool {
        matches!(self, QuestionType::Choose | QuestionType::Multi)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
