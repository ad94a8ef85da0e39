use std::collections::BTreeSet;

use sqlx::PgPool;
use thiserror::Error;

use crate::core::{metrics, time::primitive_now_utc};
use crate::db::types::QuestionType;
use crate::repositories;

pub(crate) const DEFAULT_AUTHOR: &str = "System";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OptionDraft {
    pub(crate) text: String,
    pub(crate) is_correct: bool,
}

/// A question with its options, validated and ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct QuestionDraft {
    pub(crate) question_type: QuestionType,
    pub(crate) text: String,
    pub(crate) marks: i32,
    pub(crate) created_by: String,
    pub(crate) options: Vec<OptionDraft>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum DraftError {
    #[error("question text must not be empty")]
    EmptyText,
    #[error("marks must not be negative")]
    NegativeMarks,
    #[error("'{0}' questions need at least one option")]
    NoOptions(QuestionType),
    #[error("option {0} is empty")]
    EmptyOption(usize),
    #[error("correct option index {index} is out of range for {count} options")]
    CorrectIndexOutOfRange { index: usize, count: usize },
    #[error("'{question_type}' questions need at least {required} correct option(s), got {found}")]
    TooFewCorrect { question_type: QuestionType, required: usize, found: usize },
    #[error("fill questions need an answer text")]
    MissingAnswer,
}

impl QuestionDraft {
    /// Builds a `choose`/`multi` question. `correct_indices` are 0-based
    /// positions in `options`; duplicates are ignored.
    pub(crate) fn with_choices(
        question_type: QuestionType,
        text: &str,
        marks: i32,
        created_by: &str,
        options: Vec<String>,
        correct_indices: &[usize],
    ) -> Result<Self, DraftError> {
        let correct: BTreeSet<usize> = correct_indices.iter().copied().collect();
        if options.is_empty() {
            return Err(DraftError::NoOptions(question_type));
        }
        if let Some(&index) = correct.iter().find(|index| **index >= options.len()) {
            return Err(DraftError::CorrectIndexOutOfRange { index, count: options.len() });
        }

        let options = options
            .into_iter()
            .enumerate()
            .map(|(index, text)| OptionDraft {
                text: text.trim().to_string(),
                is_correct: correct.contains(&index),
            })
            .collect();

        let draft = Self {
            question_type,
            text: text.trim().to_string(),
            marks,
            created_by: normalize_author(created_by),
            options,
        };
        draft.validate()?;
        Ok(draft)
    }

    /// Builds a `fill` question whose only option is the canonical answer.
    pub(crate) fn with_answer(
        text: &str,
        marks: i32,
        created_by: &str,
        answer: &str,
    ) -> Result<Self, DraftError> {
        let draft = Self {
            question_type: QuestionType::Fill,
            text: text.trim().to_string(),
            marks,
            created_by: normalize_author(created_by),
            options: vec![OptionDraft { text: answer.trim().to_string(), is_correct: true }],
        };
        draft.validate()?;
        Ok(draft)
    }

    pub(crate) fn validate(&self) -> Result<(), DraftError> {
        if self.text.is_empty() {
            return Err(DraftError::EmptyText);
        }
        if self.marks < 0 {
            return Err(DraftError::NegativeMarks);
        }

        match self.question_type {
            QuestionType::Fill => {
                if self.options.len() != 1 || self.options[0].text.is_empty() {
                    return Err(DraftError::MissingAnswer);
                }
            }
            QuestionType::Choose | QuestionType::Multi => {
                if self.options.is_empty() {
                    return Err(DraftError::NoOptions(self.question_type));
                }
                if let Some(index) = self.options.iter().position(|option| option.text.is_empty())
                {
                    return Err(DraftError::EmptyOption(index + 1));
                }
                let required = minimum_correct(self.question_type);
                let found = self.options.iter().filter(|option| option.is_correct).count();
                if found < required {
                    return Err(DraftError::TooFewCorrect {
                        question_type: self.question_type,
                        required,
                        found,
                    });
                }
            }
        }

        Ok(())
    }
}

pub(crate) fn minimum_correct(question_type: QuestionType) -> usize {
    match question_type {
        QuestionType::Fill | QuestionType::Choose => 1,
        QuestionType::Multi => 2,
    }
}

fn normalize_author(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        DEFAULT_AUTHOR.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Inserts the drafts, their options and one category mapping each inside a
/// single transaction. Returns the new question ids in input order.
pub(crate) async fn persist_drafts(
    pool: &PgPool,
    category_id: i64,
    drafts: &[QuestionDraft],
    source: &'static str,
) -> Result<Vec<i64>, sqlx::Error> {
    let now = primitive_now_utc();
    let mut tx = pool.begin().await?;
    let mut question_ids = Vec::with_capacity(drafts.len());

    for draft in drafts {
        let question = repositories::questions::create(
            &mut *tx,
            repositories::questions::CreateQuestion {
                question_type: draft.question_type,
                question_text: &draft.text,
                marks: draft.marks,
                created_by: &draft.created_by,
                now,
            },
        )
        .await?;

        for option in &draft.options {
            repositories::options::create(
                &mut *tx,
                question.question_id,
                &option.text,
                option.is_correct,
            )
            .await?;
        }

        repositories::mappings::create(&mut *tx, question.question_id, category_id).await?;
        question_ids.push(question.question_id);
    }

    tx.commit().await?;

    metrics::record_questions_created(source, question_ids.len());
    tracing::info!(
        category_id,
        source,
        inserted = question_ids.len(),
        "Questions inserted"
    );

    Ok(question_ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn choices_mark_correct_indices() {
        let draft = QuestionDraft::with_choices(
            QuestionType::Choose,
            " Capital of France? ",
            1,
            "",
            options(&["Berlin", "Paris", "Rome"]),
            &[1],
        )
        .unwrap();

        assert_eq!(draft.text, "Capital of France?");
        assert_eq!(draft.created_by, DEFAULT_AUTHOR);
        let flags: Vec<bool> = draft.options.iter().map(|option| option.is_correct).collect();
        assert_eq!(flags, vec![false, true, false]);
    }

    #[test]
    fn multi_requires_two_correct_options() {
        let err = QuestionDraft::with_choices(
            QuestionType::Multi,
            "Pick the primes",
            2,
            "instructor",
            options(&["2", "4", "6"]),
            &[0, 0],
        )
        .unwrap_err();

        assert_eq!(
            err,
            DraftError::TooFewCorrect { question_type: QuestionType::Multi, required: 2, found: 1 }
        );
    }

    #[test]
    fn choose_requires_a_correct_option() {
        let err = QuestionDraft::with_choices(
            QuestionType::Choose,
            "Pick one",
            1,
            "instructor",
            options(&["a", "b"]),
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, DraftError::TooFewCorrect { required: 1, found: 0, .. }));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let err = QuestionDraft::with_choices(
            QuestionType::Choose,
            "Pick one",
            1,
            "instructor",
            options(&["a", "b"]),
            &[2],
        )
        .unwrap_err();
        assert_eq!(err, DraftError::CorrectIndexOutOfRange { index: 2, count: 2 });
    }

    #[test]
    fn choices_without_options_are_rejected() {
        let err = QuestionDraft::with_choices(QuestionType::Choose, "Q", 1, "t", vec![], &[0])
            .unwrap_err();
        assert_eq!(err, DraftError::NoOptions(QuestionType::Choose));
    }

    #[test]
    fn blank_option_is_reported_one_based() {
        let err = QuestionDraft::with_choices(
            QuestionType::Choose,
            "Q",
            1,
            "t",
            options(&["a", "  "]),
            &[0],
        )
        .unwrap_err();
        assert_eq!(err, DraftError::EmptyOption(2));
    }

    #[test]
    fn fill_stores_answer_as_single_correct_option() {
        let draft = QuestionDraft::with_answer("Explain ownership", 5, "t", " moves ").unwrap();
        assert_eq!(draft.question_type, QuestionType::Fill);
        assert_eq!(
            draft.options,
            vec![OptionDraft { text: "moves".to_string(), is_correct: true }]
        );
    }

    #[test]
    fn fill_without_answer_is_rejected() {
        assert_eq!(
            QuestionDraft::with_answer("Explain", 5, "t", "").unwrap_err(),
            DraftError::MissingAnswer
        );
        assert_eq!(
            QuestionDraft::with_answer(" ", 5, "t", "x").unwrap_err(),
            DraftError::EmptyText
        );
        assert_eq!(
            QuestionDraft::with_answer("Q", -1, "t", "x").unwrap_err(),
            DraftError::NegativeMarks
        );
    }
}
