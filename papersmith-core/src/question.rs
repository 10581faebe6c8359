use std::fmt;

use serde::{Deserialize, Serialize};

use crate::QuestionError;

/// The four generated question types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QuestionKind {
    MultipleChoice,
    FillBlank,
    Short,
    Long,
}

impl QuestionKind {
    pub const ALL: [QuestionKind; 4] = [
        QuestionKind::MultipleChoice,
        QuestionKind::FillBlank,
        QuestionKind::Short,
        QuestionKind::Long,
    ];

    /// Key of this type's list in the generated-questions JSON object.
    pub fn key(&self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice => "mcqs",
            QuestionKind::FillBlank => "fill_blanks",
            QuestionKind::Short => "short",
            QuestionKind::Long => "long",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

pub trait Validate {
    fn validate(&self) -> Result<(), QuestionError>;
}

fn default_objective_marks() -> u32 {
    1
}

fn default_short_marks() -> u32 {
    5
}

fn default_long_marks() -> u32 {
    10
}

fn check_text(question: &str) -> Result<(), QuestionError> {
    if question.trim().is_empty() {
        return Err(QuestionError::EmptyQuestion);
    }
    Ok(())
}

fn check_marks(marks: u32, min: u32, max: u32) -> Result<(), QuestionError> {
    if marks < min || marks > max {
        return Err(QuestionError::MarksOutOfRange {
            min,
            max,
            got: marks,
        });
    }
    Ok(())
}

fn check_unit(unit: Option<u32>) -> Result<(), QuestionError> {
    match unit {
        Some(0) => Err(QuestionError::InvalidUnit),
        _ => Ok(()),
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct McqQuestion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default = "default_objective_marks")]
    pub marks: u32,
    #[serde(default)]
    pub unit: Option<u32>,
}

impl Validate for McqQuestion {
    fn validate(&self) -> Result<(), QuestionError> {
        check_text(&self.question)?;
        if self.options.len() != 4 {
            return Err(QuestionError::OptionCount(self.options.len()));
        }
        if self.correct_answer.trim().is_empty() {
            return Err(QuestionError::EmptyAnswer);
        }
        check_marks(self.marks, 1, u32::MAX)?;
        check_unit(self.unit)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FillBlankQuestion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub question: String,
    pub answer: String,
    #[serde(default = "default_objective_marks")]
    pub marks: u32,
    #[serde(default)]
    pub unit: Option<u32>,
}

impl Validate for FillBlankQuestion {
    fn validate(&self) -> Result<(), QuestionError> {
        check_text(&self.question)?;
        if self.answer.trim().is_empty() {
            return Err(QuestionError::EmptyAnswer);
        }
        check_marks(self.marks, 1, u32::MAX)?;
        check_unit(self.unit)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShortQuestion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub question: String,
    pub expected_points: Vec<String>,
    #[serde(default = "default_short_marks")]
    pub marks: u32,
    #[serde(default)]
    pub unit: Option<u32>,
}

impl Validate for ShortQuestion {
    fn validate(&self) -> Result<(), QuestionError> {
        check_text(&self.question)?;
        check_marks(self.marks, 3, 5)?;
        check_unit(self.unit)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LongQuestion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub question: String,
    pub expected_points: Vec<String>,
    #[serde(default = "default_long_marks")]
    pub marks: u32,
    #[serde(default)]
    pub unit: Option<u32>,
}

impl Validate for LongQuestion {
    fn validate(&self) -> Result<(), QuestionError> {
        check_text(&self.question)?;
        check_marks(self.marks, 10, u32::MAX)?;
        check_unit(self.unit)
    }
}

/// Merged result of one generation job. The JSON shape (`mcqs`,
/// `fill_blanks`, `short`, `long`) is what paper rendering reads.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedQuestions {
    #[serde(default)]
    pub mcqs: Vec<McqQuestion>,
    #[serde(default)]
    pub fill_blanks: Vec<FillBlankQuestion>,
    #[serde(default)]
    pub short: Vec<ShortQuestion>,
    #[serde(default)]
    pub long: Vec<LongQuestion>,
}

impl GeneratedQuestions {
    pub fn total(&self) -> usize {
        self.mcqs.len() + self.fill_blanks.len() + self.short.len() + self.long.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
