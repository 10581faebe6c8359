use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{GeneratedQuestions, ParseEnumError};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ParseEnumError {
                kind: "difficulty",
                value: value.to_string(),
            }),
        }
    }
}

/// Requested number of questions per type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionConfig {
    #[serde(default)]
    pub mcq: u32,
    #[serde(default)]
    pub fill_blanks: u32,
    #[serde(default)]
    pub short: u32,
    #[serde(default)]
    pub long: u32,
}

impl QuestionConfig {
    pub fn new(mcq: u32, fill_blanks: u32, short: u32, long: u32) -> Self {
        Self {
            mcq,
            fill_blanks,
            short,
            long,
        }
    }

    pub fn total(&self) -> u32 {
        self.mcq + self.fill_blanks + self.short + self.long
    }
}

/// Durable lifecycle of a paper.
///
/// `Pending` and `Processing` mean a generation job is active and no new
/// generation may start.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperStatus {
    #[default]
    Draft,
    Pending,
    Processing,
    Generated,
    Failed,
}

impl PaperStatus {
    pub const GENERATION_READY: [PaperStatus; 3] =
        [PaperStatus::Draft, PaperStatus::Generated, PaperStatus::Failed];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaperStatus::Draft => "draft",
            PaperStatus::Pending => "pending",
            PaperStatus::Processing => "processing",
            PaperStatus::Generated => "generated",
            PaperStatus::Failed => "failed",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, PaperStatus::Pending | PaperStatus::Processing)
    }
}

impl fmt::Display for PaperStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaperStatus {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "draft" => Ok(PaperStatus::Draft),
            "pending" => Ok(PaperStatus::Pending),
            "processing" => Ok(PaperStatus::Processing),
            "generated" | "completed" => Ok(PaperStatus::Generated),
            "failed" => Ok(PaperStatus::Failed),
            other => Err(ParseEnumError {
                kind: "paper status",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    pub id: String,
    pub faculty_id: String,
    pub subject_id: String,
    pub title: String,
    pub units: Vec<u32>,
    pub difficulty: Difficulty,
    pub custom_instructions: Option<String>,
    pub question_config: QuestionConfig,
    pub status: PaperStatus,
    #[serde(default)]
    pub questions: GeneratedQuestions,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Paper {
    pub fn draft(
        faculty_id: impl Into<String>,
        subject_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            faculty_id: faculty_id.into(),
            subject_id: subject_id.into(),
            title: title.into(),
            units: Vec::new(),
            difficulty: Difficulty::default(),
            custom_instructions: None,
            question_config: QuestionConfig::default(),
            status: PaperStatus::Draft,
            questions: GeneratedQuestions::default(),
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_units(mut self, units: Vec<u32>) -> Self {
        self.units = units;
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_question_config(mut self, config: QuestionConfig) -> Self {
        self.question_config = config;
        self
    }

    pub fn with_custom_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.custom_instructions = Some(instructions.into());
        self
    }
}

/// Atomic replacement of a paper's generation state.
#[derive(Clone, Debug, PartialEq)]
pub struct PaperUpdate {
    pub status: PaperStatus,
    pub questions: Option<GeneratedQuestions>,
    pub error: Option<String>,
}

impl PaperUpdate {
    pub fn status(status: PaperStatus) -> Self {
        Self {
            status,
            questions: None,
            error: None,
        }
    }

    pub fn generated(questions: GeneratedQuestions) -> Self {
        Self {
            status: PaperStatus::Generated,
            questions: Some(questions),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: PaperStatus::Failed,
            questions: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Subject {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            code: code.into(),
            description: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
