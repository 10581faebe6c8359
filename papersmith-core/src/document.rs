use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ParseEnumError;

/// OCR lifecycle of an uploaded document.
///
/// `None` means extraction was never attempted. Only `None` and `Failed`
/// accept a new processing request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrStatus {
    #[default]
    None,
    Processing,
    Completed,
    Failed,
}

impl OcrStatus {
    pub const SUBMITTABLE: [OcrStatus; 2] = [OcrStatus::None, OcrStatus::Failed];

    pub fn as_str(&self) -> &'static str {
        match self {
            OcrStatus::None => "none",
            OcrStatus::Processing => "processing",
            OcrStatus::Completed => "completed",
            OcrStatus::Failed => "failed",
        }
    }

    pub fn accepts_submission(&self) -> bool {
        Self::SUBMITTABLE.contains(self)
    }
}

impl fmt::Display for OcrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OcrStatus {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "none" | "" => Ok(OcrStatus::None),
            "processing" => Ok(OcrStatus::Processing),
            "completed" => Ok(OcrStatus::Completed),
            "failed" => Ok(OcrStatus::Failed),
            other => Err(ParseEnumError {
                kind: "ocr status",
                value: other.to_string(),
            }),
        }
    }
}

/// Reference material uploaded by a faculty member for one subject unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub id: String,
    pub faculty_id: String,
    pub subject_id: String,
    pub unit_number: u32,
    pub file_name: Option<String>,
    pub file_path: Option<String>,
    pub file_type: Option<String>,
    pub extracted_text: Option<String>,
    pub ocr_status: OcrStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SourceDocument {
    pub fn new(
        faculty_id: impl Into<String>,
        subject_id: impl Into<String>,
        unit_number: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            faculty_id: faculty_id.into(),
            subject_id: subject_id.into(),
            unit_number,
            file_name: None,
            file_path: None,
            file_type: None,
            extracted_text: None,
            ocr_status: OcrStatus::None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_file(
        mut self,
        file_path: impl Into<String>,
        file_name: impl Into<String>,
        file_type: impl Into<String>,
    ) -> Self {
        self.file_path = Some(file_path.into());
        self.file_name = Some(file_name.into());
        self.file_type = Some(file_type.into());
        self
    }

    pub fn with_extracted_text(mut self, text: impl Into<String>) -> Self {
        self.extracted_text = Some(text.into());
        self
    }

    /// Extracted text, if present and not blank.
    pub fn text(&self) -> Option<&str> {
        self.extracted_text
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub subject_id: String,
    pub unit_number: u32,
    pub file_name: Option<String>,
}

impl ChunkMetadata {
    pub fn from_document(document: &SourceDocument) -> Self {
        Self {
            subject_id: document.subject_id.clone(),
            unit_number: document.unit_number,
            file_name: document.file_name.clone(),
        }
    }
}

/// An indexed segment of a document's text.
///
/// `chunk_index` values for one document are contiguous from zero in
/// splitter order. Chunks are never mutated; re-indexing replaces the set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub document_id: String,
    pub chunk_index: usize,
    pub content: String,
    pub metadata: ChunkMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Chunk {
    pub fn new(
        document_id: impl Into<String>,
        chunk_index: usize,
        content: impl Into<String>,
        metadata: ChunkMetadata,
    ) -> Self {
        let document_id = document_id.into();
        Self {
            id: Self::chunk_id(&document_id, chunk_index),
            document_id,
            chunk_index,
            content: content.into(),
            metadata,
            embedding: None,
        }
    }

    pub fn chunk_id(document_id: &str, chunk_index: usize) -> String {
        format!("{document_id}:{chunk_index}")
    }
}
