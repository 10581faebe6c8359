use serde::{Deserialize, Serialize};

use crate::Chunk;

/// Equality-style predicates over chunk metadata.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum ChunkFilter {
    Subject(String),
    Units(Vec<u32>),
    Document(String),
    All(Vec<ChunkFilter>),
}

impl ChunkFilter {
    /// Filter for a subject and, when `units` is non-empty, those units.
    pub fn scope(subject_id: Option<&str>, units: &[u32]) -> Option<Self> {
        let mut filters = Vec::new();
        if let Some(subject_id) = subject_id {
            filters.push(ChunkFilter::Subject(subject_id.to_string()));
        }
        if !units.is_empty() {
            filters.push(ChunkFilter::Units(units.to_vec()));
        }
        match filters.len() {
            0 => None,
            1 => filters.pop(),
            _ => Some(ChunkFilter::All(filters)),
        }
    }

    pub fn matches(&self, chunk: &Chunk) -> bool {
        match self {
            ChunkFilter::Subject(subject_id) => &chunk.metadata.subject_id == subject_id,
            ChunkFilter::Units(units) => units.contains(&chunk.metadata.unit_number),
            ChunkFilter::Document(document_id) => &chunk.document_id == document_id,
            ChunkFilter::All(filters) => filters.iter().all(|filter| filter.matches(chunk)),
        }
    }

    /// Subject constraint that every match must satisfy, for backends that
    /// can push it down into their query.
    pub fn required_subject(&self) -> Option<&str> {
        match self {
            ChunkFilter::Subject(subject_id) => Some(subject_id),
            ChunkFilter::All(filters) => filters.iter().find_map(ChunkFilter::required_subject),
            _ => None,
        }
    }
}
