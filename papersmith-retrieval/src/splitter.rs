//! Recursive character splitting.
//!
//! Text is split on the most specific separator present, pieces that are
//! still too long are split again with the next separator, and the short
//! pieces are merged back into windows of at most `chunk_size` characters
//! that overlap by up to `chunk_overlap` characters. Separators stay attached
//! to the end of the piece they terminate, so concatenating the chunks of a
//! split with no overlap reproduces the input exactly.

use std::collections::VecDeque;

use papersmith_core::{Chunk, ChunkMetadata, SourceDocument};
use thiserror::Error;

/// Paragraph break, line break, sentence boundary, space, then single characters.
pub const DEFAULT_SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", " ", ""];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SplitterConfigError {
    #[error("chunk_size must be greater than zero")]
    ChunkSizeMustBeGreaterThanZero,
}

#[derive(Clone, Debug)]
pub struct RecursiveCharacterTextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct RecursiveCharacterTextSplitterBuilder {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl Default for RecursiveCharacterTextSplitterBuilder {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RecursiveCharacterTextSplitterBuilder {
    pub fn chunk_size(mut self, value: usize) -> Self {
        self.chunk_size = value;
        self
    }

    /// Overlap larger than `chunk_size - 1` is clamped so every window
    /// makes progress.
    pub fn chunk_overlap(mut self, value: usize) -> Self {
        self.chunk_overlap = value;
        self
    }

    pub fn separators<I, S>(mut self, separators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.separators = separators.into_iter().map(Into::into).collect();
        self
    }

    pub fn build(self) -> Result<RecursiveCharacterTextSplitter, SplitterConfigError> {
        if self.chunk_size == 0 {
            return Err(SplitterConfigError::ChunkSizeMustBeGreaterThanZero);
        }
        let mut separators = self.separators;
        // The character-level fallback guarantees termination.
        if separators.last().map_or(true, |last| !last.is_empty()) {
            separators.push(String::new());
        }
        Ok(RecursiveCharacterTextSplitter {
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap.min(self.chunk_size - 1),
            separators,
        })
    }
}

impl RecursiveCharacterTextSplitter {
    pub fn builder() -> RecursiveCharacterTextSplitterBuilder {
        RecursiveCharacterTextSplitterBuilder::default()
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        self.split_recursive(text, &self.separators, &mut chunks);
        chunks
    }

    /// Splits a document's extracted text into chunks that inherit its
    /// subject, unit and file name. Whitespace-only windows are skipped and
    /// indices stay contiguous from zero.
    pub fn split_document(&self, document: &SourceDocument) -> Vec<Chunk> {
        let Some(text) = document.text() else {
            return Vec::new();
        };
        let metadata = ChunkMetadata::from_document(document);
        self.split_text(text)
            .into_iter()
            .filter(|content| !content.trim().is_empty())
            .enumerate()
            .map(|(index, content)| Chunk::new(&document.id, index, content, metadata.clone()))
            .collect()
    }

    fn split_recursive(&self, text: &str, separators: &[String], out: &mut Vec<String>) {
        let (separator, remaining) = pick_separator(text, separators);

        let mut pending: Vec<&str> = Vec::new();
        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                pending.push(piece);
                continue;
            }
            if !pending.is_empty() {
                self.merge_pieces(&pending, out);
                pending.clear();
            }
            if remaining.is_empty() {
                out.push(piece.to_string());
            } else {
                self.split_recursive(piece, remaining, out);
            }
        }
        if !pending.is_empty() {
            self.merge_pieces(&pending, out);
        }
    }

    fn merge_pieces(&self, pieces: &[&str], out: &mut Vec<String>) {
        let mut window: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);
            if total + len > self.chunk_size && !window.is_empty() {
                out.push(window.iter().map(|(text, _)| *text).collect());
                while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0) {
                    match window.pop_front() {
                        Some((_, popped)) => total -= popped,
                        None => break,
                    }
                }
            }
            window.push_back((piece, len));
            total += len;
        }

        if !window.is_empty() {
            out.push(window.iter().map(|(text, _)| *text).collect());
        }
    }
}

fn pick_separator<'a>(text: &str, separators: &'a [String]) -> (&'a str, &'a [String]) {
    for (index, separator) in separators.iter().enumerate() {
        if separator.is_empty() {
            return ("", &[]);
        }
        if text.contains(separator.as_str()) {
            return (separator.as_str(), &separators[index + 1..]);
        }
    }
    ("", &[])
}

fn split_keeping_separator<'t>(text: &'t str, separator: &str) -> Vec<&'t str> {
    if separator.is_empty() {
        text.char_indices()
            .map(|(start, ch)| &text[start..start + ch.len_utf8()])
            .collect()
    } else {
        text.split_inclusive(separator).collect()
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
