//! Splits cleaned document text into ordered, size-bounded chunks.
//!
//! Three strategies are available: `Fixed` packs blank-line separated
//! segments up to a character budget with a trailing overlap, `Sentence`
//! packs sentences with a one-sentence overlap, and `Paragraph` emits every
//! paragraph as its own chunk. Options are validated once in
//! [`Chunker::new`]; chunking itself never fails.

mod clean;
mod fixed;
mod paragraph;
mod sentence;
mod span;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::types::{chunk_id, Chunk, Document, Tags};

pub use clean::clean_text;

use span::{CharOffsets, Span};

pub const DEFAULT_PARAGRAPH_SEPARATOR: &str = r"\n\s*\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ChunkStrategy {
    #[default]
    Fixed,
    Sentence,
    Paragraph,
}

impl ChunkStrategy {
    pub const ALL: [ChunkStrategy; 3] = [ChunkStrategy::Fixed, ChunkStrategy::Sentence, ChunkStrategy::Paragraph];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkStrategy::Fixed => "fixed",
            ChunkStrategy::Sentence => "sentence",
            ChunkStrategy::Paragraph => "paragraph",
        }
    }

    fn valid_names() -> String {
        Self::ALL.iter().map(ChunkStrategy::as_str).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for ChunkStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChunkStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::UnknownStrategy { given: s.to_string(), valid: Self::valid_names() })
    }
}

impl TryFrom<String> for ChunkStrategy {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Sizes are measured in characters of the cleaned text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingOptions {
    pub strategy: ChunkStrategy,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Regular expression marking paragraph boundaries.
    pub paragraph_separator: String,
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        Self {
            strategy: ChunkStrategy::Fixed,
            chunk_size: 1000,
            chunk_overlap: 200,
            paragraph_separator: DEFAULT_PARAGRAPH_SEPARATOR.to_string(),
        }
    }
}

impl ChunkingOptions {
    pub fn with_strategy(mut self, strategy: ChunkStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_size(mut self, chunk_size: usize, chunk_overlap: usize) -> Self {
        self.chunk_size = chunk_size;
        self.chunk_overlap = chunk_overlap;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.compile_separator().map(|_| ())
    }

    fn compile_separator(&self) -> Result<Regex> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk_size must be greater than zero".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        let separator = Regex::new(&self.paragraph_separator)
            .map_err(|e| Error::InvalidConfig(format!("paragraph_separator: {}", e)))?;
        if separator.is_match("") {
            return Err(Error::InvalidConfig("paragraph_separator must not match the empty string".to_string()));
        }
        Ok(separator)
    }
}

#[derive(Debug, Clone)]
pub struct Chunker {
    options: ChunkingOptions,
    separator: Regex,
}

impl Chunker {
    pub fn new(options: ChunkingOptions) -> Result<Self> {
        let separator = options.compile_separator()?;
        Ok(Self { options, separator })
    }

    pub fn options(&self) -> &ChunkingOptions {
        &self.options
    }

    pub fn chunk(&self, document: &Document) -> Vec<Chunk> {
        self.chunk_text(&document.id, &document.tags, &document.text)
    }

    /// Chunks `raw` on behalf of `document_id`. Blank input yields no chunks.
    pub fn chunk_text(&self, document_id: &str, tags: &Tags, raw: &str) -> Vec<Chunk> {
        let cleaned = clean_text(raw);
        if cleaned.is_empty() {
            tracing::debug!(document_id, "document is blank after cleaning");
            return Vec::new();
        }
        let spans = match self.options.strategy {
            ChunkStrategy::Fixed => fixed::split(&cleaned, &self.separator, self.options.chunk_size, self.options.chunk_overlap),
            ChunkStrategy::Sentence => sentence::split(&cleaned, self.options.chunk_size),
            ChunkStrategy::Paragraph => paragraph::split(&cleaned, &self.separator),
        };
        let chunks = into_chunks(document_id, tags, &cleaned, &spans);
        tracing::debug!(document_id, strategy = %self.options.strategy, chunks = chunks.len(), "chunked document");
        chunks
    }
}

fn into_chunks(document_id: &str, tags: &Tags, cleaned: &str, spans: &[Span]) -> Vec<Chunk> {
    let offsets = CharOffsets::new(cleaned);
    spans
        .iter()
        .filter_map(|span| span::trimmed(cleaned, span.start, span.end))
        .enumerate()
        .map(|(index, span)| Chunk {
            id: chunk_id(document_id, index),
            document_id: document_id.to_string(),
            index,
            content: span.text(cleaned).to_string(),
            start_offset: offsets.of(span.start),
            end_offset: offsets.of(span.end),
            tags: tags.clone(),
            embedding: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_parses_case_insensitively() {
        assert_eq!("Sentence".parse::<ChunkStrategy>().unwrap(), ChunkStrategy::Sentence);
        assert_eq!(" paragraph ".parse::<ChunkStrategy>().unwrap(), ChunkStrategy::Paragraph);
    }

    #[test]
    fn unknown_strategy_lists_valid_names() {
        let err = "semantic".parse::<ChunkStrategy>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("semantic"));
        assert!(msg.contains("fixed, sentence, paragraph"), "{msg}");
    }

    #[test]
    fn overlap_must_be_smaller_than_size() {
        let options = ChunkingOptions::default().with_size(100, 100);
        assert!(matches!(Chunker::new(options), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn separator_matching_empty_is_rejected() {
        let options = ChunkingOptions { paragraph_separator: r"\n*".to_string(), ..Default::default() };
        assert!(Chunker::new(options).is_err());
    }

    #[test]
    fn offsets_are_character_based() {
        let chunker = Chunker::new(ChunkingOptions::default().with_strategy(ChunkStrategy::Paragraph)).unwrap();
        let chunks = chunker.chunk_text("d", &Tags::new(), "über alles\n\nzweiter");
        assert_eq!(chunks[1].start_offset, 12);
        assert_eq!(chunks[1].end_offset, 19);
        assert_eq!(chunks[1].id, "d:1");
    }
}
