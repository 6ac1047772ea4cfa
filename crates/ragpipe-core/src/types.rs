//! Domain types shared by the chunker, the rankers and the retriever.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub type ChunkId = String;
pub type DocumentId = String;
pub type Tags = BTreeSet<String>;

/// A source document handed to the chunker.
///
/// `tags` are inherited by every chunk cut from the document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    pub id: DocumentId,
    pub filename: String,
    pub tags: Tags,
    pub text: String,
}

impl Document {
    pub fn new(id: impl Into<String>, filename: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), filename: filename.into(), tags: Tags::new(), text: text.into() }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// A bounded, contiguous span of a document's cleaned text.
///
/// - `id`: `"{document_id}:{index}"`, stable across re-chunking of identical input
/// - `index`: zero-based, contiguous per document
/// - `start_offset`/`end_offset`: character offsets into the cleaned text;
///   `content` is exactly that slice
/// - `embedding`: filled in after creation by the embedding collaborator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    pub id: ChunkId,
    pub document_id: DocumentId,
    pub index: usize,
    pub content: String,
    pub start_offset: usize,
    pub end_offset: usize,
    pub tags: Tags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

pub fn chunk_id(document_id: &str, index: usize) -> ChunkId {
    format!("{}:{}", document_id, index)
}

/// Indicates which retrieval method produced a candidate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SourceKind {
    Vector,
    Text,
    /// Seen in more than one source list during fusion.
    Hybrid,
}

/// A chunk plus a per-query relevance score from one retrieval method.
///
/// `score` is cosine similarity for vector hits, an uninterpreted value for
/// text hits (only the rank matters) and the fused score after fusion.
/// Higher is always better.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    pub chunk_id: ChunkId,
    pub document_id: DocumentId,
    pub filename: String,
    pub content: String,
    pub score: f32,
    pub position: usize,
    pub source: SourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

/// Restricts a search to a set of documents and/or tags.
///
/// A chunk passes the tag filter when it carries any of the requested tags.
/// An empty set restricts nothing, same as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    pub documents: Option<BTreeSet<DocumentId>>,
    pub tags: Option<Tags>,
}

impl SearchFilter {
    pub fn documents<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.documents = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn document_set(&self) -> Option<&BTreeSet<DocumentId>> {
        self.documents.as_ref().filter(|d| !d.is_empty())
    }

    pub fn tag_set(&self) -> Option<&Tags> {
        self.tags.as_ref().filter(|t| !t.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.document_set().is_none() && self.tag_set().is_none()
    }

    pub fn matches(&self, document_id: &str, tags: &Tags) -> bool {
        let doc_ok = self.document_set().map_or(true, |d| d.contains(document_id));
        let tag_ok = self.tag_set().map_or(true, |want| want.iter().any(|t| tags.contains(t)));
        doc_ok && tag_ok
    }
}
