//! Turns a directory of `.txt` files into documents and their chunks.
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::chunking::Chunker;
use crate::types::{Chunk, Document, Tags};

/// A document together with the chunks cut from it.
#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    pub document: Document,
    pub chunks: Vec<Chunk>,
}

pub struct DataProcessor {
    chunker: Chunker,
}

impl DataProcessor {
    pub fn new(chunker: Chunker) -> Self {
        Self { chunker }
    }

    pub fn chunker(&self) -> &Chunker {
        &self.chunker
    }

    pub fn process_directory(&self, data_dir: &Path) -> Result<Vec<ProcessedDocument>> {
        self.process_files(data_dir, self.list_txt_files(data_dir))
    }

    pub fn process_directory_limited(&self, data_dir: &Path, limit: usize) -> Result<Vec<ProcessedDocument>> {
        let mut files = self.list_txt_files(data_dir);
        if files.len() > limit {
            files.truncate(limit);
            tracing::info!(limit, "limited to first files");
        }
        self.process_files(data_dir, files)
    }

    /// Builds a [`Document`] for `file_path`; id and tags derive from its
    /// location under `data_dir`.
    pub fn load_document(&self, data_dir: &Path, file_path: &Path) -> Result<Document> {
        let text = read_file_content(file_path)?;
        let relative = file_path.strip_prefix(data_dir).unwrap_or(file_path);
        let filename = file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Document { id: document_id(relative), filename, tags: tags_from_path(relative), text })
    }

    fn process_files(&self, data_dir: &Path, files: Vec<PathBuf>) -> Result<Vec<ProcessedDocument>> {
        if files.is_empty() {
            tracing::warn!(dir = %data_dir.display(), "no .txt files found");
            return Ok(vec![]);
        }
        let mut processed = Vec::with_capacity(files.len());
        for (file_index, file_path) in files.iter().enumerate() {
            tracing::debug!(file = %file_path.display(), n = file_index + 1, total = files.len(), "processing file");
            let document = self.load_document(data_dir, file_path)?;
            let chunks = self.chunker.chunk(&document);
            processed.push(ProcessedDocument { document, chunks });
        }
        let chunk_count: usize = processed.iter().map(|p| p.chunks.len()).sum();
        tracing::info!(files = processed.len(), chunks = chunk_count, "processed directory");
        Ok(processed)
    }

    fn list_txt_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut txt_files: Vec<PathBuf> = walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("txt"))
            .map(|e| e.into_path())
            .collect();
        txt_files.sort();
        txt_files
    }
}

fn read_file_content(file_path: &Path) -> Result<String> {
    let bytes = fs::read(file_path).with_context(|| format!("reading {}", file_path.display()))?;
    Ok(match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

/// Relative path without extension, `/`-separated.
fn document_id(relative: &Path) -> String {
    relative
        .with_extension("")
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Every directory component above the file becomes a tag.
fn tags_from_path(relative: &Path) -> Tags {
    relative
        .parent()
        .map(|parent| parent.components().map(|c| c.as_os_str().to_string_lossy().to_string()).collect())
        .unwrap_or_default()
}
