use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use tantivy::collector::TopDocs;
use tantivy::directory::MmapDirectory;
use tantivy::query::{BooleanQuery, Occur, Query, QueryParser, TermQuery};
use tantivy::schema::{IndexRecordOption, Value};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};

use ragpipe_core::traits::KeywordSearcher;
use ragpipe_core::types::{Candidate, Chunk, Document, SearchFilter, SourceKind};

use crate::tantivy_utils::{build_schema, register_tokenizer, ChunkFields};

const WRITER_HEAP_BYTES: usize = 50_000_000;

/// Chunk-level keyword index.
///
/// Documents are replaced wholesale: every write deletes the document's
/// existing chunks before adding the new ones, then commits and reloads the
/// reader so searches see the change immediately.
pub struct KeywordIndex {
	index: Index,
	reader: IndexReader,
	fields: ChunkFields,
}

impl KeywordIndex {
	pub fn in_memory() -> Result<Self> {
		Self::from_index(Index::create_in_ram(build_schema()))
	}

	/// Recreates `index_dir` from scratch.
	pub fn create_in_dir(index_dir: &Path) -> Result<Self> {
		if index_dir.exists() { std::fs::remove_dir_all(index_dir)?; }
		std::fs::create_dir_all(index_dir)?;
		Self::from_index(Index::create_in_dir(index_dir, build_schema())?)
	}

	pub fn open_or_create(index_dir: &Path) -> Result<Self> {
		std::fs::create_dir_all(index_dir)?;
		let directory = MmapDirectory::open(index_dir)?;
		Self::from_index(Index::open_or_create(directory, build_schema())?)
	}

	fn from_index(index: Index) -> Result<Self> {
		register_tokenizer(&index);
		let fields = ChunkFields::resolve(&index.schema())?;
		let reader = index.reader_builder().reload_policy(ReloadPolicy::Manual).try_into()?;
		Ok(Self { index, reader, fields })
	}

	/// Number of indexed chunks.
	pub fn num_chunks(&self) -> u64 {
		self.reader.searcher().num_docs()
	}

	pub fn replace_document(&self, document: &Document, chunks: &[Chunk]) -> Result<()> {
		self.replace_documents(std::iter::once((document, chunks)))
	}

	/// Replaces several documents in a single commit.
	pub fn replace_documents<'a, I>(&self, batch: I) -> Result<()>
	where
		I: IntoIterator<Item = (&'a Document, &'a [Chunk])>,
	{
		let mut writer: IndexWriter = self.index.writer(WRITER_HEAP_BYTES)?;
		let mut added = 0usize;
		for (document, chunks) in batch {
			writer.delete_term(Term::from_field_text(self.fields.document_id, &document.id));
			for chunk in chunks {
				writer.add_document(self.to_tantivy(document, chunk))?;
				added += 1;
			}
		}
		writer.commit()?;
		self.reader.reload()?;
		tracing::debug!(chunks = added, "keyword index updated");
		Ok(())
	}

	pub fn delete_document(&self, document_id: &str) -> Result<()> {
		let mut writer: IndexWriter = self.index.writer(WRITER_HEAP_BYTES)?;
		writer.delete_term(Term::from_field_text(self.fields.document_id, document_id));
		writer.commit()?;
		self.reader.reload()?;
		Ok(())
	}

	fn to_tantivy(&self, document: &Document, chunk: &Chunk) -> TantivyDocument {
		let mut doc = TantivyDocument::default();
		doc.add_text(self.fields.chunk_id, &chunk.id);
		doc.add_text(self.fields.document_id, &document.id);
		doc.add_text(self.fields.filename, &document.filename);
		doc.add_u64(self.fields.index, chunk.index as u64);
		for tag in &chunk.tags { doc.add_text(self.fields.tag, tag); }
		doc.add_text(self.fields.text, &chunk.content);
		doc
	}

	/// Ranked keyword hits, best first. Malformed query syntax is parsed
	/// leniently instead of failing. The BM25 score is carried along but only
	/// the order is meaningful to callers.
	pub fn search_chunks(&self, query: &str, top_k: usize, filter: &SearchFilter) -> Result<Vec<Candidate>> {
		if top_k == 0 { return Ok(Vec::new()); }
		let parser = QueryParser::for_index(&self.index, vec![self.fields.text]);
		let (text_query, errors) = parser.parse_query_lenient(query);
		if !errors.is_empty() { tracing::debug!(?errors, query, "lenient query parse"); }

		let mut clauses: Vec<(Occur, Box<dyn Query>)> = vec![(Occur::Must, text_query)];
		if let Some(ids) = filter.document_set() {
			clauses.push((Occur::Must, any_term(self.fields.document_id, ids.iter())));
		}
		if let Some(tags) = filter.tag_set() {
			clauses.push((Occur::Must, any_term(self.fields.tag, tags.iter())));
		}
		let query = BooleanQuery::new(clauses);

		let searcher = self.reader.searcher();
		let top_docs = searcher.search(&query, &TopDocs::with_limit(top_k))?;
		let mut hits = Vec::with_capacity(top_docs.len());
		for (position, (score, addr)) in top_docs.into_iter().enumerate() {
			let doc: TantivyDocument = searcher.doc(addr)?;
			let text = |field| doc.get_first(field).and_then(|v| v.as_str()).unwrap_or("").to_string();
			hits.push(Candidate {
				chunk_id: text(self.fields.chunk_id),
				document_id: text(self.fields.document_id),
				filename: text(self.fields.filename),
				content: text(self.fields.text),
				score,
				position,
				source: SourceKind::Text,
				embedding: None,
			});
		}
		Ok(hits)
	}
}

fn any_term<'a>(field: tantivy::schema::Field, values: impl Iterator<Item = &'a String>) -> Box<dyn Query> {
	let alternatives: Vec<(Occur, Box<dyn Query>)> = values
		.map(|v| {
			let term = TermQuery::new(Term::from_field_text(field, v), IndexRecordOption::Basic);
			(Occur::Should, Box::new(term) as Box<dyn Query>)
		})
		.collect();
	Box::new(BooleanQuery::new(alternatives))
}

#[async_trait]
impl KeywordSearcher for KeywordIndex {
	async fn search(&self, query: &str, top_k: usize, filter: &SearchFilter) -> Result<Vec<Candidate>> {
		self.search_chunks(query, top_k, filter)
	}
}
