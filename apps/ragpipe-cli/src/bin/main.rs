use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use ragpipe_core::config::Config;
use ragpipe_core::data_processor::DataProcessor;
use ragpipe_core::{ChunkStrategy, Chunker, ChunkingOptions, Document, SearchFilter};
use ragpipe_text::KeywordIndex;

#[derive(Parser, Debug)]
#[command(name = "ragpipe", version, about = "Chunk, index and search plain-text corpora")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the chunks of one file as JSON lines
    Chunk {
        path: PathBuf,
        /// fixed, sentence or paragraph
        #[arg(long)]
        strategy: Option<String>,
        #[arg(long)]
        size: Option<usize>,
        #[arg(long)]
        overlap: Option<usize>,
    },
    /// Chunk every .txt file under a directory into the keyword index
    Index {
        /// Defaults to data.raw_txt_dir
        dir: Option<PathBuf>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Keyword search over the index
    Search {
        query: String,
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
        /// Restrict to these document ids
        #[arg(long = "doc")]
        docs: Vec<String>,
        /// Restrict to chunks carrying any of these tags
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load().context("loading configuration")?;
    let base = std::env::current_dir()?;

    match cli.command {
        Command::Chunk { path, strategy, size, overlap } => {
            let mut options = config.settings().chunking.clone();
            if let Some(name) = strategy { options.strategy = name.parse::<ChunkStrategy>()?; }
            if let Some(size) = size { options.chunk_size = size; }
            if let Some(overlap) = overlap { options.chunk_overlap = overlap; }
            chunk_file(&path, options)
        }
        Command::Index { dir, limit } => {
            let data_dir = dir.unwrap_or_else(|| config.settings().data.raw_txt_dir(&base));
            let index_dir = config.settings().data.index_dir(&base);
            index_directory(&data_dir, &index_dir, config.settings().chunking.clone(), limit)
        }
        Command::Search { query, limit, docs, tags } => {
            let index_dir = config.settings().data.index_dir(&base);
            let index = KeywordIndex::open_or_create(&index_dir)?;
            let filter = SearchFilter::default().documents(docs).tags(tags);
            let hits = index.search_chunks(&query, limit, &filter)?;
            if hits.is_empty() { println!("No results for '{}'", query); }
            for hit in hits {
                println!("{:>2}. [{:.3}] {} ({})", hit.position + 1, hit.score, hit.chunk_id, hit.filename);
                println!("    {}", preview(&hit.content, 160));
            }
            Ok(())
        }
    }
}

fn chunk_file(path: &Path, options: ChunkingOptions) -> anyhow::Result<()> {
    let chunker = Chunker::new(options)?;
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let id = path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
    let filename = path.file_name().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
    let document = Document::new(id, filename, String::from_utf8_lossy(&bytes));
    for chunk in chunker.chunk(&document) {
        println!("{}", serde_json::to_string(&chunk)?);
    }
    Ok(())
}

fn index_directory(data_dir: &Path, index_dir: &Path, options: ChunkingOptions, limit: Option<usize>) -> anyhow::Result<()> {
    let processor = DataProcessor::new(Chunker::new(options)?);
    let processed = match limit {
        Some(limit) => processor.process_directory_limited(data_dir, limit)?,
        None => processor.process_directory(data_dir)?,
    };
    let index = KeywordIndex::create_in_dir(index_dir)?;

    let bar = ProgressBar::new(processed.len() as u64);
    bar.set_style(ProgressStyle::with_template("{bar:40} {pos}/{len} documents").unwrap_or_else(|_| ProgressStyle::default_bar()));
    index.replace_documents(processed.iter().inspect(|_| bar.inc(1)).map(|p| (&p.document, p.chunks.as_slice())))?;
    bar.finish_and_clear();

    let chunks: usize = processed.iter().map(|p| p.chunks.len()).sum();
    tracing::info!(documents = processed.len(), chunks, index = %index_dir.display(), "index built");
    println!("Indexed {} documents ({} chunks) into {}", processed.len(), chunks, index_dir.display());
    Ok(())
}

fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() <= max_chars { return flat; }
    let cut: String = flat.chars().take(max_chars).collect();
    format!("{}...", cut)
}
