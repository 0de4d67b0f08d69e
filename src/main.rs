use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::*;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use docquery_core::{EmbeddingProvider, LLMProvider};
use docquery_openai::{OpenAIClient, load_env_vars};
use docquery_rag::{
    DEFAULT_DATA_DIR, DEFAULT_PERSIST_DIR, DEFAULT_SIMILARITY_CUTOFF, DEFAULT_SIMILARITY_TOP_K,
    HashEmbedding, IndexOptions, RetrieverQueryEngine, SimilarityPostprocessor, StalenessPolicy,
    VectorIndexRetriever, get_index,
};
use docquery_web::{AppState, serve};

/// Where document and query embeddings come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EmbeddingBackend {
    /// OpenAI embeddings API (needs OPENAI_API_KEY)
    Openai,
    /// Offline hashed bag-of-words vectors
    Hash,
}

#[derive(Parser, Debug)]
#[command(name = "docquery")]
#[command(about = "Ask questions about a directory of documents", long_about = None)]
struct Cli {
    /// Directory holding the source documents
    #[arg(long, env = "DOCQUERY_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Directory where the index is persisted
    #[arg(long, env = "DOCQUERY_PERSIST_DIR", default_value = DEFAULT_PERSIST_DIR)]
    persist_dir: PathBuf,

    /// Address to serve the web page on
    #[arg(long, env = "DOCQUERY_BIND", default_value = "127.0.0.1:8501")]
    bind: SocketAddr,

    /// Number of nodes retrieved per query
    #[arg(long, default_value_t = DEFAULT_SIMILARITY_TOP_K)]
    top_k: usize,

    /// Minimum similarity for a retrieved node to be used
    #[arg(long, default_value_t = DEFAULT_SIMILARITY_CUTOFF)]
    similarity_cutoff: f32,

    /// What to do with an existing index: trust, verify or rebuild
    #[arg(long, default_value = "trust")]
    staleness: StalenessPolicy,

    /// Embedding backend
    #[arg(long, value_enum, default_value_t = EmbeddingBackend::Openai)]
    embedding: EmbeddingBackend,

    /// Also read documents in subdirectories
    #[arg(short, long)]
    recursive: bool,
}

impl Cli {
    fn index_options(&self) -> IndexOptions {
        IndexOptions {
            data_dir: self.data_dir.clone(),
            recursive: self.recursive,
            policy: self.staleness,
            ..Default::default()
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Build the query engine: load or build the index, then wire retriever and cutoff
async fn build_engine(
    cli: &Cli,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LLMProvider>,
) -> Result<RetrieverQueryEngine> {
    let index = get_index(&cli.persist_dir, embedder, &cli.index_options())
        .await
        .with_context(|| format!("failed to prepare index in {}", cli.persist_dir.display()))?;

    let retriever = VectorIndexRetriever::new(Arc::new(index), cli.top_k);
    Ok(RetrieverQueryEngine::new(retriever, llm)
        .with_postprocessor(SimilarityPostprocessor::new(cli.similarity_cutoff)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    load_env_vars();
    let cli = Cli::parse();

    let openai = Arc::new(OpenAIClient::from_env()?);
    let embedder: Arc<dyn EmbeddingProvider> = match cli.embedding {
        EmbeddingBackend::Openai => openai.clone() as Arc<dyn EmbeddingProvider>,
        EmbeddingBackend::Hash => Arc::new(HashEmbedding::new()),
    };

    let engine = build_engine(&cli, embedder, openai).await?;

    let listener = tokio::net::TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("failed to bind {}", cli.bind))?;

    println!();
    println!("{}", "Document Query Interface".blue().bold());
    println!("{} http://{}", "→".green(), listener.local_addr()?);
    println!("{}", "Press Ctrl-C to stop".dimmed());
    println!();

    serve(listener, AppState::new(Arc::new(engine)), shutdown_signal()).await?;

    println!("{}", "Goodbye!".green());
    Ok(())
}
