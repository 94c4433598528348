use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use search_core::source::load_documents;
use search_core::{paginate, Document, DocumentId, DocumentStatus, RequestQueue, SearchConfig, SearchServer, StopWords};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "search-cli")]
#[command(about = "Index documents in memory and run TF-IDF searches", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the built-in pets example with request history and pagination
    Demo {
        #[arg(long, default_value_t = 2)]
        page_size: usize,
    },
    /// Rank documents from a JSON/JSONL file or directory against a query
    Search {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        query: String,
        /// Only return documents with this status
        #[arg(long, default_value = "ACTUAL")]
        status: DocumentStatus,
        /// Space-separated stop words
        #[arg(long, default_value = "")]
        stop_words: String,
        /// Maximum number of results (0 is treated as 1)
        #[arg(long, default_value_t = 5)]
        max_results: usize,
        #[arg(long, default_value_t = 2)]
        page_size: usize,
        /// Print results as JSON instead of pages
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show which query words a document matches
    Match {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        query: String,
        #[arg(long)]
        id: DocumentId,
        #[arg(long, default_value = "")]
        stop_words: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Demo { page_size } => run_demo(page_size),
        Commands::Search { input, query, status, stop_words, max_results, page_size, json } => {
            let config = SearchConfig::default().with_max_result_count(max_results);
            let server = build_server(&input, &stop_words, config)?;
            let found = server.find_top_documents_by_status(&query, status)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&found)?);
            } else {
                print_pages(&found, page_size);
            }
            Ok(())
        }
        Commands::Match { input, query, id, stop_words } => {
            let server = build_server(&input, &stop_words, SearchConfig::default())?;
            let (words, status) = server.match_document(&query, id)?;
            println!("{{ document_id = {id}, status = {status}, words = [{}] }}", words.join(", "));
            Ok(())
        }
    }
}

fn build_server(input: &Path, stop_words: &str, config: SearchConfig) -> Result<SearchServer> {
    let stop_words = StopWords::from_text(stop_words).context("invalid stop words")?;
    let mut server = SearchServer::with_config(stop_words, config);
    let docs = load_documents(input)?;
    for doc in &docs {
        if let Err(err) = server.add_input_document(doc) {
            tracing::warn!(document_id = doc.id, error = %err, "skipping document");
        }
    }
    tracing::info!(num_docs = server.document_count(), skipped = docs.len() - server.document_count(), "ingested documents");
    Ok(server)
}

fn print_pages(found: &[Document], page_size: usize) {
    for page in &paginate(found, page_size) {
        for doc in page {
            println!("{doc}");
        }
        println!("Page break");
    }
}

fn run_demo(page_size: usize) -> Result<()> {
    let mut server = SearchServer::from_stop_words_text("and in at")?;
    server.add_document(1, "curly cat curly tail", DocumentStatus::Actual, &[7, 2, 7])?;
    server.add_document(2, "curly dog and fancy collar", DocumentStatus::Actual, &[1, 2, 3])?;
    server.add_document(3, "big cat fancy collar ", DocumentStatus::Actual, &[1, 2, 8])?;
    server.add_document(4, "big dog sparrow Eugene", DocumentStatus::Actual, &[1, 3, 2])?;
    server.add_document(5, "big dog sparrow Vasiliy", DocumentStatus::Actual, &[1, 1, 1])?;

    let mut queue = RequestQueue::new(&server);
    // 1439 requests that find nothing
    for _ in 0..1439 {
        queue.add_find_request("empty request")?;
    }
    // still 1439 empty requests in the window
    queue.add_find_request("curly dog")?;
    // the window is full: the oldest empty request drops out, 1438 left
    queue.add_find_request("big collar")?;
    queue.add_find_request("sparrow")?;
    println!("Total empty requests: {}", queue.no_result_requests());

    let found = server.find_top_documents("big dog")?;
    print_pages(&found, page_size);
    Ok(())
}
