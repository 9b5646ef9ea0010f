use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use gridlens::column_filter::ColumnFilter;
use gridlens::llm::{ColumnResolver, LlmClient};
use gridlens::query_state::GENERIC_FAILURE;
use gridlens::records::RecordStore;
use gridlens::tui;

#[derive(Parser)]
#[command(name = "gridlens")]
#[command(about = "Ask in plain language which column of the record table to show")]
struct Args {
    /// Natural-language search query; omit to launch the interactive viewer
    query: Option<String>,

    /// Anthropic API key (or set ANTHROPIC_API_KEY env var)
    #[arg(long)]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let store = RecordStore::seed();

    // The credential is checked at call time, not here: launching without a
    // key still shows the table, and the first search surfaces the error.
    let api_key = args
        .api_key
        .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
        .unwrap_or_default();
    let resolver: Arc<dyn ColumnResolver + Send + Sync> =
        Arc::new(LlmClient::new(api_key, store.queryable_field_names()));

    match args.query {
        Some(query) => run_once(&store, resolver.as_ref(), &query).await,
        None => {
            tui::run(store, resolver).await?;
            Ok(())
        }
    }
}

/// Resolve a single query and print the filtered table to stdout. Resolver
/// failure prints the generic message and the table with columns unchanged
/// from their initial state, matching the interactive error policy.
async fn run_once(
    store: &RecordStore,
    resolver: &(dyn ColumnResolver + Send + Sync),
    query: &str,
) -> Result<()> {
    info!("Resolving query: {}", query);

    let filter = match resolver.resolve_column(query).await {
        Ok(token) => ColumnFilter::from_token(&token),
        Err(e) => {
            error!("Column resolution failed: {}", e);
            eprintln!("{}", GENERIC_FAILURE);
            ColumnFilter::none()
        }
    };

    tui::print_plain(store, &filter)?;
    Ok(())
}
