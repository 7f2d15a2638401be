use bookshelf_mcp::config::{ShelfConfig, DEFAULT_LOG_FILTER, LOG_ENV};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdoutはMCPのトランスポートなのでログはstderrへ
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = ShelfConfig::from_env();
    tracing::info!(
        dir = %config.storage_dir.display(),
        key = %config.storage_key,
        "starting bookshelf-mcp"
    );

    bookshelf_mcp::interface::mcp::run(config).await
}
