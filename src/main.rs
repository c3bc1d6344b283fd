use anyhow::Result;
use clap::Parser;
use folder_upload::cli::{run, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    tracing::debug!(?cli, "CLI arguments parsed, invoking run");
    let result = run(cli).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "Upload failed");
    }
    result
}
