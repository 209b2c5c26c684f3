use anyhow::Result;
use clap::Parser;
use contentful_audit::cli::{run, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // CONTENTFUL_* tokens usually live in .env next to the working directory.
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let outcome = run(cli).await;
    if let Err(e) = &outcome {
        tracing::error!(error = %e, "Audit aborted");
    } else {
        tracing::info!("Audit finished");
    }
    outcome
}
