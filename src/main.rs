//! appstat - Compute app analytics from exported CSV snapshots

use appstat::{cli::Cli, commands, error::Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise quiet unless --verbose
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            tracing_subscriber::EnvFilter::new("appstat=info")
        } else {
            tracing_subscriber::EnvFilter::new("appstat=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let show_progress = !cli.json && is_terminal::is_terminal(std::io::stdout());
    let output = commands::run(&cli, show_progress).await?;
    println!("{output}");

    Ok(())
}
