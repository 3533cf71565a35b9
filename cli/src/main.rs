use anyhow::Result;
use arthakar_core::{Config, Driver, join_query};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "arthakar")]
#[command(about = "Arthakar - a financial research agent for the terminal", long_about = None)]
struct Cli {
    /// Your financial query. Multiple words are joined with spaces.
    #[arg(required = true, num_args = 1..)]
    query: Vec<String>,

    /// Path to a TOML config file (defaults to ./arthakar.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the maximum number of model calls per run
    #[arg(long)]
    max_iterations: Option<usize>,
}

fn init_logging() {
    // stdout carries the agent transcript; diagnostics go to stderr.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let query = join_query(&cli.query)?;

    let mut config = Config::load(cli.config.as_deref()).map_err(|e| {
        eprintln!("❌ Error: {}", e);
        anyhow::anyhow!("Configuration failed: {}", e)
    })?;
    if let Some(max) = cli.max_iterations {
        config.max_iterations = max;
        config.validate()?;
    }

    let driver = Driver::from_config(&config)?;

    let mut stdout = std::io::stdout();
    if let Err(e) = driver.run(&query, &mut stdout).await {
        eprintln!("❌ Error: {}", e);
        anyhow::bail!("Agent processing failed: {}", e);
    }

    Ok(())
}
