mod cli;

use clap::Parser;
use cli::{Cli, Command};
use clipweave::simulate;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = cli.settings.resolve().unwrap_or_else(|e| {
        tracing::error!(error = %e, "invalid configuration");
        eprintln!("clipweave: {e}");
        std::process::exit(1);
    });

    let result = match cli.command {
        Command::Transplant {
            source,
            range,
            target,
            at,
        } => simulate::transplant(config, &source, range, &target, at).await,
        Command::PasteUris { target, at, uris } => {
            simulate::paste_uris(config, &target, at, &uris).await
        }
    };

    match result {
        Ok(text) => print!("{text}"),
        Err(e) => {
            tracing::error!(error = %e, "session failed");
            eprintln!("clipweave: {e}");
            std::process::exit(1);
        }
    }
}
