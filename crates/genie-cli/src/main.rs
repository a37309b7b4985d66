mod alerts;
mod catalog;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "genie-cli")]
#[command(about = "Genie storefront command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Inspect and validate the product catalog
    Catalog {
        #[command(subcommand)]
        command: catalog::CatalogCommands,
    },
    /// Manage price-drop alerts
    Alerts {
        #[command(subcommand)]
        command: alerts::AlertsCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Catalog { command } => catalog::run(command),
        Commands::Alerts { command } => alerts::run(command).await,
    }
}
