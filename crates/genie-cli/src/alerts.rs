//! Price-alert maintenance commands.

use std::path::PathBuf;

use clap::Subcommand;

use genie_core::load_catalog;

#[derive(Debug, Subcommand)]
pub enum AlertsCommands {
    /// Run one price-alert sweep against the configured database
    Sweep {
        /// Path to the catalog YAML file
        #[arg(long, default_value = "config/catalog.yaml")]
        path: PathBuf,
    },
}

pub async fn run(command: AlertsCommands) -> anyhow::Result<()> {
    match command {
        AlertsCommands::Sweep { path } => sweep(&path).await,
    }
}

/// One-shot version of the sweep the server schedules hourly. Useful
/// after editing the catalog file by hand.
async fn sweep(path: &std::path::Path) -> anyhow::Result<()> {
    let catalog = load_catalog(path)?;

    let pool = genie_db::connect_pool_from_env().await?;
    genie_db::run_migrations(&pool).await?;

    let outcome = genie_db::sweep_price_alerts(&pool, &catalog.products).await?;
    tracing::info!(
        refreshed = outcome.refreshed,
        newly_triggered = outcome.newly_triggered,
        "price-alert sweep complete"
    );
    println!(
        "sweep complete: {} alerts refreshed, {} newly triggered",
        outcome.refreshed, outcome.newly_triggered
    );
    Ok(())
}
