// Seed the default site pages into the configured document store

use tracing::info;
use tracing_subscriber::EnvFilter;

use content_hub::{
    config::Config, data_seeder::seed_pages, infrastructure::open_document_store,
    pages::PageRepository,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    info!("Seeding pages into {}", config.database.url);

    let store = open_document_store(&config.database.url).await?;
    let report = seed_pages(&PageRepository::new(store)).await;

    println!(
        "created: {}, skipped: {}, failed: {}",
        report.created.len(),
        report.skipped.len(),
        report.failed.len()
    );
    if !report.failed.is_empty() {
        anyhow::bail!("failed to seed: {}", report.failed.join(", "));
    }
    Ok(())
}
