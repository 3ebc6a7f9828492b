// Print the stored seed pages and the slug lookup for `home`

use serde_json::Value;
use tracing_subscriber::EnvFilter;

use content_hub::{
    config::Config,
    data_seeder::check_pages,
    infrastructure::open_document_store,
    models::StoredDocument,
    pages::PageRepository,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let config = Config::from_env()?;
    println!("Using store: {}", config.database.url);

    let store = open_document_store(&config.database.url).await?;
    let repository = PageRepository::new(store);

    for (id, dump) in check_pages(&repository).await? {
        match dump {
            Some(json) => {
                println!("--- {} ---", id);
                println!("{}", json);
            }
            None => println!("--- {} NOT FOUND ---", id),
        }
    }

    println!("\n--- Checking Query slug: home ---");
    let matches = repository.find_by_slug("home").await?;
    if matches.is_empty() {
        println!("NOT FOUND BY SLUG query");
    }
    for page in matches {
        let id = page.id.clone().unwrap_or_default();
        let fields = serde_json::to_string_pretty(&Value::Object(page.to_fields()?))?;
        println!("FOUND BY SLUG query (ID: {}): {}", id, fields);
    }

    Ok(())
}
