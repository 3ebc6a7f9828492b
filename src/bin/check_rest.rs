// Connectivity probe: fetch the `home` page over the public REST API

use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use content_hub::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let base = Config::probe_base_url();
    let url = format!("{}/api/v1/pages/home", base.trim_end_matches('/'));
    println!("Checking connectivity to: {}", url);
    debug!("Probe base URL {}", base);

    let response = match reqwest::get(&url).await {
        Ok(response) => response,
        Err(e) => {
            error!("Request to {} failed: {}", url, e);
            eprintln!("Error: {}", e);
            return Err(e.into());
        }
    };

    println!("statusCode: {}", response.status().as_u16());
    println!("headers:");
    for (name, value) in response.headers() {
        println!("  {}: {}", name, value.to_str().unwrap_or("<binary>"));
    }

    let body = response.text().await?;
    println!("Body: {}", body);
    Ok(())
}
