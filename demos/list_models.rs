use dotenv::dotenv;
use llm_gateway::{ApiKey, Binding, list_models};
use tracing_subscriber::{EnvFilter, fmt};

/// Usage: `cargo run --example list-models -- <binding> [base_url]`
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let mut args = std::env::args().skip(1);
    let binding = Binding::from(args.next().unwrap_or_else(|| "ollama".to_string()).as_str());
    let base_url = args.next().unwrap_or_default();
    let api_key = ApiKey::Default.resolve(&binding).ok();

    let models = list_models(&binding, &base_url, api_key.as_deref()).await;

    if models.is_empty() {
        println!("No models found for {binding}.");
    }
    for model in models {
        println!("{model}");
    }

    Ok(())
}
