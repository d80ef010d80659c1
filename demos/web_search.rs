use dotenv::dotenv;
use llm_gateway::{SearchQuery, WebSearch};
use tracing_subscriber::{EnvFilter, fmt};

/// Usage: `SEARCH_PROVIDER=kagi cargo run --example web-search -- "<query>"`
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let text = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "What is new in the Rust 2024 edition?".to_string());

    let search = WebSearch::from_env()?;
    let result = search
        .search_and_save(&SearchQuery::new(text).with_limit(5), "search_results")
        .await?;

    println!("[{}] {}\n", result.provider, result.answer);
    for citation in &result.citations {
        println!("{} {} - {}", citation.reference, citation.title, citation.url);
    }
    if let Some(path) = result.extras.get("result_file") {
        println!("\nSaved to {path}");
    }

    Ok(())
}
