use dotenv::dotenv;
use llm_gateway::{ApiKey, Binding, CompletionGateway, CompletionRequest, GatewayConfig};
use tracing_subscriber::{EnvFilter, fmt};

/// Usage: `cargo run --example completion -- <binding> <model> [base_url]`
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let mut args = std::env::args().skip(1);
    let binding = Binding::from(args.next().unwrap_or_else(|| "openai".to_string()).as_str());
    let model = args.next().unwrap_or_else(|| "gpt-4o-mini".to_string());

    let mut request = CompletionRequest::new(model, "Share a fun fact about Rust programming.")
        .with_system_prompt("You are a concise, upbeat assistant.")
        .with_temperature(0.3);
    if let Some(base_url) = args.next() {
        request = request.with_base_url(base_url);
    }
    // Local servers run without a key.
    if let Ok(key) = ApiKey::Default.resolve(&binding) {
        request = request.with_api_key(key);
    }

    let gateway = CompletionGateway::new(GatewayConfig::default())?;
    let reply = gateway.complete(&binding, request).await?;

    println!("Assistant:\n{reply}");

    Ok(())
}
