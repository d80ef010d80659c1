use std::time::Duration;

use llm_gateway::{Binding, HttpClientConfig, ModelDiscovery};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

fn discovery() -> ModelDiscovery {
    ModelDiscovery::new(HttpClientConfig::default().with_timeout(Duration::from_secs(5)))
        .expect("discovery client")
}

#[tokio::test]
async fn local_ollama_lists_tags() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [
                {"name": "llama3.2:latest", "size": 2019393189u64},
                {"name": "llama3.1:8b"},
                {"name": "qwen2.5-coder"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let models = discovery()
        .list_models(&Binding::Ollama, &format!("{}/v1", server.uri()), None)
        .await;

    assert!(models.iter().any(|model| model.contains("llama")));
    assert_eq!(models.len(), 3);
}

#[tokio::test]
async fn openai_style_listing_sends_bearer_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [{"id": "gpt-4o"}, {"id": "gpt-4o-mini"}]
        })))
        .mount(&server)
        .await;

    let models = discovery()
        .list_models(&Binding::OpenAI, &format!("{}/v1/", server.uri()), Some("sk-test"))
        .await;

    assert_eq!(models, vec!["gpt-4o", "gpt-4o-mini"]);
}

#[tokio::test]
async fn anthropic_listing_uses_its_own_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .and(header("x-api-key", "sk-ant"))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "claude-sonnet-4-0", "type": "model"}]
        })))
        .mount(&server)
        .await;

    let models = discovery()
        .list_models(&Binding::Anthropic, &format!("{}/v1", server.uri()), Some("sk-ant"))
        .await;

    assert_eq!(models, vec!["claude-sonnet-4-0"]);
}

#[tokio::test]
async fn local_server_without_tags_falls_through_to_models() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": ["phi3", "mistral"]})))
        .expect(1)
        .mount(&server)
        .await;

    let models = discovery()
        .list_models(&Binding::Ollama, &format!("{}/v1", server.uri()), None)
        .await;

    assert_eq!(models, vec!["phi3", "mistral"]);
}

#[tokio::test]
async fn cloud_host_falls_back_to_tags_when_models_is_empty() {
    let server = MockServer::start().await;
    // Any URL containing the cloud domain takes the cloud path.
    Mock::given(method("GET"))
        .and(path("/ollama.com/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ollama.com/api/tags"))
        .and(header("authorization", "Bearer cloud-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{"name": "gpt-oss:120b"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let models = discovery()
        .list_models(
            &Binding::OllamaCloud,
            &format!("{}/ollama.com", server.uri()),
            Some("cloud-key"),
        )
        .await;

    assert_eq!(models, vec!["gpt-oss:120b"]);
}

#[tokio::test]
async fn ollama_binding_on_the_cloud_host_lists_models_first() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ollama.com/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "deepseek-v3.1:671b"}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ollama.com/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": []})))
        .expect(0)
        .mount(&server)
        .await;

    let models = discovery()
        .list_models(
            &Binding::Ollama,
            &format!("{}/ollama.com/v1", server.uri()),
            Some("cloud-key"),
        )
        .await;

    assert_eq!(models, vec!["deepseek-v3.1:671b"]);
}

#[tokio::test]
async fn failing_probes_yield_an_empty_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let models = discovery()
        .list_models(&Binding::OpenAI, &server.uri(), Some("k"))
        .await;
    assert!(models.is_empty());

    let malformed = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&malformed)
        .await;

    let models = discovery()
        .list_models(&Binding::DeepSeek, &malformed.uri(), Some("k"))
        .await;
    assert!(models.is_empty());
}

#[tokio::test]
async fn unreachable_server_yields_an_empty_list() {
    let models = discovery()
        .list_models(&Binding::Ollama, "http://127.0.0.1:9", None)
        .await;

    assert!(models.is_empty());
}

#[tokio::test]
async fn free_function_uses_default_settings() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "a"}, "b"])))
        .mount(&server)
        .await;

    let models = llm_gateway::list_models(&Binding::from("acme"), &server.uri(), None).await;

    assert_eq!(models, vec!["a", "b"]);
}
