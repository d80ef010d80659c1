//! Base URL normalization for OpenAI-compatible endpoints.
//!
//! Callers hand in whatever they configured: bare hosts, URLs with trailing
//! slashes, or full endpoint URLs copied from provider docs. Transports need a
//! canonical *base* URL they can append their own endpoint paths to.

use super::{Binding, constants::ollama};

/// Endpoint suffixes that belong to the request path, never to the base URL.
const ENDPOINT_SUFFIXES: [&str; 4] = ["/chat/completions", "/completions", "/messages", "/embeddings"];

/// Canonicalize `base_url` for an OpenAI-compatible transport.
///
/// Rules, in order:
/// 1. empty input is returned unchanged
/// 2. trailing slashes are stripped
/// 3. `http://` is prepended when no scheme is present
/// 4. known endpoint suffixes are stripped
/// 5. local inference servers (port 11434, or an `ollama` host that is not
///    `ollama.com`) get a `/v1` segment
///
/// The result is a fixed point: normalizing it again yields the same string.
pub fn normalize(base_url: &str, _binding: &Binding) -> String {
    if base_url.is_empty() {
        return String::new();
    }

    let mut url = base_url.trim_end_matches('/').to_string();
    if url.is_empty() {
        return url;
    }

    if !has_scheme(&url) {
        url = format!("http://{url}");
    }

    url = strip_endpoint_suffixes(url);

    if is_local_inference_server(&url) && !url.ends_with("/v1") {
        url = format!("{}/v1", url.trim_end_matches('/'));
    }

    url
}

/// Self-hosted inference server speaking the OpenAI API under `/v1`.
pub fn is_local_inference_server(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.contains(ollama::DEFAULT_PORT_MARKER)
        || (lower.contains("ollama") && !lower.contains(ollama::CLOUD_DOMAIN))
}

/// The vendor-hosted Ollama service.
pub fn is_ollama_cloud(url: &str) -> bool {
    url.to_lowercase().contains(ollama::CLOUD_DOMAIN)
}

/// URL pointing at the local machine.
pub fn is_loopback(url: &str) -> bool {
    let Some(host) = host_of(url) else {
        return false;
    };
    matches!(host.as_str(), "localhost" | "127.0.0.1" | "0.0.0.0" | "[::1]")
}

/// Strip a trailing `/v1` to reach the server root.
pub(crate) fn server_root(url: &str) -> &str {
    let url = url.trim_end_matches('/');
    url.strip_suffix("/v1").unwrap_or(url)
}

/// Append `path` to `base` unless `base` already ends with it.
pub(crate) fn join_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.ends_with(path) {
        base.to_string()
    } else {
        format!("{base}{path}")
    }
}

fn has_scheme(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn host_of(url: &str) -> Option<String> {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let authority = rest.split('/').next()?;
    let authority = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    let host = if authority.starts_with('[') {
        authority
            .find(']')
            .map_or(authority, |end| &authority[..=end])
    } else {
        authority.split(':').next().unwrap_or(authority)
    };
    Some(host.to_lowercase()).filter(|host| !host.is_empty())
}

/// Strip endpoint suffixes until none matches, without ever eating into the host.
fn strip_endpoint_suffixes(url: String) -> String {
    let (scheme, mut rest) = match url.split_once("://") {
        Some((scheme, rest)) => (Some(scheme.to_string()), rest.to_string()),
        None => (None, url),
    };

    loop {
        let stripped = ENDPOINT_SUFFIXES.iter().find_map(|suffix| {
            rest.strip_suffix(suffix)
                .map(|head| head.trim_end_matches('/'))
                .filter(|head| !head.is_empty())
                .map(str::to_string)
        });
        match stripped {
            Some(head) => rest = head,
            None => break,
        }
    }

    match scheme {
        Some(scheme) => format!("{scheme}://{rest}"),
        None => rest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(url: &str, binding: &str) -> String {
        normalize(url, &Binding::from(binding))
    }

    #[test]
    fn local_ollama_gets_scheme_and_v1() {
        assert_eq!(norm("localhost:11434", "ollama"), "http://localhost:11434/v1");
        assert_eq!(norm("http://localhost:11434/", "ollama"), "http://localhost:11434/v1");
        assert_eq!(
            norm("http://my-ollama-box:8080", "openai"),
            "http://my-ollama-box:8080/v1"
        );
    }

    #[test]
    fn endpoint_suffixes_are_stripped() {
        assert_eq!(
            norm("https://api.example.com/v1/chat/completions", "openai"),
            "https://api.example.com/v1"
        );
        assert_eq!(
            norm("https://api.example.com/v1/completions/", "openai"),
            "https://api.example.com/v1"
        );
        assert_eq!(
            norm("https://api.example.com/v1/embeddings", "openai"),
            "https://api.example.com/v1"
        );
        assert_eq!(
            norm("http://localhost:11434/v1/chat/completions", "ollama"),
            "http://localhost:11434/v1"
        );
        assert_eq!(
            norm("http://localhost:11434/chat/completions", "ollama"),
            "http://localhost:11434/v1"
        );
    }

    #[test]
    fn cloud_ollama_is_left_without_v1() {
        assert_eq!(norm("https://ollama.com", "ollama-cloud"), "https://ollama.com");
        assert_eq!(norm("https://OLLAMA.com/api/", "ollama-cloud"), "https://OLLAMA.com/api");
    }

    #[test]
    fn empty_input_passes_through() {
        assert_eq!(norm("", "openai"), "");
        assert_eq!(norm("///", "openai"), "");
    }

    #[test]
    fn suffix_stripping_never_reaches_the_host() {
        assert_eq!(norm("http:///completions", "openai"), "http:///completions");
        assert_eq!(norm("chat/completions", "openai"), "http://chat");
    }

    #[test]
    fn normalization_is_idempotent() {
        let inputs = [
            "",
            "/",
            "localhost:11434",
            "localhost:11434/v1/",
            "https://api.example.com/v1/chat/completions",
            "https://api.example.com/v1/completions/completions",
            "https://api.example.com/v1/messages//",
            "http://chat/completions",
            "http://",
            "https://ollama.com/v1",
            "ollama.internal/api",
            "HTTPS://Api.Example.com/V1/",
            "api.openai.com/v1",
            "http://127.0.0.1:8000/v1/embeddings",
        ];
        for input in inputs {
            for binding in ["openai", "ollama", "anthropic"] {
                let once = norm(input, binding);
                assert_eq!(norm(&once, binding), once, "input {input:?} binding {binding}");
            }
        }
    }

    #[test]
    fn local_detection() {
        assert!(is_local_inference_server("http://localhost:11434"));
        assert!(is_local_inference_server("http://Ollama.lan"));
        assert!(!is_local_inference_server("https://ollama.com/v1"));
        assert!(!is_local_inference_server("https://api.openai.com/v1"));
    }

    #[test]
    fn loopback_detection() {
        assert!(is_loopback("http://localhost:8080/v1"));
        assert!(is_loopback("127.0.0.1:1234"));
        assert!(is_loopback("http://[::1]:11434"));
        assert!(!is_loopback("https://api.example.com"));
    }

    #[test]
    fn helpers_join_and_strip() {
        assert_eq!(server_root("http://localhost:11434/v1/"), "http://localhost:11434");
        assert_eq!(server_root("https://ollama.com"), "https://ollama.com");
        assert_eq!(
            join_endpoint("https://api.example.com/v1/", "/chat/completions"),
            "https://api.example.com/v1/chat/completions"
        );
        assert_eq!(
            join_endpoint("https://api.example.com/v1/chat/completions", "/chat/completions"),
            "https://api.example.com/v1/chat/completions"
        );
    }
}
