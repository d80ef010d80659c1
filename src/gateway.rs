//! Completion gateway: normalize, dispatch, validate, fall back.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::core::{
    CompletionRequest, CompletionTransport, GatewayConfig, GatewayError, UnknownBindingPolicy,
};
use crate::provider::{
    AnthropicTransport, Binding, DirectChatFallback, OpenAiTransport, TransportKind,
    endpoint::{self, is_local_inference_server, is_loopback},
    resolve_transport,
};

/// Routes completion calls to the right provider transport.
///
/// A call walks `NORMALIZE -> PRIMARY_ATTEMPT -> {SUCCESS | FALLBACK_ATTEMPT} ->
/// {SUCCESS | FAILURE}`. Nothing is carried between calls, so one gateway can
/// serve concurrent requests.
pub struct CompletionGateway {
    config: GatewayConfig,
    openai: Arc<dyn CompletionTransport>,
    anthropic: Arc<dyn CompletionTransport>,
    fallback: DirectChatFallback,
}

impl CompletionGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let http_config = config.http_config.clone();
        Ok(Self {
            openai: Arc::new(OpenAiTransport::new(http_config.clone())?),
            anthropic: Arc::new(AnthropicTransport::new(http_config.clone())?),
            fallback: DirectChatFallback::new(http_config)?,
            config,
        })
    }

    /// Replace the primary transport used for `kind`.
    pub fn with_transport(mut self, kind: TransportKind, transport: Arc<dyn CompletionTransport>) -> Self {
        match kind {
            TransportKind::OpenAiCompatible => self.openai = transport,
            TransportKind::Anthropic => self.anthropic = transport,
        }
        self
    }

    pub fn with_fallback(mut self, fallback: DirectChatFallback) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Run one completion and return the assistant's reply.
    ///
    /// Validation and credential errors are returned before any network call.
    /// A primary failure or empty reply triggers the direct fallback for the
    /// OpenAI-compatible family; when that is unavailable or also comes back
    /// empty, the primary error is returned.
    #[tracing::instrument(
        name = "gateway_complete",
        skip(self, request),
        fields(binding = %binding, model = %request.model),
        err
    )]
    pub async fn complete(
        &self,
        binding: &Binding,
        mut request: CompletionRequest,
    ) -> Result<String, GatewayError> {
        request.validate()?;
        let kind = self.resolve(binding)?;

        if kind == TransportKind::OpenAiCompatible
            && let Some(original) = request.base_url()
        {
            let normalized = endpoint::normalize(original, binding);
            if normalized != original {
                info!(from = %original, to = %normalized, "base URL normalized");
            }
            request.base_url = Some(normalized);
        }
        check_credentials(binding, kind, &request)?;

        debug!(transport = %kind, base_url = ?request.base_url(), "dispatching completion");

        let primary_error = match self.transport(kind).complete(&request).await {
            Ok(content) if !content.is_empty() => return Ok(content),
            Ok(_) => GatewayError::EmptyResponse(format!("Empty response from {kind} transport")),
            Err(e) => e,
        };

        match request.base_url() {
            Some(base_url)
                if self.config.fallback_enabled && binding.supports_direct_fallback() =>
            {
                warn!(error = %primary_error, base_url = %base_url, "primary transport failed, falling back to direct call");
                match self.fallback.complete(base_url, &request).await {
                    Ok(Some(content)) => return Ok(content),
                    Ok(None) => warn!("direct fallback returned no content"),
                    Err(e) => warn!(error = %e, "direct fallback failed"),
                }
            }
            _ => debug!("direct fallback not applicable"),
        }

        Err(primary_error)
    }

    fn resolve(&self, binding: &Binding) -> Result<TransportKind, GatewayError> {
        if !binding.is_known() {
            match self.config.unknown_bindings {
                UnknownBindingPolicy::Reject => {
                    return Err(GatewayError::Configuration(format!(
                        "Unsupported binding '{binding}'"
                    )));
                }
                UnknownBindingPolicy::AssumeOpenAiCompatible => {
                    warn!(binding = %binding, "unrecognized binding, assuming OpenAI-compatible");
                }
            }
        }
        Ok(resolve_transport(binding))
    }

    fn transport(&self, kind: TransportKind) -> &dyn CompletionTransport {
        match kind {
            TransportKind::OpenAiCompatible => self.openai.as_ref(),
            TransportKind::Anthropic => self.anthropic.as_ref(),
        }
    }
}

/// Keys are optional for self-hosted bindings and local endpoints. Hosted
/// providers fail here instead of with an upstream 401.
fn check_credentials(
    binding: &Binding,
    kind: TransportKind,
    request: &CompletionRequest,
) -> Result<(), GatewayError> {
    if request.api_key().is_some() {
        return Ok(());
    }

    let keyless = match kind {
        TransportKind::Anthropic => false,
        TransportKind::OpenAiCompatible => {
            !binding.requires_api_key()
                || request
                    .base_url()
                    .is_some_and(|url| is_local_inference_server(url) || is_loopback(url))
        }
    };

    if keyless {
        Ok(())
    } else {
        Err(GatewayError::Configuration(format!(
            "API key is missing for binding '{binding}'."
        )))
    }
}
