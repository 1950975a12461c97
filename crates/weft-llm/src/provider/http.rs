//! Shared HTTP wiring for the provider variants
//!
//! Free helpers for endpoint resolution and status/error translation; every
//! family takes these as dependencies rather than inheriting behavior.

use secrecy::ExposeSecret;

use crate::error::LlmError;
use crate::types::ModelConfig;

/// Resolve the effective base URL for a request, without a trailing slash
///
/// # Errors
///
/// `LlmError::Configuration` when the provider has no default endpoint and
/// none was configured. This fires before any I/O.
pub fn resolve_base_url(
    provider: &'static str,
    default_base_url: Option<&'static str>,
    config: &ModelConfig,
) -> Result<String, LlmError> {
    if let Some(url) = &config.base_url {
        return Ok(url.as_str().trim_end_matches('/').to_owned());
    }
    default_base_url
        .map(|url| url.trim_end_matches('/').to_owned())
        .ok_or_else(|| LlmError::Configuration(format!("provider '{provider}' requires an explicit endpoint")))
}

/// Expose the configured API key, if any
pub fn api_key(config: &ModelConfig) -> Option<String> {
    config.api_key.as_ref().map(|k| k.expose_secret().to_owned())
}

/// Send a prepared request and check its status
///
/// # Errors
///
/// `LlmError::Transport` with the underlying cause on a network failure, or
/// with the status code and truncated body on a non-success response.
pub async fn send_checked(provider: &'static str, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, LlmError> {
    let response = builder.send().await.map_err(|e| {
        tracing::error!(provider, error = %e, "upstream request failed");
        LlmError::transport(e)
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(provider, status = %status, "upstream returned error");
        return Err(LlmError::upstream_status(status.as_u16(), &body));
    }

    Ok(response)
}
