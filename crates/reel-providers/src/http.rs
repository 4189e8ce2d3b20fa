//! Shared HTTP helpers for provider clients.

use reqwest::{Client, Response};
use std::time::Duration;

use crate::error::{ProviderError, ProviderResult};

/// Longest error body kept in a `RequestFailed` error.
const ERROR_BODY_CHARS: usize = 300;

pub(crate) fn build_client(timeout: Duration) -> ProviderResult<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(ProviderError::Network)
}

/// Turn a non-2xx response into `RequestFailed`.
pub(crate) async fn check_status(
    response: Response,
    provider: &'static str,
) -> ProviderResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::RequestFailed {
        provider,
        status: status.as_u16(),
        body: body.chars().take(ERROR_BODY_CHARS).collect(),
    })
}

/// Read a binary body, rejecting empty payloads.
pub(crate) async fn read_bytes(response: Response, provider: &'static str) -> ProviderResult<Vec<u8>> {
    let bytes = check_status(response, provider).await?.bytes().await?;
    if bytes.is_empty() {
        return Err(ProviderError::EmptyResponse(provider));
    }
    Ok(bytes.to_vec())
}

/// Download an asset referenced by a provider response.
pub(crate) async fn download(
    client: &Client,
    url: &str,
    provider: &'static str,
) -> ProviderResult<Vec<u8>> {
    let response = client.get(url).send().await?;
    read_bytes(response, provider).await
}
