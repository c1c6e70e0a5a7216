//! Free-time API client.
//!
//! This module provides a low-level HTTP client for the provider's
//! `Scheduler/GetFreeTime` endpoint, handling request building, status
//! mapping and envelope parsing.

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderName};
use tracing::{debug, warn};
use url::Url;

use clinicslots_core::format_instant;

use crate::error::{ProviderError, ProviderResult};
use crate::provider::FreeTimeRequest;
use crate::raw_slot::{FreeTimeEnvelope, RawSlot};

use super::config::FreeTimeConfig;

/// Free-time API client.
#[derive(Debug, Clone)]
pub struct FreeTimeClient {
    http_client: reqwest::Client,
    endpoint: Url,
    auth_header: HeaderName,
}

impl FreeTimeClient {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the base URL or header name is
    /// invalid, or the HTTP client cannot be built.
    pub fn new(config: &FreeTimeConfig) -> ProviderResult<Self> {
        let endpoint = config.endpoint()?;
        let auth_header = HeaderName::from_bytes(config.auth_header.as_bytes()).map_err(|e| {
            ProviderError::configuration(format!(
                "invalid auth header '{}': {}",
                config.auth_header, e
            ))
        })?;
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                ProviderError::configuration(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            endpoint,
            auth_header,
        })
    }

    /// Returns the endpoint this client queries.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Queries free time for the request's schedulers.
    ///
    /// A response whose `code` is not `"Success"` is still accepted when it
    /// carries a `result` array.
    pub async fn get_free_time(&self, request: &FreeTimeRequest) -> ProviderResult<Vec<RawSlot>> {
        if request.scheduler_ids.is_empty() {
            return Err(ProviderError::bad_request("no scheduler ids to query"));
        }

        let response = self
            .http_client
            .get(self.endpoint.clone())
            .header(ACCEPT, "application/json")
            .header(self.auth_header.clone(), request.auth_token.as_str())
            .query(&[
                ("schedulerIDsStr", request.scheduler_ids_param()),
                ("duration", request.duration_minutes.to_string()),
                ("fromDateUTC", format_instant(request.window.start)),
                ("toDateUTC", format_instant(request.window.end)),
            ])
            .send()
            .await?;

        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(ProviderError::authentication("auth token rejected"));
        }

        if status == StatusCode::FORBIDDEN {
            return Err(ProviderError::authorization("access denied to scheduler"));
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::rate_limited("rate limit exceeded"));
        }

        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::server(format!(
                "API error ({}): {}",
                status,
                truncate(&body, 200)
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))?;

        let envelope = parse_envelope(&body)?;
        if !envelope.is_success() {
            warn!(
                code = envelope.code.as_deref().unwrap_or("<none>"),
                error = envelope.error.as_deref().unwrap_or(""),
                "provider returned a non-success code alongside results"
            );
        }

        let slots = envelope.result.unwrap_or_default();
        debug!(
            schedulers = %request.scheduler_ids_param(),
            count = slots.len(),
            "fetched free slots"
        );
        Ok(slots)
    }
}

/// Parses the response body, requiring a `result` array.
fn parse_envelope(body: &str) -> ProviderResult<FreeTimeEnvelope> {
    let envelope: FreeTimeEnvelope = serde_json::from_str(body).map_err(|e| {
        ProviderError::invalid_response(format!("failed to parse response: {}", e))
    })?;

    if envelope.result.is_none() {
        return Err(ProviderError::missing_result(format!(
            "response has no result array (code: {}, error: {})",
            envelope.code.as_deref().unwrap_or("<none>"),
            envelope.error.as_deref().unwrap_or("<none>")
        )));
    }

    Ok(envelope)
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
