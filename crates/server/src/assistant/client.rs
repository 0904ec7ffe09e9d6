//! Anthropic Messages API client.

use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::instrument;

use crate::config::AssistantConfig;

use super::error::{ApiErrorResponse, AssistantError};
use super::types::{Message, MessagesRequest, MessagesResponse};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Messages API client.
#[derive(Clone)]
pub struct AssistantClient {
    inner: Arc<AssistantClientInner>,
}

struct AssistantClientInner {
    client: reqwest::Client,
    model: String,
    api_url: String,
}

impl AssistantClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `AssistantError::InvalidApiKey` if the key contains characters
    /// that cannot go in a header, or `AssistantError::Http` if the HTTP
    /// client cannot be built.
    pub fn new(config: &AssistantConfig) -> Result<Self, AssistantError> {
        let api_key = HeaderValue::from_str(config.api_key.expose_secret())
            .map_err(|e| AssistantError::InvalidApiKey(e.to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("x-api-key", api_key);
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(60))
            .build()?;

        Ok(Self {
            inner: Arc::new(AssistantClientInner {
                client,
                model: config.model.clone(),
                api_url: config.api_url.clone(),
            }),
        })
    }

    /// Send a single-turn prompt and return the text reply.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the API returns an error, or
    /// the reply has no text.
    #[instrument(skip(self, system, prompt), fields(model = %self.inner.model))]
    pub async fn complete(
        &self,
        system: &str,
        prompt: String,
        max_tokens: u32,
    ) -> Result<String, AssistantError> {
        let request = MessagesRequest {
            model: self.inner.model.clone(),
            max_tokens,
            messages: vec![Message::user(prompt)],
            system: Some(system.to_string()),
        };

        let response = self
            .inner
            .client
            .post(&self.inner.api_url)
            .json(&request)
            .send()
            .await?;

        let response = self.handle_response(response).await?;
        tracing::debug!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "Assistant reply received"
        );

        let text = response.text();
        if text.is_empty() {
            return Err(AssistantError::EmptyResponse);
        }
        Ok(text)
    }

    /// Handle a response, parsing the body or mapping the error status.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<MessagesResponse, AssistantError> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body)
                .map_err(|e| AssistantError::Parse(format!("Failed to parse response: {e}")))
        } else {
            Err(self.handle_error_status(status, response).await)
        }
    }

    /// Handle an error status code.
    async fn handle_error_status(
        &self,
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> AssistantError {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return AssistantError::RateLimited(retry_after);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return AssistantError::Unauthorized("Invalid API key".to_string());
        }

        match response.text().await {
            Ok(body) => serde_json::from_str::<ApiErrorResponse>(&body).map_or_else(
                |_| AssistantError::Api {
                    error_type: format!("http_{}", status.as_u16()),
                    message: body,
                },
                |api_error| AssistantError::Api {
                    error_type: api_error.error.error_type,
                    message: api_error.error.message,
                },
            ),
            Err(e) => AssistantError::Http(e),
        }
    }
}
