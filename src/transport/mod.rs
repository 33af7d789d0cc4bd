//! HTTP transport for opening chat streams.

use std::sync::OnceLock;
use std::time::Duration;

use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};

use crate::config::EndpointConfig;
use crate::error::ChatError;
use crate::protocol::ChatRequest;

fn build_reqwest_client(
    pool_max_idle_per_host: usize,
    pool_idle_timeout: Option<Duration>,
    connect_timeout: Duration,
) -> Result<reqwest::Client, ChatError> {
    // No total request timeout: a healthy stream may stay open for minutes.
    // Stalls are bounded by the caller's per-chunk read timeout instead.
    reqwest::Client::builder()
        .pool_max_idle_per_host(pool_max_idle_per_host)
        .pool_idle_timeout(pool_idle_timeout)
        .tcp_nodelay(true)
        .connect_timeout(connect_timeout)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|err| ChatError::Transport(format!("Failed to build HTTP client: {err}")))
}

/// HTTP client for the chat endpoint.
///
/// Owns the connection pool and the fixed request headers; yields open
/// streaming responses whose bodies the orchestrator reads chunk by chunk.
pub struct ChatTransport {
    client: OnceLock<reqwest::Client>,
    endpoint_url: String,
    authorization: String,
    connect_timeout: Duration,
    pool_max_idle_per_host: usize,
    pool_idle_timeout: Option<Duration>,
}

impl ChatTransport {
    #[must_use]
    pub fn new(config: &EndpointConfig) -> Self {
        let pool_idle_timeout = if config.http_pool_idle_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(config.http_pool_idle_timeout_secs))
        };
        Self {
            client: OnceLock::new(),
            endpoint_url: config.url.clone(),
            authorization: config.authorization.clone(),
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            pool_max_idle_per_host: config.http_pool_max_idle_per_host,
            pool_idle_timeout,
        }
    }

    fn http_client(&self) -> &reqwest::Client {
        self.client.get_or_init(|| {
            match build_reqwest_client(
                self.pool_max_idle_per_host,
                self.pool_idle_timeout,
                self.connect_timeout,
            ) {
                Ok(client) => client,
                Err(err) => {
                    tracing::error!(error = %err, "failed to build configured HTTP client, falling back to default client");
                    reqwest::Client::new()
                }
            }
        })
    }

    /// POST the chat request and return the open streaming response.
    ///
    /// A non-success status reads the whole body as plain text and surfaces
    /// it as the error message.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Transport`] when the request cannot be built or
    /// the connection fails, and [`ChatError::Upstream`] for non-2xx
    /// responses.
    pub async fn open_stream(&self, request: &ChatRequest) -> Result<reqwest::Response, ChatError> {
        let payload = serde_json::to_vec(request)
            .map_err(|err| ChatError::Transport(format!("Failed to encode request: {err}")))?;

        let response = self
            .http_client()
            .post(&self.endpoint_url)
            .header(AUTHORIZATION, self.authorization.as_str())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "text/event-stream")
            .body(payload)
            .send()
            .await
            .map_err(|err| ChatError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::from_upstream(status, body));
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_endpoint_config() -> EndpointConfig {
        EndpointConfig {
            url: "https://chat.example.com/api/chat".to_string(),
            authorization: "secret".to_string(),
            connect_timeout_secs: 5,
            read_timeout_secs: 120,
            http_pool_max_idle_per_host: 16,
            http_pool_idle_timeout_secs: 15,
        }
    }

    #[test]
    fn test_http_client_is_lazy() {
        let transport = ChatTransport::new(&make_endpoint_config());
        assert!(transport.client.get().is_none());
        let _ = transport.http_client();
        assert!(transport.client.get().is_some());
    }

    #[test]
    fn test_zero_pool_idle_timeout_disables_expiry() {
        let mut config = make_endpoint_config();
        config.http_pool_idle_timeout_secs = 0;
        let transport = ChatTransport::new(&config);
        assert!(transport.pool_idle_timeout.is_none());
    }
}
