//! HTTP client for the Contentful GraphQL content delivery API.
//!
//! ## Endpoints
//! - Delivery/preview: `https://graphql.contentful.com/content/v1/spaces/{space}/environments/{env}`
//!
//! Delivery and preview share the endpoint; the access token decides which
//! content is visible. Requests whose `preview` variable is `true` are sent
//! with the preview token.
//!
//! ## Usage
//!
//! ```ignore
//! let client = ContentfulClient::new(ContentfulConfig::from_env()?);
//! let response = client.execute(request).await?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use cms_pages_types::env_utils::{env_nonempty, env_string_or, env_var_or};
use tracing::debug;

use crate::error::{ConfigError, TransportError};
use crate::graphql::{GraphQLRequest, GraphQLResponse};
use crate::network::{infer_environment_from_url, resolve_graphql_endpoint};
use crate::source::ContentSource;

/// Longest HTTP error body kept in a [`TransportError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// Connection settings for [`ContentfulClient`].
#[derive(Debug, Clone)]
pub struct ContentfulConfig {
    pub space_id: String,
    pub environment: String,
    pub access_token: String,
    /// Token for draft content. Falls back to `access_token` when unset.
    pub preview_access_token: Option<String>,
    pub endpoint: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl ContentfulConfig {
    /// Default request timeout in seconds (can be overridden by env).
    const DEFAULT_TIMEOUT_SECS: u64 = 30;
    /// Default connect timeout in seconds (can be overridden by env).
    const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

    pub fn new(space_id: &str, environment: &str, access_token: &str) -> Self {
        Self {
            space_id: space_id.to_string(),
            environment: environment.to_string(),
            access_token: access_token.to_string(),
            preview_access_token: None,
            endpoint: resolve_graphql_endpoint(space_id, environment),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(Self::DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    /// Read the configuration from `CONTENTFUL_*` / `CMS_HTTP_*` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let space_id =
            env_nonempty("CONTENTFUL_SPACE_ID").ok_or(ConfigError::Missing("CONTENTFUL_SPACE_ID"))?;
        let access_token = env_nonempty("CONTENTFUL_ACCESS_TOKEN")
            .ok_or(ConfigError::Missing("CONTENTFUL_ACCESS_TOKEN"))?;
        let environment = env_string_or("CONTENTFUL_ENVIRONMENT", "master");

        let mut config = Self::new(&space_id, &environment, &access_token);
        config.preview_access_token = env_nonempty("CONTENTFUL_PREVIEW_ACCESS_TOKEN");
        config.timeout = Duration::from_secs(env_var_or(
            "CMS_HTTP_TIMEOUT_SECS",
            Self::DEFAULT_TIMEOUT_SECS,
        ));
        config.connect_timeout = Duration::from_secs(env_var_or(
            "CMS_HTTP_CONNECT_TIMEOUT_SECS",
            Self::DEFAULT_CONNECT_TIMEOUT_SECS,
        ));
        Ok(config)
    }

    /// Point at another endpoint. An `/environments/{env}` segment in the URL
    /// also becomes the configured environment.
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        if let Some(environment) = infer_environment_from_url(endpoint) {
            self.environment = environment.to_string();
        }
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn with_preview_token(mut self, token: &str) -> Self {
        self.preview_access_token = Some(token.to_string());
        self
    }

    pub fn with_timeouts(mut self, timeout: Duration, connect_timeout: Duration) -> Self {
        self.timeout = timeout;
        self.connect_timeout = connect_timeout;
        self
    }

    fn token_for(&self, preview: bool) -> &str {
        if preview {
            self.preview_access_token
                .as_deref()
                .unwrap_or(&self.access_token)
        } else {
            &self.access_token
        }
    }
}

/// GraphQL client for the content delivery API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct ContentfulClient {
    config: ContentfulConfig,
    agent: ureq::Agent,
}

impl ContentfulClient {
    pub fn new(config: ContentfulConfig) -> Self {
        let agent = Self::build_agent(config.timeout, config.connect_timeout);
        Self { config, agent }
    }

    fn build_agent(timeout: Duration, connect_timeout: Duration) -> ureq::Agent {
        ureq::AgentBuilder::new()
            .timeout(timeout)
            .timeout_connect(connect_timeout)
            .build()
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    pub fn config(&self) -> &ContentfulConfig {
        &self.config
    }

    /// Execute a request on the calling thread.
    pub fn execute_blocking(
        &self,
        request: &GraphQLRequest,
    ) -> Result<GraphQLResponse, TransportError> {
        let token = self.config.token_for(request.bool_variable("preview"));
        debug!(
            endpoint = %self.config.endpoint,
            operation = request.operation_name.as_deref().unwrap_or("anonymous"),
            bytes = request.encoded_len(),
            "sending GraphQL request"
        );

        let result = self
            .agent
            .post(&self.config.endpoint)
            .set("Content-Type", "application/json")
            .set("Authorization", &format!("Bearer {}", token))
            .send_json(request);

        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(code, response)) => {
                // Query errors arrive with a 4xx status and a regular GraphQL body.
                let body = response.into_string().unwrap_or_default();
                if let Ok(parsed) = serde_json::from_str::<GraphQLResponse>(&body) {
                    if !parsed.errors.is_empty() {
                        return Ok(parsed);
                    }
                }
                return Err(TransportError::Status {
                    code,
                    body: truncate(&body, MAX_ERROR_BODY),
                });
            }
            Err(ureq::Error::Transport(transport)) => {
                let message = transport.to_string();
                if message.contains("timed out") {
                    return Err(TransportError::Timeout);
                }
                return Err(TransportError::Request(message));
            }
        };

        response
            .into_json::<GraphQLResponse>()
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ContentSource for ContentfulClient {
    async fn execute(&self, request: GraphQLRequest) -> Result<GraphQLResponse, TransportError> {
        let client = self.clone();
        tokio::task::spawn_blocking(move || client.execute_blocking(&request))
            .await
            .map_err(|e| TransportError::Join(e.to_string()))?
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let config = ContentfulConfig::new("space1", "master", "token")
            .with_endpoint("https://custom.endpoint/graphql");
        let client = ContentfulClient::new(config);
        assert_eq!(client.endpoint(), "https://custom.endpoint/graphql");
        assert_eq!(client.config().environment, "master");
    }

    #[test]
    fn test_endpoint_override_sets_environment() {
        let config = ContentfulConfig::new("space1", "master", "token").with_endpoint(
            "https://graphql.contentful.com/content/v1/spaces/space1/environments/staging",
        );
        assert_eq!(config.environment, "staging");
    }

    #[test]
    fn test_preview_token_selection() {
        let config = ContentfulConfig::new("s", "master", "delivery");
        assert_eq!(config.token_for(true), "delivery");

        let config = config.with_preview_token("preview");
        assert_eq!(config.token_for(false), "delivery");
        assert_eq!(config.token_for(true), "preview");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("ééé", 3), "é...");
    }

    /// Run with: CONTENTFUL_SPACE_ID=... CONTENTFUL_ACCESS_TOKEN=... cargo test -p cms-transport -- --ignored
    #[tokio::test]
    #[ignore = "requires CONTENTFUL_* credentials"]
    async fn test_live_typename_query() {
        let client = ContentfulClient::new(ContentfulConfig::from_env().expect("config"));
        let response = client
            .execute(GraphQLRequest::new("query { __typename }"))
            .await
            .expect("request should succeed");
        assert!(!response.has_hard_errors(), "{:?}", response.errors);
    }
}
