use std::time::Duration;

use cms_transport::{ContentSource, GraphQLRequest, GraphQLResponse};

use crate::error::UpstreamError;

/// Send one request under its own deadline.
///
/// Returns the operation name with the response so callers can label errors.
pub(crate) async fn execute(
    source: &dyn ContentSource,
    request: GraphQLRequest,
    timeout: Duration,
) -> Result<(String, GraphQLResponse), UpstreamError> {
    let operation = request
        .operation_name
        .clone()
        .unwrap_or_else(|| "anonymous".to_string());

    match tokio::time::timeout(timeout, source.execute(request)).await {
        Ok(Ok(response)) => Ok((operation, response)),
        Ok(Err(e)) => Err(UpstreamError::transport(&operation, e)),
        Err(_) => Err(UpstreamError::Timeout {
            timeout_ms: timeout.as_millis() as u64,
            operation,
        }),
    }
}

/// Turn hard GraphQL errors into an [`UpstreamError`].
pub(crate) fn check_hard_errors(
    operation: &str,
    response: &GraphQLResponse,
) -> Result<(), UpstreamError> {
    let messages: Vec<String> = response.hard_errors().map(|e| e.message.clone()).collect();
    if messages.is_empty() {
        Ok(())
    } else {
        Err(UpstreamError::GraphQL {
            operation: operation.to_string(),
            messages,
        })
    }
}
