use cms_transport::TransportError;
use thiserror::Error;

/// A failure from the upstream that aborts the whole resolution.
///
/// Unresolvable links never become an `UpstreamError`; they only drop the
/// affected references.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UpstreamError {
    #[error("{operation}: {source}")]
    Transport {
        operation: String,
        #[source]
        source: TransportError,
    },

    #[error("{operation}: timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("{operation}: upstream reported {}", .messages.join("; "))]
    GraphQL {
        operation: String,
        messages: Vec<String>,
    },

    #[error("{operation}: malformed response: {reason}")]
    MalformedResponse { operation: String, reason: String },
}

impl UpstreamError {
    pub(crate) fn transport(operation: &str, source: TransportError) -> Self {
        Self::Transport {
            operation: operation.to_string(),
            source,
        }
    }

    pub(crate) fn malformed(operation: &str, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            operation: operation.to_string(),
            reason: reason.into(),
        }
    }

    /// Operation whose request failed.
    pub fn operation(&self) -> &str {
        match self {
            UpstreamError::Transport { operation, .. }
            | UpstreamError::Timeout { operation, .. }
            | UpstreamError::GraphQL { operation, .. }
            | UpstreamError::MalformedResponse { operation, .. } => operation,
        }
    }

    /// True for both client-side and transport-reported timeouts.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            UpstreamError::Timeout { .. }
                | UpstreamError::Transport {
                    source: TransportError::Timeout,
                    ..
                }
        )
    }
}

/// Why a page could not be assembled.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ResolveError {
    #[error("no page with slug '{slug}' in locale '{locale}'")]
    NotFound { slug: String, locale: String },

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl ResolveError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graphql_error_message_joins_messages() {
        let err = UpstreamError::GraphQL {
            operation: "ResolveComponentCta".into(),
            messages: vec!["access denied".into(), "rate limited".into()],
        };
        assert_eq!(
            err.to_string(),
            "ResolveComponentCta: upstream reported access denied; rate limited"
        );
    }

    #[test]
    fn test_timeout_detection() {
        let transport = UpstreamError::transport("PageShell", TransportError::Timeout);
        assert!(transport.is_timeout());

        let local = UpstreamError::Timeout {
            operation: "PageShell".into(),
            timeout_ms: 5,
        };
        assert!(local.is_timeout());
        assert_eq!(local.operation(), "PageShell");

        assert!(!UpstreamError::malformed("PageShell", "no data").is_timeout());
    }

    #[test]
    fn test_not_found_display() {
        let err = ResolveError::NotFound {
            slug: "about".into(),
            locale: "de-DE".into(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "no page with slug 'about' in locale 'de-DE'");
    }
}
