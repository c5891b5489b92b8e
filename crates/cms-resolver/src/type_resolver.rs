//! Per-type batch fetching.
//!
//! A [`TypeResolver`] owns one content type and turns a sub-batch of ids into
//! resolved entities with a single upstream request. Requests never mix types,
//! which keeps each request's field selection and size predictable.
//!
//! ## Error policy
//!
//! | Upstream errors in the response | Outcome |
//! |---------------------------------|---------|
//! | none | all returned items |
//! | only unresolvable links | returned items; the unresolvable ids are absent |
//! | anything else (alone or mixed with link errors) | `UpstreamError` |

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use cms_pages_types::{ContentType, ResolvedEntity};
use cms_transport::{ContentSource, GraphQLResponse};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ResolverConfig;
use crate::error::UpstreamError;
use crate::query;
use crate::upstream;

/// Fetches full records for one content type.
#[derive(Clone)]
pub struct TypeResolver {
    content_type: ContentType,
    source: Arc<dyn ContentSource>,
    timeout: Duration,
}

impl TypeResolver {
    pub fn new(content_type: ContentType, source: Arc<dyn ContentSource>) -> Self {
        Self {
            content_type,
            source,
            timeout: Duration::from_secs(ResolverConfig::DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// Resolve one sub-batch with exactly one upstream request.
    #[tracing::instrument(
        name = "resolve_type_batch",
        skip_all,
        fields(content_type = %self.content_type, ids = sub_batch.len())
    )]
    pub async fn resolve(
        &self,
        sub_batch: &[String],
        locale: &str,
        preview: bool,
    ) -> Result<HashMap<String, ResolvedEntity>, UpstreamError> {
        let request = query::type_request(self.content_type, sub_batch, locale, preview);
        debug!(bytes = request.encoded_len(), "dispatching type batch");

        let (operation, response) =
            upstream::execute(self.source.as_ref(), request, self.timeout).await?;
        parse_type_response(self.content_type, &operation, sub_batch, &response)
    }
}

/// Extract the resolved entities of one type-batch response.
///
/// Only ids that were requested are returned. Null items and items without a
/// `sys.id` are skipped.
pub fn parse_type_response(
    content_type: ContentType,
    operation: &str,
    requested: &[String],
    response: &GraphQLResponse,
) -> Result<HashMap<String, ResolvedEntity>, UpstreamError> {
    upstream::check_hard_errors(operation, response)?;

    for err in response.link_errors() {
        debug!(
            %content_type,
            link_id = err.link_id().unwrap_or("<unknown>"),
            "unresolvable link in type batch"
        );
    }

    let items = match response.collection_items(content_type.collection_field()) {
        Some(items) => items.as_slice(),
        // Link errors alone may null out the whole collection.
        None if !response.errors.is_empty() => &[],
        None => {
            return Err(UpstreamError::malformed(
                operation,
                format!("missing {}.items", content_type.collection_field()),
            ))
        }
    };

    let wanted: HashSet<&str> = requested.iter().map(String::as_str).collect();
    let mut resolved = HashMap::with_capacity(items.len());

    for item in items {
        let Value::Object(fields) = item else {
            continue;
        };
        let Some(id) = fields
            .get("sys")
            .and_then(|s| s.get("id"))
            .and_then(Value::as_str)
        else {
            warn!(%content_type, "skipping item without sys.id");
            continue;
        };
        if !wanted.contains(id) {
            warn!(%content_type, id, "skipping item that was not requested");
            continue;
        }
        resolved.insert(
            id.to_string(),
            ResolvedEntity::new(content_type, id, fields.clone()),
        );
    }

    Ok(resolved)
}
