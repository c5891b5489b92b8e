//! The upstream seam.
//!
//! The resolution engine only ever talks to a [`ContentSource`]. The HTTP
//! client and the fixture-backed source both implement it, and so does any
//! `Arc` of one, so a single client can be shared by every in-flight batch.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::graphql::{GraphQLRequest, GraphQLResponse};

/// A typed query/response service.
///
/// Implementations must be safe to call from many concurrent tasks. A
/// response carrying GraphQL `errors` is still `Ok`; `Err` is reserved for
/// requests that produced no payload at all.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn execute(&self, request: GraphQLRequest) -> Result<GraphQLResponse, TransportError>;
}

#[async_trait]
impl<S: ContentSource + ?Sized> ContentSource for Arc<S> {
    async fn execute(&self, request: GraphQLRequest) -> Result<GraphQLResponse, TransportError> {
        (**self).execute(request).await
    }
}
