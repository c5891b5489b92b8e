//! CMS Transport Layer
//!
//! Everything the resolution engine needs to talk to the content delivery API,
//! and nothing about how pages are assembled.
//!
//! This crate provides:
//! - [`graphql`]: request/response payloads and error classification
//! - [`source`]: the [`ContentSource`] trait the engine fetches through
//! - [`client`]: [`ContentfulClient`], the HTTP implementation
//! - [`memory`]: [`InMemorySource`], a fixture-backed implementation for offline runs and tests
//! - [`network`]: endpoint resolution
//!
//! # Example
//!
//! ```ignore
//! use cms_transport::{ContentSource, ContentfulClient, ContentfulConfig, GraphQLRequest};
//!
//! let client = ContentfulClient::new(ContentfulConfig::from_env()?);
//! let response = client
//!     .execute(GraphQLRequest::new("query { __typename }"))
//!     .await?;
//! ```

pub mod client;
pub mod error;
pub mod graphql;
pub mod memory;
pub mod network;
pub mod source;

// Re-export main types for convenience
pub use client::{ContentfulClient, ContentfulConfig};
pub use error::{ConfigError, TransportError};
pub use graphql::{operations, GraphQLError, GraphQLErrorKind, GraphQLRequest, GraphQLResponse};
pub use memory::{Failure, InMemorySource};
pub use source::ContentSource;
