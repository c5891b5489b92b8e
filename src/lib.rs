//! CMS page assembly
//!
//! Resolves a page shell and its ordered list of polymorphic section references
//! into fully populated items, fetching one batch per content type instead of
//! one request per item:
//!
//! - **Types** ([`types`]): content types, references, resolved entities
//! - **Transport** ([`transport`]): GraphQL delivery client and the in-memory fixture source
//! - **Resolver** ([`resolver`]): indexing, batch planning, concurrent fetch, assembly
//!
//! See [`PageResolver`] for the entry point.

pub use cms_pages_types as types;
pub use cms_resolver as resolver;
pub use cms_transport as transport;

pub use cms_pages_types::{AssembledDocument, ContentType, ResolvedEntity};
pub use cms_resolver::{PageResolver, ResolveError, ResolveStats, ResolverConfig, UpstreamError};
pub use cms_transport::{ContentSource, ContentfulClient, ContentfulConfig, InMemorySource};
