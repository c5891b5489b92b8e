//! CMS Resolver
//!
//! Assembles a page from a shell record and its ordered, heterogeneous list of
//! section references.
//!
//! # Pipeline
//!
//! ```text
//! fetch shell ─▶ index refs by type ─▶ plan sub-batches ─▶ fetch all batches concurrently
//!                                                                   │
//!              AssembledDocument ◀── assemble in shell order ◀── join
//! ```
//!
//! This crate provides:
//! - [`indexer`]: group references into one deduplicated id set per content type
//! - [`planner`]: split an id set into sub-batches that fit the upstream's request budget
//! - [`type_resolver`]: fetch one sub-batch of one content type, tolerating unresolvable links
//! - [`orchestrator`]: [`PageResolver`], which runs the whole pipeline for one page
//! - [`assembler`]: rebuild the ordered item list from the joined results
//!
//! Only [`PageResolver`] performs I/O. Everything else is a pure function over
//! the types in [`cms_pages_types`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use cms_resolver::{PageResolver, ResolverConfig};
//! use cms_transport::{ContentfulClient, ContentfulConfig};
//!
//! let client = ContentfulClient::new(ContentfulConfig::from_env()?);
//! let resolver = PageResolver::new(Arc::new(client), ResolverConfig::from_env());
//! let page = resolver.resolve_document("home", "en-US").await?;
//! for item in &page.items {
//!     println!("{} {}", item.content_type, item.id);
//! }
//! ```

pub mod assembler;
pub mod cache;
pub mod config;
pub mod error;
pub mod indexer;
pub mod orchestrator;
pub mod planner;
pub mod query;
pub mod shell;
pub mod type_resolver;

mod upstream;

pub use assembler::assemble;
pub use cache::RequestCache;
pub use config::{BatchBudget, ResolverConfig};
pub use error::{ResolveError, UpstreamError};
pub use indexer::index;
pub use orchestrator::{FetchPlan, PageResolver, ResolveStats, TypePlan};
pub use planner::{plan, plan_with_budget};
pub use type_resolver::TypeResolver;
