//! Shared types for the cms-pages workspace.
//!
//! This crate provides the data model passed between the transport layer and
//! the resolution engine, keeping both free of each other's internals.
//!
//! ## Page Model
//!
//! A page is fetched in two steps. First a [`ShellDocument`] with only the
//! ordered list of typed [`ChildRef`]s, then the full records for those
//! references, grouped by [`ContentType`]. The resolved records come back as
//! [`ResolvedEntity`] values collected in a [`ResolutionResult`], and the final
//! ordered page is an [`AssembledDocument`].
//!
//! - [`content_type`] - the closed set of content types a page may reference
//! - [`document`] - shells, references, resolved entities and assembled pages
//! - [`env_utils`] - environment variable parsing helpers

pub mod content_type;
pub mod document;
pub mod env_utils;

pub use content_type::ContentType;
pub use document::{
    AssembledDocument, ChildRef, ResolutionResult, ResolvedEntity, ShellDocument, TypeBatch,
    TYPENAME_FIELD,
};
