//! The closed set of content types a page section may reference.
//!
//! Every type the upstream schema can place in a page's section list has a
//! variant here. Code that needs per-type behaviour (query building, field
//! selection, rendering hints) matches on [`ContentType`] exhaustively, so a
//! new variant shows up as a compile error everywhere it has to be handled.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A content type that can appear in a page's ordered section list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ContentType {
    /// Full-width hero block with headline, image and optional CTA.
    HeroBanner,
    /// Call-to-action block.
    CallToAction,
    /// Titled list of items.
    ItemList,
    /// Group of linked sub-pages.
    PageGroup,
    /// Free-form rich text block.
    RichText,
}

impl ContentType {
    /// All known content types, in declaration order.
    pub const ALL: [ContentType; 5] = [
        ContentType::HeroBanner,
        ContentType::CallToAction,
        ContentType::ItemList,
        ContentType::PageGroup,
        ContentType::RichText,
    ];

    /// The GraphQL `__typename` the upstream reports for this type.
    pub fn typename(self) -> &'static str {
        match self {
            ContentType::HeroBanner => "ComponentHeroBanner",
            ContentType::CallToAction => "ComponentCta",
            ContentType::ItemList => "ComponentList",
            ContentType::PageGroup => "ComponentPageGroup",
            ContentType::RichText => "ComponentTextBlock",
        }
    }

    /// Root query field returning a collection of this type.
    pub fn collection_field(self) -> &'static str {
        match self {
            ContentType::HeroBanner => "componentHeroBannerCollection",
            ContentType::CallToAction => "componentCtaCollection",
            ContentType::ItemList => "componentListCollection",
            ContentType::PageGroup => "componentPageGroupCollection",
            ContentType::RichText => "componentTextBlockCollection",
        }
    }

    /// Parse a GraphQL `__typename`. Returns `None` for types outside the closed set.
    pub fn from_typename(typename: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.typename() == typename)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.typename())
    }
}

impl From<ContentType> for String {
    fn from(ty: ContentType) -> Self {
        ty.typename().to_string()
    }
}

impl TryFrom<String> for ContentType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ContentType::from_typename(&value).ok_or_else(|| format!("unknown content type: {value}"))
    }
}
