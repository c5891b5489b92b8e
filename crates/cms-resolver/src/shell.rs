//! Shell retrieval.
//!
//! The shell query stops at `{ __typename, sys { id } }` for every section, so
//! its size does not grow with the content of the referenced blocks.
//!
//! A page's section list is read in pages of `ref_limit` slots. The upstream
//! reports the list's `total`, and pages are requested until every slot has
//! been seen, so long pages are never cut short.

use std::time::Duration;

use cms_pages_types::{ChildRef, ContentType, ShellDocument};
use cms_transport::{ContentSource, GraphQLResponse};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::UpstreamError;
use crate::query;
use crate::upstream;

const PAGE_COLLECTION: &str = "pageCollection";

/// One page of a shell's section list.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellPage {
    /// References in this page, positioned relative to the whole list.
    pub shell: ShellDocument,
    /// Slots in this page, null and unknown ones included.
    pub slots: usize,
    /// Slots in the whole list, when the upstream reports it.
    pub total: Option<usize>,
}

/// Fetch the shell for `(slug, locale)`. `Ok(None)` means no such page.
pub async fn fetch_shell(
    source: &dyn ContentSource,
    slug: &str,
    locale: &str,
    preview: bool,
    ref_limit: usize,
    timeout: Duration,
) -> Result<Option<ShellDocument>, UpstreamError> {
    let page_size = ref_limit.max(1);
    let mut shell: Option<ShellDocument> = None;
    let mut seen = 0;

    loop {
        let request = query::shell_request(slug, locale, preview, page_size, seen);
        let (operation, response) = upstream::execute(source, request, timeout).await?;

        let Some(page) = parse_shell_response(&operation, slug, locale, seen, &response)? else {
            return match shell {
                None => Ok(None),
                Some(_) => Err(UpstreamError::malformed(
                    &operation,
                    format!("page disappeared after {seen} sections"),
                )),
            };
        };

        let ShellPage {
            shell: chunk,
            slots,
            total,
        } = page;
        seen += slots;
        let total = total.unwrap_or(seen);
        shell = Some(match shell.take() {
            None => chunk,
            Some(mut acc) => {
                acc.ordered_refs.extend(chunk.ordered_refs);
                acc
            }
        });

        if seen >= total {
            return Ok(shell);
        }
        if slots == 0 {
            return Err(UpstreamError::malformed(
                &operation,
                format!("section list ended at {seen} of {total}"),
            ));
        }
        debug!(slug, seen, total, "fetching next page of sections");
    }
}

/// Parse one shell response whose section list starts at `skip`.
///
/// Null section slots (links the shell itself could not resolve) and sections
/// of unknown content types are skipped, but still consume a position.
pub fn parse_shell_response(
    operation: &str,
    slug: &str,
    locale: &str,
    skip: usize,
    response: &GraphQLResponse,
) -> Result<Option<ShellPage>, UpstreamError> {
    upstream::check_hard_errors(operation, response)?;

    let Some(pages) = response.collection_items(PAGE_COLLECTION) else {
        return Err(UpstreamError::malformed(
            operation,
            "missing pageCollection.items",
        ));
    };

    let Some(page) = pages.iter().find(|p| !p.is_null()) else {
        return Ok(None);
    };

    let id = page
        .get("sys")
        .and_then(|s| s.get("id"))
        .and_then(Value::as_str)
        .ok_or_else(|| UpstreamError::malformed(operation, "page without sys.id"))?;

    let collection = page.get("sectionsCollection");
    let total = collection
        .and_then(|c| c.get("total"))
        .and_then(Value::as_u64)
        .map(|t| t as usize);
    let sections = collection
        .and_then(|c| c.get("items"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut ordered_refs = Vec::with_capacity(sections.len());
    for (offset, slot) in sections.iter().enumerate() {
        let position = skip + offset;
        if slot.is_null() {
            debug!(slug, position, "skipping unresolvable section link");
            continue;
        }
        let typename = slot.get("__typename").and_then(Value::as_str);
        let section_id = slot
            .get("sys")
            .and_then(|s| s.get("id"))
            .and_then(Value::as_str);

        match (typename.and_then(ContentType::from_typename), section_id) {
            (Some(content_type), Some(section_id)) => {
                ordered_refs.push(ChildRef::new(content_type, section_id, position));
            }
            (None, _) => warn!(
                slug,
                position,
                typename = typename.unwrap_or("<missing>"),
                "skipping section with unknown content type"
            ),
            (Some(content_type), None) => warn!(
                slug,
                position,
                %content_type,
                "skipping section without sys.id"
            ),
        }
    }

    Ok(Some(ShellPage {
        shell: ShellDocument {
            id: id.to_string(),
            slug: page
                .get("slug")
                .and_then(Value::as_str)
                .unwrap_or(slug)
                .to_string(),
            locale: locale.to_string(),
            ordered_refs,
        },
        slots: sections.len(),
        total,
    }))
}
