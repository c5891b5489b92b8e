//! Order-preserving assembly.

use cms_pages_types::{ChildRef, ResolutionResult, ResolvedEntity};

/// Rebuild the page's item list in author order.
///
/// Each reference is looked up in `result`; hits are emitted (tagged with
/// their `__typename` if the payload lacks one), misses are skipped silently;
/// the caller logs them once per distinct reference. The same
/// entity referenced at several positions is emitted at each of them.
pub fn assemble(ordered_refs: &[ChildRef], result: &ResolutionResult) -> Vec<ResolvedEntity> {
    let mut items = Vec::with_capacity(ordered_refs.len());
    for r in ordered_refs {
        if let Some(entity) = result.get(r.content_type, &r.id) {
            let mut entity = entity.clone();
            entity.ensure_typename();
            items.push(entity);
        }
    }
    items
}
