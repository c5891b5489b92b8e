//! Page shells, child references and resolved content.
//!
//! ## Lifecycle
//!
//! All of these values are built for a single resolution call and dropped
//! once the assembled page has been handed to the renderer. Nothing here is
//! persisted or shared between calls.
//!
//! ```text
//! ShellDocument ──index──▶ TypeBatch (per type) ──fetch──▶ ResolutionResult
//!       │                                                        │
//!       └──────────────── ordered_refs ──────── assemble ◀───────┘
//!                                                  │
//!                                                  ▼
//!                                          AssembledDocument
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap};

use crate::content_type::ContentType;

/// Field carrying the GraphQL type discriminator in a resolved record.
pub const TYPENAME_FIELD: &str = "__typename";

/// A typed pointer from a page shell into a full content record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChildRef {
    pub content_type: ContentType,
    pub id: String,
    /// 0-based index in the author-defined section list.
    pub position: usize,
}

impl ChildRef {
    pub fn new(content_type: ContentType, id: impl Into<String>, position: usize) -> Self {
        Self {
            content_type,
            id: id.into(),
            position,
        }
    }
}

/// Minimal top-level fetch of a page: identity plus its ordered references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellDocument {
    pub id: String,
    pub slug: String,
    pub locale: String,
    pub ordered_refs: Vec<ChildRef>,
}

/// Deduplicated id set for one content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeBatch {
    pub content_type: ContentType,
    pub ids: BTreeSet<String>,
}

/// A full content record as returned by the upstream.
///
/// The type tag comes from the request that produced the record, since a
/// batch response is an untyped list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedEntity {
    pub content_type: ContentType,
    pub id: String,
    pub fields: Map<String, Value>,
}

impl ResolvedEntity {
    pub fn new(content_type: ContentType, id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            content_type,
            id: id.into(),
            fields,
        }
    }

    /// Get a top-level field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// The `__typename` carried in the payload, if any.
    pub fn typename(&self) -> Option<&str> {
        self.fields.get(TYPENAME_FIELD).and_then(|v| v.as_str())
    }

    /// Make sure the payload carries its type discriminator.
    ///
    /// An existing `__typename` is left untouched.
    pub fn ensure_typename(&mut self) {
        if self.typename().is_none() {
            self.fields.insert(
                TYPENAME_FIELD.to_string(),
                Value::String(self.content_type.typename().to_string()),
            );
        }
    }
}

/// Joined output of every type fetch for one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolutionResult {
    pub by_type: HashMap<ContentType, HashMap<String, ResolvedEntity>>,
}

impl ResolutionResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a resolved record.
    pub fn get(&self, content_type: ContentType, id: &str) -> Option<&ResolvedEntity> {
        self.by_type.get(&content_type).and_then(|m| m.get(id))
    }

    pub fn contains(&self, content_type: ContentType, id: &str) -> bool {
        self.get(content_type, id).is_some()
    }

    /// Insert one record under its own content type.
    pub fn insert(&mut self, entity: ResolvedEntity) {
        self.by_type
            .entry(entity.content_type)
            .or_default()
            .insert(entity.id.clone(), entity);
    }

    /// Union a batch of records for one type into the result.
    pub fn extend_type(
        &mut self,
        content_type: ContentType,
        entities: impl IntoIterator<Item = (String, ResolvedEntity)>,
    ) {
        self.by_type.entry(content_type).or_default().extend(entities);
    }

    /// Total number of resolved records across all types.
    pub fn len(&self) -> usize {
        self.by_type.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The final, ordered page handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssembledDocument {
    pub id: String,
    pub slug: String,
    pub locale: String,
    pub items: Vec<ResolvedEntity>,
}

impl AssembledDocument {
    /// A page with a valid shell but no resolved content.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_ensure_typename_inserts_when_missing() {
        let mut entity = ResolvedEntity::new(
            ContentType::ItemList,
            "b1",
            fields(json!({ "title": "Services" })),
        );
        assert_eq!(entity.typename(), None);

        entity.ensure_typename();
        assert_eq!(entity.typename(), Some("ComponentList"));
    }

    #[test]
    fn test_ensure_typename_keeps_existing_value() {
        let mut entity = ResolvedEntity::new(
            ContentType::CallToAction,
            "a1",
            fields(json!({ "__typename": "ComponentCta", "headline": "Talk to us" })),
        );
        entity.ensure_typename();
        assert_eq!(entity.typename(), Some("ComponentCta"));
        assert_eq!(entity.fields.len(), 2);
    }

    #[test]
    fn test_resolution_result_lookup_is_per_type() {
        let mut result = ResolutionResult::new();
        result.insert(ResolvedEntity::new(ContentType::CallToAction, "x", Map::new()));

        assert!(result.contains(ContentType::CallToAction, "x"));
        assert!(!result.contains(ContentType::ItemList, "x"));
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_extend_type_unions_batches() {
        let mut result = ResolutionResult::new();
        let batch = |ids: &[&str]| {
            ids.iter()
                .map(|id| {
                    (
                        id.to_string(),
                        ResolvedEntity::new(ContentType::ItemList, *id, Map::new()),
                    )
                })
                .collect::<Vec<_>>()
        };

        result.extend_type(ContentType::ItemList, batch(&["a", "b"]));
        result.extend_type(ContentType::ItemList, batch(&["c"]));

        assert_eq!(result.len(), 3);
        assert!(!result.is_empty());
    }
}
