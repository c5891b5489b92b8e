//! GraphQL query builders.
//!
//! Queries are static text; everything that varies (slug, ids, locale,
//! preview) travels in `variables`, so the query body size is known up front
//! and the batch planner only has to account for the id list.

use cms_pages_types::ContentType;
use cms_transport::{operations, GraphQLRequest};
use serde_json::json;

const SHELL_QUERY: &str = r#"
query PageShell($slug: String!, $locale: String, $preview: Boolean, $refLimit: Int, $refSkip: Int) {
  pageCollection(where: { slug: $slug }, locale: $locale, preview: $preview, limit: 1) {
    items {
      sys { id }
      slug
      sectionsCollection(limit: $refLimit, skip: $refSkip) {
        total
        items {
          __typename
          ... on Entry { sys { id } }
        }
      }
    }
  }
}
"#;

/// Fields requested for a full record of each content type.
pub fn field_selection(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::HeroBanner => {
            "internalName headline bodyText { json } ctaText targetPage { slug } \
             image { url title width height } imageStyle heroSize colorPalette"
        }
        ContentType::CallToAction => {
            "internalName headline subline { json } ctaText urlParameters \
             targetPage { slug } colorPalette"
        }
        ContentType::ItemList => {
            "internalName title \
             itemsCollection(limit: 20) { items { ... on ComponentListItem { title description } } }"
        }
        ContentType::PageGroup => {
            "internalName title \
             pagesCollection(limit: 20) { items { ... on Page { slug pageName } } }"
        }
        ContentType::RichText => "internalName headline subline body { json }",
    }
}

/// Full query text for a batch of one content type.
pub fn type_query(content_type: ContentType) -> String {
    format!(
        "query {operation}($ids: [String], $locale: String, $preview: Boolean, $limit: Int) {{\n  \
         {collection}(where: {{ sys: {{ id_in: $ids }} }}, locale: $locale, preview: $preview, limit: $limit) {{\n    \
         items {{ __typename sys {{ id }} {fields} }}\n  }}\n}}\n",
        operation = operations::resolve_type(content_type),
        collection = content_type.collection_field(),
        fields = field_selection(content_type),
    )
}

/// Request for one page of a shell's section list, starting at `ref_skip`.
pub fn shell_request(
    slug: &str,
    locale: &str,
    preview: bool,
    ref_limit: usize,
    ref_skip: usize,
) -> GraphQLRequest {
    GraphQLRequest::new(SHELL_QUERY)
        .with_operation_name(operations::PAGE_SHELL)
        .with_variables(json!({
            "slug": slug,
            "locale": locale,
            "preview": preview,
            "refLimit": ref_limit,
            "refSkip": ref_skip,
        }))
}

/// Request for full records of `ids`, all of `content_type`.
pub fn type_request(
    content_type: ContentType,
    ids: &[String],
    locale: &str,
    preview: bool,
) -> GraphQLRequest {
    GraphQLRequest::new(type_query(content_type))
        .with_operation_name(operations::resolve_type(content_type))
        .with_variables(json!({
            "ids": ids,
            "locale": locale,
            "preview": preview,
            "limit": ids.len(),
        }))
}

/// Encoded size of a type request with an empty id list.
pub fn type_request_base_bytes(content_type: ContentType, locale: &str, preview: bool) -> usize {
    type_request(content_type, &[], locale, preview).encoded_len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_query_targets_one_collection() {
        for ty in ContentType::ALL {
            let query = type_query(ty);
            assert!(query.contains(ty.collection_field()));
            assert!(query.starts_with(&format!("query Resolve{}(", ty.typename())));
            let others = ContentType::ALL
                .iter()
                .filter(|other| **other != ty)
                .filter(|other| query.contains(other.collection_field()))
                .count();
            assert_eq!(others, 0, "{ty} query mentions another collection");
        }
    }

    #[test]
    fn test_type_request_variables() {
        let ids = vec!["a1".to_string(), "a2".to_string()];
        let request = type_request(ContentType::CallToAction, &ids, "en-US", true);

        assert_eq!(request.operation_name.as_deref(), Some("ResolveComponentCta"));
        assert_eq!(request.str_list_variable("ids"), ids);
        assert_eq!(request.variables["limit"], 2);
        assert!(request.bool_variable("preview"));
    }

    #[test]
    fn test_shell_request_variables() {
        let request = shell_request("home", "de-DE", false, 100, 200);
        assert_eq!(request.operation_name.as_deref(), Some("PageShell"));
        assert_eq!(request.str_variable("slug"), Some("home"));
        assert_eq!(request.variables["refLimit"], 100);
        assert_eq!(request.variables["refSkip"], 200);
        assert!(request.query.contains("total"));
    }

    #[test]
    fn test_base_bytes_fit_default_budget() {
        for ty in ContentType::ALL {
            let base = type_request_base_bytes(ty, "en-US", false);
            assert!(base > 0 && base < 2048, "{ty}: {base} bytes");
        }
    }
}
