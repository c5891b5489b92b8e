//! GraphQL payloads for the content delivery API.
//!
//! The upstream answers every query with `{ data, errors }`. Errors come in two
//! flavours that callers must tell apart:
//!
//! - **Unresolvable link** - a referenced entry exists but cannot be returned
//!   (draft, archived, deleted, missing in this locale). The rest of the payload
//!   is still valid.
//! - **Everything else** - bad query, auth, rate limit, query too large. The
//!   payload cannot be trusted.
//!
//! [`GraphQLResponse::hard_errors`] and [`GraphQLResponse::link_errors`] split a
//! response along that line.

use cms_pages_types::ContentType;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Error code the upstream uses for links it cannot resolve.
pub const UNRESOLVABLE_LINK_CODE: &str = "UNRESOLVABLE_LINK";

/// Operation names shared by query builders and sources that dispatch on them.
pub mod operations {
    use super::ContentType;

    /// Shell fetch: a page's identity and its ordered, unresolved section list.
    pub const PAGE_SHELL: &str = "PageShell";

    const RESOLVE_PREFIX: &str = "Resolve";

    /// Batch fetch of full records for one content type.
    pub fn resolve_type(content_type: ContentType) -> String {
        format!("{}{}", RESOLVE_PREFIX, content_type.typename())
    }

    /// Inverse of [`resolve_type`].
    pub fn parse_resolve_type(operation: &str) -> Option<ContentType> {
        operation
            .strip_prefix(RESOLVE_PREFIX)
            .and_then(ContentType::from_typename)
    }
}

/// A single GraphQL request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    #[serde(default)]
    pub variables: Value,
}

impl GraphQLRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            operation_name: None,
            variables: Value::Null,
        }
    }

    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    pub fn with_variables(mut self, variables: Value) -> Self {
        self.variables = variables;
        self
    }

    /// Read a boolean variable, `false` when absent.
    pub fn bool_variable(&self, name: &str) -> bool {
        self.variables
            .get(name)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Read a string variable.
    pub fn str_variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).and_then(Value::as_str)
    }

    /// Read a list-of-strings variable. Non-string elements are skipped.
    pub fn str_list_variable(&self, name: &str) -> Vec<String> {
        self.variables
            .get(name)
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Size of the serialized request body in bytes.
    pub fn encoded_len(&self) -> usize {
        serde_json::to_vec(self).map(|b| b.len()).unwrap_or(0)
    }
}

/// How a GraphQL error affects the rest of the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphQLErrorKind {
    /// The referenced entry cannot be returned; other data is still valid.
    UnresolvableLink,
    /// Any other failure.
    Other,
}

/// One entry of a response's `errors` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQLError {
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_empty")]
    pub path: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl GraphQLError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Vec::new(),
            extensions: None,
        }
    }

    /// Build an unresolvable-link error for an entry id.
    pub fn unresolvable_link(id: &str) -> Self {
        Self {
            message: format!("Query cannot be executed. The link \"{id}\" cannot be resolved"),
            path: Vec::new(),
            extensions: Some(serde_json::json!({
                "contentful": {
                    "code": UNRESOLVABLE_LINK_CODE,
                    "details": { "type": "Entry", "linkId": id }
                }
            })),
        }
    }

    /// The machine-readable error code, if the upstream sent one.
    ///
    /// Looks at `extensions.contentful.code` first, then `extensions.code`.
    pub fn code(&self) -> Option<&str> {
        let ext = self.extensions.as_ref()?;
        ext.get("contentful")
            .and_then(|c| c.get("code"))
            .or_else(|| ext.get("code"))
            .and_then(Value::as_str)
    }

    pub fn kind(&self) -> GraphQLErrorKind {
        match self.code() {
            Some(UNRESOLVABLE_LINK_CODE) => GraphQLErrorKind::UnresolvableLink,
            _ => GraphQLErrorKind::Other,
        }
    }

    pub fn is_unresolvable_link(&self) -> bool {
        self.kind() == GraphQLErrorKind::UnresolvableLink
    }

    /// Id of the entry an unresolvable-link error points at.
    pub fn link_id(&self) -> Option<&str> {
        self.extensions
            .as_ref()?
            .get("contentful")?
            .get("details")?
            .get("linkId")?
            .as_str()
    }
}

/// A full `{ data, errors }` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQLResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_empty")]
    pub errors: Vec<GraphQLError>,
}

impl GraphQLResponse {
    pub fn from_data(data: Value) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
        }
    }

    pub fn from_errors(errors: Vec<GraphQLError>) -> Self {
        Self { data: None, errors }
    }

    pub fn with_error(mut self, error: GraphQLError) -> Self {
        self.errors.push(error);
        self
    }

    /// Errors that invalidate the payload.
    pub fn hard_errors(&self) -> impl Iterator<Item = &GraphQLError> {
        self.errors.iter().filter(|e| !e.is_unresolvable_link())
    }

    /// Errors that only mark individual references as unavailable.
    pub fn link_errors(&self) -> impl Iterator<Item = &GraphQLError> {
        self.errors.iter().filter(|e| e.is_unresolvable_link())
    }

    /// True if any error is not an unresolvable link.
    ///
    /// A mix of link errors and other errors counts as a hard failure.
    pub fn has_hard_errors(&self) -> bool {
        self.hard_errors().next().is_some()
    }

    /// Look up `data.<field>.items` as a slice. Missing or non-array yields `None`.
    pub fn collection_items(&self, field: &str) -> Option<&Vec<Value>> {
        self.data
            .as_ref()?
            .get(field)?
            .get("items")?
            .as_array()
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
