//! Fixture-backed content source.
//!
//! [`InMemorySource`] answers the same operations as the live API from a fixed
//! set of pages and entries. The CLI uses it for offline runs (`--fixture`),
//! and tests use it to script upstream behaviour: failures per operation,
//! artificial latency, and a log of every request received.
//!
//! Entry lookups behave like the live API for unpublished content: an id
//! with no entry is reported as an unresolvable link and left out of `items`.
//!
//! # Fixture format
//!
//! ```json
//! {
//!   "pages": [
//!     { "id": "p1", "slug": "home", "locale": "en-US",
//!       "sections": [ { "__typename": "ComponentCta", "id": "a1" }, null ] }
//!   ],
//!   "entries": [
//!     { "__typename": "ComponentCta", "id": "a1", "fields": { "headline": "Hi" } }
//!   ]
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use cms_pages_types::ContentType;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::error::{ConfigError, TransportError};
use crate::graphql::{operations, GraphQLError, GraphQLRequest, GraphQLResponse};
use crate::source::ContentSource;

/// One slot in a page's section list.
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureRef {
    #[serde(rename = "__typename")]
    pub typename: String,
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixturePage {
    pub id: String,
    pub slug: String,
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Ordered section slots. `None` models a link the shell itself could not
    /// resolve.
    #[serde(default)]
    pub sections: Vec<Option<FixtureRef>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureEntry {
    #[serde(rename = "__typename")]
    pub content_type: ContentType,
    pub id: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct Fixture {
    #[serde(default)]
    pages: Vec<FixturePage>,
    #[serde(default)]
    entries: Vec<FixtureEntry>,
}

fn default_locale() -> String {
    "en-US".to_string()
}

/// Scripted reaction to an operation.
#[derive(Debug, Clone)]
pub enum Failure {
    /// Answer with a GraphQL error that is not an unresolvable link.
    GraphQL(String),
    /// Fail without a payload.
    Transport(TransportError),
    /// Answer normally, then append a GraphQL error that is not an
    /// unresolvable link.
    Partial(String),
}

/// In-memory [`ContentSource`].
#[derive(Debug, Default)]
pub struct InMemorySource {
    pages: HashMap<(String, String), FixturePage>,
    entries: HashMap<(ContentType, String), Map<String, Value>>,
    failures: HashMap<String, Failure>,
    delay: Option<Duration>,
    log: Mutex<Vec<GraphQLRequest>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a source from fixture JSON.
    pub fn from_fixture_json(raw: &str) -> Result<Self, ConfigError> {
        let fixture: Fixture =
            serde_json::from_str(raw).map_err(|e| ConfigError::Fixture(e.to_string()))?;
        let mut source = Self::new();
        for page in fixture.pages {
            source.insert_page(page);
        }
        for entry in fixture.entries {
            source
                .entries
                .insert((entry.content_type, entry.id), entry.fields);
        }
        Ok(source)
    }

    /// Build a source from a fixture file.
    pub fn from_fixture_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Fixture(format!("{}: {}", path.display(), e)))?;
        Self::from_fixture_json(&raw)
    }

    /// Add a page whose sections are all present. Each section is `(typename, id)`.
    pub fn with_page(self, id: &str, slug: &str, locale: &str, sections: &[(&str, &str)]) -> Self {
        let slots = sections.iter().map(|s| Some(*s)).collect::<Vec<_>>();
        self.with_page_slots(id, slug, locale, &slots)
    }

    /// Add a page whose section list may contain unresolvable (`None`) slots.
    pub fn with_page_slots(
        mut self,
        id: &str,
        slug: &str,
        locale: &str,
        sections: &[Option<(&str, &str)>],
    ) -> Self {
        self.insert_page(FixturePage {
            id: id.to_string(),
            slug: slug.to_string(),
            locale: locale.to_string(),
            sections: sections
                .iter()
                .map(|slot| {
                    slot.map(|(typename, id)| FixtureRef {
                        typename: typename.to_string(),
                        id: id.to_string(),
                    })
                })
                .collect(),
        });
        self
    }

    /// Add a published entry. `fields` should be a JSON object.
    pub fn with_entry(mut self, content_type: ContentType, id: &str, fields: Value) -> Self {
        let fields = match fields {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.entries.insert((content_type, id.to_string()), fields);
        self
    }

    /// Make every request for `operation` fail.
    pub fn with_failure(mut self, operation: &str, failure: Failure) -> Self {
        self.failures.insert(operation.to_string(), failure);
        self
    }

    /// Delay every response.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn insert_page(&mut self, page: FixturePage) {
        self.pages
            .insert((page.slug.clone(), page.locale.clone()), page);
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<GraphQLRequest> {
        self.log.lock().clone()
    }

    /// Requests received for one operation.
    pub fn requests_for(&self, operation: &str) -> Vec<GraphQLRequest> {
        self.log
            .lock()
            .iter()
            .filter(|r| r.operation_name.as_deref() == Some(operation))
            .cloned()
            .collect()
    }

    /// Highest number of requests that were in progress at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn answer(&self, request: &GraphQLRequest) -> Result<GraphQLResponse, TransportError> {
        let operation = request.operation_name.as_deref().unwrap_or_default();

        let partial = match self.failures.get(operation) {
            Some(Failure::GraphQL(message)) => {
                return Ok(GraphQLResponse::from_errors(vec![GraphQLError::new(
                    message.clone(),
                )]))
            }
            Some(Failure::Transport(err)) => return Err(err.clone()),
            Some(Failure::Partial(message)) => Some(message),
            None => None,
        };

        let response = self.answer_operation(operation, request);
        Ok(match partial {
            Some(message) => response.with_error(GraphQLError::new(message.clone())),
            None => response,
        })
    }

    fn answer_operation(&self, operation: &str, request: &GraphQLRequest) -> GraphQLResponse {
        if operation == operations::PAGE_SHELL {
            return self.answer_shell(request);
        }

        match operations::parse_resolve_type(operation) {
            Some(content_type) => self.answer_type(content_type, request),
            None => GraphQLResponse::from_errors(vec![GraphQLError::new(format!(
                "Unknown operation: {operation}"
            ))]),
        }
    }

    fn answer_shell(&self, request: &GraphQLRequest) -> GraphQLResponse {
        let slug = request.str_variable("slug").unwrap_or_default();
        let locale = request.str_variable("locale").unwrap_or_default();
        let limit = request
            .variables
            .get("refLimit")
            .and_then(Value::as_u64)
            .map(|l| l as usize)
            .unwrap_or(usize::MAX);
        let skip = request
            .variables
            .get("refSkip")
            .and_then(Value::as_u64)
            .map(|s| s as usize)
            .unwrap_or(0);

        let Some(page) = self.pages.get(&(slug.to_string(), locale.to_string())) else {
            return GraphQLResponse::from_data(json!({ "pageCollection": { "items": [] } }));
        };

        let mut errors = Vec::new();
        let sections: Vec<Value> = page
            .sections
            .iter()
            .skip(skip)
            .take(limit)
            .enumerate()
            .map(|(index, slot)| match slot {
                Some(r) => json!({ "__typename": r.typename, "sys": { "id": r.id } }),
                None => {
                    let link_id = format!("{}-slot-{}", page.id, skip + index);
                    let mut err = GraphQLError::unresolvable_link(&link_id);
                    err.path = vec![
                        json!("pageCollection"),
                        json!("items"),
                        json!(0),
                        json!("sectionsCollection"),
                        json!("items"),
                        json!(index),
                    ];
                    errors.push(err);
                    Value::Null
                }
            })
            .collect();

        let mut response = GraphQLResponse::from_data(json!({
            "pageCollection": {
                "items": [{
                    "sys": { "id": page.id },
                    "slug": page.slug,
                    "sectionsCollection": {
                        "total": page.sections.len(),
                        "items": sections
                    }
                }]
            }
        }));
        response.errors = errors;
        response
    }

    fn answer_type(&self, content_type: ContentType, request: &GraphQLRequest) -> GraphQLResponse {
        let mut items = Vec::new();
        let mut errors = Vec::new();

        for id in request.str_list_variable("ids") {
            match self.entries.get(&(content_type, id.clone())) {
                Some(fields) => {
                    let mut item = fields.clone();
                    item.insert("__typename".into(), json!(content_type.typename()));
                    item.insert("sys".into(), json!({ "id": id }));
                    items.push(Value::Object(item));
                }
                None => errors.push(GraphQLError::unresolvable_link(&id)),
            }
        }

        let mut data = Map::new();
        data.insert(
            content_type.collection_field().to_string(),
            json!({ "items": items }),
        );
        GraphQLResponse {
            data: Some(Value::Object(data)),
            errors,
        }
    }
}

/// Keeps the in-flight counter balanced even when the request future is dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ContentSource for InMemorySource {
    async fn execute(&self, request: GraphQLRequest) -> Result<GraphQLResponse, TransportError> {
        self.log.lock().push(request.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.answer(&request)
    }
}
