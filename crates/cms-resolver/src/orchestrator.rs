//! Page resolution.
//!
//! [`PageResolver`] is the only component that performs I/O and the only one
//! holding state, and that state lives for a single call:
//!
//! 1. fetch the page shell (`None` -> [`ResolveError::NotFound`])
//! 2. index the shell's references by content type
//! 3. plan each type's id set into sub-batches under the [`BatchBudget`](crate::BatchBudget)
//! 4. run every `(type, sub-batch)` request concurrently and join
//! 5. assemble the items in shell order
//!
//! The first [`UpstreamError`] from any batch ends the call. Batches that are
//! still pending at that point are dropped, which cancels them.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Instant;

use cms_pages_types::{AssembledDocument, ContentType, ResolvedEntity, ShellDocument, TypeBatch};
use cms_transport::ContentSource;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use tracing::{debug, info};

use crate::assembler::assemble;
use crate::cache::RequestCache;
use crate::config::ResolverConfig;
use crate::error::{ResolveError, UpstreamError};
use crate::indexer;
use crate::planner::plan_with_budget;
use crate::query;
use crate::shell::fetch_shell;
use crate::type_resolver::TypeResolver;

/// Sub-batches planned for one content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypePlan {
    pub content_type: ContentType,
    /// Distinct ids referenced by the page.
    pub ids: usize,
    pub batches: Vec<Vec<String>>,
}

/// What resolving a page would fetch, without fetching it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchPlan {
    pub page_id: String,
    pub slug: String,
    pub locale: String,
    /// References in the shell, duplicates included.
    pub refs: usize,
    pub types: Vec<TypePlan>,
}

impl FetchPlan {
    /// Number of type-batch requests the plan issues.
    pub fn batch_count(&self) -> usize {
        self.types.iter().map(|t| t.batches.len()).sum()
    }
}

/// Counters for one resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolveStats {
    pub refs: usize,
    pub distinct_types: usize,
    pub batches: usize,
    pub resolved: usize,
    pub dropped: usize,
    pub elapsed_ms: u64,
}

/// Resolves pages against a [`ContentSource`].
///
/// Cheap to clone; concurrent calls for different pages share nothing but the
/// source.
#[derive(Clone)]
pub struct PageResolver {
    source: Arc<dyn ContentSource>,
    config: ResolverConfig,
}

impl PageResolver {
    pub fn new(source: Arc<dyn ContentSource>, config: ResolverConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Assemble the page `slug` in `locale`.
    pub async fn resolve_document(
        &self,
        slug: &str,
        locale: &str,
    ) -> Result<AssembledDocument, ResolveError> {
        self.resolve_document_with_stats(slug, locale)
            .await
            .map(|(document, _)| document)
    }

    /// [`resolve_document`](Self::resolve_document), also returning counters.
    #[tracing::instrument(skip(self), fields(preview = self.config.preview))]
    pub async fn resolve_document_with_stats(
        &self,
        slug: &str,
        locale: &str,
    ) -> Result<(AssembledDocument, ResolveStats), ResolveError> {
        let started = Instant::now();

        let shell = self.shell(slug, locale).await?;
        let plan = self.plan_shell(&shell);
        let cache = self.fetch(&plan, locale).await?;
        let batches = cache.batches();
        let result = cache.into_result();

        for ((content_type, id), positions) in indexer::positions(&shell.ordered_refs) {
            if !result.contains(content_type, id) {
                debug!(%content_type, id, ?positions, "dropping unresolved reference");
            }
        }

        let items = assemble(&shell.ordered_refs, &result);
        let stats = ResolveStats {
            refs: shell.ordered_refs.len(),
            distinct_types: plan.types.len(),
            batches,
            resolved: items.len(),
            dropped: shell.ordered_refs.len() - items.len(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            page_id = %shell.id,
            refs = stats.refs,
            types = stats.distinct_types,
            batches = stats.batches,
            resolved = stats.resolved,
            dropped = stats.dropped,
            elapsed_ms = stats.elapsed_ms,
            "resolved page"
        );

        let document = AssembledDocument {
            id: shell.id,
            slug: shell.slug,
            locale: shell.locale,
            items,
        };
        Ok((document, stats))
    }

    /// Fetch the shell and plan its batches without fetching any entries.
    pub async fn plan_document(&self, slug: &str, locale: &str) -> Result<FetchPlan, ResolveError> {
        let shell = self.shell(slug, locale).await?;
        Ok(self.plan_shell(&shell))
    }

    async fn shell(&self, slug: &str, locale: &str) -> Result<ShellDocument, ResolveError> {
        fetch_shell(
            self.source.as_ref(),
            slug,
            locale,
            self.config.preview,
            self.config.shell_ref_limit,
            self.config.request_timeout,
        )
        .await?
        .ok_or_else(|| ResolveError::NotFound {
            slug: slug.to_string(),
            locale: locale.to_string(),
        })
    }

    fn plan_shell(&self, shell: &ShellDocument) -> FetchPlan {
        let types = indexer::type_batches(&shell.ordered_refs)
            .into_iter()
            .map(|TypeBatch { content_type, ids }| {
                let base_bytes =
                    query::type_request_base_bytes(content_type, &shell.locale, self.config.preview);
                TypePlan {
                    content_type,
                    ids: ids.len(),
                    batches: plan_with_budget(&ids, &self.config.budget, base_bytes),
                }
            })
            .collect();

        FetchPlan {
            page_id: shell.id.clone(),
            slug: shell.slug.clone(),
            locale: shell.locale.clone(),
            refs: shell.ordered_refs.len(),
            types,
        }
    }

    /// Run every planned batch, at most `fetch_concurrency` at a time.
    async fn fetch(
        &self,
        plan: &FetchPlan,
        locale: &str,
    ) -> Result<RequestCache, UpstreamError> {
        let resolvers: BTreeMap<ContentType, TypeResolver> = plan
            .types
            .iter()
            .map(|t| {
                let resolver = TypeResolver::new(t.content_type, self.source.clone())
                    .with_timeout(self.config.request_timeout);
                (t.content_type, resolver)
            })
            .collect();

        let jobs = plan.types.iter().flat_map(|t| {
            t.batches
                .iter()
                .map(move |batch| (t.content_type, batch.as_slice()))
        });

        let preview = self.config.preview;
        let resolvers = &resolvers;
        let batches: Vec<(ContentType, HashMap<String, ResolvedEntity>)> = stream::iter(jobs)
            .map(move |(content_type, batch)| async move {
                let resolver = &resolvers[&content_type];
                let resolved = resolver.resolve(batch, locale, preview).await?;
                Ok::<_, UpstreamError>((content_type, resolved))
            })
            .buffer_unordered(self.config.fetch_concurrency.max(1))
            .try_collect()
            .await?;

        let mut cache = RequestCache::new();
        for (content_type, resolved) in batches {
            cache.record(content_type, resolved);
        }
        Ok(cache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cms_transport::InMemorySource;
    use serde_json::json;

    #[tokio::test]
    async fn test_plan_document_issues_only_the_shell_request() {
        let source = Arc::new(
            InMemorySource::new()
                .with_page(
                    "p1",
                    "home",
                    "en-US",
                    &[
                        ("ComponentCta", "a1"),
                        ("ComponentList", "b1"),
                        ("ComponentCta", "a1"),
                    ],
                )
                .with_entry(ContentType::CallToAction, "a1", json!({})),
        );
        let resolver = PageResolver::new(source.clone(), ResolverConfig::default());

        let plan = resolver.plan_document("home", "en-US").await.unwrap();

        assert_eq!(plan.refs, 3);
        assert_eq!(plan.batch_count(), 2);
        assert_eq!(plan.types[0].content_type, ContentType::CallToAction);
        assert_eq!(plan.types[0].batches, vec![vec!["a1".to_string()]]);
        assert_eq!(source.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_stats_count_dropped_references() {
        let source = Arc::new(
            InMemorySource::new()
                .with_page(
                    "p1",
                    "home",
                    "en-US",
                    &[("ComponentCta", "a1"), ("ComponentCta", "gone")],
                )
                .with_entry(ContentType::CallToAction, "a1", json!({ "headline": "Hi" })),
        );
        let resolver = PageResolver::new(source, ResolverConfig::default());

        let (document, stats) = resolver
            .resolve_document_with_stats("home", "en-US")
            .await
            .unwrap();

        assert_eq!(document.items.len(), 1);
        assert_eq!(stats.refs, 2);
        assert_eq!(stats.distinct_types, 1);
        assert_eq!(stats.batches, 1);
        assert_eq!(stats.resolved, 1);
        assert_eq!(stats.dropped, 1);
    }

    #[tokio::test]
    async fn test_zero_concurrency_still_makes_progress() {
        let source = Arc::new(
            InMemorySource::new()
                .with_page("p1", "home", "en-US", &[("ComponentTextBlock", "t1")])
                .with_entry(ContentType::RichText, "t1", json!({})),
        );
        let resolver =
            PageResolver::new(source, ResolverConfig::default().with_fetch_concurrency(0));

        let document = resolver.resolve_document("home", "en-US").await.unwrap();
        assert_eq!(document.items.len(), 1);
    }
}
