//! Request-scoped result accumulator.
//!
//! A [`RequestCache`] lives for exactly one `resolve_document` call and
//! collects what each finished sub-batch returned. It is owned by the call,
//! never stored on the resolver, and so never leaks between pages.

use std::collections::HashMap;

use cms_pages_types::{ContentType, ResolutionResult, ResolvedEntity};

#[derive(Debug, Default)]
pub struct RequestCache {
    result: ResolutionResult,
    batches: usize,
}

impl RequestCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one finished sub-batch.
    pub fn record(&mut self, content_type: ContentType, resolved: HashMap<String, ResolvedEntity>) {
        self.batches += 1;
        self.result.extend_type(content_type, resolved);
    }

    /// Sub-batches merged so far.
    pub fn batches(&self) -> usize {
        self.batches
    }

    pub fn result(&self) -> &ResolutionResult {
        &self.result
    }

    pub fn into_result(self) -> ResolutionResult {
        self.result
    }
}
