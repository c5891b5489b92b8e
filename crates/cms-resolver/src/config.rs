//! Resolver tuning.
//!
//! All values have defaults that fit the public delivery API and can be
//! overridden through `CMS_*` environment variables.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `CMS_MAX_IDS_PER_BATCH` | 50 |
//! | `CMS_MAX_REQUEST_BYTES` | 8192 |
//! | `CMS_FETCH_CONCURRENCY` | 16 |
//! | `CMS_REQUEST_TIMEOUT_SECS` | 30 |
//! | `CMS_SHELL_REF_LIMIT` | 200 |
//! | `CMS_PREVIEW` | false |

use std::time::Duration;

use cms_pages_types::env_utils::{env_bool_or, env_var_or};

/// Size limits for a single type-batch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchBudget {
    /// Most ids sent in one request.
    pub max_ids_per_batch: usize,
    /// Upper bound on the estimated request body size.
    pub max_request_bytes: usize,
}

impl BatchBudget {
    pub const DEFAULT_MAX_IDS: usize = 50;
    /// The delivery API rejects query bodies above 8 KiB.
    pub const DEFAULT_MAX_REQUEST_BYTES: usize = 8 * 1024;

    pub fn new(max_ids_per_batch: usize, max_request_bytes: usize) -> Self {
        Self {
            max_ids_per_batch,
            max_request_bytes,
        }
    }
}

impl Default for BatchBudget {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_IDS, Self::DEFAULT_MAX_REQUEST_BYTES)
    }
}

/// Configuration for [`PageResolver`](crate::PageResolver).
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub budget: BatchBudget,

    /// Maximum type-batch requests in flight at once for one page.
    pub fetch_concurrency: usize,

    /// Deadline for each individual upstream request.
    pub request_timeout: Duration,

    /// Section slots read per shell request. Longer lists take several requests.
    pub shell_ref_limit: usize,

    /// Fetch draft content through the preview token.
    pub preview: bool,
}

impl ResolverConfig {
    pub const DEFAULT_FETCH_CONCURRENCY: usize = 16;
    pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
    pub const DEFAULT_SHELL_REF_LIMIT: usize = 200;

    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            budget: BatchBudget::new(
                env_var_or("CMS_MAX_IDS_PER_BATCH", defaults.budget.max_ids_per_batch),
                env_var_or("CMS_MAX_REQUEST_BYTES", defaults.budget.max_request_bytes),
            ),
            fetch_concurrency: env_var_or("CMS_FETCH_CONCURRENCY", defaults.fetch_concurrency),
            request_timeout: Duration::from_secs(env_var_or(
                "CMS_REQUEST_TIMEOUT_SECS",
                Self::DEFAULT_REQUEST_TIMEOUT_SECS,
            )),
            shell_ref_limit: env_var_or("CMS_SHELL_REF_LIMIT", defaults.shell_ref_limit),
            preview: env_bool_or("CMS_PREVIEW", defaults.preview),
        }
    }

    pub fn with_budget(mut self, budget: BatchBudget) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_max_ids_per_batch(mut self, max_ids: usize) -> Self {
        self.budget.max_ids_per_batch = max_ids;
        self
    }

    pub fn with_fetch_concurrency(mut self, concurrency: usize) -> Self {
        self.fetch_concurrency = concurrency;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_shell_ref_limit(mut self, limit: usize) -> Self {
        self.shell_ref_limit = limit;
        self
    }

    pub fn with_preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            budget: BatchBudget::default(),
            fetch_concurrency: Self::DEFAULT_FETCH_CONCURRENCY,
            request_timeout: Duration::from_secs(Self::DEFAULT_REQUEST_TIMEOUT_SECS),
            shell_ref_limit: Self::DEFAULT_SHELL_REF_LIMIT,
            preview: false,
        }
    }
}
