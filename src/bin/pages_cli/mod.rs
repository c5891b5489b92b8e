//! Subcommands of the `cms-pages` binary.

pub mod output;
pub mod plan;
pub mod resolve;
pub mod types;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use cms_pages::resolver::{PageResolver, ResolverConfig};
use cms_pages::transport::{ContentSource, ContentfulClient, ContentfulConfig, InMemorySource};
use tracing::debug;

/// Options shared by every subcommand.
pub struct PagesContext {
    pub endpoint: Option<String>,
    pub fixture: Option<PathBuf>,
}

impl PagesContext {
    /// The upstream to query: the fixture file when given, the delivery API otherwise.
    pub fn source(&self) -> Result<Arc<dyn ContentSource>> {
        if let Some(path) = &self.fixture {
            debug!(fixture = %path.display(), "using fixture source");
            let source = InMemorySource::from_fixture_file(path)
                .with_context(|| format!("load fixture {}", path.display()))?;
            return Ok(Arc::new(source));
        }

        let mut config = ContentfulConfig::from_env().context("configure delivery API client")?;
        if let Some(endpoint) = &self.endpoint {
            config = config.with_endpoint(endpoint);
        }
        debug!(endpoint = %config.endpoint, "using delivery API");
        Ok(Arc::new(ContentfulClient::new(config)))
    }

    pub fn resolver(&self, preview: bool) -> Result<PageResolver> {
        let mut config = ResolverConfig::from_env();
        if preview {
            config = config.with_preview(true);
        }
        Ok(PageResolver::new(self.source()?, config))
    }
}
