use anyhow::{Context, Result};
use clap::Parser;

use super::{output, PagesContext};

#[derive(Parser, Debug)]
#[command(about = "Resolve a page and print its items in author order")]
pub struct ResolveCmd {
    /// Page slug
    slug: String,

    /// Content locale
    #[arg(long, default_value = "en-US")]
    locale: String,

    /// Fetch draft content with the preview token
    #[arg(long)]
    preview: bool,

    /// Print resolution counters after the items. With `--json` the output
    /// becomes `{ "document": ..., "stats": ... }`.
    #[arg(long)]
    stats: bool,
}

impl ResolveCmd {
    pub async fn execute(&self, ctx: &PagesContext, json_output: bool, verbose: bool) -> Result<()> {
        let resolver = ctx.resolver(self.preview)?;
        let (document, stats) = resolver
            .resolve_document_with_stats(&self.slug, &self.locale)
            .await
            .with_context(|| format!("resolve page '{}'", self.slug))?;

        if json_output && self.stats {
            let body = serde_json::json!({ "document": document, "stats": stats });
            println!(
                "{}",
                serde_json::to_string_pretty(&body).context("serialize page")?
            );
        } else if json_output {
            println!(
                "{}",
                serde_json::to_string_pretty(&document).context("serialize page")?
            );
        } else {
            let stats = (self.stats || verbose).then_some(&stats);
            print!("{}", output::format_document(&document, stats));
        }
        Ok(())
    }
}
