use anyhow::{Context, Result};
use clap::Parser;

use super::{output, PagesContext};

#[derive(Parser, Debug)]
#[command(about = "Show the per-type batches a page needs, without fetching entries")]
pub struct PlanCmd {
    /// Page slug
    slug: String,

    /// Content locale
    #[arg(long, default_value = "en-US")]
    locale: String,

    /// Plan against draft content
    #[arg(long)]
    preview: bool,
}

impl PlanCmd {
    pub async fn execute(&self, ctx: &PagesContext, json_output: bool) -> Result<()> {
        let resolver = ctx.resolver(self.preview)?;
        let plan = resolver
            .plan_document(&self.slug, &self.locale)
            .await
            .with_context(|| format!("plan page '{}'", self.slug))?;

        if json_output {
            println!(
                "{}",
                serde_json::to_string_pretty(&plan).context("serialize plan")?
            );
        } else {
            print!("{}", output::format_plan(&plan));
        }
        Ok(())
    }
}
