use anyhow::{Context, Result};
use clap::Parser;

use super::output;

#[derive(Parser, Debug)]
#[command(about = "List the content types the resolver knows")]
pub struct TypesCmd {}

impl TypesCmd {
    pub fn execute(&self, json_output: bool) -> Result<()> {
        if json_output {
            println!(
                "{}",
                serde_json::to_string_pretty(&output::types_json()).context("serialize types")?
            );
        } else {
            print!("{}", output::format_types());
        }
        Ok(())
    }
}
