//! Output formatting utilities for the CLI.

use std::fmt::Write as _;

use cms_pages::resolver::{FetchPlan, ResolveError, ResolveStats};
use cms_pages::types::{AssembledDocument, ContentType};
use serde::Serialize;

/// Exit status for a failed command: 2 for a missing page, 1 otherwise.
pub fn exit_code(error: &anyhow::Error) -> u8 {
    match error.downcast_ref::<ResolveError>() {
        Some(err) if err.is_not_found() => 2,
        _ => 1,
    }
}

/// Format an error for display
pub fn format_error(error: &anyhow::Error, json_output: bool) -> String {
    if json_output {
        #[derive(Serialize)]
        struct ErrorJson {
            error: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            cause: Option<String>,
        }

        let err = ErrorJson {
            error: error.to_string(),
            cause: error.chain().nth(1).map(|e| e.to_string()),
        };
        let mut out = serde_json::to_string_pretty(&err).unwrap_or_else(|_| "{}".to_string());
        out.push('\n');
        out
    } else {
        let mut out = format!("\x1b[31mError:\x1b[0m {}\n", error);
        let mut causes = error.chain().skip(1).peekable();
        if causes.peek().is_some() {
            out.push_str("Caused by:\n");
            for (idx, cause) in causes.enumerate() {
                let _ = writeln!(out, "  {}: {}", idx + 1, cause);
            }
        }
        out
    }
}

/// One line per item: position in the output, type, id.
pub fn format_document(document: &AssembledDocument, stats: Option<&ResolveStats>) -> String {
    let mut out = format!(
        "{} ({}, {}): {} items\n",
        document.id,
        document.slug,
        document.locale,
        document.items.len()
    );
    for (idx, item) in document.items.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {:>3}  {:<22} {}",
            idx,
            item.content_type.typename(),
            item.id
        );
    }
    if let Some(stats) = stats {
        let _ = writeln!(
            out,
            "\n{} refs, {} types, {} batches, {} dropped, {}ms",
            stats.refs, stats.distinct_types, stats.batches, stats.dropped, stats.elapsed_ms
        );
    }
    out
}

pub fn format_plan(plan: &FetchPlan) -> String {
    let mut out = format!(
        "{} ({}, {}): {} refs, {} requests\n",
        plan.page_id,
        plan.slug,
        plan.locale,
        plan.refs,
        plan.batch_count()
    );
    for ty in &plan.types {
        let sizes: Vec<String> = ty.batches.iter().map(|b| b.len().to_string()).collect();
        let _ = writeln!(
            out,
            "  {:<22} {:>4} ids  batches [{}]",
            ty.content_type.typename(),
            ty.ids,
            sizes.join(", ")
        );
    }
    out
}

pub fn format_types() -> String {
    let mut out = String::new();
    for ty in ContentType::ALL {
        let _ = writeln!(
            out,
            "{:<14} {:<22} {}",
            format!("{ty:?}"),
            ty.typename(),
            ty.collection_field()
        );
    }
    out
}

#[derive(Serialize)]
pub struct ContentTypeJson {
    pub name: String,
    pub typename: &'static str,
    pub collection: &'static str,
}

pub fn types_json() -> Vec<ContentTypeJson> {
    ContentType::ALL
        .iter()
        .map(|ty| ContentTypeJson {
            name: format!("{ty:?}"),
            typename: ty.typename(),
            collection: ty.collection_field(),
        })
        .collect()
}
