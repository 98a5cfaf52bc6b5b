//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output is **schema-centric, not file-centric**. The primary display for
//! every entity (page, field, collection) is its semantic identity — the
//! normalized name and inferred type — with the CSS-like selector shown as
//! secondary context. The inventory reads as a content model; the selectors
//! are there to trace an entry back to the markup.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Pages
//! 001 index  /
//!     hero_title  plain-text
//!         section.hero > h1
//!     story_cards  collection (title, description)
//!         div.grid > div.story-card
//!
//! 2 fields, 1 collection across 1 page
//! ```
//!
//! ## Build
//!
//! ```text
//! index → templates/index.html
//! story_cards → backend/story_cards.schema.json
//!
//! Wrote 1 template, 2 content types, 1 seed document
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.

use crate::pipeline::PipelineReport;
use crate::types::{ContentManifest, Warning};
use std::collections::BTreeMap;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Scan output
// ============================================================================

/// Format the inferred content model as a per-page inventory.
///
/// Each page leads with its id and route; fields and collections follow
/// with their type, then the selector as an indented context line.
pub fn format_scan_output(manifest: &ContentManifest) -> Vec<String> {
    let mut lines = Vec::new();
    let mut total_fields = 0;
    let mut total_collections = 0;

    lines.push("Pages".to_string());
    for (i, (page_id, page)) in manifest.pages.iter().enumerate() {
        lines.push(format!(
            "{} {}  {}",
            format_index(i + 1),
            page_id,
            page.meta.route
        ));
        for (name, field) in &page.fields {
            lines.push(format!("    {}  {}", name, field.field_type));
            lines.push(format!("        {}", field.selector));
            total_fields += 1;
        }
        for (name, collection) in &page.collections {
            let item_fields: Vec<&str> = collection.fields.keys().map(String::as_str).collect();
            lines.push(format!(
                "    {}  collection ({})",
                name,
                item_fields.join(", ")
            ));
            lines.push(format!("        {}", collection.selector));
            total_collections += 1;
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "{}, {} across {}",
        plural(total_fields, "field"),
        plural(total_collections, "collection"),
        plural(manifest.pages.len(), "page")
    ));

    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(manifest: &ContentManifest) {
    for line in format_scan_output(manifest) {
        println!("{line}");
    }
}

// ============================================================================
// Build output
// ============================================================================

/// Format the build summary: one arrow line per written artifact, then
/// totals.
pub fn format_build_output(report: &PipelineReport) -> Vec<String> {
    let mut lines = Vec::new();

    for template in &report.templates {
        lines.push(format!(
            "{} \u{2192} templates/{}.html",
            template.page_id, template.page_id
        ));
    }
    for name in report.backend_schemas.keys() {
        lines.push(format!("{name} \u{2192} backend/{name}.schema.json"));
    }

    lines.push(String::new());
    lines.push(format!(
        "Wrote {}, {}, 1 seed document",
        plural(report.templates.len(), "template"),
        plural(report.backend_schemas.len(), "content type"),
    ));

    lines
}

/// Print build output to stdout.
pub fn print_build_output(report: &PipelineReport) {
    for line in format_build_output(report) {
        println!("{line}");
    }
}

// ============================================================================
// Warnings and failures
// ============================================================================

/// Format collected warnings grouped by page. Pages with no warnings are
/// omitted; an empty batch formats to no lines at all.
pub fn format_warnings(warnings: &BTreeMap<String, Vec<Warning>>) -> Vec<String> {
    let total: usize = warnings.values().map(Vec::len).sum();
    if total == 0 {
        return Vec::new();
    }
    let mut lines = Vec::new();
    lines.push(format!("{}", plural(total, "warning")));
    for (page_id, page_warnings) in warnings {
        if page_warnings.is_empty() {
            continue;
        }
        lines.push(format!("    {page_id}"));
        for warning in page_warnings {
            lines.push(format!("        {warning}"));
        }
    }
    lines
}

/// Print warnings to stderr, where they survive stdout redirection.
pub fn print_warnings(warnings: &BTreeMap<String, Vec<Warning>>) {
    for line in format_warnings(warnings) {
        eprintln!("{line}");
    }
}

/// Format dropped pages, one line each.
pub fn format_failures(failures: &[crate::pipeline::PageFailure]) -> Vec<String> {
    failures
        .iter()
        .map(|f| format!("skipped {}: {}", f.page_id, f.error))
        .collect()
}

/// Print failures to stderr.
pub fn print_failures(failures: &[crate::pipeline::PageFailure]) {
    for line in format_failures(failures) {
        eprintln!("{line}");
    }
}
