//! Pipeline orchestration.
//!
//! Runs the full inference chain over a batch of exported pages:
//!
//! ```text
//! parse ──> detect ──> manifest ──┬──> rewrite (templates)
//!                                 ├──> backend (content types)
//!                                 └──> extract (seed content)
//! ```
//!
//! Pages are independent, so the per-page stages fan out in parallel using
//! [rayon](https://docs.rs/rayon). The batch runs in two waves: parse and
//! detect first, because the manifest must see every page before any
//! projection; then rewrite and extract against the finished manifest.
//!
//! One bad page never aborts the batch. Parse failures land in
//! [`PipelineReport::failures`]; everything recoverable lands in the
//! per-page warning lists.

use crate::backend::{self, BackendSchema};
use crate::config::SiteConfig;
use crate::detect;
use crate::extract;
use crate::manifest::{self, ManifestStore};
use crate::parse::{self, PageError, ParsedPage};
use crate::rewrite::{self, PortableTemplate};
use crate::types::{ContentManifest, ExtractedContent, Warning};
use rayon::prelude::*;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("manifest error: {0}")]
    Manifest(#[from] crate::manifest::ManifestError),
}

/// One raw page handed to the pipeline.
#[derive(Debug, Clone)]
pub struct PageInput {
    pub page_id: String,
    pub raw_html: String,
}

/// A page the pipeline had to drop entirely.
#[derive(Debug)]
pub struct PageFailure {
    pub page_id: String,
    pub error: PageError,
}

/// Everything one run produces.
#[derive(Debug)]
pub struct PipelineReport {
    pub manifest: ContentManifest,
    pub templates: Vec<PortableTemplate>,
    pub backend_schemas: BTreeMap<String, BackendSchema>,
    pub content: ExtractedContent,
    pub seed: serde_json::Value,
    pub warnings: BTreeMap<String, Vec<Warning>>,
    pub failures: Vec<PageFailure>,
}

impl PipelineReport {
    pub fn warning_count(&self) -> usize {
        self.warnings.values().map(Vec::len).sum()
    }
}

/// Run the full pipeline over a batch of pages.
pub fn run(inputs: Vec<PageInput>, config: &SiteConfig) -> Result<PipelineReport, PipelineError> {
    // Wave 1: parse and infer, per page.
    let wave1: Vec<_> = inputs
        .par_iter()
        .map(|input| {
            let mut warnings = Vec::new();
            let result = parse::parse(&input.raw_html, &input.page_id, &mut warnings).map(
                |page| {
                    let detection = detect::detect(&page.dom, &config.inference, &mut warnings);
                    (page, detection)
                },
            );
            (input.page_id.clone(), result, warnings)
        })
        .collect();

    let mut parsed: Vec<ParsedPage> = Vec::new();
    let mut detections = BTreeMap::new();
    let mut warnings: BTreeMap<String, Vec<Warning>> = BTreeMap::new();
    let mut failures = Vec::new();
    for (page_id, result, page_warnings) in wave1 {
        warnings.entry(page_id.clone()).or_default().extend(page_warnings);
        match result {
            Ok((page, detection)) => {
                detections.insert(page_id, detection);
                parsed.push(page);
            }
            Err(error) => failures.push(PageFailure { page_id, error }),
        }
    }

    let mut store = ManifestStore::new();
    store.load(manifest::build(detections));
    let manifest = store.read()?;

    // Wave 2: project the manifest back onto each surviving page.
    let wave2: Vec<_> = parsed
        .par_iter()
        .map(|page| {
            let mut page_warnings = Vec::new();
            let schema = &manifest.pages[&page.page_id];
            let template = rewrite::rewrite(page, schema, config, &mut page_warnings);
            let content = extract::extract(
                page,
                schema,
                &config.assets.root_prefix,
                &mut page_warnings,
            );
            (page.page_id.clone(), template, content, page_warnings)
        })
        .collect();

    let mut templates = Vec::new();
    let mut content = ExtractedContent::new();
    for (page_id, template, page_content, page_warnings) in wave2 {
        warnings.entry(page_id.clone()).or_default().extend(page_warnings);
        templates.push(template);
        content.insert(page_id, page_content);
    }
    templates.sort_by(|a, b| a.page_id.cmp(&b.page_id));

    let backend_schemas = backend::compile(manifest, config.backend.draft_and_publish);
    let seed = extract::seed_document(&content);

    Ok(PipelineReport {
        manifest: manifest.clone(),
        templates,
        backend_schemas,
        content,
        seed,
        warnings,
        failures,
    })
}
