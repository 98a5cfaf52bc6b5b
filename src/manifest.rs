//! Manifest construction and the construct-then-load store.
//!
//! The manifest is built exactly once per run from the per-page detection
//! results, after which it is immutable: downstream consumers get it by
//! reference and never write back. There is no incremental merge — every
//! run fully replaces the previous manifest.
//!
//! [`ManifestStore`] enforces the lifecycle: `read()` before `build()` or
//! `load()` is a [`ManifestError::NotLoaded`], fatal to that call only.

use crate::detect::PageDetection;
use crate::naming::derive_route;
use crate::types::{ContentManifest, PageMeta, PageSchema, MANIFEST_VERSION};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("manifest accessed before build/load")]
    NotLoaded,
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Merge per-page detections into one versioned manifest.
///
/// The union is associative — pages are independent and each contributes
/// exactly one entry, fully populated or absent, never partial.
pub fn build(pages: BTreeMap<String, PageDetection>) -> ContentManifest {
    let pages = pages
        .into_iter()
        .map(|(page_id, detection)| {
            let route = derive_route(&page_id);
            (
                page_id,
                PageSchema {
                    fields: detection.fields,
                    collections: detection.collections,
                    meta: PageMeta { route },
                },
            )
        })
        .collect();
    ContentManifest {
        version: MANIFEST_VERSION,
        pages,
    }
}

/// Holder enforcing the construct-then-load lifecycle.
#[derive(Debug, Default)]
pub struct ManifestStore {
    manifest: Option<ContentManifest>,
}

impl ManifestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a freshly built manifest, replacing any previous one.
    pub fn load(&mut self, manifest: ContentManifest) {
        self.manifest = Some(manifest);
    }

    /// Read access; fails until a manifest has been built or loaded.
    pub fn read(&self) -> Result<&ContentManifest, ManifestError> {
        self.manifest.as_ref().ok_or(ManifestError::NotLoaded)
    }

    /// Serialize the loaded manifest as the canonical ordered document.
    pub fn to_json(&self) -> Result<String, ManifestError> {
        Ok(serde_json::to_string_pretty(self.read()?)?)
    }

    /// Load a previously persisted manifest document.
    pub fn from_json(&mut self, json: &str) -> Result<(), ManifestError> {
        self.manifest = Some(serde_json::from_str(json)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InferenceConfig;
    use crate::detect;
    use crate::test_helpers::page_dom;

    fn detection_for(body: &str) -> PageDetection {
        let dom = page_dom(body);
        let mut warnings = Vec::new();
        detect::detect(&dom, &InferenceConfig::default(), &mut warnings)
    }

    #[test]
    fn build_derives_routes() {
        let mut pages = BTreeMap::new();
        pages.insert("index".to_string(), PageDetection::default());
        pages.insert("press-release/article".to_string(), PageDetection::default());

        let manifest = build(pages);
        assert_eq!(manifest.version, MANIFEST_VERSION);
        assert_eq!(manifest.pages["index"].meta.route, "/");
        assert_eq!(
            manifest.pages["press-release/article"].meta.route,
            "/press-release/article"
        );
    }

    #[test]
    fn read_before_load_fails() {
        let store = ManifestStore::new();
        assert!(matches!(store.read(), Err(ManifestError::NotLoaded)));
    }

    #[test]
    fn read_after_load_succeeds() {
        let mut store = ManifestStore::new();
        store.load(build(BTreeMap::new()));
        assert!(store.read().is_ok());
    }

    #[test]
    fn json_round_trip_preserves_manifest() {
        let mut pages = BTreeMap::new();
        pages.insert(
            "index".to_string(),
            detection_for(r#"<section class="hero"><h1>Welcome to the site</h1></section>"#),
        );
        let manifest = build(pages);

        let mut store = ManifestStore::new();
        store.load(manifest.clone());
        let json = store.to_json().unwrap();

        let mut reloaded = ManifestStore::new();
        reloaded.from_json(&json).unwrap();
        assert_eq!(reloaded.read().unwrap(), &manifest);
    }

    #[test]
    fn canonical_document_is_ordered() {
        let mut pages = BTreeMap::new();
        pages.insert("zulu".to_string(), PageDetection::default());
        pages.insert("alpha".to_string(), PageDetection::default());
        let mut store = ManifestStore::new();
        store.load(build(pages));
        let json = store.to_json().unwrap();
        assert!(json.find("alpha").unwrap() < json.find("zulu").unwrap());
    }

    #[test]
    fn load_fully_replaces_previous_manifest() {
        let mut first = BTreeMap::new();
        first.insert("index".to_string(), PageDetection::default());
        let mut second = BTreeMap::new();
        second.insert("about".to_string(), PageDetection::default());

        let mut store = ManifestStore::new();
        store.load(build(first));
        store.load(build(second));
        let manifest = store.read().unwrap();
        assert!(!manifest.pages.contains_key("index"));
        assert!(manifest.pages.contains_key("about"));
    }
}
