//! Markup loading and page parsing.
//!
//! First stage of the pipeline. Takes raw exported markup plus a page id
//! and produces a [`ParsedPage`]: the mutable tree, the page title, and
//! the asset/navigation references the later stages normalize.
//!
//! Malformed markup is tolerated — html5ever auto-recovers and the partial
//! tree is processed like any other. Parser recovery messages become
//! [`Warning::ParseRecoverable`] entries rather than errors.
//!
//! Embedded `<script>` and `<style>` blocks are structural noise for
//! schema inference (they belong to the asset pipeline), so they are
//! detached from the tree before anything downstream sees it.

use crate::dom::Dom;
use crate::types::Warning;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PageError {
    /// The recovered tree has no `<body>` content at all, so there is
    /// nothing to infer from.
    #[error("page '{0}' has an empty document body")]
    EmptyDocument(String),
}

/// A parsed page, alive only between parsing and manifest construction.
///
/// The tree is `Clone`: the rewriter mutates a copy while the extractor
/// re-walks this original.
#[derive(Debug, Clone)]
pub struct ParsedPage {
    pub page_id: String,
    /// From `<head><title>`, falling back to the page id.
    pub title: String,
    pub dom: Dom,
    /// Every `img[src]` in document order.
    pub asset_refs: Vec<String>,
    /// Every `a[href]` in document order.
    pub nav_refs: Vec<String>,
}

/// Parse raw markup into a [`ParsedPage`].
///
/// Never fails on malformed input; the only error is a document whose
/// recovered `<body>` holds no elements at all. Recovery messages are
/// appended to `warnings`.
pub fn parse(
    raw: &str,
    page_id: &str,
    warnings: &mut Vec<Warning>,
) -> Result<ParsedPage, PageError> {
    let mut dom = Dom::parse(raw);

    for detail in dom.parse_errors.drain(..) {
        warnings.push(Warning::ParseRecoverable { detail });
    }

    // The parser recovers a body for any input, even an empty string.
    let body = dom
        .body()
        .filter(|&b| !dom.child_elements(b).is_empty())
        .ok_or_else(|| PageError::EmptyDocument(page_id.to_string()))?;

    let title = dom
        .head()
        .and_then(|head| {
            dom.child_elements(head)
                .into_iter()
                .find(|&n| dom.tag(n) == Some("title"))
        })
        .map(|t| dom.text_content(t))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| page_id.to_string());

    strip_embedded_blocks(&mut dom);

    let mut asset_refs = Vec::new();
    let mut nav_refs = Vec::new();
    for el in dom.descendant_elements(body) {
        match dom.tag(el) {
            Some("img") => {
                if let Some(src) = dom.element(el).and_then(|e| e.attr("src")) {
                    asset_refs.push(src.to_string());
                }
            }
            Some("a") => {
                if let Some(href) = dom.element(el).and_then(|e| e.attr("href")) {
                    nav_refs.push(href.to_string());
                }
            }
            _ => {}
        }
    }

    Ok(ParsedPage {
        page_id: page_id.to_string(),
        title,
        dom,
        asset_refs,
        nav_refs,
    })
}

/// Detach every `<script>` and `<style>` element. Node removal keeps
/// sibling order for everything that remains, so selectors computed
/// downstream stay positionally valid.
fn strip_embedded_blocks(dom: &mut Dom) {
    let root = match dom.html() {
        Some(html) => html,
        None => return,
    };
    let doomed: Vec<_> = dom
        .descendant_elements(root)
        .into_iter()
        .filter(|&n| matches!(dom.tag(n), Some("script") | Some("style")))
        .collect();
    for node in doomed {
        dom.detach(node);
    }
}
